use derive_more::{Display, Error};
use serde::Deserialize;

pub(crate) mod admin;
pub(crate) mod bill;
pub(crate) mod cart;
pub(crate) mod config;
pub(crate) mod menu;
pub(crate) mod order;

#[derive(Debug, Deserialize)]
pub(crate) struct CommonRequestParams {
    pub page: Option<u8>,
    pub page_size: Option<u8>,
}

impl CommonRequestParams {
    /// (offset, limit) for the requested page, 20 rows per page by default
    pub fn offset_limit(&self) -> (i64, i64) {
        let (page, page_size) = (self.page.unwrap_or(0), self.page_size.unwrap_or(20).max(1));
        (page as i64 * page_size as i64, page_size as i64)
    }
}

/// Rejected user input. Raised before any database work happens.
#[derive(Debug, Display, Error, PartialEq)]
pub(crate) enum InputError {
    #[display("Name cannot be empty and Price must be positive.")]
    InvalidMenuItem,
    #[display("Please enter a valid price (e.g., 100.00).")]
    InvalidPrice,
    #[display("Please enter a valid menu item ID.")]
    InvalidId,
    #[display("Please enter a quantity between 1 and 100.")]
    InvalidQuantity,
    #[display("The cart is empty. Please add items before finalizing a bill.")]
    EmptyCart,
    #[display("Menu item {_0} is not in the cart.")]
    NotInCart(#[error(not(source))] i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_page() {
        let params = CommonRequestParams { page: None, page_size: None };
        assert_eq!(params.offset_limit(), (0, 20));
    }

    #[test]
    fn later_page() {
        let params = CommonRequestParams { page: Some(3), page_size: Some(50) };
        assert_eq!(params.offset_limit(), (150, 50));
        let params = CommonRequestParams { page: Some(1), page_size: Some(0) };
        assert_eq!(params.offset_limit(), (1, 1));
    }
}
