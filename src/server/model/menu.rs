use crate::server::model::InputError;
use crate::server::util::money::MONEY_SCALE;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub(crate) type MenuItemId = i32;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub price: Decimal,
}

/// Admin form input for adding or editing a menu item.
#[derive(Debug, Deserialize)]
pub(crate) struct MenuItemForm {
    pub name: String,
    pub price: String,
}

/// A validated name and price, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MenuItemDraft {
    pub name: String,
    pub price: Decimal,
}

impl MenuItemDraft {
    pub fn parse(name: &str, price: &str) -> Result<Self, InputError> {
        let mut price = Decimal::from_str(price.trim())
            .map_err(|_| InputError::InvalidPrice)?
            .round_dp(MONEY_SCALE);
        // always two places, "5.5" is served as "5.50"
        price.rescale(MONEY_SCALE);
        let name = name.trim();
        if name.is_empty() || price <= Decimal::ZERO {
            return Err(InputError::InvalidMenuItem);
        }
        Ok(Self {
            name: name.to_string(),
            price,
        })
    }
}

impl TryFrom<&MenuItemForm> for MenuItemDraft {
    type Error = InputError;

    fn try_from(form: &MenuItemForm) -> Result<Self, Self::Error> {
        Self::parse(&form.name, &form.price)
    }
}

pub(crate) fn parse_menu_item_id(text: &str) -> Result<MenuItemId, InputError> {
    text.trim().parse().map_err(|_| InputError::InvalidId)
}

#[derive(Debug, Serialize)]
pub(crate) struct GetMenuResponse {
    pub items: Vec<MenuItem>,
}
