use crate::server::model::bill::NewOrderLine;
use crate::server::model::menu::{MenuItem, MenuItemId};
use crate::server::model::InputError;
use crate::server::util::money::format_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest quantity accepted for a single cart line.
pub(crate) const MAX_QUANTITY: u32 = 100;

/// A menu item snapshot together with how many of it were ordered.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CartItem {
    menu_item_id: MenuItemId,
    name: String,
    price: Decimal,
    quantity: u32,
    subtotal: Decimal,
}

impl CartItem {
    fn new(item: &MenuItem, quantity: u32) -> Self {
        let mut line = Self {
            menu_item_id: item.id,
            name: item.name.clone(),
            price: item.price,
            quantity,
            subtotal: Decimal::ZERO,
        };
        line.recompute();
        line
    }

    fn recompute(&mut self) {
        self.subtotal = self.price * Decimal::from(self.quantity);
    }

    pub fn menu_item_id(&self) -> MenuItemId {
        self.menu_item_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }
}

pub(crate) fn check_quantity(quantity: u32) -> Result<u32, InputError> {
    match quantity {
        1..=MAX_QUANTITY => Ok(quantity),
        _ => Err(InputError::InvalidQuantity),
    }
}

/// In-memory order of one terminal, dropped once the bill is finalized.
#[derive(Debug, Default)]
pub(crate) struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of `item`, merging into an existing line for the same menu item.
    pub fn add(&mut self, item: &MenuItem, quantity: u32) -> Result<&CartItem, InputError> {
        let quantity = check_quantity(quantity)?;
        match self.items.iter().position(|line| line.menu_item_id == item.id) {
            Some(idx) => {
                let line = &mut self.items[idx];
                line.quantity = check_quantity(line.quantity + quantity)?;
                line.recompute();
                Ok(&self.items[idx])
            }
            None => {
                self.items.push(CartItem::new(item, quantity));
                Ok(&self.items[self.items.len() - 1])
            }
        }
    }

    pub fn set_quantity(&mut self, menu_item_id: MenuItemId, quantity: u32) -> Result<&CartItem, InputError> {
        let quantity = check_quantity(quantity)?;
        let line = self
            .items
            .iter_mut()
            .find(|line| line.menu_item_id == menu_item_id)
            .ok_or(InputError::NotInCart(menu_item_id))?;
        line.quantity = quantity;
        line.recompute();
        Ok(&*line)
    }

    pub fn remove(&mut self, menu_item_id: MenuItemId) -> Result<CartItem, InputError> {
        let idx = self
            .items
            .iter()
            .position(|line| line.menu_item_id == menu_item_id)
            .ok_or(InputError::NotInCart(menu_item_id))?;
        Ok(self.items.remove(idx))
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn order_lines(&self) -> Vec<NewOrderLine> {
        self.items
            .iter()
            .map(|line| NewOrderLine {
                item_name: line.name.clone(),
                item_price: line.price,
                quantity: line.quantity as i32,
                subtotal: line.subtotal,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostCartItemRequest {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PatchCartItemRequest {
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct CartLineView {
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub price: String,
    pub quantity: u32,
    pub subtotal: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetCartResponse {
    pub items: Vec<CartLineView>,
    pub total: String,
}

impl From<&Cart> for GetCartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|line| CartLineView {
                    menu_item_id: line.menu_item_id(),
                    name: line.name().to_string(),
                    price: format_money(line.price()),
                    quantity: line.quantity(),
                    subtotal: format_money(line.subtotal()),
                })
                .collect(),
            total: format_money(cart.total()),
        }
    }
}
