//! in-memory [`Store`] for unit tests, with fault injection

use crate::server::database::error::DbError;
use crate::server::database::store::Store;
use crate::server::model::bill::{BillDetail, BillId, BillReceipt, NewOrderLine, OrderLine};
use crate::server::model::menu::{MenuItem, MenuItemDraft, MenuItemId};
use crate::server::model::order::OrderHistoryEntry;
use crate::server::util::time::helper::get_utc_now;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub(crate) struct StoredBill {
    pub bill_id: BillId,
    pub bill_time: DateTime<Utc>,
    pub total_amount: Decimal,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    pub menu: Vec<MenuItem>,
    pub admins: HashMap<String, String>,
    pub bills: Vec<StoredBill>,
    pub orders: Vec<OrderLine>,
    next_bill_id: BillId,
    next_order_id: i64,
    /// store calls made so far
    pub calls: usize,
    /// make `create_bill` come back without a generated key
    pub omit_generated_key: bool,
    /// make `create_bill` fail on the order line at this index
    pub fail_order_line_at: Option<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_menu(items: &[(&str, Decimal)]) -> Self {
        let store = Self::new();
        {
            let mut state = store.state();
            for (i, (name, price)) in items.iter().enumerate() {
                state.menu.push(MenuItem {
                    id: i as MenuItemId + 1,
                    name: name.to_string(),
                    price: *price,
                });
            }
        }
        store
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    fn enter(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        let mut state = self.state();
        state.calls += 1;
        state
    }
}

impl Store for MemoryStore {
    async fn list_menu(&self) -> Result<Vec<MenuItem>, DbError> {
        let state = self.enter();
        let mut items = state.menu.clone();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    async fn find_menu_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, DbError> {
        Ok(self.enter().menu.iter().find(|item| item.id == id).cloned())
    }

    async fn add_menu_item(&self, draft: &MenuItemDraft) -> Result<MenuItem, DbError> {
        let mut state = self.enter();
        let id = state.menu.iter().map(|item| item.id).max().unwrap_or(0) + 1;
        let item = MenuItem {
            id,
            name: draft.name.clone(),
            price: draft.price,
        };
        state.menu.push(item.clone());
        Ok(item)
    }

    async fn update_menu_item(&self, id: MenuItemId, draft: &MenuItemDraft) -> Result<MenuItem, DbError> {
        let mut state = self.enter();
        let item = state
            .menu
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(DbError::NoRowsAffected)?;
        item.name = draft.name.clone();
        item.price = draft.price;
        Ok(item.clone())
    }

    async fn delete_menu_item(&self, id: MenuItemId) -> Result<(), DbError> {
        let mut state = self.enter();
        let before = state.menu.len();
        state.menu.retain(|item| item.id != id);
        match state.menu.len() == before {
            true => Err(DbError::NoRowsAffected),
            false => Ok(()),
        }
    }

    async fn create_bill(&self, total_amount: Decimal, lines: &[NewOrderLine]) -> Result<BillReceipt, DbError> {
        let mut state = self.enter();
        if state.omit_generated_key {
            return Err(DbError::MissingGeneratedKey);
        }
        // stage everything, apply only when every line made it
        let bill_id = state.next_bill_id + 1;
        let mut staged = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            if state.fail_order_line_at == Some(i) {
                return Err(DbError::Timeout);
            }
            staged.push(OrderLine {
                order_id: state.next_order_id + i as i64 + 1,
                bill_id,
                item_name: line.item_name.clone(),
                item_price: line.item_price,
                quantity: line.quantity,
                subtotal: line.subtotal,
            });
        }
        let receipt = BillReceipt {
            bill_id,
            bill_time: get_utc_now(),
            total_amount,
        };
        state.next_bill_id = bill_id;
        state.next_order_id += staged.len() as i64;
        state.bills.push(StoredBill {
            bill_id,
            bill_time: receipt.bill_time,
            total_amount,
        });
        state.orders.extend(staged);
        Ok(receipt)
    }

    async fn find_bill(&self, id: BillId) -> Result<Option<BillDetail>, DbError> {
        let state = self.enter();
        Ok(state.bills.iter().find(|bill| bill.bill_id == id).map(|bill| BillDetail {
            bill_id: bill.bill_id,
            bill_time: bill.bill_time,
            total_amount: bill.total_amount,
            lines: state.orders.iter().filter(|line| line.bill_id == id).cloned().collect(),
        }))
    }

    async fn order_history(&self, offset: i64, limit: i64) -> Result<Vec<OrderHistoryEntry>, DbError> {
        let state = self.enter();
        let mut entries = state
            .orders
            .iter()
            .filter_map(|line| {
                let bill = state.bills.iter().find(|bill| bill.bill_id == line.bill_id)?;
                Some(OrderHistoryEntry {
                    order_id: line.order_id,
                    bill_id: line.bill_id,
                    item_name: line.item_name.clone(),
                    item_price: line.item_price,
                    quantity: line.quantity,
                    subtotal: line.subtotal,
                    bill_time: bill.bill_time,
                })
            })
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| b.bill_time.cmp(&a.bill_time).then(b.order_id.cmp(&a.order_id)));
        Ok(entries
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn find_admin_password(&self, username: &str) -> Result<Option<String>, DbError> {
        Ok(self.enter().admins.get(username).cloned())
    }

    async fn ensure_admin(&self, username: &str, password_hash: &str) -> Result<bool, DbError> {
        let mut state = self.enter();
        if state.admins.contains_key(username) {
            return Ok(false);
        }
        state.admins.insert(username.to_string(), password_hash.to_string());
        Ok(true)
    }
}
