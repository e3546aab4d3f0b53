use crate::server::model::bill::BillId;
use crate::server::util::money::format_money;
use crate::server::util::time::format_timestamp;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// An order line joined with the time of its bill.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderHistoryEntry {
    pub order_id: i64,
    pub bill_id: BillId,
    pub item_name: String,
    pub item_price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
    pub bill_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OrderHistoryView {
    pub order_id: i64,
    pub bill_id: BillId,
    pub item_name: String,
    pub item_price: String,
    pub quantity: i32,
    pub subtotal: String,
    pub bill_time: String,
}

impl From<&OrderHistoryEntry> for OrderHistoryView {
    fn from(entry: &OrderHistoryEntry) -> Self {
        Self {
            order_id: entry.order_id,
            bill_id: entry.bill_id,
            item_name: entry.item_name.clone(),
            item_price: format_money(entry.item_price),
            quantity: entry.quantity,
            subtotal: format_money(entry.subtotal),
            bill_time: format_timestamp(&entry.bill_time),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct GetOrdersResponse {
    pub orders: Vec<OrderHistoryView>,
}
