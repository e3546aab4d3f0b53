use crate::server::util::money::format_money;
use crate::server::util::time::format_timestamp;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub(crate) type BillId = i64;

/// One cart line as it is written to `orders`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewOrderLine {
    pub item_name: String,
    pub item_price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}

/// What finalizing a cart hands back.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BillReceipt {
    pub bill_id: BillId,
    pub bill_time: DateTime<Utc>,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrderLine {
    pub order_id: i64,
    pub bill_id: BillId,
    pub item_name: String,
    pub item_price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BillDetail {
    pub bill_id: BillId,
    pub bill_time: DateTime<Utc>,
    pub total_amount: Decimal,
    pub lines: Vec<OrderLine>,
}

impl BillDetail {
    pub fn lines_total(&self) -> Decimal {
        self.lines.iter().map(|line| line.subtotal).sum()
    }

    /// the stored total matches what its order lines add up to
    pub fn is_consistent(&self) -> bool {
        self.lines_total() == self.total_amount
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PostFinalizeResponse {
    pub bill_id: BillId,
    pub bill_time: String,
    pub total_amount: String,
}

impl From<&BillReceipt> for PostFinalizeResponse {
    fn from(receipt: &BillReceipt) -> Self {
        Self {
            bill_id: receipt.bill_id,
            bill_time: format_timestamp(&receipt.bill_time),
            total_amount: format_money(receipt.total_amount),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BillLineView {
    pub order_id: i64,
    pub item_name: String,
    pub item_price: String,
    pub quantity: i32,
    pub subtotal: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetBillResponse {
    pub bill_id: BillId,
    pub bill_time: String,
    pub total_amount: String,
    pub lines: Vec<BillLineView>,
    pub consistent: bool,
}

impl From<&BillDetail> for GetBillResponse {
    fn from(bill: &BillDetail) -> Self {
        Self {
            bill_id: bill.bill_id,
            bill_time: format_timestamp(&bill.bill_time),
            total_amount: format_money(bill.total_amount),
            lines: bill
                .lines
                .iter()
                .map(|line| BillLineView {
                    order_id: line.order_id,
                    item_name: line.item_name.clone(),
                    item_price: format_money(line.item_price),
                    quantity: line.quantity,
                    subtotal: format_money(line.subtotal),
                })
                .collect(),
            consistent: bill.is_consistent(),
        }
    }
}
