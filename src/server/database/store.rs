use crate::server::database::error::DbError;
use crate::server::model::bill::{BillDetail, BillId, BillReceipt, NewOrderLine};
use crate::server::model::menu::{MenuItem, MenuItemDraft, MenuItemId};
use crate::server::model::order::OrderHistoryEntry;
use rust_decimal::Decimal;

/// Every database operation the point of sale performs.
///
/// Writes are atomic: an `Err` means nothing was persisted. Operations that
/// target a row by key report a missing row as [`DbError::NoRowsAffected`].
pub(crate) trait Store: 'static {
    /// whole menu ordered by id
    async fn list_menu(&self) -> Result<Vec<MenuItem>, DbError>;

    async fn find_menu_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, DbError>;

    /// insert with the next id, `max(id) + 1`
    async fn add_menu_item(&self, draft: &MenuItemDraft) -> Result<MenuItem, DbError>;

    async fn update_menu_item(&self, id: MenuItemId, draft: &MenuItemDraft) -> Result<MenuItem, DbError>;

    async fn delete_menu_item(&self, id: MenuItemId) -> Result<(), DbError>;

    /// one bill row plus one order row per line, committed together
    async fn create_bill(&self, total_amount: Decimal, lines: &[NewOrderLine]) -> Result<BillReceipt, DbError>;

    async fn find_bill(&self, id: BillId) -> Result<Option<BillDetail>, DbError>;

    /// newest bill first, then newest order line first
    async fn order_history(&self, offset: i64, limit: i64) -> Result<Vec<OrderHistoryEntry>, DbError>;

    /// stored credential of `username`, if the admin exists
    async fn find_admin_password(&self, username: &str) -> Result<Option<String>, DbError>;

    /// create the admin unless it exists, `true` when it was created
    async fn ensure_admin(&self, username: &str, password_hash: &str) -> Result<bool, DbError>;
}
