use crate::server::database::connection::Connection;
use crate::server::database::error::DbError;
use crate::server::database::pool::Pool;
use crate::server::database::store::Store;
use crate::server::database::transaction::{self, WriteTransaction};
use crate::server::model::bill::{BillDetail, BillId, BillReceipt, NewOrderLine, OrderLine};
use crate::server::model::menu::{MenuItem, MenuItemDraft, MenuItemId};
use crate::server::model::order::OrderHistoryEntry;
use chrono::{DateTime, Utc};
use log::info;
use rust_decimal::Decimal;
use std::future::Future;
use std::time::Duration;
use tokio::time;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Row, Transaction};

/// [`Store`] backed by postgres, reads and writes go through separate pools.
pub(crate) struct PgStore {
    read_pool: Pool<Client>,
    write_pool: Pool<Client>,
    timeout: Duration,
}

impl PgStore {
    pub fn new(read_pool: Pool<Client>, write_pool: Pool<Client>, timeout: Duration) -> Self {
        Self {
            read_pool,
            write_pool,
            timeout,
        }
    }

    async fn read(&self) -> Result<Connection<Client>, DbError> {
        self.read_pool
            .acquire(self.timeout)
            .await
            .ok_or(DbError::Busy(self.read_pool.name()))
    }

    async fn write(&self) -> Result<Connection<Client>, DbError> {
        self.write_pool
            .acquire(self.timeout)
            .await
            .ok_or(DbError::Busy(self.write_pool.name()))
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, DbError>
    where
        F: Future<Output = Result<T, tokio_postgres::Error>>,
    {
        bounded(self.timeout, fut).await
    }

    async fn begin<'a>(&self, conn: &'a mut Connection<Client>) -> Result<PgTransaction<'a>, DbError> {
        let txn = self.bounded(conn.transaction()).await?;
        Ok(PgTransaction {
            txn,
            timeout: self.timeout,
        })
    }
}

/// run one database round trip under `timeout`
async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, tokio_postgres::Error>>,
{
    match time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(DbError::from),
        Err(_) => Err(DbError::Timeout),
    }
}

pub(crate) struct PgTransaction<'a> {
    txn: Transaction<'a>,
    timeout: Duration,
}

impl WriteTransaction for PgTransaction<'_> {
    async fn next_menu_item_id(&self) -> Result<MenuItemId, DbError> {
        let row = bounded(
            self.timeout,
            self.txn.query_one("SELECT COALESCE(MAX(id), 0) + 1 AS next_id FROM menu", &[]),
        )
        .await?;
        Ok(row.try_get("next_id")?)
    }

    async fn insert_menu_item(&self, id: MenuItemId, draft: &MenuItemDraft) -> Result<u64, DbError> {
        let params: &[&(dyn ToSql + Sync)] = &[&id, &draft.name, &draft.price];
        bounded(
            self.timeout,
            self.txn.execute("INSERT INTO menu (id, name, price) VALUES ($1, $2, $3)", params),
        )
        .await
    }

    async fn update_menu_item(&self, id: MenuItemId, draft: &MenuItemDraft) -> Result<u64, DbError> {
        let params: &[&(dyn ToSql + Sync)] = &[&draft.name, &draft.price, &id];
        bounded(
            self.timeout,
            self.txn.execute("UPDATE menu SET name = $1, price = $2 WHERE id = $3", params),
        )
        .await
    }

    async fn delete_menu_item(&self, id: MenuItemId) -> Result<u64, DbError> {
        bounded(self.timeout, self.txn.execute("DELETE FROM menu WHERE id = $1", &[&id])).await
    }

    async fn insert_bill(&self, total_amount: Decimal) -> Result<Option<(BillId, DateTime<Utc>)>, DbError> {
        let row = bounded(
            self.timeout,
            self.txn.query_opt(
                "INSERT INTO bills (total_amount) VALUES ($1) RETURNING bill_id, bill_time",
                &[&total_amount],
            ),
        )
        .await?;
        Ok(row.and_then(|row| match (row.try_get("bill_id"), row.try_get("bill_time")) {
            (Ok(bill_id), Ok(bill_time)) => Some((bill_id, bill_time)),
            _ => None,
        }))
    }

    async fn insert_order_lines(&self, bill_id: BillId, lines: &[NewOrderLine]) -> Result<u64, DbError> {
        let (stmt, params) = order_lines_insert(&bill_id, lines);
        bounded(self.timeout, self.txn.execute(stmt.as_str(), params.as_slice())).await
    }

    async fn insert_admin(&self, username: &str, password_hash: &str) -> Result<u64, DbError> {
        bounded(
            self.timeout,
            self.txn.execute(
                "INSERT INTO admin (username, password) VALUES ($1, $2) ON CONFLICT (username) DO NOTHING",
                &[&username, &password_hash],
            ),
        )
        .await
    }

    async fn commit(self) -> Result<(), DbError> {
        bounded(self.timeout, self.txn.commit()).await
    }

    async fn rollback(self) -> Result<(), DbError> {
        bounded(self.timeout, self.txn.rollback()).await
    }
}

fn menu_item_from_row(row: &Row) -> Result<MenuItem, DbError> {
    Ok(MenuItem {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price: row.try_get("price")?,
    })
}

fn order_line_from_row(row: &Row) -> Result<OrderLine, DbError> {
    Ok(OrderLine {
        order_id: row.try_get("order_id")?,
        bill_id: row.try_get("bill_id")?,
        item_name: row.try_get("item_name")?,
        item_price: row.try_get("item_price")?,
        quantity: row.try_get("quantity")?,
        subtotal: row.try_get("subtotal")?,
    })
}

/// multi-row insert of every order line of a bill
fn order_lines_insert<'a>(bill_id: &'a BillId, lines: &'a [NewOrderLine]) -> (String, Vec<&'a (dyn ToSql + Sync)>) {
    const COLUMN_LEN: usize = 5;
    let mut stmt = "INSERT INTO orders (bill_id, item_name, item_price, quantity, subtotal) VALUES".to_string();
    let mut params: Vec<&(dyn ToSql + Sync)> = Vec::with_capacity(lines.len() * COLUMN_LEN);
    for (i, line) in lines.iter().enumerate() {
        let idx = i * COLUMN_LEN + 1;
        let maybe_comma = if i != lines.len() - 1 { "," } else { "" };
        stmt.push_str(&format!(
            " (${}, ${}, ${}, ${}, ${}){}",
            idx,
            idx + 1,
            idx + 2,
            idx + 3,
            idx + 4,
            maybe_comma
        ));
        params.push(bill_id);
        params.push(&line.item_name);
        params.push(&line.item_price);
        params.push(&line.quantity);
        params.push(&line.subtotal);
    }
    (stmt, params)
}

impl Store for PgStore {
    async fn list_menu(&self) -> Result<Vec<MenuItem>, DbError> {
        let conn = self.read().await?;
        let rows = self
            .bounded(conn.query("SELECT id, name, price FROM menu ORDER BY id", &[]))
            .await?;
        rows.iter().map(menu_item_from_row).collect()
    }

    async fn find_menu_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, DbError> {
        let conn = self.read().await?;
        let row = self
            .bounded(conn.query_opt("SELECT id, name, price FROM menu WHERE id = $1", &[&id]))
            .await?;
        row.as_ref().map(menu_item_from_row).transpose()
    }

    async fn add_menu_item(&self, draft: &MenuItemDraft) -> Result<MenuItem, DbError> {
        let mut conn = self.write().await?;
        let txn = self.begin(&mut conn).await?;
        transaction::add_menu_item(txn, draft).await
    }

    async fn update_menu_item(&self, id: MenuItemId, draft: &MenuItemDraft) -> Result<MenuItem, DbError> {
        let mut conn = self.write().await?;
        let txn = self.begin(&mut conn).await?;
        transaction::update_menu_item(txn, id, draft).await
    }

    async fn delete_menu_item(&self, id: MenuItemId) -> Result<(), DbError> {
        let mut conn = self.write().await?;
        let txn = self.begin(&mut conn).await?;
        transaction::delete_menu_item(txn, id).await
    }

    async fn create_bill(&self, total_amount: Decimal, lines: &[NewOrderLine]) -> Result<BillReceipt, DbError> {
        let mut conn = self.write().await?;
        let txn = self.begin(&mut conn).await?;
        let receipt = transaction::create_bill(txn, total_amount, lines).await?;
        info!("bill={} committed with {} order lines", receipt.bill_id, lines.len());
        Ok(receipt)
    }

    async fn find_bill(&self, id: BillId) -> Result<Option<BillDetail>, DbError> {
        let conn = self.read().await?;
        let Some(row) = self
            .bounded(conn.query_opt(
                "SELECT bill_id, bill_time, total_amount FROM bills WHERE bill_id = $1",
                &[&id],
            ))
            .await?
        else {
            return Ok(None);
        };
        let rows = self
            .bounded(conn.query(
                r#"
                SELECT order_id, bill_id, item_name, item_price, quantity, subtotal
                FROM orders
                WHERE bill_id = $1
                ORDER BY order_id
                "#,
                &[&id],
            ))
            .await?;
        Ok(Some(BillDetail {
            bill_id: row.try_get("bill_id")?,
            bill_time: row.try_get("bill_time")?,
            total_amount: row.try_get("total_amount")?,
            lines: rows.iter().map(order_line_from_row).collect::<Result<Vec<_>, _>>()?,
        }))
    }

    async fn order_history(&self, offset: i64, limit: i64) -> Result<Vec<OrderHistoryEntry>, DbError> {
        let conn = self.read().await?;
        let rows = self
            .bounded(conn.query(
                r##"
                SELECT o.order_id, o.bill_id, o.item_name, o.item_price, o.quantity, o.subtotal, b.bill_time
                FROM orders o
                JOIN bills b
                ON o.bill_id = b.bill_id
                ORDER BY b.bill_time DESC, o.order_id DESC
                OFFSET $1
                LIMIT $2
                ;
                "##,
                &[&offset, &limit],
            ))
            .await?;
        rows.iter()
            .map(|r| -> Result<OrderHistoryEntry, DbError> {
                Ok(OrderHistoryEntry {
                    order_id: r.try_get("order_id")?,
                    bill_id: r.try_get("bill_id")?,
                    item_name: r.try_get("item_name")?,
                    item_price: r.try_get("item_price")?,
                    quantity: r.try_get("quantity")?,
                    subtotal: r.try_get("subtotal")?,
                    bill_time: r.try_get("bill_time")?,
                })
            })
            .collect()
    }

    async fn find_admin_password(&self, username: &str) -> Result<Option<String>, DbError> {
        let conn = self.read().await?;
        let row = self
            .bounded(conn.query_opt("SELECT password FROM admin WHERE username = $1", &[&username]))
            .await?;
        Ok(match row {
            Some(row) => Some(row.try_get("password")?),
            None => None,
        })
    }

    async fn ensure_admin(&self, username: &str, password_hash: &str) -> Result<bool, DbError> {
        let mut conn = self.write().await?;
        let txn = self.begin(&mut conn).await?;
        transaction::ensure_admin(txn, username, password_hash).await
    }
}
