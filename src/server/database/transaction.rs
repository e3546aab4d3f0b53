//! write paths of the store, run against any [`WriteTransaction`]

use crate::server::database::error::DbError;
use crate::server::model::bill::{BillId, BillReceipt, NewOrderLine};
use crate::server::model::menu::{MenuItem, MenuItemDraft, MenuItemId};
use chrono::{DateTime, Utc};
use log::{error, warn};
use rust_decimal::Decimal;

/// One open transaction, one method per statement a write needs.
///
/// Implementations bound every call, `commit` and `rollback` included, by the
/// database timeout and report it as [`DbError::Timeout`].
pub(crate) trait WriteTransaction: Sized {
    async fn next_menu_item_id(&self) -> Result<MenuItemId, DbError>;

    async fn insert_menu_item(&self, id: MenuItemId, draft: &MenuItemDraft) -> Result<u64, DbError>;

    async fn update_menu_item(&self, id: MenuItemId, draft: &MenuItemDraft) -> Result<u64, DbError>;

    async fn delete_menu_item(&self, id: MenuItemId) -> Result<u64, DbError>;

    /// generated key and time of the new bill, `None` when no row came back
    async fn insert_bill(&self, total_amount: Decimal) -> Result<Option<(BillId, DateTime<Utc>)>, DbError>;

    async fn insert_order_lines(&self, bill_id: BillId, lines: &[NewOrderLine]) -> Result<u64, DbError>;

    async fn insert_admin(&self, username: &str, password_hash: &str) -> Result<u64, DbError>;

    async fn commit(self) -> Result<(), DbError>;

    async fn rollback(self) -> Result<(), DbError>;
}

/// Commit on `Ok`, roll back on `Err`.
///
/// A commit whose reply is lost may still have been applied, so it comes back
/// as [`DbError::CommitUnconfirmed`] rather than as a plain failure.
pub(crate) async fn finish<T: WriteTransaction, V>(txn: T, op: &str, result: Result<V, DbError>) -> Result<V, DbError> {
    match result {
        Ok(value) => match txn.commit().await {
            Ok(()) => Ok(value),
            Err(DbError::Timeout) => {
                error!("{} commit timed out, outcome unknown", op);
                Err(DbError::CommitUnconfirmed)
            }
            Err(DbError::Postgres(e)) if e.is_closed() => {
                error!("{} lost its connection while committing, outcome unknown, {}", op, e);
                Err(DbError::CommitUnconfirmed)
            }
            Err(e) => Err(e),
        },
        Err(e) => {
            warn!("{} failed, rolling back, {}", op, e);
            if let Err(rollback_err) = txn.rollback().await {
                warn!("{} rollback failed, {}", op, rollback_err);
            }
            Err(e)
        }
    }
}

pub(crate) async fn add_menu_item<T: WriteTransaction>(txn: T, draft: &MenuItemDraft) -> Result<MenuItem, DbError> {
    let result: Result<MenuItem, DbError> = async {
        let id = txn.next_menu_item_id().await?;
        match txn.insert_menu_item(id, draft).await? {
            0 => Err(DbError::NoRowsAffected),
            _ => Ok(MenuItem {
                id,
                name: draft.name.clone(),
                price: draft.price,
            }),
        }
    }
    .await;
    finish(txn, "add_menu_item", result).await
}

pub(crate) async fn update_menu_item<T: WriteTransaction>(
    txn: T,
    id: MenuItemId,
    draft: &MenuItemDraft,
) -> Result<MenuItem, DbError> {
    let result = match txn.update_menu_item(id, draft).await {
        Ok(0) => Err(DbError::NoRowsAffected),
        Ok(_) => Ok(MenuItem {
            id,
            name: draft.name.clone(),
            price: draft.price,
        }),
        Err(e) => Err(e),
    };
    finish(txn, "update_menu_item", result).await
}

pub(crate) async fn delete_menu_item<T: WriteTransaction>(txn: T, id: MenuItemId) -> Result<(), DbError> {
    let result = match txn.delete_menu_item(id).await {
        Ok(0) => Err(DbError::NoRowsAffected),
        Ok(_) => Ok(()),
        Err(e) => Err(e),
    };
    finish(txn, "delete_menu_item", result).await
}

/// The bill row, then every order line in one statement, then commit.
pub(crate) async fn create_bill<T: WriteTransaction>(
    txn: T,
    total_amount: Decimal,
    lines: &[NewOrderLine],
) -> Result<BillReceipt, DbError> {
    let result: Result<BillReceipt, DbError> = async {
        let (bill_id, bill_time) = txn
            .insert_bill(total_amount)
            .await?
            .ok_or(DbError::MissingGeneratedKey)?;
        if !lines.is_empty() {
            let expected = lines.len() as u64;
            let inserted = txn.insert_order_lines(bill_id, lines).await?;
            if inserted != expected {
                return Err(DbError::PartialInsert { expected, inserted });
            }
        }
        Ok(BillReceipt {
            bill_id,
            bill_time,
            total_amount,
        })
    }
    .await;
    let bill_id = result.as_ref().map(|receipt| receipt.bill_id).ok();
    finish(txn, "create_bill", result).await.map_err(|e| match (e, bill_id) {
        (DbError::CommitUnconfirmed, Some(bill_id)) => DbError::BillUnconfirmed(bill_id),
        (e, _) => e,
    })
}

/// `true` when the admin row was created
pub(crate) async fn ensure_admin<T: WriteTransaction>(txn: T, username: &str, password_hash: &str) -> Result<bool, DbError> {
    let result = txn.insert_admin(username, password_hash).await.map(|inserted| inserted > 0);
    finish(txn, "ensure_admin", result).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    /// scripted transaction recording every statement it receives
    struct MockTransaction {
        log: Log,
        affected: u64,
        bill_key: Option<(BillId, DateTime<Utc>)>,
        lines_inserted: Option<u64>,
        lines_fail: bool,
        commit_fails: bool,
    }

    impl MockTransaction {
        fn new(log: &Log) -> Self {
            Self {
                log: log.clone(),
                affected: 1,
                bill_key: Some((7, DateTime::<Utc>::from_timestamp(0, 0).unwrap())),
                lines_inserted: None,
                lines_fail: false,
                commit_fails: false,
            }
        }

        fn record(&self, statement: &'static str) {
            self.log.borrow_mut().push(statement);
        }
    }

    impl WriteTransaction for MockTransaction {
        async fn next_menu_item_id(&self) -> Result<MenuItemId, DbError> {
            self.record("next_menu_item_id");
            Ok(3)
        }

        async fn insert_menu_item(&self, _id: MenuItemId, _draft: &MenuItemDraft) -> Result<u64, DbError> {
            self.record("insert_menu_item");
            Ok(self.affected)
        }

        async fn update_menu_item(&self, _id: MenuItemId, _draft: &MenuItemDraft) -> Result<u64, DbError> {
            self.record("update_menu_item");
            Ok(self.affected)
        }

        async fn delete_menu_item(&self, _id: MenuItemId) -> Result<u64, DbError> {
            self.record("delete_menu_item");
            Ok(self.affected)
        }

        async fn insert_bill(&self, _total_amount: Decimal) -> Result<Option<(BillId, DateTime<Utc>)>, DbError> {
            self.record("insert_bill");
            Ok(self.bill_key)
        }

        async fn insert_order_lines(&self, _bill_id: BillId, lines: &[NewOrderLine]) -> Result<u64, DbError> {
            self.record("insert_order_lines");
            match self.lines_fail {
                true => Err(DbError::Timeout),
                false => Ok(self.lines_inserted.unwrap_or(lines.len() as u64)),
            }
        }

        async fn insert_admin(&self, _username: &str, _password_hash: &str) -> Result<u64, DbError> {
            self.record("insert_admin");
            Ok(self.affected)
        }

        async fn commit(self) -> Result<(), DbError> {
            self.record("commit");
            match self.commit_fails {
                true => Err(DbError::Timeout),
                false => Ok(()),
            }
        }

        async fn rollback(self) -> Result<(), DbError> {
            self.record("rollback");
            Ok(())
        }
    }

    fn lines() -> Vec<NewOrderLine> {
        vec![
            NewOrderLine {
                item_name: "Burger".to_string(),
                item_price: Decimal::new(500, 2),
                quantity: 2,
                subtotal: Decimal::new(1000, 2),
            },
            NewOrderLine {
                item_name: "Fries".to_string(),
                item_price: Decimal::new(250, 2),
                quantity: 1,
                subtotal: Decimal::new(250, 2),
            },
        ]
    }

    fn draft() -> MenuItemDraft {
        MenuItemDraft {
            name: "Tea".to_string(),
            price: Decimal::new(150, 2),
        }
    }

    #[tokio::test]
    async fn bill_commits_with_all_lines() {
        let log = Log::default();
        let receipt = create_bill(MockTransaction::new(&log), Decimal::new(1250, 2), &lines())
            .await
            .unwrap();
        assert_eq!(receipt.bill_id, 7);
        assert_eq!(*log.borrow(), ["insert_bill", "insert_order_lines", "commit"]);
    }

    #[tokio::test]
    async fn missing_key_rolls_back_before_any_line() {
        let log = Log::default();
        let mut txn = MockTransaction::new(&log);
        txn.bill_key = None;
        let err = create_bill(txn, Decimal::new(1250, 2), &lines()).await.unwrap_err();
        assert!(matches!(err, DbError::MissingGeneratedKey));
        assert_eq!(*log.borrow(), ["insert_bill", "rollback"]);
    }

    #[tokio::test]
    async fn short_line_insert_rolls_back() {
        let log = Log::default();
        let mut txn = MockTransaction::new(&log);
        txn.lines_inserted = Some(1);
        let err = create_bill(txn, Decimal::new(1250, 2), &lines()).await.unwrap_err();
        assert!(matches!(err, DbError::PartialInsert { expected: 2, inserted: 1 }));
        assert_eq!(*log.borrow(), ["insert_bill", "insert_order_lines", "rollback"]);
    }

    #[tokio::test]
    async fn failed_line_insert_rolls_back() {
        let log = Log::default();
        let mut txn = MockTransaction::new(&log);
        txn.lines_fail = true;
        assert!(create_bill(txn, Decimal::new(1250, 2), &lines()).await.is_err());
        assert_eq!(log.borrow().last(), Some(&"rollback"));
        assert!(!log.borrow().contains(&"commit"));
    }

    #[tokio::test]
    async fn lost_commit_reply_names_the_bill() {
        let log = Log::default();
        let mut txn = MockTransaction::new(&log);
        txn.commit_fails = true;
        let err = create_bill(txn, Decimal::new(1250, 2), &lines()).await.unwrap_err();
        assert!(matches!(err, DbError::BillUnconfirmed(7)));
        assert!(!log.borrow().contains(&"rollback"));
    }

    #[tokio::test]
    async fn zero_row_update_and_delete_roll_back() {
        let log = Log::default();
        let mut txn = MockTransaction::new(&log);
        txn.affected = 0;
        let err = update_menu_item(txn, 9, &draft()).await.unwrap_err();
        assert!(matches!(err, DbError::NoRowsAffected));
        assert_eq!(*log.borrow(), ["update_menu_item", "rollback"]);

        let log = Log::default();
        let mut txn = MockTransaction::new(&log);
        txn.affected = 0;
        let err = delete_menu_item(txn, 9).await.unwrap_err();
        assert!(matches!(err, DbError::NoRowsAffected));
        assert_eq!(*log.borrow(), ["delete_menu_item", "rollback"]);
    }

    #[tokio::test]
    async fn menu_writes_commit() {
        let log = Log::default();
        let item = add_menu_item(MockTransaction::new(&log), &draft()).await.unwrap();
        assert_eq!(item.id, 3);
        update_menu_item(MockTransaction::new(&log), 3, &draft()).await.unwrap();
        delete_menu_item(MockTransaction::new(&log), 3).await.unwrap();
        assert_eq!(
            *log.borrow(),
            ["next_menu_item_id", "insert_menu_item", "commit", "update_menu_item", "commit", "delete_menu_item", "commit"]
        );
    }

    #[tokio::test]
    async fn existing_admin_is_kept() {
        let log = Log::default();
        let mut txn = MockTransaction::new(&log);
        txn.affected = 0;
        assert!(!ensure_admin(txn, "admin", "$argon2id$").await.unwrap());
        assert_eq!(*log.borrow(), ["insert_admin", "commit"]);
    }
}
