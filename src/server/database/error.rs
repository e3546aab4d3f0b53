use crate::server::model::bill::BillId;
use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub(crate) enum DbError {
    #[display("no connection available in the {_0} pool")]
    Busy(#[error(not(source))] &'static str),
    #[display("database statement timed out")]
    Timeout,
    #[display("no generated key returned")]
    MissingGeneratedKey,
    #[display("no rows affected")]
    NoRowsAffected,
    #[display("inserted {inserted} of {expected} order lines")]
    PartialInsert { expected: u64, inserted: u64 },
    /// commit was sent but its reply never arrived
    #[display("commit outcome unknown")]
    CommitUnconfirmed,
    #[display("commit outcome of bill {_0} unknown")]
    BillUnconfirmed(#[error(not(source))] BillId),
    #[display("postgres error, {_0}")]
    Postgres(tokio_postgres::Error),
}

impl From<tokio_postgres::Error> for DbError {
    fn from(e: tokio_postgres::Error) -> Self {
        DbError::Postgres(e)
    }
}
