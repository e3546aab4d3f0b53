//! persistence: connection pool, the `Store` seam, its write transactions and the postgres backend

pub(crate) mod connection;
pub(crate) mod error;
#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod pool;
pub(crate) mod postgres;
pub(crate) mod store;
pub(crate) mod transaction;
