//! point-of-sale rules, written against the `Store` seam

pub(crate) mod auth;
pub(crate) mod catalog;
pub(crate) mod checkout;
pub(crate) mod session;
