pub mod address;
pub mod api;
pub mod auth;
pub mod ballot;
pub mod chain;
pub mod ledger;
