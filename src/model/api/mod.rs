//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - Addresses and hashes are serialised as `0x`-prefixed hex strings.
//! - Field names are camelCase, matching the ballot's public interface.

pub mod ballot;
pub mod ledger;
pub mod pagination;
pub mod receipt;
pub mod session;
