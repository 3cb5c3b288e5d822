use std::fmt::Display;

use serde_repr::{Deserialize_repr, Serialize_repr};

/// Privilege level carried by an authentication token. Higher levels include
/// everything the lower levels may do.
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum Rights {
    Account = 0,
    Chairperson = 1,
}

impl Display for Rights {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Account => "account",
                Self::Chairperson => "chairperson",
            }
        )
    }
}

/// A kind of user that a route can require.
pub trait User {
    const RIGHTS: Rights;
}

/// Any logged-in account.
pub struct Account;

/// The chairperson's account.
pub struct Chairperson;

impl User for Account {
    const RIGHTS: Rights = Rights::Account;
}

impl User for Chairperson {
    const RIGHTS: Rights = Rights::Chairperson;
}
