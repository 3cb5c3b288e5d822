use serde::{Deserialize, Serialize};

use crate::model::{address::Address, auth::Rights};

/// Login request: the account secret from which the address is derived.
#[derive(Deserialize, Serialize)]
pub struct AccountCredentials {
    pub secret: String,
}

impl AccountCredentials {
    /// The address these credentials unlock.
    pub fn address(&self) -> Address {
        Address::from_secret(&self.secret)
    }
}

/// Who the caller is logged in as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub address: Address,
    pub rights: Rights,
}
