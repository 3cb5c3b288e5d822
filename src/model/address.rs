use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use data_encoding::HEXLOWER_PERMISSIVE;
use rocket::request::FromParam;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of bytes in an account address.
pub const ADDRESS_LENGTH: usize = 20;

/// An account address: 20 bytes, rendered as `0x` followed by 40 hex digits.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Derive the address belonging to the given account secret.
    /// This is the last 20 bytes of the SHA-256 digest of the secret.
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Self {
        let digest = Sha256::digest(secret.as_ref());
        let mut bytes = [0; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest[digest.len() - ADDRESS_LENGTH..]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", data_encoding::HEXLOWER.encode(&self.0))
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({self})")
    }
}

/// Reasons an address string may fail to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must start with `0x`")]
    MissingPrefix,
    #[error("address must be {} hex digits, got {0}", ADDRESS_LENGTH * 2)]
    BadLength(usize),
    #[error("address contains non-hex characters")]
    BadEncoding,
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parse an address. Mixed-case hex is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AddressError::MissingPrefix)?;
        if hex.len() != ADDRESS_LENGTH * 2 {
            return Err(AddressError::BadLength(hex.len()));
        }
        let decoded = HEXLOWER_PERMISSIVE
            .decode(hex.as_bytes())
            .map_err(|_| AddressError::BadEncoding)?;
        let mut bytes = [0; ADDRESS_LENGTH];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        string.parse().map_err(D::Error::custom)
    }
}

/// Allow addresses to be used directly as route parameters.
impl<'a> FromParam<'a> for Address {
    type Error = AddressError;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}
