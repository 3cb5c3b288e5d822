use chrono::{DateTime, Utc};
use rocket::serde::json::serde_json;
use serde::{Deserialize, Serialize};

use super::{hash::BlockHash, transaction::Transaction};

/// A sealed block holding exactly one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub number: u64,
    pub timestamp: DateTime<Utc>,
    pub parent_hash: BlockHash,
    pub hash: BlockHash,
    pub transaction: Transaction,
}

impl Block {
    /// Seal a new block on top of `parent_hash`, timestamped now.
    pub fn new(number: u64, parent_hash: BlockHash, transaction: Transaction) -> Self {
        let timestamp = Utc::now();
        let hash = Self::compute_hash(number, &timestamp, &parent_hash, &transaction);
        Self {
            number,
            timestamp,
            parent_hash,
            hash,
            transaction,
        }
    }

    /// The hash a block with these contents must carry.
    pub fn compute_hash(
        number: u64,
        timestamp: &DateTime<Utc>,
        parent_hash: &BlockHash,
        transaction: &Transaction,
    ) -> BlockHash {
        let encoded_tx =
            serde_json::to_vec(transaction).expect("Transaction serialisation is infallible");
        BlockHash::digest([
            number.to_be_bytes().as_slice(),
            timestamp.timestamp_millis().to_be_bytes().as_slice(),
            parent_hash.as_bytes().as_slice(),
            encoded_tx.as_slice(),
        ])
    }

    /// Does the stored hash match the block's contents?
    pub fn is_sealed(&self) -> bool {
        self.hash
            == Self::compute_hash(
                self.number,
                &self.timestamp,
                &self.parent_hash,
                &self.transaction,
            )
    }
}
