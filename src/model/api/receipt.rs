use serde::{Deserialize, Serialize};

use crate::model::{
    ballot::VoteCast,
    ledger::{Block, BlockHash},
};

/// Proof that a call was committed: the block it landed in and what it emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub block_number: u64,
    pub block_hash: BlockHash,
    pub events: Vec<VoteCast>,
}

impl Receipt {
    /// Construct a receipt for the given block.
    pub fn from_block(block: &Block) -> Self {
        Self {
            block_number: block.number,
            block_hash: block.hash,
            events: block.transaction.events.clone(),
        }
    }
}
