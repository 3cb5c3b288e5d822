use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    api::ballot::Results,
    ballot::{Ballot, VoteCast},
    ledger::{Block, BlockHash, Ledger},
};

/// A vote notification together with the block that emitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteEvent {
    pub block_hash: BlockHash,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: VoteCast,
}

impl VoteEvent {
    pub fn new(block: &Block, event: &VoteCast) -> Self {
        Self {
            block_hash: block.hash,
            timestamp: block.timestamp,
            event: event.clone(),
        }
    }
}

/// Where a voter's vote was committed, and how deeply it is buried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteVerification {
    pub block: Block,
    pub confirmations: u64,
}

impl VoteVerification {
    pub fn new(block: &Block, ledger: &Ledger) -> Self {
        Self {
            block: block.clone(),
            confirmations: ledger.height() - block.number,
        }
    }
}

/// Everything needed to verify the election offline: every block, plus the
/// results the server reports for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDump {
    pub blocks: Vec<Block>,
    pub results: Results,
}

impl LedgerDump {
    pub fn new(ballot: &Ballot, ledger: &Ledger) -> Self {
        Self {
            blocks: ledger.blocks().to_vec(),
            results: ballot.into(),
        }
    }
}
