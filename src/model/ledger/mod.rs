use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    address::Address,
    ballot::{Ballot, BallotError, VoteCast},
};

pub use block::Block;
pub use hash::BlockHash;
pub use transaction::{Call, Transaction};

mod block;
mod hash;
mod transaction;

/// Reasons a ledger fails verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger has no blocks")]
    Empty,
    #[error("block {0} is out of sequence")]
    BadNumber(u64),
    #[error("block {0} does not link to its parent")]
    BrokenLink(u64),
    #[error("block {0} hash does not match its contents")]
    BadHash(u64),
    #[error("first block is not a deployment")]
    BadGenesis,
    #[error("block {number} holds a call the ballot rejects: {source}")]
    Rejected { number: u64, source: BallotError },
    #[error("block {0} records different events than its call produces")]
    EventMismatch(u64),
}

/// Append-only, hash-chained list of blocks, one transaction each.
/// Block 0 is always the deployment of the ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Ledger {
    /// Start a ledger with the deployment block.
    pub fn genesis(chairperson: Address, candidates: Vec<String>) -> Self {
        let transaction = Transaction {
            from: chairperson,
            call: Call::Deploy { candidates },
            events: vec![],
        };
        Self {
            blocks: vec![Block::new(0, BlockHash::default(), transaction)],
        }
    }

    /// Wrap existing blocks, e.g. from a dump. Call [`Ledger::verify`] before
    /// trusting them.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, number: u64) -> Option<&Block> {
        usize::try_from(number)
            .ok()
            .and_then(|index| self.blocks.get(index))
    }

    pub fn latest(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Number of the latest block.
    pub fn height(&self) -> u64 {
        self.next_number().saturating_sub(1)
    }

    /// Number the next appended block will get.
    pub fn next_number(&self) -> u64 {
        self.blocks.len() as u64
    }

    /// Seal a transaction into a new block at the tip.
    pub fn append(&mut self, transaction: Transaction) -> &Block {
        let parent_hash = self.latest().map(|b| b.hash).unwrap_or_default();
        let block = Block::new(self.next_number(), parent_hash, transaction);
        self.blocks.push(block);
        &self.blocks[self.blocks.len() - 1]
    }

    /// Every vote notification from block `from_block` onwards, with its block.
    pub fn vote_events(&self, from_block: u64) -> impl Iterator<Item = (&Block, &VoteCast)> {
        self.blocks
            .iter()
            .filter(move |block| block.number >= from_block)
            .flat_map(|block| block.transaction.events.iter().map(move |e| (block, e)))
    }

    /// Blocks holding a vote.
    pub fn voting_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.transaction.call.is_vote())
    }

    /// The block in which `voter` cast their vote, if they have.
    pub fn vote_of(&self, voter: &Address) -> Option<&Block> {
        self.voting_blocks()
            .find(|block| block.transaction.from == *voter)
    }

    /// Check numbering, parent links, and block hashes.
    pub fn verify(&self) -> Result<(), LedgerError> {
        if self.blocks.is_empty() {
            return Err(LedgerError::Empty);
        }
        let mut parent_hash = BlockHash::default();
        for (index, block) in self.blocks.iter().enumerate() {
            if block.number != index as u64 {
                return Err(LedgerError::BadNumber(block.number));
            }
            if block.parent_hash != parent_hash {
                return Err(LedgerError::BrokenLink(block.number));
            }
            if !block.is_sealed() {
                return Err(LedgerError::BadHash(block.number));
            }
            parent_hash = block.hash;
        }
        Ok(())
    }

    /// Verify the ledger, then rebuild the ballot by re-executing every
    /// transaction in order.
    pub fn replay(&self) -> Result<Ballot, LedgerError> {
        self.verify()?;

        let (genesis, rest) = self.blocks.split_first().ok_or(LedgerError::Empty)?;
        let mut ballot = match &genesis.transaction.call {
            // Deployment never emits notifications.
            Call::Deploy { .. } if !genesis.transaction.events.is_empty() => {
                return Err(LedgerError::EventMismatch(genesis.number));
            }
            Call::Deploy { candidates } => {
                Ballot::deploy(genesis.transaction.from, candidates.iter().cloned()).map_err(
                    |source| LedgerError::Rejected {
                        number: genesis.number,
                        source,
                    },
                )?
            }
            _ => return Err(LedgerError::BadGenesis),
        };

        for block in rest {
            let tx = &block.transaction;
            let events = tx
                .call
                .apply(&mut ballot, &tx.from, block.number)
                .map_err(|source| LedgerError::Rejected {
                    number: block.number,
                    source,
                })?;
            if events != tx.events {
                return Err(LedgerError::EventMismatch(block.number));
            }
        }

        Ok(ballot)
    }
}
