use serde::{Deserialize, Serialize};

use crate::model::{
    address::Address,
    ballot::{Ballot, BallotError, CandidateIndex, Result, VoteCast},
};

/// A state-changing call on the ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum Call {
    /// Creation of the ballot; only ever the first transaction.
    Deploy { candidates: Vec<String> },
    GrantVotingRight { voter: Address },
    Vote { candidate: CandidateIndex },
    PauseVoting,
    ResumeVoting,
}

impl Call {
    /// Apply this call to the ballot on behalf of `from`, as part of block
    /// `block_number`. Returns any notifications the call produced.
    pub fn apply(
        &self,
        ballot: &mut Ballot,
        from: &Address,
        block_number: u64,
    ) -> Result<Vec<VoteCast>> {
        match self {
            Self::Deploy { .. } => Err(BallotError::AlreadyDeployed),
            Self::GrantVotingRight { voter } => {
                ballot.grant_voting_right(from, *voter).map(|_| vec![])
            }
            Self::Vote { candidate } => ballot
                .cast_vote(from, *candidate, block_number)
                .map(|event| vec![event]),
            Self::PauseVoting => ballot.pause_voting(from).map(|_| vec![]),
            Self::ResumeVoting => ballot.resume_voting(from).map(|_| vec![]),
        }
    }

    /// Is this a vote?
    pub fn is_vote(&self) -> bool {
        matches!(self, Self::Vote { .. })
    }
}

/// A committed call, together with the caller and the notifications it emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Address,
    #[serde(flatten)]
    pub call: Call,
    pub events: Vec<VoteCast>,
}
