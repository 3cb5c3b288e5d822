use serde::{Deserialize, Serialize};

use crate::model::{
    address::Address,
    ballot::{Ballot, Candidate, CandidateIndex, Voter},
};

/// Request to give an address the right to vote.
#[derive(Debug, Deserialize, Serialize)]
pub struct GrantRequest {
    pub voter: Address,
}

/// Request to vote for a candidate.
#[derive(Debug, Deserialize, Serialize)]
pub struct VoteRequest {
    pub candidate: CandidateIndex,
}

/// API-friendly representation of a candidate, including its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDesc {
    pub index: CandidateIndex,
    pub name: String,
    pub vote_count: u64,
}

impl CandidateDesc {
    pub fn new(index: CandidateIndex, candidate: &Candidate) -> Self {
        Self {
            index,
            name: candidate.name.clone(),
            vote_count: candidate.vote_count,
        }
    }

    /// Describe every candidate on the ballot, in order.
    pub fn all(ballot: &Ballot) -> Vec<Self> {
        ballot
            .candidates()
            .iter()
            .enumerate()
            .map(|(index, candidate)| Self::new(index, candidate))
            .collect()
    }
}

/// A voter record together with its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterDesc {
    pub address: Address,
    #[serde(flatten)]
    pub voter: Voter,
}

/// Overview of the deployed ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotSummary {
    pub chairperson: Address,
    pub proposal_count: usize,
    pub voting_paused: bool,
    pub block_height: u64,
}

/// The current leader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub winning_proposal: CandidateIndex,
    pub winner_name: String,
}

impl From<&Ballot> for Winner {
    fn from(ballot: &Ballot) -> Self {
        Self {
            winning_proposal: ballot.winning_proposal(),
            winner_name: ballot.winner_name().to_string(),
        }
    }
}

/// Full tally. `winner` follows the ballot's lowest-index tie-break; `tie`
/// reports whether other candidates share the leading count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    pub candidates: Vec<CandidateDesc>,
    pub total_votes: u64,
    pub winner: Winner,
    pub tie: bool,
}

impl From<&Ballot> for Results {
    fn from(ballot: &Ballot) -> Self {
        Self {
            candidates: CandidateDesc::all(ballot),
            total_votes: ballot.total_votes(),
            winner: ballot.into(),
            tie: ballot.is_tied(),
        }
    }
}

impl Results {
    /// Share of the total vote for the given candidate, as a percentage.
    pub fn percentage(&self, candidate: &CandidateDesc) -> f64 {
        if self.total_votes == 0 {
            0.0
        } else {
            candidate.vote_count as f64 * 100.0 / self.total_votes as f64
        }
    }
}
