use serde::{Deserialize, Serialize};

/// Index of a candidate within the ballot's fixed candidate sequence.
pub type CandidateIndex = usize;

/// A named option on the ballot with an accumulating vote counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub name: String,
    pub vote_count: u64,
}

impl Candidate {
    /// Create a new candidate with no votes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vote_count: 0,
        }
    }
}
