use serde::{Deserialize, Serialize};

use super::candidate::CandidateIndex;

/// Per-address voting state.
///
/// Every address implicitly has a record; an address that has never been
/// referenced reads as [`Voter::default`], i.e. ineligible and not voted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voter {
    /// Set by the chairperson; never revoked.
    pub has_right_to_vote: bool,
    /// Set exactly once, by the voter's own vote.
    pub is_voted: bool,
    /// The candidate voted for. Only meaningful when `is_voted` is set.
    pub vote: CandidateIndex,
}
