use thiserror::Error;

use super::candidate::CandidateIndex;

pub type Result<T> = std::result::Result<T, BallotError>;

/// Reasons the ballot rejects a call. A rejected call never changes any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BallotError {
    #[error("a ballot needs at least one candidate")]
    NoCandidates,
    #[error("candidate names must not be blank")]
    InvalidCandidateName,
    #[error("duplicate candidate name: {0}")]
    DuplicateCandidate(String),
    #[error("the ballot is already deployed")]
    AlreadyDeployed,
    #[error("only the administrator may perform this action")]
    Unauthorized,
    #[error("you do not have the right to vote")]
    NotEligible,
    #[error("you have already voted")]
    AlreadyVoted,
    #[error("invalid proposal")]
    InvalidCandidate(CandidateIndex),
    #[error("candidate index {0} out of range")]
    IndexOutOfRange(CandidateIndex),
    #[error("voting is paused")]
    VotingPaused,
    #[error("voting is already paused")]
    AlreadyPaused,
    #[error("voting is not paused")]
    NotPaused,
}
