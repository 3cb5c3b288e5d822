pub use ballot_core::{Ballot, VoteCast};
pub use candidate::{Candidate, CandidateIndex};
pub use error::{BallotError, Result};
pub use voter::Voter;

mod ballot_core;
mod candidate;
mod error;
mod voter;
