use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::address::Address;

use super::{
    candidate::{Candidate, CandidateIndex},
    error::{BallotError, Result},
    voter::Voter,
};

/// Notification published after every successful vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCast {
    /// Number of the block the vote was committed in.
    pub block_number: u64,
    /// Name of the candidate that received the vote.
    pub candidate_name: String,
}

/// The ballot state machine: a fixed candidate list, a voter registry keyed by
/// address, and the chairperson allowed to hand out voting rights.
///
/// Every mutating operation validates all of its preconditions before touching
/// any state, so a rejected call leaves the ballot exactly as it was.
/// Serializing calls against each other is the caller's job; see
/// [`crate::model::chain::Chain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    chairperson: Address,
    candidates: Vec<Candidate>,
    voters: BTreeMap<Address, Voter>,
    voting_paused: bool,
}

impl Ballot {
    /// Create a ballot for the given candidates, administered by `chairperson`.
    /// The chairperson is granted the right to vote.
    ///
    /// Fails if there are no candidates, or if any name is blank or repeated.
    pub fn deploy<I, S>(chairperson: Address, candidate_names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for name in candidate_names {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(BallotError::InvalidCandidateName);
            }
            if !seen.insert(name.clone()) {
                return Err(BallotError::DuplicateCandidate(name));
            }
            candidates.push(Candidate::new(name));
        }
        if candidates.is_empty() {
            return Err(BallotError::NoCandidates);
        }

        let mut voters = BTreeMap::new();
        voters.insert(
            chairperson,
            Voter {
                has_right_to_vote: true,
                ..Voter::default()
            },
        );

        Ok(Self {
            chairperson,
            candidates,
            voters,
            voting_paused: false,
        })
    }

    pub fn chairperson(&self) -> Address {
        self.chairperson
    }

    pub fn voting_paused(&self) -> bool {
        self.voting_paused
    }

    pub fn proposal_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Get the candidate at the given index.
    pub fn candidate(&self, index: CandidateIndex) -> Result<&Candidate> {
        self.candidates
            .get(index)
            .ok_or(BallotError::IndexOutOfRange(index))
    }

    /// Get the voter record for any address, defaulting if never referenced.
    pub fn voter(&self, address: &Address) -> Voter {
        self.voters.get(address).copied().unwrap_or_default()
    }

    /// All addresses with a non-default record, in address order.
    pub fn voters(&self) -> impl Iterator<Item = (&Address, &Voter)> {
        self.voters.iter()
    }

    pub fn has_right_to_vote(&self, address: &Address) -> bool {
        self.voter(address).has_right_to_vote
    }

    /// Total number of votes cast so far.
    pub fn total_votes(&self) -> u64 {
        self.candidates.iter().map(|c| c.vote_count).sum()
    }

    /// Give `target` the right to vote. Only the chairperson may do this.
    /// Granting twice is harmless.
    pub fn grant_voting_right(&mut self, caller: &Address, target: Address) -> Result<()> {
        self.ensure_chairperson(caller)?;
        self.voters.entry(target).or_default().has_right_to_vote = true;
        Ok(())
    }

    /// Cast the caller's single vote for the candidate at `index`, committed in
    /// block `block_number`.
    ///
    /// Checks, in order: voting is not paused, the caller has the right to
    /// vote, the caller has not voted yet, and the index is valid.
    pub fn cast_vote(
        &mut self,
        caller: &Address,
        index: CandidateIndex,
        block_number: u64,
    ) -> Result<VoteCast> {
        if self.voting_paused {
            return Err(BallotError::VotingPaused);
        }
        let voter = self.voter(caller);
        if !voter.has_right_to_vote {
            return Err(BallotError::NotEligible);
        }
        if voter.is_voted {
            return Err(BallotError::AlreadyVoted);
        }
        let candidate = self
            .candidates
            .get_mut(index)
            .ok_or(BallotError::InvalidCandidate(index))?;

        candidate.vote_count += 1;
        let record = self.voters.entry(*caller).or_default();
        record.is_voted = true;
        record.vote = index;

        Ok(VoteCast {
            block_number,
            candidate_name: candidate.name.clone(),
        })
    }

    /// Freeze voting. Only the chairperson may do this.
    pub fn pause_voting(&mut self, caller: &Address) -> Result<()> {
        self.ensure_chairperson(caller)?;
        if self.voting_paused {
            return Err(BallotError::AlreadyPaused);
        }
        self.voting_paused = true;
        Ok(())
    }

    /// Unfreeze voting. Only the chairperson may do this.
    pub fn resume_voting(&mut self, caller: &Address) -> Result<()> {
        self.ensure_chairperson(caller)?;
        if !self.voting_paused {
            return Err(BallotError::NotPaused);
        }
        self.voting_paused = false;
        Ok(())
    }

    /// Index of the current leader.
    ///
    /// Scans left to right, replacing the leader only on a strictly greater
    /// count, so on a tie the lowest index wins and with no votes at all the
    /// first candidate is returned.
    pub fn winning_proposal(&self) -> CandidateIndex {
        let mut winning_count = 0;
        let mut winner = 0;
        for (index, candidate) in self.candidates.iter().enumerate() {
            if candidate.vote_count > winning_count {
                winning_count = candidate.vote_count;
                winner = index;
            }
        }
        winner
    }

    /// Name of the current leader, as chosen by [`Ballot::winning_proposal`].
    pub fn winner_name(&self) -> &str {
        // A deployed ballot always has at least one candidate.
        &self.candidates[self.winning_proposal()].name
    }

    /// Whether more than one candidate shares the leading count.
    pub fn is_tied(&self) -> bool {
        let leading = self.candidates[self.winning_proposal()].vote_count;
        self.candidates
            .iter()
            .filter(|c| c.vote_count == leading)
            .count()
            > 1
    }

    fn ensure_chairperson(&self, caller: &Address) -> Result<()> {
        if *caller == self.chairperson {
            Ok(())
        } else {
            Err(BallotError::Unauthorized)
        }
    }
}
