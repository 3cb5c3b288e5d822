use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use log::warn;
use rocket::{
    http::{ContentType, Status},
    response::{self, Responder, Response},
    Request,
};
use thiserror::Error;

use crate::model::ballot::BallotError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Ballot(#[from] BallotError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn not_found(what: impl AsRef<str>) -> Self {
        Self::Status(Status::NotFound, format!("{} not found", what.as_ref()))
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Ballot(err) => match err {
                BallotError::Unauthorized | BallotError::NotEligible => Status::Forbidden,
                BallotError::AlreadyVoted
                | BallotError::VotingPaused
                | BallotError::AlreadyPaused
                | BallotError::NotPaused
                | BallotError::AlreadyDeployed => Status::Conflict,
                BallotError::InvalidCandidate(_)
                | BallotError::NoCandidates
                | BallotError::InvalidCandidateName
                | BallotError::DuplicateCandidate(_) => Status::BadRequest,
                BallotError::IndexOutOfRange(_) => Status::NotFound,
            },
            Self::Jwt(err) => match err.kind() {
                JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
                    Status::Unauthorized
                }
                _ => Status::BadRequest,
            },
            Self::Status(status, _) => *status,
        }
    }
}

/// Respond with the error's status and its message as a plain-text body, so
/// callers can display the reason.
impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        let message = self.to_string();
        warn!("{} {}: {message}", req.method(), req.uri());
        Response::build_from(message.respond_to(req)?)
            .status(status)
            .header(ContentType::Plain)
            .ok()
    }
}
