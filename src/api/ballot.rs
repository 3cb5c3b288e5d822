use log::info;
use rocket::{http::Status, serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::logging::RequestId;
use crate::model::{
    address::{Address, AddressError},
    api::{
        ballot::{BallotSummary, CandidateDesc, GrantRequest, Results, VoteRequest, VoterDesc, Winner},
        receipt::Receipt,
    },
    auth::{Account, AuthToken, Chairperson},
    ballot::{CandidateIndex, Voter},
    chain::Chain,
    ledger::Call,
};

pub fn routes() -> Vec<Route> {
    routes![
        summary,
        chairperson,
        candidates,
        proposal_count,
        candidate,
        voter,
        has_right_to_vote,
        voters_chairperson,
        voters_non_chairperson,
        grant_voting_right,
        cast_vote,
        pause_voting,
        resume_voting,
        winner,
        results,
    ]
}

#[get("/ballot")]
async fn summary(chain: &State<Chain>) -> Json<BallotSummary> {
    let summary = chain
        .snapshot(|ballot, ledger| BallotSummary {
            chairperson: ballot.chairperson(),
            proposal_count: ballot.proposal_count(),
            voting_paused: ballot.voting_paused(),
            block_height: ledger.height(),
        })
        .await;
    Json(summary)
}

#[get("/ballot/chairperson")]
async fn chairperson(chain: &State<Chain>) -> Json<Address> {
    Json(chain.ballot().await.chairperson())
}

#[get("/ballot/candidates")]
async fn candidates(chain: &State<Chain>) -> Json<Vec<CandidateDesc>> {
    Json(CandidateDesc::all(&*chain.ballot().await))
}

#[get("/ballot/candidates/count")]
async fn proposal_count(chain: &State<Chain>) -> Json<usize> {
    Json(chain.ballot().await.proposal_count())
}

#[get("/ballot/candidates/<index>")]
async fn candidate(index: CandidateIndex, chain: &State<Chain>) -> Result<Json<CandidateDesc>> {
    let ballot = chain.ballot().await;
    let candidate = ballot.candidate(index)?;
    Ok(Json(CandidateDesc::new(index, candidate)))
}

#[get("/ballot/voters/<address>")]
async fn voter(
    address: std::result::Result<Address, AddressError>,
    chain: &State<Chain>,
) -> Result<Json<Voter>> {
    let address = parse_address(address)?;
    Ok(Json(chain.ballot().await.voter(&address)))
}

#[get("/ballot/voters/<address>/right")]
async fn has_right_to_vote(
    address: std::result::Result<Address, AddressError>,
    chain: &State<Chain>,
) -> Result<Json<bool>> {
    let address = parse_address(address)?;
    Ok(Json(chain.ballot().await.has_right_to_vote(&address)))
}

#[get("/ballot/voters", rank = 1)]
async fn voters_chairperson(
    _token: AuthToken<Chairperson>,
    chain: &State<Chain>,
) -> Json<Vec<VoterDesc>> {
    let ballot = chain.ballot().await;
    let voters = ballot
        .voters()
        .map(|(address, voter)| VoterDesc {
            address: *address,
            voter: *voter,
        })
        .collect();
    Json(voters)
}

#[get("/ballot/voters", rank = 2)]
fn voters_non_chairperson() -> Error {
    Error::Status(
        Status::Forbidden,
        "Only the chairperson may list voters".to_string(),
    )
}

#[post("/ballot/voters", data = "<request>", format = "json")]
async fn grant_voting_right(
    id: &RequestId,
    token: Option<AuthToken<Account>>,
    request: Json<GrantRequest>,
    chain: &State<Chain>,
) -> Result<Json<Receipt>> {
    let from = caller(token)?;
    info!("req{id} {from} grants the right to vote to {}", request.voter);

    let receipt = chain
        .submit(from, Call::GrantVotingRight { voter: request.voter })
        .await?;
    Ok(Json(receipt))
}

#[post("/ballot/vote", data = "<request>", format = "json")]
async fn cast_vote(
    id: &RequestId,
    token: Option<AuthToken<Account>>,
    request: Json<VoteRequest>,
    chain: &State<Chain>,
) -> Result<Json<Receipt>> {
    let from = caller(token)?;
    info!("req{id} {from} votes for candidate {}", request.candidate);

    let receipt = chain
        .submit(from, Call::Vote { candidate: request.candidate })
        .await?;
    Ok(Json(receipt))
}

#[post("/ballot/pause")]
async fn pause_voting(
    id: &RequestId,
    token: Option<AuthToken<Account>>,
    chain: &State<Chain>,
) -> Result<Json<Receipt>> {
    let from = caller(token)?;
    info!("req{id} {from} pauses voting");
    Ok(Json(chain.submit(from, Call::PauseVoting).await?))
}

#[post("/ballot/resume")]
async fn resume_voting(
    id: &RequestId,
    token: Option<AuthToken<Account>>,
    chain: &State<Chain>,
) -> Result<Json<Receipt>> {
    let from = caller(token)?;
    info!("req{id} {from} resumes voting");
    Ok(Json(chain.submit(from, Call::ResumeVoting).await?))
}

#[get("/ballot/winner")]
async fn winner(chain: &State<Chain>) -> Json<Winner> {
    Json(Winner::from(&*chain.ballot().await))
}

#[get("/ballot/results")]
async fn results(chain: &State<Chain>) -> Json<Results> {
    Json(Results::from(&*chain.ballot().await))
}

/// The address of the logged-in caller.
fn caller(token: Option<AuthToken<Account>>) -> Result<Address> {
    token
        .map(|token| token.address)
        .ok_or_else(|| Error::Status(Status::Unauthorized, "Not logged in".to_string()))
}

pub(crate) fn parse_address(address: std::result::Result<Address, AddressError>) -> Result<Address> {
    address.map_err(|err| Error::Status(Status::BadRequest, format!("Invalid address: {err}")))
}
