use log::warn;
use rocket::{
    response::stream::{Event, EventStream},
    serde::json::Json,
    tokio::{select, sync::broadcast::error::RecvError},
    Route, Shutdown, State,
};

use crate::error::{Error, Result};
use crate::model::{
    address::{Address, AddressError},
    api::{
        ledger::{LedgerDump, VoteEvent, VoteVerification},
        pagination::{Paginated, PaginationRequest},
    },
    chain::Chain,
    ledger::Block,
};

use super::ballot::parse_address;

pub fn routes() -> Vec<Route> {
    routes![
        blocks,
        latest_block,
        block,
        votes,
        vote_of,
        events,
        dump,
    ]
}

#[get("/ledger/blocks?<pagination..>")]
async fn blocks(pagination: PaginationRequest, chain: &State<Chain>) -> Json<Paginated<Block>> {
    Json(pagination.paginate(chain.ledger().await.blocks()))
}

#[get("/ledger/blocks/latest")]
async fn latest_block(chain: &State<Chain>) -> Result<Json<Block>> {
    chain
        .ledger()
        .await
        .latest()
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::not_found("Latest block"))
}

#[get("/ledger/blocks/<number>")]
async fn block(number: u64, chain: &State<Chain>) -> Result<Json<Block>> {
    chain
        .ledger()
        .await
        .block(number)
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("Block {number}")))
}

/// Vote notifications committed at or after `from_block`, oldest first.
#[get("/ledger/votes?<from_block>")]
async fn votes(from_block: Option<u64>, chain: &State<Chain>) -> Json<Vec<VoteEvent>> {
    let ledger = chain.ledger().await;
    let events = ledger
        .vote_events(from_block.unwrap_or(0))
        .map(|(block, event)| VoteEvent::new(block, event))
        .collect();
    Json(events)
}

/// Find the block holding a voter's vote, so they can check it was recorded.
#[get("/ledger/votes/<address>")]
async fn vote_of(
    address: std::result::Result<Address, AddressError>,
    chain: &State<Chain>,
) -> Result<Json<VoteVerification>> {
    let address = parse_address(address)?;
    let ledger = chain.ledger().await;
    let block = ledger
        .vote_of(&address)
        .ok_or_else(|| Error::not_found(format!("Vote of {address}")))?;
    Ok(Json(VoteVerification::new(block, &ledger)))
}

/// Stream vote notifications as they are committed.
#[get("/ledger/events")]
fn events(chain: &State<Chain>, mut end: Shutdown) -> EventStream![] {
    let mut rx = chain.subscribe();
    EventStream! {
        loop {
            let event = select! {
                msg = rx.recv() => match msg {
                    Ok(event) => event,
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Event subscriber lagged, skipped {skipped} notifications");
                        continue;
                    }
                },
                _ = &mut end => break,
            };

            yield Event::json(&event).event("VoteCast");
        }
    }
}

/// Everything needed to verify the election offline.
#[get("/ledger/dump")]
async fn dump(chain: &State<Chain>) -> Json<LedgerDump> {
    Json(chain.snapshot(LedgerDump::new).await)
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::{Client, LocalResponse},
        serde::json::serde_json,
        tokio::{
            io::AsyncReadExt,
            time::{timeout, Duration},
        },
    };

    use crate::model::{
        api::ballot::Results,
        ballot::VoteCast,
        ledger::{Call, Ledger},
    };

    use super::*;

    fn chair() -> Address {
        Address::from_secret(crate::TEST_CHAIRPERSON_SECRET)
    }

    async fn body<T: serde::de::DeserializeOwned>(response: LocalResponse<'_>) -> T {
        serde_json::from_str(&response.into_string().await.unwrap()).unwrap()
    }

    /// Grant the two example voters, then have the chairperson and both voters
    /// vote. Votes land in blocks 3, 4, and 5.
    async fn run_election(chain: &Chain) {
        for voter in [Address::example(), Address::example2()] {
            chain
                .submit(chair(), Call::GrantVotingRight { voter })
                .await
                .unwrap();
        }
        for (from, candidate) in [(chair(), 0), (Address::example(), 2), (Address::example2(), 2)] {
            chain.submit(from, Call::Vote { candidate }).await.unwrap();
        }
    }

    /// Read the stream until the next complete named event with data, skipping
    /// anything else (e.g. heartbeats). Unconsumed bytes stay in `pending`.
    async fn next_event(response: &mut LocalResponse<'_>, pending: &mut String) -> (String, VoteCast) {
        loop {
            if let Some(end) = pending.find("\n\n") {
                let message = pending.drain(..end + 2).collect::<String>();
                let mut name = None;
                let mut data = None;
                for line in message.lines() {
                    if let Some(value) = line.strip_prefix("event:") {
                        name = Some(value.trim().to_string());
                    } else if let Some(value) = line.strip_prefix("data:") {
                        data = Some(value.trim().to_string());
                    }
                }
                if let (Some(name), Some(data)) = (name, data) {
                    return (name, serde_json::from_str(&data).unwrap());
                }
                continue;
            }

            let mut chunk = [0; 1024];
            let read = timeout(Duration::from_secs(5), response.read(&mut chunk))
                .await
                .expect("no event within 5 seconds")
                .unwrap();
            assert!(read > 0, "event stream ended");
            pending.push_str(std::str::from_utf8(&chunk[..read]).unwrap());
        }
    }

    #[backend_test]
    async fn votes_are_streamed(client: Client, chain: Chain) {
        chain
            .submit(chair(), Call::GrantVotingRight { voter: Address::example() })
            .await
            .unwrap();

        let mut response = client.get(uri!(events)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(response.content_type(), Some(ContentType::EventStream));

        chain
            .submit(Address::example(), Call::Vote { candidate: 1 })
            .await
            .unwrap();
        chain
            .submit(chair(), Call::Vote { candidate: 2 })
            .await
            .unwrap();

        let mut pending = String::new();
        let (name, event) = next_event(&mut response, &mut pending).await;
        assert_eq!(name, "VoteCast");
        assert_eq!(
            event,
            VoteCast {
                block_number: 2,
                candidate_name: "Bob".to_string()
            }
        );
        let (name, event) = next_event(&mut response, &mut pending).await;
        assert_eq!(name, "VoteCast");
        assert_eq!(
            event,
            VoteCast {
                block_number: 3,
                candidate_name: "Carol".to_string()
            }
        );
    }

    #[backend_test]
    async fn lagging_stream_skips_to_oldest_retained_vote(client: Client, chain: Chain) {
        // The test server buffers 16 notifications per subscriber.
        const VOTERS: u64 = 20;

        let voters = (0..VOTERS)
            .map(|i| Address::from_secret(format!("streamed voter {i}")))
            .collect::<Vec<_>>();
        for voter in &voters {
            chain
                .submit(chair(), Call::GrantVotingRight { voter: *voter })
                .await
                .unwrap();
        }

        let mut response = client.get(uri!(events)).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        // Votes land in blocks 21..=40 before the stream is read.
        for (i, voter) in voters.iter().enumerate() {
            chain
                .submit(*voter, Call::Vote { candidate: i % 3 })
                .await
                .unwrap();
        }

        // The first 4 are dropped; the stream carries on from the 5th.
        let mut pending = String::new();
        let (_, event) = next_event(&mut response, &mut pending).await;
        assert_eq!(
            event,
            VoteCast {
                block_number: 25,
                candidate_name: "Bob".to_string()
            }
        );
        let (_, event) = next_event(&mut response, &mut pending).await;
        assert_eq!(event.block_number, 26);
    }

    #[backend_test]
    async fn fresh_ledger_has_genesis(client: Client) {
        let response = client.get(uri!(latest_block)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let genesis: Block = body(response).await;
        assert_eq!(genesis.number, 0);
        assert_eq!(genesis.transaction.from, chair());
        assert!(genesis.is_sealed());

        let response = client.get("/ledger/blocks/1").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn blocks_are_paginated(client: Client, chain: Chain) {
        run_election(&chain).await;

        let response = client
            .get("/ledger/blocks?page_num=2&page_size=4")
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let page: Paginated<Block> = body(response).await;
        assert_eq!(page.pagination.total, 6);
        assert_eq!(
            page.items.iter().map(|b| b.number).collect::<Vec<_>>(),
            vec![4, 5]
        );

        let response = client.get("/ledger/blocks?page_size=0").dispatch().await;
        assert_ne!(Status::Ok, response.status());
    }

    #[backend_test]
    async fn voting_history(client: Client, chain: Chain) {
        run_election(&chain).await;

        let response = client.get("/ledger/votes").dispatch().await;
        let events: Vec<VoteEvent> = body(response).await;
        assert_eq!(
            events.iter().map(|e| &e.event).cloned().collect::<Vec<_>>(),
            vec![
                VoteCast {
                    block_number: 3,
                    candidate_name: "Alice".to_string()
                },
                VoteCast {
                    block_number: 4,
                    candidate_name: "Carol".to_string()
                },
                VoteCast {
                    block_number: 5,
                    candidate_name: "Carol".to_string()
                },
            ]
        );

        let response = client.get("/ledger/votes?from_block=4").dispatch().await;
        let events: Vec<VoteEvent> = body(response).await;
        assert_eq!(events.len(), 2);
    }

    #[backend_test]
    async fn verify_own_vote(client: Client, chain: Chain) {
        run_election(&chain).await;

        let response = client
            .get(format!("/ledger/votes/{}", Address::example()))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let verification: VoteVerification = body(response).await;
        assert_eq!(verification.block.number, 4);
        assert_eq!(verification.block.transaction.from, Address::example());
        assert_eq!(verification.confirmations, 1);

        let response = client
            .get(format!("/ledger/votes/{}", Address::example3()))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn dump_replays_to_reported_results(client: Client, chain: Chain) {
        run_election(&chain).await;

        let response = client.get(uri!(dump)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let dump: LedgerDump = body(response).await;

        let replayed = Ledger::from_blocks(dump.blocks).replay().unwrap();
        assert_eq!(Results::from(&replayed), dump.results);
        assert_eq!(dump.results.winner.winner_name, "Carol");
        assert_eq!(dump.results.total_votes, 3);
    }
}
