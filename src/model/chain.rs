use std::sync::Arc;

use log::{info, warn};
use rocket::tokio::sync::{broadcast, RwLock, RwLockReadGuard};

use crate::model::{
    address::Address,
    api::receipt::Receipt,
    ballot::{Ballot, Result, VoteCast},
    ledger::{Call, Ledger, Transaction},
};

/// Ballot and ledger, always updated together.
struct ChainState {
    ballot: Ballot,
    ledger: Ledger,
}

/// The single authority executing calls against the ballot.
///
/// All state-changing calls run one at a time under the write lock: the call is
/// validated and applied, its block sealed, and its notifications published
/// before the next call starts. Reads share the read lock and so never observe
/// a partially-applied call.
#[derive(Clone)]
pub struct Chain {
    state: Arc<RwLock<ChainState>>,
    events: broadcast::Sender<VoteCast>,
}

impl Chain {
    /// Deploy a new ballot administered by `chairperson`, recording the
    /// deployment as block 0. `event_capacity` bounds how many notifications a
    /// slow subscriber may fall behind by.
    pub fn deploy(
        chairperson: Address,
        candidates: Vec<String>,
        event_capacity: usize,
    ) -> Result<Self> {
        let ballot = Ballot::deploy(chairperson, candidates.iter().cloned())?;
        let ledger = Ledger::genesis(chairperson, candidates);
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Ok(Self {
            state: Arc::new(RwLock::new(ChainState { ballot, ledger })),
            events,
        })
    }

    /// Execute `call` on behalf of `from`. On success the call is committed in
    /// a new block; on failure nothing changes and no block is produced.
    pub async fn submit(&self, from: Address, call: Call) -> Result<Receipt> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let number = state.ledger.next_number();
        let events = match call.apply(&mut state.ballot, &from, number) {
            Ok(events) => events,
            Err(err) => {
                warn!("Rejected {call:?} from {from}: {err}");
                return Err(err);
            }
        };

        let block = state.ledger.append(Transaction {
            from,
            call,
            events,
        });
        info!(
            "Committed block #{} {} ({:?} from {})",
            block.number, block.hash, block.transaction.call, from
        );

        for event in &block.transaction.events {
            // No subscribers is fine.
            let _ = self.events.send(event.clone());
        }

        Ok(Receipt::from_block(block))
    }

    /// Subscribe to vote notifications committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<VoteCast> {
        self.events.subscribe()
    }

    /// Read-only view of the ballot.
    pub async fn ballot(&self) -> RwLockReadGuard<'_, Ballot> {
        RwLockReadGuard::map(self.state.read().await, |state| &state.ballot)
    }

    /// Read-only view of the ledger.
    pub async fn ledger(&self) -> RwLockReadGuard<'_, Ledger> {
        RwLockReadGuard::map(self.state.read().await, |state| &state.ledger)
    }

    /// Run `f` against one consistent snapshot of both ballot and ledger.
    pub async fn snapshot<T>(&self, f: impl FnOnce(&Ballot, &Ledger) -> T) -> T {
        let state = self.state.read().await;
        f(&state.ballot, &state.ledger)
    }
}
