pub mod catalog;
pub mod loan_ledger;
pub mod membership;

use crate::domain::{BoardGame, ItemId, Loan, LoanId, Media, Member, MemberId};
use crate::ports::errors::{Result, StoreError};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    media: HashMap<ItemId, Media>,
    board_games: HashMap<ItemId, BoardGame>,
    members: HashMap<MemberId, Member>,
    loans: HashMap<LoanId, Loan>,
}

/// In-memory implementation of the catalog, membership and loan ledger ports
///
/// All three stores share one lock, so a borrow decision and its writes
/// happen atomically with respect to every other operation.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::backend("in-memory store lock poisoned"))
    }
}
