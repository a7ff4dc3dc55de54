use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{Bid, BidId, BidStatus};
use super::repository::{BidRepository, RepositoryError};

/// In-memory bid store used by the binary wiring and the test suite.
///
/// Records keep insertion order so that chronological ties resolve the same
/// way a persistence-ordered query would.
#[derive(Default, Clone)]
pub struct MemoryBidRepository {
    records: Arc<Mutex<Vec<Bid>>>,
}

impl MemoryBidRepository {
    /// Snapshot of every stored bid, in insertion order.
    pub fn all(&self) -> Vec<Bid> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl BidRepository for MemoryBidRepository {
    fn insert(&self, bid: Bid) -> Result<Bid, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == bid.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(bid.clone());
        Ok(bid)
    }

    fn fetch(&self, id: &BidId) -> Result<Option<Bid>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|bid| &bid.id == id).cloned())
    }

    fn bids_since(&self, since: DateTime<Utc>) -> Result<Vec<Bid>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|bid| bid.created_at >= since)
            .cloned()
            .collect())
    }

    fn unevaluated(&self) -> Result<Vec<Bid>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|bid| {
                matches!(
                    bid.status,
                    BidStatus::Pending | BidStatus::WaitingForApproval
                )
            })
            .cloned()
            .collect())
    }

    fn update_all(&self, bids: Vec<Bid>) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        // Resolve every target before writing anything so the batch stays
        // all-or-nothing.
        let mut positions = Vec::with_capacity(bids.len());
        for bid in &bids {
            let position = guard
                .iter()
                .position(|existing| existing.id == bid.id)
                .ok_or(RepositoryError::NotFound)?;
            positions.push(position);
        }
        for (position, bid) in positions.into_iter().zip(bids) {
            guard[position] = bid;
        }
        Ok(())
    }
}
