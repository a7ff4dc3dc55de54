use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Bid, BidId, TicketCode};
use crate::workflows::players::PlayerId;

/// Storage abstraction so the evaluation job can be exercised in isolation.
///
/// `update_all` is the only write the weekly job performs and is assumed
/// atomic: either the whole ranked batch lands or none of it does.
pub trait BidRepository: Send + Sync {
    fn insert(&self, bid: Bid) -> Result<Bid, RepositoryError>;
    fn fetch(&self, id: &BidId) -> Result<Option<Bid>, RepositoryError>;
    /// Every bid created at or after `since`, regardless of status.
    fn bids_since(&self, since: DateTime<Utc>) -> Result<Vec<Bid>, RepositoryError>;
    /// Bids no weekly evaluation has settled yet (`Pending` or
    /// `WaitingForApproval`). Terminal bids never come back through here,
    /// which is what keeps re-runs from double-processing.
    fn unevaluated(&self) -> Result<Vec<Bid>, RepositoryError>;
    /// Batch persist of an evaluation outcome.
    fn update_all(&self, bids: Vec<Bid>) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized representation of a bid's exposed state.
#[derive(Debug, Clone, Serialize)]
pub struct BidStatusView {
    pub bid_id: BidId,
    pub creator: PlayerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner: Option<PlayerId>,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_code: Option<TicketCode>,
}

impl Bid {
    pub fn status_view(&self) -> BidStatusView {
        BidStatusView {
            bid_id: self.id.clone(),
            creator: self.creator.clone(),
            partner: self.partner.clone(),
            status: self.status.label(),
            score: self.score.value(),
            ticket_code: self.ticket_code.clone(),
        }
    }
}
