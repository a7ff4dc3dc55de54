//! Weekly play-bid intake, fairness scoring, and slot allocation.
//!
//! The scoring pass walks a four-week lookback in chronological order so a
//! bid's score reflects how much its participants have already played; the
//! allocator then ranks the target week ascending by score and awards the
//! configured number of slots. Both are pure over data the repository
//! already fetched; only the orchestrating service touches I/O.

pub mod allocation;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod schedule;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use allocation::{WeeklyAllocator, DEFAULT_MAX_EVENTS_PER_WEEK};
pub use domain::{Bid, BidId, BidScore, BidStatus, TicketCode};
pub use memory::MemoryBidRepository;
pub use repository::{BidRepository, BidStatusView, RepositoryError};
pub use router::bid_router;
pub use schedule::{closing_sunday, lookback_start, Clock, SystemClock, LOOKBACK_WEEKS};
pub use scoring::{evaluate, ScoreTable};
pub use service::{
    BidService, BidServiceError, BidSubmission, EvaluationRun, EvaluationSummary,
};
