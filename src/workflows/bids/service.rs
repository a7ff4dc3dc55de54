use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::allocation::WeeklyAllocator;
use super::domain::{Bid, BidId, BidScore, BidStatus};
use super::repository::{BidRepository, BidStatusView, RepositoryError};
use super::schedule::{lookback_start, Clock};
use super::scoring;
use crate::workflows::players::{DirectoryError, PlayerDirectory, PlayerId};

static BID_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_bid_id() -> BidId {
    let id = BID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BidId(format!("bid-{id:06}"))
}

/// Intake payload for a new play bid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidSubmission {
    pub creator: PlayerId,
    #[serde(default)]
    pub partner: Option<PlayerId>,
}

/// Service composing the roster, repository, clock, and weekly allocator.
///
/// One instance is expected to own the weekly evaluation: the run lock
/// serializes find-anchor through persist so a second trigger cannot award
/// the same capacity window twice.
pub struct BidService<R, P, C> {
    repository: Arc<R>,
    directory: Arc<P>,
    clock: Arc<C>,
    allocator: WeeklyAllocator,
    run_lock: Mutex<()>,
}

impl<R, P, C> BidService<R, P, C>
where
    R: BidRepository + 'static,
    P: PlayerDirectory + 'static,
    C: Clock + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<P>, clock: Arc<C>) -> Self {
        Self::with_allocator(repository, directory, clock, WeeklyAllocator::default())
    }

    pub fn with_allocator(
        repository: Arc<R>,
        directory: Arc<P>,
        clock: Arc<C>,
        allocator: WeeklyAllocator,
    ) -> Self {
        Self {
            repository,
            directory,
            clock,
            allocator,
            run_lock: Mutex::new(()),
        }
    }

    /// Submit a new bid, returning the stored record.
    ///
    /// Solo bids start `Pending`; partnered bids start `WaitingForApproval`
    /// and stay out of scoring until the partner approves.
    pub fn submit(&self, submission: BidSubmission) -> Result<Bid, BidServiceError> {
        self.ensure_registered(&submission.creator)?;
        if let Some(partner) = &submission.partner {
            self.ensure_registered(partner)?;
        }

        let status = if submission.partner.is_some() {
            BidStatus::WaitingForApproval
        } else {
            BidStatus::Pending
        };
        let bid = Bid {
            id: next_bid_id(),
            creator: submission.creator,
            partner: submission.partner,
            created_at: self.clock.now(),
            status,
            score: BidScore::Unscored,
            ticket_code: None,
        };

        Ok(self.repository.insert(bid)?)
    }

    /// Partner approval: flips a partnered bid from `WaitingForApproval` to
    /// `Pending` so the next evaluation scores it.
    pub fn approve(&self, id: &BidId) -> Result<Bid, BidServiceError> {
        let mut bid = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if bid.partner.is_none() || bid.status != BidStatus::WaitingForApproval {
            return Err(BidServiceError::InvalidApproval {
                bid_id: id.clone(),
                status: bid.status,
            });
        }

        bid.status = BidStatus::Pending;
        self.repository.update_all(vec![bid.clone()])?;
        Ok(bid)
    }

    /// Read-only standings: scores the pool feeding the current week without
    /// touching any status, for display between evaluation runs.
    pub fn evaluate_current_week(&self) -> Result<Vec<Bid>, BidServiceError> {
        let week_end = self.clock.week_end(self.clock.now());
        let pool = self.repository.bids_since(lookback_start(week_end))?;
        Ok(scoring::evaluate(pool))
    }

    /// Weekly job: anchor on the earliest unevaluated bid, score its
    /// four-week lookback window, allocate the target week, persist.
    ///
    /// An empty backlog is a clean no-op. A persistence failure aborts the
    /// run without partial commit; the next scheduled invocation retries the
    /// whole thing, and already-settled bids stay settled because they no
    /// longer appear in the unevaluated query.
    pub fn run_weekly_evaluation(&self) -> Result<EvaluationRun, BidServiceError> {
        let _run = self.run_lock.lock().expect("evaluation run lock poisoned");

        let unevaluated = self.repository.unevaluated()?;
        let Some(anchor) = unevaluated.iter().map(|bid| bid.created_at).min() else {
            info!("no unevaluated bids, nothing to evaluate this week");
            return Ok(EvaluationRun::NothingToEvaluate);
        };

        let week_end = self.clock.week_end(anchor);
        let week_start = lookback_start(week_end);

        let evaluated = scoring::evaluate(self.repository.bids_since(week_start)?);
        let ranked = self.allocator.allocate(evaluated, week_start, week_end);
        self.repository.update_all(ranked.clone())?;

        let awarded = ranked
            .iter()
            .filter(|bid| bid.status == BidStatus::Won)
            .count();
        let rejected = ranked.len() - awarded;
        info!(%week_start, %week_end, awarded, rejected, "weekly evaluation persisted");

        Ok(EvaluationRun::Completed(EvaluationSummary {
            week_start,
            week_end,
            awarded,
            rejected,
            ranked: ranked.iter().map(Bid::status_view).collect(),
        }))
    }

    fn ensure_registered(&self, player: &PlayerId) -> Result<(), BidServiceError> {
        match self.directory.find(player)? {
            Some(_) => Ok(()),
            None => Err(BidServiceError::UnknownPlayer(player.clone())),
        }
    }
}

/// Outcome of one weekly evaluation invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EvaluationRun {
    NothingToEvaluate,
    Completed(EvaluationSummary),
}

/// What a completed run settled, winners first.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub week_start: DateTime<Utc>,
    pub week_end: DateTime<Utc>,
    pub awarded: usize,
    pub rejected: usize,
    pub ranked: Vec<BidStatusView>,
}

/// Error raised by the bid service.
#[derive(Debug, thiserror::Error)]
pub enum BidServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("player {0:?} is not registered")]
    UnknownPlayer(PlayerId),
    #[error("bid {bid_id:?} cannot be approved from status {status:?}")]
    InvalidApproval { bid_id: BidId, status: BidStatus },
}
