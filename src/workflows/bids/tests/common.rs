use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::bids::domain::{Bid, BidId, BidScore, BidStatus};
use crate::workflows::bids::memory::MemoryBidRepository;
use crate::workflows::bids::repository::{BidRepository, RepositoryError};
use crate::workflows::bids::router::bid_router;
use crate::workflows::bids::schedule::{closing_sunday, lookback_start, Clock};
use crate::workflows::bids::service::BidService;
use crate::workflows::bids::WeeklyAllocator;
use crate::workflows::players::{MemoryPlayerDirectory, Player, PlayerDirectory, PlayerId};

/// Monday 2026-03-02, the start of the fixed test week.
pub(super) fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Timestamp within the fixed test week: `day` days after Monday, at `hour`.
pub(super) fn at(day: i64, hour: i64) -> DateTime<Utc> {
    monday() + Duration::days(day) + Duration::hours(hour)
}

/// Closing boundary of the fixed test week (Sunday 2026-03-08 00:00 UTC).
pub(super) fn week_end() -> DateTime<Utc> {
    closing_sunday(monday())
}

pub(super) fn week_start() -> DateTime<Utc> {
    lookback_start(week_end())
}

pub(super) fn player(name: &str) -> PlayerId {
    PlayerId(name.to_string())
}

pub(super) fn solo(id: &str, creator: &str, created_at: DateTime<Utc>) -> Bid {
    Bid {
        id: BidId(id.to_string()),
        creator: player(creator),
        partner: None,
        created_at,
        status: BidStatus::Pending,
        score: BidScore::Unscored,
        ticket_code: None,
    }
}

pub(super) fn paired(
    id: &str,
    creator: &str,
    partner: &str,
    status: BidStatus,
    created_at: DateTime<Utc>,
) -> Bid {
    Bid {
        id: BidId(id.to_string()),
        creator: player(creator),
        partner: Some(player(partner)),
        created_at,
        status,
        score: BidScore::Unscored,
        ticket_code: None,
    }
}

pub(super) fn scored(mut bid: Bid, score: f64) -> Bid {
    bid.score = BidScore::Scored(score);
    bid
}

/// The representative week: two solo bids by the same player, a confirmed
/// pair, and a pair still waiting on approval.
pub(super) fn scenario_bids() -> Vec<Bid> {
    vec![
        solo("bid-a", "alice", at(0, 10)),
        solo("bid-b", "alice", at(1, 9)),
        paired("bid-c", "clara", "dan", BidStatus::Pending, at(2, 18)),
        paired("bid-e", "eva", "finn", BidStatus::WaitingForApproval, at(3, 8)),
    ]
}

/// Deterministic clock pinned inside the fixed test week.
pub(super) struct FixedClock {
    pub(super) now: DateTime<Utc>,
}

impl FixedClock {
    pub(super) fn thursday() -> Self {
        Self { now: at(3, 12) }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn week_end(&self, reference: DateTime<Utc>) -> DateTime<Utc> {
        closing_sunday(reference)
    }
}

pub(super) type TestService = BidService<MemoryBidRepository, MemoryPlayerDirectory, FixedClock>;

pub(super) fn build_service(
    capacity: usize,
) -> (
    TestService,
    Arc<MemoryBidRepository>,
    Arc<MemoryPlayerDirectory>,
) {
    let repository = Arc::new(MemoryBidRepository::default());
    let directory = Arc::new(MemoryPlayerDirectory::default());
    register_roster(directory.as_ref());
    let service = BidService::with_allocator(
        repository.clone(),
        directory.clone(),
        Arc::new(FixedClock::thursday()),
        WeeklyAllocator::new(capacity),
    );
    (service, repository, directory)
}

pub(super) fn register_roster<P: PlayerDirectory>(directory: &P) {
    for name in ["alice", "ben", "clara", "dan", "eva", "finn"] {
        directory
            .create_player(Player {
                id: player(name),
                first_name: name.to_string(),
                last_name: "Player".to_string(),
                email: format!("{name}@club.example"),
            })
            .expect("roster registration succeeds");
    }
}

pub(super) fn seed_bids<R: BidRepository>(repository: &R, bids: Vec<Bid>) {
    for bid in bids {
        repository.insert(bid).expect("seed insert succeeds");
    }
}

pub(super) fn bid_router_with_service(service: TestService) -> axum::Router {
    bid_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Repository double that accepts reads but refuses the batch persist.
#[derive(Default, Clone)]
pub(super) struct ReadOnlyRepository {
    pub(super) inner: MemoryBidRepository,
}

impl BidRepository for ReadOnlyRepository {
    fn insert(&self, bid: Bid) -> Result<Bid, RepositoryError> {
        self.inner.insert(bid)
    }

    fn fetch(&self, id: &BidId) -> Result<Option<Bid>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn bids_since(&self, since: DateTime<Utc>) -> Result<Vec<Bid>, RepositoryError> {
        self.inner.bids_since(since)
    }

    fn unevaluated(&self) -> Result<Vec<Bid>, RepositoryError> {
        self.inner.unevaluated()
    }

    fn update_all(&self, _bids: Vec<Bid>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }
}

/// Repository double standing in for an offline store.
pub(super) struct UnavailableRepository;

impl BidRepository for UnavailableRepository {
    fn insert(&self, _bid: Bid) -> Result<Bid, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &BidId) -> Result<Option<Bid>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn bids_since(&self, _since: DateTime<Utc>) -> Result<Vec<Bid>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn unevaluated(&self) -> Result<Vec<Bid>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_all(&self, _bids: Vec<Bid>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
