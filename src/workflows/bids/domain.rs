use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::workflows::players::PlayerId;

/// Identifier wrapper for submitted bids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BidId(pub String);

/// Lifecycle of a bid. Intake produces `Pending` (solo) or
/// `WaitingForApproval` (partnered); the weekly evaluation moves a bid to a
/// terminal `Won` or `Lost` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidStatus {
    Pending,
    WaitingForApproval,
    Won,
    Lost,
}

impl BidStatus {
    pub const fn label(self) -> &'static str {
        match self {
            BidStatus::Pending => "pending",
            BidStatus::WaitingForApproval => "waiting_for_approval",
            BidStatus::Won => "won",
            BidStatus::Lost => "lost",
        }
    }
}

/// Fairness score attached to a bid by the scoring pass.
///
/// `Unscored` covers both "not evaluated yet" and "ineligible" (a partnered
/// bid still waiting for approval). Callers have to handle it explicitly; in
/// ranking order it sorts after every scored bid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BidScore {
    Unscored,
    Scored(f64),
}

impl BidScore {
    pub fn is_scored(self) -> bool {
        matches!(self, BidScore::Scored(_))
    }

    pub fn value(self) -> Option<f64> {
        match self {
            BidScore::Scored(value) => Some(value),
            BidScore::Unscored => None,
        }
    }

    /// Ranking order used by the allocator: lower accumulated score first,
    /// every unscored bid after every scored one.
    pub fn ranking(self, other: BidScore) -> Ordering {
        match (self, other) {
            (BidScore::Scored(a), BidScore::Scored(b)) => a.total_cmp(&b),
            (BidScore::Scored(_), BidScore::Unscored) => Ordering::Less,
            (BidScore::Unscored, BidScore::Scored(_)) => Ordering::Greater,
            (BidScore::Unscored, BidScore::Unscored) => Ordering::Equal,
        }
    }
}

const TICKET_LETTERS: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Claim token handed to a winning bid: two letters followed by four digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketCode(pub String);

impl TicketCode {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut code = String::with_capacity(6);
        for _ in 0..2 {
            let letter = TICKET_LETTERS[rng.gen_range(0..TICKET_LETTERS.len())];
            code.push(char::from(letter));
        }
        for _ in 0..4 {
            let digit: u8 = rng.gen_range(0..10);
            code.push(char::from(b'0' + digit));
        }
        Self(code)
    }
}

/// A request for a play slot, optionally shared with a partner.
///
/// `created_at` is stamped once at intake and never changes; windowing and
/// chronological scoring both depend on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub creator: PlayerId,
    pub partner: Option<PlayerId>,
    pub created_at: DateTime<Utc>,
    pub status: BidStatus,
    pub score: BidScore,
    pub ticket_code: Option<TicketCode>,
}
