use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::Rng;

use super::domain::{Bid, BidStatus, TicketCode};

/// Capacity the allocator falls back to when none is configured. The stored
/// club settings carry their own, different default of six.
pub const DEFAULT_MAX_EVENTS_PER_WEEK: usize = 5;

/// Issues ticket codes for a single allocation run, retrying the rare
/// in-run collision so every winner holds a distinct code.
#[derive(Debug, Default)]
struct TicketIssuer {
    issued: HashSet<String>,
}

impl TicketIssuer {
    fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TicketCode {
        loop {
            let code = TicketCode::generate(rng);
            if self.issued.insert(code.0.clone()) {
                return code;
            }
        }
    }
}

/// Ranks one week's evaluated bids and assigns the final statuses.
#[derive(Debug, Clone)]
pub struct WeeklyAllocator {
    max_events_per_week: usize,
}

impl Default for WeeklyAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENTS_PER_WEEK)
    }
}

impl WeeklyAllocator {
    pub fn new(max_events_per_week: usize) -> Self {
        Self { max_events_per_week }
    }

    pub fn max_events_per_week(&self) -> usize {
        self.max_events_per_week
    }

    /// Selects the target week's bids from an evaluated pool, ranks them by
    /// score, and marks winners and losers.
    ///
    /// Only bids strictly inside `(week_start, week_end)` take part. The
    /// sort is stable: equal scores keep their chronological order between
    /// runs. A rank within capacity only wins if the bid is still `Pending`;
    /// everything else in the window is marked `Lost`. Returns the ranked
    /// subset, winners first.
    pub fn allocate(
        &self,
        evaluated: Vec<Bid>,
        week_start: DateTime<Utc>,
        week_end: DateTime<Utc>,
    ) -> Vec<Bid> {
        let mut ranked: Vec<Bid> = evaluated
            .into_iter()
            .filter(|bid| week_start < bid.created_at && bid.created_at < week_end)
            .collect();
        ranked.sort_by(|a, b| a.score.ranking(b.score));

        let mut rng = rand::thread_rng();
        let mut tickets = TicketIssuer::default();
        for (rank, bid) in ranked.iter_mut().enumerate() {
            // `<=` keeps capacity + 1 ranks in play.
            if rank <= self.max_events_per_week && bid.status == BidStatus::Pending {
                bid.status = BidStatus::Won;
                bid.ticket_code = Some(tickets.next(&mut rng));
            } else {
                bid.status = BidStatus::Lost;
            }
        }
        ranked
    }
}
