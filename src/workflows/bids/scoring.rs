use std::collections::HashMap;

use super::domain::{Bid, BidScore, BidStatus};
use crate::workflows::players::PlayerId;

/// Per-run accumulator mapping each participant to their running total.
///
/// A table lives for exactly one scoring pass and is discarded afterwards;
/// it is never persisted or shared between runs.
#[derive(Debug, Default)]
pub struct ScoreTable {
    totals: HashMap<PlayerId, u32>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `by` to the participant's total, creating the entry first if
    /// absent, and returns the updated total.
    fn credit(&mut self, player: &PlayerId, by: u32) -> u32 {
        let total = self.totals.entry(player.clone()).or_insert(0);
        *total += by;
        *total
    }

    pub fn total(&self, player: &PlayerId) -> u32 {
        self.totals.get(player).copied().unwrap_or(0)
    }
}

/// Scores a pool of bids.
///
/// The pool is walked in ascending `created_at` order (stable for ties, so
/// persistence order wins) with a fresh [`ScoreTable`]; each bid's score
/// reflects cumulative history up to and including itself. Participants who
/// have bid less accumulate less, which ranks them ahead at allocation time.
/// Returns the bids in chronological order.
pub fn evaluate(mut bids: Vec<Bid>) -> Vec<Bid> {
    bids.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let mut table = ScoreTable::new();
    for bid in &mut bids {
        bid.score = score_bid(bid, &mut table);
    }
    bids
}

fn score_bid(bid: &Bid, table: &mut ScoreTable) -> BidScore {
    match &bid.partner {
        Some(partner) if bid.status != BidStatus::WaitingForApproval => {
            let partner_total = table.credit(partner, 1);
            let creator_total = table.credit(&bid.creator, 1);
            BidScore::Scored(f64::from(partner_total + creator_total) / 2.0)
        }
        // Still waiting on the partner: ineligible until approval flips it.
        Some(_) => BidScore::Unscored,
        None => BidScore::Scored(f64::from(table.credit(&bid.creator, 2))),
    }
}
