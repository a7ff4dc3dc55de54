pub mod bids;
pub mod players;
