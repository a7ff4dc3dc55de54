//! Weekly court-bid evaluation service.
//!
//! Players submit bids for play slots, optionally paired with a partner. Once a
//! week the evaluation job scores every bid in a four-week lookback window,
//! ranks the target week's bids by accumulated fairness score, and awards the
//! available slots. Everything around that core (intake, approval, the HTTP
//! surface) feeds or reads the same repository contract.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
