//! Background polling of the match-history API for tracked players.

mod match_poller;

pub use match_poller::{CycleOutcome, MatchPoller};
