//! In-process state shared across invocations.

pub mod ledger;

pub use ledger::{HistoryLedger, DEFAULT_CAPACITY};
