//! Query execution orchestration.
//!
//! Ties together template substitution, the proxy transport, result
//! validation, and history recording.

mod executor;

pub use executor::{ExecutionOutcome, QueryExecutor};
