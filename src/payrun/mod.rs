//! Payrun lifecycle orchestration.
//!
//! This module owns the payrun state machine: it is the only code that
//! writes payrun statuses and aggregate totals, always under a per-payrun
//! lock, with the status re-checked after the lock is held so transitions
//! that raced a concurrent operation are rejected rather than overwritten.

mod controller;
mod locks;

pub use controller::{ComputeOutcome, ComputeWarning, PayrunController};
pub use locks::LockRegistry;
