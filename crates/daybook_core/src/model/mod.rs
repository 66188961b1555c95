//! Domain model and in-memory record operations.
//!
//! # Responsibility
//! - Define the daily record and its child collections.
//! - Enforce seal gating, ordering and completion invariants in memory.

pub mod content;
pub mod journal;
pub mod metrics;
pub mod record;
pub mod tasks;
