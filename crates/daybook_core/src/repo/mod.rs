//! Persistence ports and the dual-write coordinator.
//!
//! # Responsibility
//! - Define the local-cache and remote-store ports.
//! - Keep both sides consistent through the record store facade.

pub mod local_cache;
pub mod record_store;
pub mod remote;
pub mod rows;
