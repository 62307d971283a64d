//! Association reconciliation core.
//!
//! # Responsibility
//! - Resolve requested associations ([`resolver`]) and diff them against
//!   persisted links ([`diff`]).
//! - Cascade owned sub-resources ([`cascade`]).
//! - Commit parent rows and link changes atomically ([`orchestrator`]).

pub mod cascade;
pub mod diff;
pub mod orchestrator;
pub mod resolver;
