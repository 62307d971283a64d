//! Persistence layer.
//!
//! # Responsibility
//! - Map catalog records onto SQLite tables ([`tables`], [`codec`]).
//! - Offer a generic record store and a join-table helper that run on a
//!   caller-supplied connection or transaction.
//!
//! # Invariants
//! - Repository calls never commit; transaction boundaries belong to callers.
//! - Not-found and constraint conflicts are reported as semantic errors, not
//!   raw SQLite errors.

pub mod codec;
pub mod entity_store;
pub mod link_repo;
pub mod tables;
