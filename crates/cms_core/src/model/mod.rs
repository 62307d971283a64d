//! Catalog domain model.
//!
//! # Responsibility
//! - Define the records persisted by the catalog core.
//! - Keep storage-agnostic shapes; SQL mapping lives in `repo::tables`.
//!
//! # Invariants
//! - Every record is identified by a stable `EntityId` that never changes
//!   after creation.
//! - Timestamps are Unix epoch milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub mod api_endpoint;
pub mod api_tag;
pub mod attachment;
pub mod faq;
pub mod image;

/// Stable identifier shared by every catalog record.
pub type EntityId = Uuid;

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
