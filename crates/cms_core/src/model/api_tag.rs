//! API tag record.
//!
//! # Invariants
//! - `name` is the natural key and is unique across all tags.

use super::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTag {
    pub id: EntityId,
    pub name: String,
    pub version: i64,
    pub created: i64,
    pub creator_id: Option<EntityId>,
    pub changed: Option<i64>,
    pub changed_user: Option<EntityId>,
}
