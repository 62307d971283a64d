//! Attachment sub-resource record.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// Stored file owned by exactly one parent reference field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: EntityId,
    pub file_name: String,
    pub file_url: Vec<u8>,
    pub file_path: String,
    pub version: i64,
    pub created: i64,
    pub changed: Option<i64>,
    pub changed_user: Option<EntityId>,
}
