//! Image sub-resource record.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// Stored image owned by exactly one parent reference field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: EntityId,
    pub file_name: String,
    /// Encoded image body (base64 or data URL), opaque to the core.
    pub image_data: String,
    pub image_path: String,
    pub alt_text: Option<String>,
    /// Starts at 1 and increments on every in-place update.
    pub version: i64,
    pub created: i64,
    pub changed: Option<i64>,
    pub creator_id: Option<EntityId>,
    pub changed_user: Option<EntityId>,
}
