//! FAQ records and their categories.

use super::EntityId;
use serde::{Deserialize, Serialize};

/// One question/answer pair; categories are linked through
/// `faq_faq_categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub id: EntityId,
    pub question: String,
    pub answer: String,
    pub langcode: String,
    pub status: bool,
    /// Display position; zero is reserved as "unset" and rejected on write.
    pub faq_order: i64,
    pub created: i64,
    pub changed: Option<i64>,
}

/// Grouping used to organize FAQs. Referenced by id, never created implicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqCategory {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub version: i64,
    pub created: i64,
    pub changed: Option<i64>,
}
