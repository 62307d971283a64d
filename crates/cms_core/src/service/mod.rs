//! Catalog use-case services.
//!
//! # Responsibility
//! - Sub-resource services: [`image_service`], [`attachment_service`].
//! - Association services: [`api_tag_service`] (find-or-create by name),
//!   [`faq_category_service`] (lookup by id).
//! - Parent services built on the reconciliation orchestrator:
//!   [`api_endpoint_service`], [`faq_service`].
//!
//! # Invariants
//! - Services borrow one connection and never hold state beyond it.
//! - `try_new` refuses connections that are not fully migrated.

pub mod api_endpoint_service;
pub mod api_tag_service;
pub mod attachment_service;
pub mod faq_category_service;
pub mod faq_service;
pub mod image_service;
pub mod validation;
