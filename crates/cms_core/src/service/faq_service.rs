//! FAQ use-case service.
//!
//! # Responsibility
//! - Create/update/delete FAQs and reconcile their category links.
//!
//! # Invariants
//! - Categories are referenced by id and must already exist.
//! - `faq_order` must be non-zero.
//! - FAQs own no sub-resources, so the cascade step is empty.

use crate::error::{ServiceError, ServiceResult};
use crate::model::faq::Faq;
use crate::model::{now_epoch_ms, EntityId};
use crate::reconcile::cascade::CascadeCoordinator;
use crate::reconcile::orchestrator::{Orchestrator, ParentPlan, ParentView};
use crate::reconcile::resolver::resolve_ids;
use crate::repo::entity_store::{ensure_connection_ready, Entity, ListQuery};
use crate::repo::link_repo::{LinkTable, FAQ_FAQ_CATEGORIES};
use crate::service::faq_category_service::FaqCategoryService;
use crate::service::validation::{require_id, require_langcode, require_text};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// FAQ with the ids of its categories.
pub type FaqView = ParentView<Faq>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqRequest {
    pub question: String,
    pub answer: String,
    pub langcode: String,
    #[serde(default)]
    pub status: bool,
    pub faq_order: i64,
    #[serde(default)]
    pub faq_categories: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateFaqRequest {
    pub id: EntityId,
    #[serde(flatten)]
    pub faq: FaqRequest,
}

pub struct FaqPlan<'conn> {
    categories: FaqCategoryService<'conn>,
}

impl ParentPlan for FaqPlan<'_> {
    type Parent = Faq;
    type Request = FaqRequest;

    fn links(&self) -> LinkTable {
        FAQ_FAQ_CATEGORIES
    }

    fn validate(&self, request: &FaqRequest) -> ServiceResult<()> {
        require_text("question", &request.question)?;
        require_text("answer", &request.answer)?;
        require_langcode(&request.langcode)?;
        if request.faq_order == 0 {
            return Err(ServiceError::validation("`faq_order` must not be 0"));
        }
        for id in &request.faq_categories {
            require_id("faq_categories", *id)?;
        }
        Ok(())
    }

    fn resolve_associations(&self, request: &FaqRequest) -> ServiceResult<BTreeSet<EntityId>> {
        resolve_ids(&self.categories, &request.faq_categories)
    }

    fn cascade<'a>(
        &'a self,
        _request: &FaqRequest,
        _current: Option<&Faq>,
        _coordinator: &mut CascadeCoordinator<'a>,
    ) -> ServiceResult<()> {
        Ok(())
    }

    fn build(
        &self,
        request: FaqRequest,
        current: Option<Faq>,
        _coordinator: &CascadeCoordinator<'_>,
    ) -> Faq {
        let now = now_epoch_ms();
        let (id, created) = match current {
            Some(current) => (current.id, current.created),
            None => (Uuid::new_v4(), now),
        };
        Faq {
            id,
            question: request.question.trim().to_string(),
            answer: request.answer.trim().to_string(),
            langcode: request.langcode,
            status: request.status,
            faq_order: request.faq_order,
            created,
            changed: Some(now),
        }
    }

    fn release<'a>(
        &'a self,
        _faq: &Faq,
        _coordinator: &mut CascadeCoordinator<'a>,
    ) -> ServiceResult<()> {
        Ok(())
    }
}

pub struct FaqService<'conn> {
    orchestrator: Orchestrator<'conn, FaqPlan<'conn>>,
}

impl<'conn> FaqService<'conn> {
    pub fn try_new(conn: &'conn Connection) -> ServiceResult<Self> {
        ensure_connection_ready(conn, &[Faq::TABLE, FAQ_FAQ_CATEGORIES.table])?;
        let plan = FaqPlan {
            categories: FaqCategoryService::try_new(conn)?,
        };
        Ok(Self {
            orchestrator: Orchestrator::new(conn, plan),
        })
    }

    pub fn create_faq(&self, request: FaqRequest) -> ServiceResult<EntityId> {
        self.orchestrator.create(request)
    }

    pub fn update_faq(&self, request: UpdateFaqRequest) -> ServiceResult<EntityId> {
        self.orchestrator.update(request.id, request.faq)
    }

    pub fn delete_faq(&self, id: EntityId) -> ServiceResult<bool> {
        self.orchestrator.delete(id)
    }

    pub fn get_faq(&self, id: EntityId) -> ServiceResult<FaqView> {
        self.orchestrator.get(id)
    }

    pub fn list_faqs(&self, query: &ListQuery) -> ServiceResult<Vec<FaqView>> {
        self.orchestrator.list(query)
    }
}
