//! Transactional write path for parent records.
//!
//! # Responsibility
//! - Drive one parent create/update/delete through validation, association
//!   resolution, sub-resource cascade and a single link-reconciling
//!   transaction.
//! - Serve parent reads together with their associated child ids.
//!
//! # Invariants
//! - Validation performs no I/O. Preflight may read but never writes, so a
//!   request rejected by either leaves storage untouched.
//! - The parent row and all its link rows change in one IMMEDIATE
//!   transaction; link deletes run before link inserts.
//! - Sub-resource calls never run inside the transaction. Sub-resources
//!   created for a write that then fails are deleted again.
//! - A failure inside the transaction surfaces as `ServiceError::Technical`,
//!   except a parent row that vanished mid-write, which stays `NotFound`.
//!
//! # See also
//! - `reconcile::cascade` for the per-slot decision.

use crate::error::{ServiceError, ServiceResult};
use crate::model::EntityId;
use crate::reconcile::cascade::CascadeCoordinator;
use crate::reconcile::diff::{diff, AssociationDelta};
use crate::repo::entity_store::{Entity, EntityStore, ListQuery, RepoError, RepoResult};
use crate::repo::link_repo::LinkTable;
use log::{debug, error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle of one reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStage {
    Validating,
    ResolvingAssociations,
    CascadingSubResources,
    InTransaction,
    Committed,
    RolledBack,
}

impl ReconcileStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::ResolvingAssociations => "resolving_associations",
            Self::CascadingSubResources => "cascading_sub_resources",
            Self::InTransaction => "in_transaction",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        }
    }
}

/// Parent-specific hooks used by [`Orchestrator`].
pub trait ParentPlan {
    type Parent: Entity;
    type Request;

    /// Join table holding this parent's associations.
    fn links(&self) -> LinkTable;

    /// Checks required fields. Must not touch storage.
    fn validate(&self, request: &Self::Request) -> ServiceResult<()>;

    /// Rejects sub-resource payloads the cascade would refuse. Runs before
    /// any write; may read `current`'s references but must not write.
    fn preflight(
        &self,
        _request: &Self::Request,
        _current: Option<&Self::Parent>,
    ) -> ServiceResult<()> {
        Ok(())
    }

    /// Resolves requested associations into child ids.
    fn resolve_associations(&self, request: &Self::Request) -> ServiceResult<BTreeSet<EntityId>>;

    /// Upserts owned sub-resources through `coordinator`.
    fn cascade<'a>(
        &'a self,
        request: &Self::Request,
        current: Option<&Self::Parent>,
        coordinator: &mut CascadeCoordinator<'a>,
    ) -> ServiceResult<()>;

    /// Builds the row to persist. `current` is `None` on create.
    fn build(
        &self,
        request: Self::Request,
        current: Option<Self::Parent>,
        coordinator: &CascadeCoordinator<'_>,
    ) -> Self::Parent;

    /// Deletes owned sub-resources before the parent itself is deleted.
    fn release<'a>(
        &'a self,
        parent: &Self::Parent,
        coordinator: &mut CascadeCoordinator<'a>,
    ) -> ServiceResult<()>;
}

/// Parent record together with its associated child ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentView<E> {
    pub parent: E,
    pub associations: Vec<EntityId>,
}

/// Sequential write coordinator for one parent type.
pub struct Orchestrator<'conn, P: ParentPlan> {
    conn: &'conn Connection,
    plan: P,
    store: EntityStore<P::Parent>,
}

impl<'conn, P: ParentPlan> Orchestrator<'conn, P> {
    pub fn new(conn: &'conn Connection, plan: P) -> Self {
        Self {
            conn,
            plan,
            store: EntityStore::new(),
        }
    }

    pub fn plan(&self) -> &P {
        &self.plan
    }

    /// Creates a parent and links its resolved associations.
    pub fn create(&self, request: P::Request) -> ServiceResult<EntityId> {
        self.trace("create", None, ReconcileStage::Validating);
        self.plan.validate(&request)?;
        self.plan.preflight(&request, None)?;
        self.write("create", None, request)
    }

    /// Replaces a parent's fields and reconciles its associations.
    pub fn update(&self, id: EntityId, request: P::Request) -> ServiceResult<EntityId> {
        self.trace("update", Some(id), ReconcileStage::Validating);
        require_id(id)?;
        self.plan.validate(&request)?;
        let current = self.store.get(self.conn, id)?;
        self.plan.preflight(&request, Some(&current))?;
        self.write("update", Some(current), request)
    }

    /// Deletes a parent, its owned sub-resources and all its links.
    pub fn delete(&self, id: EntityId) -> ServiceResult<bool> {
        self.trace("delete", Some(id), ReconcileStage::Validating);
        require_id(id)?;
        let current = self.store.get(self.conn, id)?;

        self.trace("delete", Some(id), ReconcileStage::CascadingSubResources);
        let mut coordinator = CascadeCoordinator::new();
        self.plan.release(&current, &mut coordinator)?;

        self.trace("delete", Some(id), ReconcileStage::InTransaction);
        let links = self.plan.links();
        let store = self.store;
        let outcome = self.in_transaction(|tx| {
            let unlinked = links.delete_all(tx, id)?;
            store.delete(tx, id)?;
            Ok(unlinked)
        });
        match outcome {
            Ok(unlinked) => {
                self.trace("delete", Some(id), ReconcileStage::Committed);
                info!(
                    "event=parent_delete module=reconcile status=ok kind={} id={} links_removed={}",
                    P::Parent::KIND,
                    id,
                    unlinked
                );
                Ok(true)
            }
            Err(err) => {
                self.trace("delete", Some(id), ReconcileStage::RolledBack);
                error!(
                    "event=parent_delete module=reconcile status=error kind={} id={} error={}",
                    P::Parent::KIND,
                    id,
                    err
                );
                match err {
                    RepoError::NotFound { kind, id: missing } if missing == id => {
                        Err(ServiceError::NotFound { kind, id })
                    }
                    _ => Err(ServiceError::technical(format!(
                        "failed to delete {} {id}",
                        P::Parent::KIND
                    ))),
                }
            }
        }
    }

    pub fn get(&self, id: EntityId) -> ServiceResult<ParentView<P::Parent>> {
        require_id(id)?;
        let parent = self.store.get(self.conn, id)?;
        let associations = self.plan.links().linked_ids(self.conn, id)?;
        Ok(ParentView {
            parent,
            associations: associations.into_iter().collect(),
        })
    }

    pub fn list(&self, query: &ListQuery) -> ServiceResult<Vec<ParentView<P::Parent>>> {
        let parents = self.store.list(self.conn, query)?;
        let ids: Vec<EntityId> = parents.iter().map(|parent| parent.id()).collect();
        let mut linked = self.plan.links().linked_ids_for(self.conn, &ids)?;
        Ok(parents
            .into_iter()
            .map(|parent| {
                let associations = linked
                    .remove(&parent.id())
                    .unwrap_or_default()
                    .into_iter()
                    .collect();
                ParentView {
                    parent,
                    associations,
                }
            })
            .collect())
    }

    fn write(
        &self,
        operation: &'static str,
        current: Option<P::Parent>,
        request: P::Request,
    ) -> ServiceResult<EntityId> {
        let current_id = current.as_ref().map(|parent| parent.id());

        self.trace(operation, current_id, ReconcileStage::ResolvingAssociations);
        let requested = self.plan.resolve_associations(&request)?;

        self.trace(operation, current_id, ReconcileStage::CascadingSubResources);
        let mut coordinator = CascadeCoordinator::new();
        if let Err(err) = self
            .plan
            .cascade(&request, current.as_ref(), &mut coordinator)
        {
            coordinator.compensate();
            return Err(err);
        }

        let is_create = current.is_none();
        let parent = self.plan.build(request, current, &coordinator);
        let parent_id = parent.id();

        self.trace(operation, Some(parent_id), ReconcileStage::InTransaction);
        let links = self.plan.links();
        let store = self.store;
        let outcome = self.in_transaction(|tx| {
            if is_create {
                store.insert(tx, &parent)?;
            } else {
                store.update(tx, &parent)?;
            }
            reconcile_links(tx, links, parent_id, &requested)
        });

        match outcome {
            Ok(delta) => {
                self.trace(operation, Some(parent_id), ReconcileStage::Committed);
                info!(
                    "event=parent_{} module=reconcile status=ok kind={} id={} links_added={} links_removed={}",
                    operation,
                    P::Parent::KIND,
                    parent_id,
                    delta.to_add.len(),
                    delta.to_remove.len()
                );
                Ok(parent_id)
            }
            Err(err) => {
                self.trace(operation, Some(parent_id), ReconcileStage::RolledBack);
                let compensated = coordinator.compensate();
                error!(
                    "event=parent_{} module=reconcile status=error kind={} id={} compensated={} error={}",
                    operation,
                    P::Parent::KIND,
                    parent_id,
                    compensated,
                    err
                );
                match err {
                    RepoError::NotFound { kind, id } if id == parent_id => {
                        Err(ServiceError::NotFound { kind, id })
                    }
                    _ => Err(ServiceError::technical(format!(
                        "failed to {operation} {} {parent_id}",
                        P::Parent::KIND
                    ))),
                }
            }
        }
    }

    /// Runs `work` in an IMMEDIATE transaction; any error rolls back.
    fn in_transaction<T>(
        &self,
        work: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        match work(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event=tx_rollback module=reconcile status=error kind={} error={}",
                        P::Parent::KIND,
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }

    fn trace(&self, operation: &str, id: Option<EntityId>, stage: ReconcileStage) {
        match id {
            Some(id) => debug!(
                "event=reconcile module=reconcile op={} kind={} id={} stage={}",
                operation,
                P::Parent::KIND,
                id,
                stage.as_str()
            ),
            None => debug!(
                "event=reconcile module=reconcile op={} kind={} stage={}",
                operation,
                P::Parent::KIND,
                stage.as_str()
            ),
        }
    }
}

/// Brings the persisted links of `parent_id` in line with `requested`.
fn reconcile_links(
    conn: &Connection,
    links: LinkTable,
    parent_id: EntityId,
    requested: &BTreeSet<EntityId>,
) -> RepoResult<AssociationDelta> {
    let persisted = links.linked_ids(conn, parent_id)?;
    let delta = diff(&persisted, requested);
    for child_id in &delta.to_remove {
        links.delete(conn, parent_id, *child_id)?;
    }
    for child_id in &delta.to_add {
        links.insert(conn, parent_id, *child_id)?;
    }
    Ok(delta)
}

fn require_id(id: EntityId) -> ServiceResult<()> {
    if id.is_nil() {
        return Err(ServiceError::validation("id must not be nil"));
    }
    Ok(())
}
