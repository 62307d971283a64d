//! Association resolution contracts.
//!
//! # Responsibility
//! - Turn a parent's requested associations (tag names or category ids)
//!   into a set of persisted child ids.
//!
//! # Invariants
//! - Resolving the same name twice yields the same id and creates at most
//!   one record.
//! - Duplicate names or ids in one request collapse to one id.
//! - Any failure aborts the whole resolution; nothing is linked yet.

use crate::error::{ServiceError, ServiceResult};
use crate::model::EntityId;
use std::collections::BTreeSet;

/// Outcome of resolving one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub id: EntityId,
    /// `true` when this call inserted the record.
    pub created: bool,
}

/// Find-or-create by natural key.
pub trait TagResolver {
    /// Returns the id of the record named `name`, creating it when absent.
    ///
    /// Blank names are a validation error. A concurrent insert that wins the
    /// unique constraint surfaces as a retryable conflict.
    fn resolve_or_create(&self, name: &str) -> ServiceResult<Resolved>;
}

/// Id-addressed lookup; unknown ids are `ServiceError::NotFound`.
pub trait AssociationLookup {
    type Target;

    fn get(&self, id: EntityId) -> ServiceResult<Self::Target>;
}

/// Resolves every name, creating missing records.
pub fn resolve_names<R: TagResolver + ?Sized>(
    resolver: &R,
    names: &[String],
) -> ServiceResult<BTreeSet<EntityId>> {
    let mut ids = BTreeSet::new();
    for name in names {
        ids.insert(resolver.resolve_or_create(name)?.id);
    }
    Ok(ids)
}

/// Confirms every id exists; the first unknown id aborts resolution.
pub fn resolve_ids<L: AssociationLookup + ?Sized>(
    lookup: &L,
    ids: &[EntityId],
) -> ServiceResult<BTreeSet<EntityId>> {
    let requested: BTreeSet<EntityId> = ids.iter().copied().collect();
    for id in &requested {
        if id.is_nil() {
            return Err(ServiceError::validation("association id must not be nil"));
        }
        lookup.get(*id)?;
    }
    Ok(requested)
}

#[cfg(test)]
mod tests {
    use super::{resolve_ids, resolve_names, AssociationLookup, Resolved, TagResolver};
    use crate::error::{ServiceError, ServiceResult};
    use crate::model::EntityId;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    #[derive(Default)]
    struct MemoryTags {
        by_name: RefCell<BTreeMap<String, EntityId>>,
    }

    impl TagResolver for MemoryTags {
        fn resolve_or_create(&self, name: &str) -> ServiceResult<Resolved> {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::validation("blank"));
            }
            let mut by_name = self.by_name.borrow_mut();
            if let Some(id) = by_name.get(name) {
                return Ok(Resolved {
                    id: *id,
                    created: false,
                });
            }
            let id = Uuid::new_v4();
            by_name.insert(name.to_string(), id);
            Ok(Resolved { id, created: true })
        }
    }

    struct KnownIds(Vec<EntityId>);

    impl AssociationLookup for KnownIds {
        type Target = EntityId;

        fn get(&self, id: EntityId) -> ServiceResult<EntityId> {
            if self.0.contains(&id) {
                Ok(id)
            } else {
                Err(ServiceError::NotFound {
                    kind: "faq_category",
                    id,
                })
            }
        }
    }

    #[test]
    fn duplicate_names_collapse_to_one_id() {
        let tags = MemoryTags::default();
        let names = vec!["x".to_string(), "x".to_string(), "y".to_string()];
        let ids = resolve_names(&tags, &names).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(tags.by_name.borrow().len(), 2);
    }

    #[test]
    fn unknown_id_aborts_resolution() {
        let known = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let err = resolve_ids(&KnownIds(vec![known]), &[known, missing]).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { id, .. } if id == missing));
    }

    #[test]
    fn nil_id_is_validation_error() {
        let err = resolve_ids(&KnownIds(vec![]), &[Uuid::nil()]).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
