//! Cascading upsert of owned sub-resources.
//!
//! # Responsibility
//! - Decide per reference slot whether the owned sub-resource is created,
//!   updated, deleted or left alone.
//! - Execute that decision through [`SubResourceService`] only.
//! - Remember every creation so it can be undone if the parent write fails.
//!
//! # Invariants
//! - Slots are independent; one slot's outcome never changes another's plan.
//! - The four-way decision is exhaustive and deterministic.
//! - Updates keep the sub-resource id; deletes clear the reference.
//! - A reference whose sub-resource is gone is treated as absent: delete
//!   skips it and update recreates it.

use crate::error::{ServiceError, ServiceResult};
use crate::model::EntityId;
use log::{debug, error, warn};
use std::fmt::{Debug, Formatter};

/// Payload accepted by a sub-resource service.
pub trait SubResourcePayload {
    /// `true` when no content field is set.
    fn is_empty(&self) -> bool;

    /// Checks the fields a new sub-resource needs. Must not touch storage.
    fn validate_for_create(&self) -> ServiceResult<()>;
}

/// Operations the coordinator needs from an owned sub-resource type.
pub trait SubResourceService {
    type Resource;
    type Payload: SubResourcePayload;

    /// Snake-case sub-resource name used in log events.
    const KIND: &'static str;

    fn create(&self, payload: &Self::Payload) -> ServiceResult<EntityId>;
    fn get(&self, id: EntityId) -> ServiceResult<Self::Resource>;
    /// Partial update; only non-empty payload fields overwrite.
    fn update(&self, id: EntityId, payload: &Self::Payload) -> ServiceResult<EntityId>;
    fn delete(&self, id: EntityId) -> ServiceResult<bool>;
}

/// Payload-free summary of a slot decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    Create,
    Update,
    Delete,
    Noop,
}

impl SlotAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Noop => "noop",
        }
    }
}

/// Slot decision carrying the data needed to execute it.
#[derive(Debug, PartialEq, Eq)]
pub enum SlotPlan<'p, P> {
    Create(&'p P),
    Update(EntityId, &'p P),
    Delete(EntityId),
    Noop,
}

impl<P> SlotPlan<'_, P> {
    pub fn action(&self) -> SlotAction {
        match self {
            Self::Create(_) => SlotAction::Create,
            Self::Update(..) => SlotAction::Update,
            Self::Delete(_) => SlotAction::Delete,
            Self::Noop => SlotAction::Noop,
        }
    }
}

/// Four-way decision over `(existing reference, payload)`.
///
/// An empty payload counts as absent.
pub fn plan_slot<P: SubResourcePayload>(
    existing: Option<EntityId>,
    payload: Option<&P>,
) -> SlotPlan<'_, P> {
    let payload = payload.filter(|payload| !payload.is_empty());
    match (existing, payload) {
        (None, Some(payload)) => SlotPlan::Create(payload),
        (Some(id), Some(payload)) => SlotPlan::Update(id, payload),
        (Some(id), None) => SlotPlan::Delete(id),
        (None, None) => SlotPlan::Noop,
    }
}

/// Rejects a slot request whose execution would fail validation.
///
/// Runs before any write so a rejected request leaves no trace. Reads the
/// existing reference to learn whether an update will fall back to create.
pub fn preflight<S: SubResourceService>(
    service: &S,
    existing: Option<EntityId>,
    payload: Option<&S::Payload>,
) -> ServiceResult<()> {
    match plan_slot(existing, payload) {
        SlotPlan::Create(payload) => payload.validate_for_create(),
        SlotPlan::Update(id, payload) => match service.get(id) {
            Ok(_) => Ok(()),
            Err(ServiceError::NotFound { .. }) => payload.validate_for_create(),
            Err(err) => Err(err),
        },
        SlotPlan::Delete(_) | SlotPlan::Noop => Ok(()),
    }
}

/// What happened to one slot during a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOutcome {
    pub slot: &'static str,
    pub action: SlotAction,
    /// Reference the parent must store after the cascade.
    pub reference: Option<EntityId>,
}

struct Compensation<'a> {
    slot: &'static str,
    kind: &'static str,
    id: EntityId,
    undo: Box<dyn Fn(EntityId) -> ServiceResult<bool> + 'a>,
}

/// Runs slot upserts for one parent write and tracks what to undo.
#[derive(Default)]
pub struct CascadeCoordinator<'a> {
    outcomes: Vec<SlotOutcome>,
    compensations: Vec<Compensation<'a>>,
}

impl Debug for CascadeCoordinator<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeCoordinator")
            .field("outcomes", &self.outcomes)
            .field("pending_compensations", &self.compensations.len())
            .finish()
    }
}

impl<'a> CascadeCoordinator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles one slot and returns the reference the parent should hold.
    pub fn upsert<S: SubResourceService>(
        &mut self,
        slot: &'static str,
        service: &'a S,
        existing: Option<EntityId>,
        payload: Option<&S::Payload>,
    ) -> ServiceResult<Option<EntityId>> {
        let plan = plan_slot(existing, payload);
        let mut action = plan.action();
        let reference = match plan {
            SlotPlan::Create(payload) => Some(self.create(slot, service, payload)?),
            SlotPlan::Update(id, payload) => match service.update(id, payload) {
                Ok(id) => Some(id),
                Err(ServiceError::NotFound { .. }) => {
                    warn!(
                        "event=cascade_slot module=reconcile status=dangling slot={} kind={} id={} fallback=create",
                        slot,
                        S::KIND,
                        id
                    );
                    action = SlotAction::Create;
                    Some(self.create(slot, service, payload)?)
                }
                Err(err) => return Err(err),
            },
            SlotPlan::Delete(id) => {
                match service.delete(id) {
                    Ok(_) => {}
                    Err(ServiceError::NotFound { .. }) => {
                        warn!(
                            "event=cascade_slot module=reconcile status=dangling slot={} kind={} id={}",
                            slot,
                            S::KIND,
                            id
                        );
                    }
                    Err(err) => return Err(err),
                }
                None
            }
            SlotPlan::Noop => None,
        };

        debug!(
            "event=cascade_slot module=reconcile status=ok slot={} kind={} action={}",
            slot,
            S::KIND,
            action.as_str()
        );
        self.outcomes.push(SlotOutcome {
            slot,
            action,
            reference,
        });
        Ok(reference)
    }

    fn create<S: SubResourceService>(
        &mut self,
        slot: &'static str,
        service: &'a S,
        payload: &S::Payload,
    ) -> ServiceResult<EntityId> {
        let id = service.create(payload)?;
        self.compensations.push(Compensation {
            slot,
            kind: S::KIND,
            id,
            undo: Box::new(move |id| service.delete(id)),
        });
        Ok(id)
    }

    /// Deletes the sub-resource held in `slot`, if any.
    pub fn release<S: SubResourceService>(
        &mut self,
        slot: &'static str,
        service: &'a S,
        existing: Option<EntityId>,
    ) -> ServiceResult<()> {
        self.upsert(slot, service, existing, None).map(|_| ())
    }

    /// Reference recorded for `slot`; `None` if the slot was never visited.
    pub fn reference(&self, slot: &str) -> Option<EntityId> {
        self.outcomes
            .iter()
            .rev()
            .find(|outcome| outcome.slot == slot)
            .and_then(|outcome| outcome.reference)
    }

    pub fn outcomes(&self) -> &[SlotOutcome] {
        &self.outcomes
    }

    /// Deletes every sub-resource created so far, newest first.
    ///
    /// Failures are logged and skipped. Returns the number removed.
    pub fn compensate(&mut self) -> usize {
        let mut removed = 0;
        while let Some(compensation) = self.compensations.pop() {
            match (compensation.undo)(compensation.id) {
                Ok(_) => {
                    removed += 1;
                    debug!(
                        "event=cascade_compensate module=reconcile status=ok slot={} kind={} id={}",
                        compensation.slot, compensation.kind, compensation.id
                    );
                }
                Err(err) => error!(
                    "event=cascade_compensate module=reconcile status=error slot={} kind={} id={} error={}",
                    compensation.slot, compensation.kind, compensation.id, err
                ),
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::{
        plan_slot, preflight, CascadeCoordinator, SlotAction, SlotPlan, SubResourcePayload,
        SubResourceService,
    };
    use crate::error::{ServiceError, ServiceResult};
    use crate::model::EntityId;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    #[derive(Debug, PartialEq, Eq)]
    struct Note(Option<String>);

    impl SubResourcePayload for Note {
        fn is_empty(&self) -> bool {
            self.0.as_deref().map_or(true, |text| text.trim().is_empty())
        }

        /// New notes need at least three characters; edits may be shorter.
        fn validate_for_create(&self) -> ServiceResult<()> {
            match self.0.as_deref() {
                Some(text) if text.trim().chars().count() >= 3 => Ok(()),
                _ => Err(ServiceError::validation("note too short")),
            }
        }
    }

    #[derive(Default)]
    struct MemoryNotes {
        rows: RefCell<BTreeMap<EntityId, String>>,
    }

    impl SubResourceService for MemoryNotes {
        type Resource = String;
        type Payload = Note;

        const KIND: &'static str = "note";

        fn create(&self, payload: &Note) -> ServiceResult<EntityId> {
            let id = Uuid::new_v4();
            self.rows
                .borrow_mut()
                .insert(id, payload.0.clone().unwrap_or_default());
            Ok(id)
        }

        fn get(&self, id: EntityId) -> ServiceResult<String> {
            self.rows
                .borrow()
                .get(&id)
                .cloned()
                .ok_or(ServiceError::NotFound { kind: "note", id })
        }

        fn update(&self, id: EntityId, payload: &Note) -> ServiceResult<EntityId> {
            let mut rows = self.rows.borrow_mut();
            let row = rows
                .get_mut(&id)
                .ok_or(ServiceError::NotFound { kind: "note", id })?;
            *row = payload.0.clone().unwrap_or_default();
            Ok(id)
        }

        fn delete(&self, id: EntityId) -> ServiceResult<bool> {
            self.rows
                .borrow_mut()
                .remove(&id)
                .map(|_| true)
                .ok_or(ServiceError::NotFound { kind: "note", id })
        }
    }

    fn note(text: &str) -> Note {
        Note(Some(text.to_string()))
    }

    #[test]
    fn plan_covers_all_four_branches() {
        let id = Uuid::new_v4();
        let filled = note("x");
        let empty = Note(None);

        assert_eq!(plan_slot(None, Some(&filled)), SlotPlan::Create(&filled));
        assert_eq!(
            plan_slot(Some(id), Some(&filled)),
            SlotPlan::Update(id, &filled)
        );
        assert_eq!(plan_slot::<Note>(Some(id), None), SlotPlan::Delete(id));
        assert_eq!(plan_slot(Some(id), Some(&empty)), SlotPlan::Delete(id));
        assert_eq!(plan_slot::<Note>(None, None), SlotPlan::Noop);
        assert_eq!(plan_slot(None, Some(&empty)), SlotPlan::Noop);
    }

    #[test]
    fn slots_are_reconciled_independently() {
        let notes = MemoryNotes::default();
        let kept = notes.create(&note("old")).unwrap();
        let dropped = notes.create(&note("gone")).unwrap();

        let mut coordinator = CascadeCoordinator::new();
        let created = coordinator
            .upsert("first", &notes, None, Some(&note("new")))
            .unwrap();
        let updated = coordinator
            .upsert("second", &notes, Some(kept), Some(&note("fresh")))
            .unwrap();
        let removed = coordinator
            .upsert("third", &notes, Some(dropped), None)
            .unwrap();

        assert!(created.is_some());
        assert_eq!(updated, Some(kept));
        assert_eq!(removed, None);
        assert_eq!(notes.get(kept).unwrap(), "fresh");
        assert!(notes.get(dropped).is_err());
        assert_eq!(coordinator.reference("first"), created);

        let actions: Vec<SlotAction> = coordinator
            .outcomes()
            .iter()
            .map(|outcome| outcome.action)
            .collect();
        assert_eq!(
            actions,
            vec![SlotAction::Create, SlotAction::Update, SlotAction::Delete]
        );
    }

    #[test]
    fn compensate_removes_only_created_resources() {
        let notes = MemoryNotes::default();
        let existing = notes.create(&note("keep")).unwrap();

        let mut coordinator = CascadeCoordinator::new();
        let created = coordinator
            .upsert("a", &notes, None, Some(&note("temp")))
            .unwrap()
            .unwrap();
        coordinator
            .upsert("b", &notes, Some(existing), Some(&note("edited")))
            .unwrap();

        assert_eq!(coordinator.compensate(), 1);
        assert!(notes.get(created).is_err());
        assert_eq!(notes.get(existing).unwrap(), "edited");
        assert_eq!(coordinator.compensate(), 0);
    }

    #[test]
    fn dangling_reference_is_released_without_error() {
        let notes = MemoryNotes::default();
        let mut coordinator = CascadeCoordinator::new();
        coordinator
            .release("slot", &notes, Some(Uuid::new_v4()))
            .unwrap();
        assert_eq!(coordinator.reference("slot"), None);
    }

    #[test]
    fn preflight_rejects_incomplete_create_without_writing() {
        let notes = MemoryNotes::default();
        let existing = notes.create(&note("keep")).unwrap();

        assert!(matches!(
            preflight(&notes, None, Some(&note("x"))),
            Err(ServiceError::Validation(_))
        ));
        // A short edit of a live note is fine.
        assert!(preflight(&notes, Some(existing), Some(&note("x"))).is_ok());
        // A short edit of a vanished note would become a create.
        assert!(matches!(
            preflight(&notes, Some(Uuid::new_v4()), Some(&note("x"))),
            Err(ServiceError::Validation(_))
        ));
        assert!(preflight(&notes, Some(existing), None).is_ok());
        assert_eq!(notes.rows.borrow().len(), 1);
    }

    #[test]
    fn update_of_dangling_reference_recreates_the_resource() {
        let notes = MemoryNotes::default();
        let missing = Uuid::new_v4();

        let mut coordinator = CascadeCoordinator::new();
        let reference = coordinator
            .upsert("slot", &notes, Some(missing), Some(&note("again")))
            .unwrap()
            .unwrap();

        assert_ne!(reference, missing);
        assert_eq!(notes.get(reference).unwrap(), "again");
        assert_eq!(coordinator.outcomes()[0].action, SlotAction::Create);
        assert_eq!(coordinator.compensate(), 1);
        assert!(notes.get(reference).is_err());
    }
}
