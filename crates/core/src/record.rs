//! Clinical record data model.
//!
//! A [`ClinicalRecord`] generalises the two record types the clinic tracks
//! through the same lifecycle: laboratory tests and prescription
//! dispensations. The differences between the two are expressed as
//! [`RecordKind`] configuration, not as separate state machines.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::actor::Role;
use crate::capability::CapabilitySet;
use crs_types::{ActorId, RecordId, SubjectId};

/// Lifecycle status of a clinical record.
///
/// `Pending` is the initial status. `Completed` and `Cancelled` are terminal:
/// no forward transition leaves `Cancelled`, and the only edge out of
/// `Completed` is the admin-gated revert back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl RecordStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [RecordStatus; 4] = [
        RecordStatus::Pending,
        RecordStatus::InProgress,
        RecordStatus::Completed,
        RecordStatus::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordStatus::Completed | RecordStatus::Cancelled)
    }

    /// The wire/storage name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::InProgress => "in_progress",
            RecordStatus::Completed => "completed",
            RecordStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "pending" => Ok(RecordStatus::Pending),
            "in_progress" => Ok(RecordStatus::InProgress),
            "completed" => Ok(RecordStatus::Completed),
            "cancelled" => Ok(RecordStatus::Cancelled),
            other => Err(format!("unknown record status {other:?}")),
        }
    }
}

/// The record type a lifecycle applies to.
///
/// The two kinds share the full status graph; they differ only in which
/// non-admin role fulfils the order (see [`RecordKind::fulfilling_role`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    LaboratoryTest,
    Prescription,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::LaboratoryTest, RecordKind::Prescription];

    /// The role responsible for fulfilling records of this kind.
    pub fn fulfilling_role(&self) -> Role {
        match self {
            RecordKind::LaboratoryTest => Role::LaboratoryTechnician,
            RecordKind::Prescription => Role::Pharmacist,
        }
    }

    /// The role that places orders of this kind.
    pub fn ordering_role(&self) -> Role {
        Role::Doctor
    }

    /// The wire/storage name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::LaboratoryTest => "laboratory_test",
            RecordKind::Prescription => "prescription",
        }
    }

    /// Human-readable label used in report headers.
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::LaboratoryTest => "Laboratory test",
            RecordKind::Prescription => "Prescription",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "laboratory_test" => Ok(RecordKind::LaboratoryTest),
            "prescription" => Ok(RecordKind::Prescription),
            other => Err(format!("unknown record kind {other:?}")),
        }
    }
}

/// A clinical record tracked through the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ClinicalRecord {
    /// Opaque stable identifier, assigned at creation, never reused.
    pub id: RecordId,

    /// Which record type this lifecycle instance governs.
    pub kind: RecordKind,

    /// The patient the record concerns.
    pub subject_id: SubjectId,

    /// The actor who created the order. Immutable after creation.
    pub ordering_actor_id: ActorId,

    /// The actor responsible for fulfilling the record, if assigned.
    /// Mutable only while the record is not in a terminal status.
    pub assigned_actor_id: Option<ActorId>,

    pub status: RecordStatus,

    /// Free-text result content. Mutability is gated by status and role;
    /// completion requires this to be non-blank.
    pub payload: String,

    /// Free-text clinician notes.
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Rewritten on every accepted mutation; never backdated.
    pub updated_at: DateTime<Utc>,
}

impl ClinicalRecord {
    /// Whether the payload carries any non-whitespace content.
    pub fn has_payload(&self) -> bool {
        !self.payload.trim().is_empty()
    }

    /// Produces the capability-scoped view of this record.
    ///
    /// The payload is never silently omitted: a viewer without the
    /// view-payload capability receives [`PayloadView::Restricted`], so the
    /// caller can distinguish "no results yet" from "no permission".
    pub fn view_for(&self, capabilities: &CapabilitySet) -> RecordView {
        let payload = if !capabilities.can_view_payload {
            PayloadView::Restricted
        } else if self.has_payload() {
            PayloadView::Visible(self.payload.clone())
        } else {
            PayloadView::Absent
        };

        RecordView {
            id: self.id,
            kind: self.kind,
            subject_id: self.subject_id,
            ordering_actor_id: self.ordering_actor_id,
            assigned_actor_id: self.assigned_actor_id,
            status: self.status,
            payload,
            notes: self.notes.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for creating a new record. The record itself is allocated by the
/// lifecycle service, which stamps id, status, and timestamps.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    pub kind: RecordKind,
    pub subject_id: SubjectId,
    pub assigned_actor_id: Option<ActorId>,
    pub payload: String,
    pub notes: Option<String>,
}

impl RecordDraft {
    pub fn new(kind: RecordKind, subject_id: SubjectId) -> Self {
        Self {
            kind,
            subject_id,
            assigned_actor_id: None,
            payload: String::new(),
            notes: None,
        }
    }
}

/// Structural payload visibility on a read (the tri-state of a redacted
/// field), rather than a UI-only disabled flag.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadView {
    /// The viewer may read the payload and it has content.
    Visible(String),
    /// The viewer lacks the view-payload capability.
    Restricted,
    /// The viewer may read the payload but no results exist yet.
    Absent,
}

/// A capability-scoped, read-only projection of a [`ClinicalRecord`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RecordView {
    pub id: RecordId,
    pub kind: RecordKind,
    pub subject_id: SubjectId,
    pub ordering_actor_id: ActorId,
    pub assigned_actor_id: Option<ActorId>,
    pub status: RecordStatus,
    pub payload: PayloadView,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::capabilities_for;

    fn record_with_payload(payload: &str) -> ClinicalRecord {
        let now = Utc::now();
        ClinicalRecord {
            id: RecordId::generate(),
            kind: RecordKind::LaboratoryTest,
            subject_id: SubjectId::generate(),
            ordering_actor_id: ActorId::generate(),
            assigned_actor_id: None,
            status: RecordStatus::Pending,
            payload: payload.to_owned(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn statuses_round_trip_through_wire_names() {
        for status in RecordStatus::ALL {
            let parsed: RecordStatus = status.as_str().parse().expect("wire name should parse");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn only_completed_and_cancelled_are_terminal() {
        assert!(!RecordStatus::Pending.is_terminal());
        assert!(!RecordStatus::InProgress.is_terminal());
        assert!(RecordStatus::Completed.is_terminal());
        assert!(RecordStatus::Cancelled.is_terminal());
    }

    #[test]
    fn kinds_name_their_fulfilling_role() {
        assert_eq!(
            RecordKind::LaboratoryTest.fulfilling_role(),
            Role::LaboratoryTechnician
        );
        assert_eq!(RecordKind::Prescription.fulfilling_role(), Role::Pharmacist);
    }

    #[test]
    fn whitespace_only_payload_counts_as_empty() {
        assert!(!record_with_payload("  \n ").has_payload());
        assert!(record_with_payload("WBC 6.2k/uL").has_payload());
    }

    #[test]
    fn view_shows_payload_to_permitted_viewer() {
        let record = record_with_payload("WBC 6.2k/uL");
        let caps = capabilities_for(Role::LaboratoryTechnician, record.status, record.kind);
        let view = record.view_for(&caps);
        assert_eq!(view.payload, PayloadView::Visible("WBC 6.2k/uL".into()));
    }

    #[test]
    fn view_reports_absent_payload_distinctly() {
        let record = record_with_payload("");
        let caps = capabilities_for(Role::Doctor, record.status, record.kind);
        let view = record.view_for(&caps);
        assert_eq!(view.payload, PayloadView::Absent);
    }

    #[test]
    fn view_restricts_payload_for_viewer_without_capability() {
        let record = record_with_payload("WBC 6.2k/uL");
        let caps = capabilities_for(Role::Receptionist, record.status, record.kind);
        let view = record.view_for(&caps);
        assert_eq!(view.payload, PayloadView::Restricted);
    }
}
