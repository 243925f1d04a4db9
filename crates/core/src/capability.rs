//! The role registry: role + status + record kind to capability set.
//!
//! Laboratory tests and prescriptions share one capability matrix; the
//! record-type difference is a single parameter
//! ([`RecordKind::fulfilling_role`]), so the matrix exists exactly once.

use std::fmt;

use crate::actor::Role;
use crate::record::{RecordKind, RecordStatus};

/// The four capabilities an actor can hold over a record, given its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CapabilitySet {
    pub can_view_payload: bool,
    pub can_edit_payload: bool,
    pub can_change_status: bool,
    pub can_revert_from_completed: bool,
}

impl CapabilitySet {
    const fn new(view: bool, edit: bool, change_status: bool, revert: bool) -> Self {
        Self {
            can_view_payload: view,
            can_edit_payload: edit,
            can_change_status: change_status,
            can_revert_from_completed: revert,
        }
    }

    const fn view_only() -> Self {
        Self::new(true, false, false, false)
    }

    const fn none() -> Self {
        Self::new(false, false, false, false)
    }
}

/// Names a single capability for error reporting.
///
/// `CreateRecord` is not part of [`CapabilitySet`] (creation has no current
/// status to key on); it exists so a rejected creation can name what was
/// missing instead of failing generically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewPayload,
    EditPayload,
    ChangeStatus,
    RevertFromCompleted,
    CreateRecord,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::ViewPayload => "view-payload",
            Capability::EditPayload => "edit-payload",
            Capability::ChangeStatus => "change-status",
            Capability::RevertFromCompleted => "revert-from-completed",
            Capability::CreateRecord => "create-record",
        };
        f.write_str(name)
    }
}

/// Resolves the capability set for a role over a record of the given kind and
/// current status.
///
/// Pure and total over the closed role/status domain: every combination
/// resolves to a set. Unknown role *names* never reach this function; they
/// are rejected when parsed into [`Role`].
///
/// The matrix, for a given kind:
///
/// | role                  | status != completed            | status == completed |
/// |-----------------------|--------------------------------|---------------------|
/// | admin                 | edit + change-status           | edit + change-status + revert |
/// | fulfilling role       | edit + change-status           | view only           |
/// | doctor (ordering)     | view only                      | view only           |
/// | nurse, other clinical | view only                      | view only           |
/// | receptionist          | record only, payload restricted| record only, payload restricted |
pub fn capabilities_for(role: Role, status: RecordStatus, kind: RecordKind) -> CapabilitySet {
    let completed = status == RecordStatus::Completed;

    match role {
        Role::Admin => CapabilitySet::new(true, true, true, completed),
        role if role == kind.fulfilling_role() => {
            if completed {
                CapabilitySet::view_only()
            } else {
                CapabilitySet::new(true, true, true, false)
            }
        }
        Role::Receptionist => CapabilitySet::none(),
        // Doctor, nurse, and the clinical role not fulfilling this kind.
        _ => CapabilitySet::view_only(),
    }
}
