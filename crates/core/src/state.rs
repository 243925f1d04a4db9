//! The record state machine: legal edges, guards, and the no-op rule.
//!
//! Statuses move forward only (`pending -> in_progress -> completed`, or any
//! non-terminal status to `cancelled`), with a single backward edge:
//! `completed -> pending`, gated on the revert capability. Completion carries
//! the one substantive business guard in the system: a record with a blank
//! payload cannot be completed, regardless of role.

use crate::actor::Role;
use crate::capability::{Capability, CapabilitySet};
use crate::error::{RecordError, RecordResult};
use crate::record::{ClinicalRecord, RecordStatus};

/// Result of validating a requested transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The target equals the current status; succeed without mutating
    /// anything, including `updated_at`.
    Noop,
    /// The transition is legal and permitted; apply it and stamp
    /// `updated_at`.
    Apply,
}

/// Validates a requested status transition for a record.
///
/// Checks run in this order:
///
/// 1. Identical source and target is a [`TransitionOutcome::Noop`].
/// 2. The edge must exist in the lifecycle graph, else
///    [`RecordError::IllegalTransition`] naming the attempted source and
///    target.
/// 3. Completion requires a non-blank payload, else
///    [`RecordError::IncompleteRecord`], for every role, admin included.
/// 4. The actor must hold the guarding capability for the edge: the revert
///    capability for `completed -> pending`, change-status for everything
///    else, else [`RecordError::Forbidden`].
pub fn check_transition(
    record: &ClinicalRecord,
    capabilities: &CapabilitySet,
    actor_role: Role,
    target: RecordStatus,
) -> RecordResult<TransitionOutcome> {
    let from = record.status;

    if target == from {
        return Ok(TransitionOutcome::Noop);
    }

    let guard = match (from, target) {
        (RecordStatus::Pending, RecordStatus::InProgress) => Capability::ChangeStatus,
        (RecordStatus::Pending | RecordStatus::InProgress, RecordStatus::Completed) => {
            if !record.has_payload() {
                return Err(RecordError::IncompleteRecord);
            }
            Capability::ChangeStatus
        }
        (RecordStatus::Completed, RecordStatus::Pending) => Capability::RevertFromCompleted,
        (from, RecordStatus::Cancelled) if !from.is_terminal() => Capability::ChangeStatus,
        (from, to) => return Err(RecordError::IllegalTransition { from, to }),
    };

    let held = match guard {
        Capability::ChangeStatus => capabilities.can_change_status,
        Capability::RevertFromCompleted => capabilities.can_revert_from_completed,
        _ => false,
    };

    if !held {
        return Err(RecordError::Forbidden {
            role: actor_role,
            capability: guard,
            status: from,
        });
    }

    Ok(TransitionOutcome::Apply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Role;
    use crate::capability::capabilities_for;
    use crate::record::{RecordKind, RecordStatus};
    use chrono::Utc;
    use crs_types::{ActorId, RecordId, SubjectId};

    fn record(status: RecordStatus, payload: &str) -> ClinicalRecord {
        let now = Utc::now();
        ClinicalRecord {
            id: RecordId::generate(),
            kind: RecordKind::LaboratoryTest,
            subject_id: SubjectId::generate(),
            ordering_actor_id: ActorId::generate(),
            assigned_actor_id: None,
            status,
            payload: payload.to_owned(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn check(
        role: Role,
        status: RecordStatus,
        payload: &str,
        target: RecordStatus,
    ) -> RecordResult<TransitionOutcome> {
        let record = record(status, payload);
        let caps = capabilities_for(role, record.status, record.kind);
        check_transition(&record, &caps, role, target)
    }

    #[test]
    fn technician_moves_pending_to_in_progress() {
        let outcome = check(
            Role::LaboratoryTechnician,
            RecordStatus::Pending,
            "",
            RecordStatus::InProgress,
        )
        .expect("transition should be permitted");
        assert_eq!(outcome, TransitionOutcome::Apply);
    }

    #[test]
    fn completion_requires_payload_for_every_role() {
        for role in Role::ALL {
            let err = check(role, RecordStatus::Pending, "  ", RecordStatus::Completed)
                .expect_err("empty payload must block completion");
            assert!(
                matches!(err, RecordError::IncompleteRecord),
                "unexpected error for {role}: {err:?}"
            );
        }
    }

    #[test]
    fn completion_with_payload_is_guarded_by_change_status() {
        let outcome = check(
            Role::LaboratoryTechnician,
            RecordStatus::InProgress,
            "WBC 6.2k/uL",
            RecordStatus::Completed,
        )
        .expect("technician should complete a populated record");
        assert_eq!(outcome, TransitionOutcome::Apply);

        let err = check(
            Role::Doctor,
            RecordStatus::InProgress,
            "WBC 6.2k/uL",
            RecordStatus::Completed,
        )
        .expect_err("doctor lacks change-status");
        assert!(matches!(
            err,
            RecordError::Forbidden {
                capability: Capability::ChangeStatus,
                ..
            }
        ));
    }

    #[test]
    fn revert_is_admin_only() {
        let outcome = check(
            Role::Admin,
            RecordStatus::Completed,
            "WBC 6.2k/uL",
            RecordStatus::Pending,
        )
        .expect("admin revert should be permitted");
        assert_eq!(outcome, TransitionOutcome::Apply);

        for role in Role::ALL.into_iter().filter(|r| *r != Role::Admin) {
            let err = check(
                role,
                RecordStatus::Completed,
                "WBC 6.2k/uL",
                RecordStatus::Pending,
            )
            .expect_err("non-admin revert must be rejected");
            assert!(
                matches!(
                    err,
                    RecordError::Forbidden {
                        capability: Capability::RevertFromCompleted,
                        ..
                    }
                ),
                "unexpected error for {role}: {err:?}"
            );
        }
    }

    #[test]
    fn any_non_terminal_status_may_be_cancelled() {
        for status in [RecordStatus::Pending, RecordStatus::InProgress] {
            let outcome = check(
                Role::LaboratoryTechnician,
                status,
                "",
                RecordStatus::Cancelled,
            )
            .expect("cancellation should be permitted");
            assert_eq!(outcome, TransitionOutcome::Apply);
        }
    }

    #[test]
    fn cancelled_records_admit_no_transition() {
        for target in [
            RecordStatus::Pending,
            RecordStatus::InProgress,
            RecordStatus::Completed,
        ] {
            let err = check(Role::Admin, RecordStatus::Cancelled, "done", target)
                .expect_err("cancelled is terminal");
            assert!(matches!(
                err,
                RecordError::IllegalTransition {
                    from: RecordStatus::Cancelled,
                    ..
                }
            ));
        }
    }

    #[test]
    fn unlisted_edges_are_illegal() {
        let err = check(
            Role::Admin,
            RecordStatus::InProgress,
            "x",
            RecordStatus::Pending,
        )
        .expect_err("in_progress cannot move backwards");
        assert!(matches!(
            err,
            RecordError::IllegalTransition {
                from: RecordStatus::InProgress,
                to: RecordStatus::Pending,
            }
        ));

        let err = check(
            Role::Admin,
            RecordStatus::Completed,
            "x",
            RecordStatus::InProgress,
        )
        .expect_err("completed only reverts to pending");
        assert!(matches!(err, RecordError::IllegalTransition { .. }));
    }

    #[test]
    fn identical_source_and_target_is_a_noop_for_any_role() {
        for role in Role::ALL {
            for status in RecordStatus::ALL {
                let outcome = check(role, status, "x", status)
                    .expect("same-status request must succeed as a no-op");
                assert_eq!(outcome, TransitionOutcome::Noop);
            }
        }
    }
}
