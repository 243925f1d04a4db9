use crate::actor::Role;
use crate::capability::Capability;
use crate::record::RecordStatus;
use crate::store::StorageError;
use crs_types::RecordId;

/// Errors surfaced by the record lifecycle engine.
///
/// Every variant is user-facing and non-retryable without changing the input
/// (role, target status, or payload), with the exception of [`Storage`] on a
/// read, which callers may retry. Messages name the capability or guard that
/// failed so staff can understand why an operation was rejected.
///
/// [`Storage`]: RecordError::Storage
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("no clinical record exists with id {0}")]
    NotFound(RecordId),

    #[error("unknown role {0:?}: not part of the closed role set")]
    UnknownRole(String),

    #[error("role {role} does not hold the {capability} capability while the record is {status}")]
    Forbidden {
        role: Role,
        capability: Capability,
        status: RecordStatus,
    },

    #[error("no transition from {from} to {to} exists in the record lifecycle")]
    IllegalTransition {
        from: RecordStatus,
        to: RecordStatus,
    },

    #[error("a record cannot be completed while its result payload is empty")]
    IncompleteRecord,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;
