//! Persistence for clinical records.
//!
//! The engine treats its store as an opaque key-by-id collaborator: read,
//! conditional-free write, no locking primitive. Concurrent writers to the
//! same record are last-write-wins at this layer; the lifecycle tests pin
//! that weakness explicitly rather than assuming it safe.
//!
//! The core owns the mapping between the stored wire form
//! ([`StoredRecord`]) and the domain type ([`ClinicalRecord`]).

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};

use crate::record::{ClinicalRecord, RecordKind, RecordStatus};
use crs_types::{ActorId, RecordId, SubjectId};

/// Errors raised by the persistence layer.
///
/// Distinguished from the lifecycle taxonomy so callers can apply a retry
/// policy: a read may be retried idempotently, a failed write must not be
/// blindly retried without confirming it did not partially apply.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read record file: {0}")]
    Read(std::io::Error),
    #[error("failed to write record file: {0}")]
    Write(std::io::Error),
    #[error("failed to create record directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialization(serde_json::Error),
    #[error("stored record {id} is corrupt: {reason}")]
    Corrupt { id: RecordId, reason: String },
}

/// Key-by-id record store.
///
/// Implementations must be safe to share across threads; the lifecycle
/// service holds the store behind an `Arc`.
pub trait DataStore: Send + Sync {
    /// Fetches the stored form of a record, or `None` if the id is unknown.
    fn get(&self, id: RecordId) -> Result<Option<StoredRecord>, StorageError>;

    /// Writes the stored form of a record, replacing any previous version.
    fn put(&self, record: &StoredRecord) -> Result<(), StorageError>;

    /// Lists every stored record, in no particular order.
    fn list(&self) -> Result<Vec<StoredRecord>, StorageError>;
}

/// Wire form of a clinical record as held by the store.
///
/// Status and kind travel as their wire names so stored files remain
/// readable and diffable; parsing back into the domain enums is where
/// corruption is detected.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub kind: String,
    pub subject_id: SubjectId,
    pub ordering_actor_id: ActorId,
    #[serde(default)]
    pub assigned_actor_id: Option<ActorId>,
    pub status: String,
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Converts a domain record into its stored form.
    pub fn from_domain(record: &ClinicalRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind.as_str().to_owned(),
            subject_id: record.subject_id,
            ordering_actor_id: record.ordering_actor_id,
            assigned_actor_id: record.assigned_actor_id,
            status: record.status.as_str().to_owned(),
            payload: record.payload.clone(),
            notes: record.notes.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Parses the stored form back into a domain record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupt`] if the stored status or kind is not
    /// a recognised wire name.
    pub fn into_domain(self) -> Result<ClinicalRecord, StorageError> {
        let kind: RecordKind = self.kind.parse().map_err(|reason| StorageError::Corrupt {
            id: self.id,
            reason,
        })?;
        let status: RecordStatus =
            self.status
                .parse()
                .map_err(|reason| StorageError::Corrupt {
                    id: self.id,
                    reason,
                })?;

        Ok(ClinicalRecord {
            id: self.id,
            kind,
            subject_id: self.subject_id,
            ordering_actor_id: self.ordering_actor_id,
            assigned_actor_id: self.assigned_actor_id,
            status,
            payload: self.payload,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
