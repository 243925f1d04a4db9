//! # CRS Core
//!
//! Lifecycle and access-control engine for the CRS clinic record system.
//!
//! This crate contains the pure domain logic that governs laboratory tests
//! and prescriptions as they move from creation to a locked, reportable
//! final state:
//! - Role registry: role + status + record kind to capability set
//! - Record state machine: legal transitions, guards, the admin-gated revert
//! - Lifecycle service: authorized operations over a key-by-id store
//! - Audit report builder: deterministic plain-text rendering
//!
//! **No API concerns**: HTTP servers, CLI parsing, and user-facing copy
//! belong in the `crs-run` and `crs-cli` binaries. Confirmation dialogs are
//! the caller's responsibility; the core never prompts.

pub mod actor;
pub mod capability;
pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod record;
pub mod report;
pub mod state;
pub mod store;

pub use actor::{Actor, Role};
pub use capability::{capabilities_for, Capability, CapabilitySet};
pub use config::CoreConfig;
pub use error::{RecordError, RecordResult};
pub use identity::{Identity, IdentityResolver, ReportIdentities, StaticDirectory};
pub use lifecycle::LifecycleService;
pub use record::{
    ClinicalRecord, PayloadView, RecordDraft, RecordKind, RecordStatus, RecordView,
};
pub use report::build_report;
pub use state::{check_transition, TransitionOutcome};
pub use store::{DataStore, FsStore, MemoryStore, StorageError, StoredRecord};
