//! Actors and the closed role set.
//!
//! Every lifecycle operation receives an explicit [`Actor`]; the engine never
//! reaches into ambient session state to discover who is calling. A role is
//! immutable for the lifetime of a session token, so capability decisions are
//! recomputed from the actor on every call rather than cached.

use std::fmt;
use std::str::FromStr;

use crate::error::RecordError;
use crs_types::{ActorId, NonEmptyText};

/// The closed set of staff roles recognised by the engine.
///
/// Role names arriving from outside the core (session tokens, CLI input, API
/// requests) are validated through [`FromStr`]; a name outside this set is
/// [`RecordError::UnknownRole`], treated as a configuration error and fatal
/// to the request rather than a silent deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    LaboratoryTechnician,
    Pharmacist,
    Receptionist,
    Nurse,
}

impl Role {
    /// All roles in the closed set, in a stable order.
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Doctor,
        Role::LaboratoryTechnician,
        Role::Pharmacist,
        Role::Receptionist,
        Role::Nurse,
    ];

    /// The wire/storage name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::LaboratoryTechnician => "laboratory_technician",
            Role::Pharmacist => "pharmacist",
            Role::Receptionist => "receptionist",
            Role::Nurse => "nurse",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RecordError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "laboratory_technician" => Ok(Role::LaboratoryTechnician),
            "pharmacist" => Ok(Role::Pharmacist),
            "receptionist" => Ok(Role::Receptionist),
            "nurse" => Ok(Role::Nurse),
            other => Err(RecordError::UnknownRole(other.to_owned())),
        }
    }
}

/// An authenticated user acting under exactly one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Stable identifier of the staff member.
    pub id: ActorId,

    /// Display name, rendered in audit report footers.
    pub name: NonEmptyText,

    /// The single role the actor holds for this session.
    pub role: Role,
}

impl Actor {
    pub fn new(id: ActorId, name: NonEmptyText, role: Role) -> Self {
        Self { id, name, role }
    }
}
