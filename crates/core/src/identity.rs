//! Identity resolution for report rendering.
//!
//! The engine stores only identifiers; display identities (names, contact
//! details) live with an external collaborator. Resolution failures degrade
//! to placeholder text in the report, never abort it, so the resolver
//! returns `Option` rather than an error.

use std::collections::HashMap;

use crs_types::{ActorId, NonEmptyText, SubjectId};

/// Display identity of a patient or staff member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: NonEmptyText,
    pub contact: Option<NonEmptyText>,
}

impl Identity {
    pub fn new(name: NonEmptyText) -> Self {
        Self {
            name,
            contact: None,
        }
    }

    pub fn with_contact(name: NonEmptyText, contact: NonEmptyText) -> Self {
        Self {
            name,
            contact: Some(contact),
        }
    }
}

/// Resolves identifiers to display identities.
pub trait IdentityResolver {
    fn subject(&self, id: SubjectId) -> Option<Identity>;
    fn actor(&self, id: ActorId) -> Option<Identity>;
}

/// The identities a report needs, pre-resolved so the report builder stays a
/// pure function of its inputs.
#[derive(Debug, Clone, Default)]
pub struct ReportIdentities {
    pub subject: Option<Identity>,
    pub ordering_actor: Option<Identity>,
    pub assigned_actor: Option<Identity>,
}

impl ReportIdentities {
    /// Resolves the identities referenced by a record view.
    pub fn resolve(
        resolver: &dyn IdentityResolver,
        subject_id: SubjectId,
        ordering_actor_id: ActorId,
        assigned_actor_id: Option<ActorId>,
    ) -> Self {
        Self {
            subject: resolver.subject(subject_id),
            ordering_actor: resolver.actor(ordering_actor_id),
            assigned_actor: assigned_actor_id.and_then(|id| resolver.actor(id)),
        }
    }
}

/// In-memory identity directory used by the binaries and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    subjects: HashMap<SubjectId, Identity>,
    actors: HashMap<ActorId, Identity>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_subject(&mut self, id: SubjectId, identity: Identity) {
        self.subjects.insert(id, identity);
    }

    pub fn insert_actor(&mut self, id: ActorId, identity: Identity) {
        self.actors.insert(id, identity);
    }
}

impl IdentityResolver for StaticDirectory {
    fn subject(&self, id: SubjectId) -> Option<Identity> {
        self.subjects.get(&id).cloned()
    }

    fn actor(&self, id: ActorId) -> Option<Identity> {
        self.actors.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_resolves_known_identities() {
        let mut directory = StaticDirectory::new();
        let subject_id = SubjectId::generate();
        let actor_id = ActorId::generate();

        directory.insert_subject(
            subject_id,
            Identity::with_contact(
                NonEmptyText::new("Jane Doe").expect("name should be accepted"),
                NonEmptyText::new("jane@example.com").expect("contact should be accepted"),
            ),
        );
        directory.insert_actor(
            actor_id,
            Identity::new(NonEmptyText::new("Dr Mensah").expect("name should be accepted")),
        );

        let subject = directory.subject(subject_id).expect("subject should resolve");
        assert_eq!(subject.name.as_str(), "Jane Doe");

        let actor = directory.actor(actor_id).expect("actor should resolve");
        assert_eq!(actor.name.as_str(), "Dr Mensah");
        assert!(actor.contact.is_none());
    }

    #[test]
    fn unknown_identities_resolve_to_none() {
        let directory = StaticDirectory::new();
        assert!(directory.subject(SubjectId::generate()).is_none());
        assert!(directory.actor(ActorId::generate()).is_none());
    }

    #[test]
    fn report_identities_degrade_to_none_per_field() {
        let mut directory = StaticDirectory::new();
        let subject_id = SubjectId::generate();
        directory.insert_subject(
            subject_id,
            Identity::new(NonEmptyText::new("Jane Doe").expect("name should be accepted")),
        );

        let identities = ReportIdentities::resolve(
            &directory,
            subject_id,
            ActorId::generate(),
            Some(ActorId::generate()),
        );
        assert!(identities.subject.is_some());
        assert!(identities.ordering_actor.is_none());
        assert!(identities.assigned_actor.is_none());
    }
}
