//! The audit report builder.
//!
//! Renders a record view plus its related identities into a fixed-section
//! plain-text report for print, download, and clipboard use. The section
//! order and placeholder text are a contract with downstream tooling: every
//! field renders an explicit placeholder when absent, never a blank line,
//! so the structure stays stable and parseable.
//!
//! The builder is a pure function of its inputs: identical record,
//! identities, generating actor, and timestamp produce byte-identical
//! output. It enforces no permissions; it renders whatever view the
//! lifecycle service already redacted.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::actor::Actor;
use crate::constants::{
    REPORT_FIELD_PLACEHOLDER, REPORT_NO_NOTES, REPORT_NO_RESULTS, RESTRICTED_PAYLOAD_MARKER,
};
use crate::identity::{Identity, ReportIdentities};
use crate::record::{PayloadView, RecordView};

/// Builds the plain-text audit report for a record.
///
/// Sections, in fixed order: header (record type, id, status), patient
/// identity, assignment/order, notes, results, footer (generation timestamp
/// and generating actor).
pub fn build_report(
    view: &RecordView,
    identities: &ReportIdentities,
    generated_by: &Actor,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    out.push_str("CLINICAL RECORD REPORT\n");
    out.push_str("======================\n");
    push_field(&mut out, "Record type", Some(view.kind.label()));
    push_field(&mut out, "Record id", Some(&view.id.to_string()));
    push_field(&mut out, "Status", Some(view.status.as_str()));
    out.push('\n');

    out.push_str("Patient\n");
    out.push_str("-------\n");
    push_field(&mut out, "Patient id", Some(&view.subject_id.to_string()));
    push_identity(&mut out, identities.subject.as_ref());
    out.push('\n');

    out.push_str("Assignment\n");
    out.push_str("----------\n");
    // Unresolvable actors degrade to their raw id, never abort the report.
    let ordered_by = match &identities.ordering_actor {
        Some(identity) => identity.name.as_str().to_owned(),
        None => view.ordering_actor_id.to_string(),
    };
    push_field(&mut out, "Ordered by", Some(&ordered_by));
    let assigned_to = match (&view.assigned_actor_id, &identities.assigned_actor) {
        (Some(_), Some(identity)) => Some(identity.name.as_str().to_owned()),
        (Some(id), None) => Some(id.to_string()),
        (None, _) => None,
    };
    push_field(&mut out, "Assigned to", assigned_to.as_deref());
    out.push('\n');

    out.push_str("Notes\n");
    out.push_str("-----\n");
    match view.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(notes) => out.push_str(notes),
        None => out.push_str(REPORT_NO_NOTES),
    }
    out.push('\n');
    out.push('\n');

    out.push_str("Results\n");
    out.push_str("-------\n");
    match &view.payload {
        PayloadView::Visible(payload) => out.push_str(payload),
        PayloadView::Restricted => out.push_str(RESTRICTED_PAYLOAD_MARKER),
        PayloadView::Absent => out.push_str(REPORT_NO_RESULTS),
    }
    out.push('\n');
    out.push('\n');

    out.push_str("----\n");
    push_field(
        &mut out,
        "Generated at",
        Some(&generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
    );
    push_field(
        &mut out,
        "Generated by",
        Some(&format!("{} ({})", generated_by.name, generated_by.role)),
    );

    out
}

fn push_field(out: &mut String, label: &str, value: Option<&str>) {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(REPORT_FIELD_PLACEHOLDER);
    out.push_str(label);
    out.push_str(": ");
    out.push_str(value);
    out.push('\n');
}

fn push_identity(out: &mut String, identity: Option<&Identity>) {
    push_field(out, "Name", identity.map(|i| i.name.as_str()));
    push_field(
        out,
        "Contact",
        identity.and_then(|i| i.contact.as_ref()).map(|c| c.as_str()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Role;
    use crate::record::{RecordKind, RecordStatus};
    use chrono::TimeZone;
    use crs_types::{ActorId, NonEmptyText, RecordId, SubjectId};
    use std::str::FromStr;

    fn fixed_view(payload: PayloadView, notes: Option<String>) -> RecordView {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        RecordView {
            id: RecordId::from_str("11111111-2222-3333-4444-555555555555")
                .expect("fixed id should parse"),
            kind: RecordKind::LaboratoryTest,
            subject_id: SubjectId::from_str("aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee")
                .expect("fixed id should parse"),
            ordering_actor_id: ActorId::from_str("99999999-8888-7777-6666-555555555555")
                .expect("fixed id should parse"),
            assigned_actor_id: None,
            status: RecordStatus::Pending,
            payload,
            notes,
            created_at: created,
            updated_at: created,
        }
    }

    fn generating_actor() -> Actor {
        Actor::new(
            ActorId::from_str("00000000-0000-0000-0000-000000000001")
                .expect("fixed id should parse"),
            NonEmptyText::new("Alex Admin").expect("name should be accepted"),
            Role::Admin,
        )
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 14, 0, 0).unwrap()
    }

    #[test]
    fn identical_inputs_produce_byte_identical_reports() {
        let view = fixed_view(PayloadView::Visible("WBC 6.2k/uL".into()), None);
        let identities = ReportIdentities::default();
        let actor = generating_actor();
        let at = generated_at();

        let first = build_report(&view, &identities, &actor, at);
        let second = build_report(&view, &identities, &actor, at);
        assert_eq!(first, second);
    }

    #[test]
    fn absent_notes_render_the_placeholder_line() {
        let view = fixed_view(PayloadView::Absent, None);
        let report = build_report(
            &view,
            &ReportIdentities::default(),
            &generating_actor(),
            generated_at(),
        );
        assert!(
            report.contains("Notes\n-----\nNo notes provided\n"),
            "report should carry the notes placeholder:\n{report}"
        );
    }

    #[test]
    fn absent_payload_renders_the_placeholder_line() {
        let view = fixed_view(PayloadView::Absent, None);
        let report = build_report(
            &view,
            &ReportIdentities::default(),
            &generating_actor(),
            generated_at(),
        );
        assert!(report.contains("Results\n-------\nNo results available\n"));
    }

    #[test]
    fn restricted_payload_renders_the_marker() {
        let view = fixed_view(PayloadView::Restricted, None);
        let report = build_report(
            &view,
            &ReportIdentities::default(),
            &generating_actor(),
            generated_at(),
        );
        assert!(report.contains("Results\n-------\n[access restricted]\n"));
    }

    #[test]
    fn unresolved_identities_degrade_to_placeholders_and_ids() {
        let view = fixed_view(PayloadView::Absent, None);
        let report = build_report(
            &view,
            &ReportIdentities::default(),
            &generating_actor(),
            generated_at(),
        );
        assert!(report.contains("Name: -\n"));
        assert!(report.contains("Contact: -\n"));
        assert!(report.contains("Ordered by: 99999999-8888-7777-6666-555555555555\n"));
        assert!(report.contains("Assigned to: -\n"));
    }

    #[test]
    fn populated_report_matches_the_fixed_section_contract() {
        let mut view = fixed_view(
            PayloadView::Visible("WBC 6.2k/uL".into()),
            Some("fasting sample".into()),
        );
        view.assigned_actor_id = Some(
            ActorId::from_str("00000000-0000-0000-0000-000000000002")
                .expect("fixed id should parse"),
        );

        let identities = ReportIdentities {
            subject: Some(Identity::with_contact(
                NonEmptyText::new("Jane Doe").expect("name should be accepted"),
                NonEmptyText::new("jane@example.com").expect("contact should be accepted"),
            )),
            ordering_actor: Some(Identity::new(
                NonEmptyText::new("Dr Mensah").expect("name should be accepted"),
            )),
            assigned_actor: Some(Identity::new(
                NonEmptyText::new("Tess Technician").expect("name should be accepted"),
            )),
        };

        let report = build_report(&view, &identities, &generating_actor(), generated_at());
        let expected = "\
CLINICAL RECORD REPORT
======================
Record type: Laboratory test
Record id: 11111111-2222-3333-4444-555555555555
Status: pending

Patient
-------
Patient id: aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee
Name: Jane Doe
Contact: jane@example.com

Assignment
----------
Ordered by: Dr Mensah
Assigned to: Tess Technician

Notes
-----
fasting sample

Results
-------
WBC 6.2k/uL

----
Generated at: 2024-03-02T14:00:00Z
Generated by: Alex Admin (admin)
";
        assert_eq!(report, expected);
    }
}
