//! Constants used throughout the CRS core crate.

/// Directory name for clinical record storage under the data directory.
pub const RECORDS_DIR_NAME: &str = "records";

/// Filename for the per-record JSON file.
pub const RECORD_JSON_FILENAME: &str = "record.json";

/// Default data directory when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "record_data";

/// Marker rendered in place of a payload the viewer may not read.
pub const RESTRICTED_PAYLOAD_MARKER: &str = "[access restricted]";

/// Placeholder for absent identity fields in reports.
pub const REPORT_FIELD_PLACEHOLDER: &str = "-";

/// Placeholder for the notes section of a report with no notes.
pub const REPORT_NO_NOTES: &str = "No notes provided";

/// Placeholder for the results section of a report with no payload.
pub const REPORT_NO_RESULTS: &str = "No results available";
