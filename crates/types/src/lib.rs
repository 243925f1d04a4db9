//! Validated primitive types shared across the CRS workspace.
//!
//! Identifiers are typed wrappers around UUIDs so that a record id can never
//! be handed to an API expecting an actor id, and display text is wrapped in
//! [`NonEmptyText`] so blank names cannot reach storage or reports.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,
}

/// Errors that can occur when parsing typed identifiers.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("invalid identifier {input:?}: {source}")]
    Invalid {
        input: String,
        #[source]
        source: uuid::Error,
    },
}

/// A string type that guarantees non-empty content.
///
/// Wraps a `String` and ensures it contains at least one non-whitespace
/// character. The input is trimmed of leading and trailing whitespace during
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the
    /// trimmed result is empty, [`TextError::Empty`] is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<NonEmptyText> for String {
    fn from(text: NonEmptyText) -> Self {
        text.0
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

macro_rules! typed_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn uuid(&self) -> Uuid {
                self.0
            }

            /// Returns the hyphen-free lowercase form used for storage paths.
            pub fn storage_key(&self) -> String {
                self.0.simple().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(input: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(input.trim())
                    .map(Self)
                    .map_err(|source| IdError::Invalid {
                        input: input.to_owned(),
                        source,
                    })
            }
        }
    };
}

typed_id! {
    /// Identifier of a clinical record (lab test or prescription).
    RecordId
}

typed_id! {
    /// Identifier of an authenticated actor (staff member).
    ActorId
}

typed_id! {
    /// Identifier of the patient a record concerns.
    SubjectId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Jane Doe  ").expect("text should be accepted");
        assert_eq!(text.as_str(), "Jane Doe");
    }

    #[test]
    fn non_empty_text_rejects_blank_input() {
        let err = NonEmptyText::new(" \t\n").expect_err("blank text should be rejected");
        assert!(matches!(err, TextError::Empty));
    }

    #[test]
    fn non_empty_text_round_trips_through_serde() {
        let text = NonEmptyText::new("Ward 3").expect("text should be accepted");
        let json = serde_json::to_string(&text).expect("serialize should succeed");
        assert_eq!(json, "\"Ward 3\"");

        let back: NonEmptyText = serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(back, text);
    }

    #[test]
    fn non_empty_text_deserialize_rejects_blank() {
        let result = serde_json::from_str::<NonEmptyText>("\"   \"");
        assert!(result.is_err(), "blank text should fail to deserialize");
    }

    #[test]
    fn record_id_parses_hyphenated_form() {
        let id: RecordId = "550e8400-e29b-41d4-a716-446655440000"
            .parse()
            .expect("canonical uuid should parse");
        assert_eq!(id.storage_key(), "550e8400e29b41d4a716446655440000");
    }

    #[test]
    fn record_id_rejects_garbage() {
        let err = "not-a-uuid".parse::<RecordId>().expect_err("should reject");
        assert!(matches!(err, IdError::Invalid { .. }));
    }

    #[test]
    fn typed_ids_serialize_as_plain_strings() {
        let id = ActorId::generate();
        let json = serde_json::to_string(&id).expect("serialize should succeed");
        assert_eq!(json, format!("\"{id}\""));

        let back: ActorId = serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(back, id);
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }
}
