/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Error types for schema resolution and value conversion.

use std::fmt;

use crate::resolve::KeyRole;

/// Error raised while resolving the schema of a record type.
///
/// Schema errors are configuration errors: they depend only on the record
/// type, never on a particular value, so they are cached alongside successful
/// resolutions and returned again on every later use of the type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    record: &'static str,
    field: Option<&'static str>,
    kind: SchemaErrorKind,
}

/// The kind of schema error that occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaErrorKind {
    /// No field of the record resolves to a partition key.
    MissingPartitionKey,
    /// A field's wire name is one of the key role markers.
    KeyRoleNameCollision {
        /// The offending wire name.
        name: String,
    },
    /// Two fields encode under the same wire name.
    DuplicateWireName {
        /// The duplicated wire name.
        name: String,
    },
    /// More than one field claims the same key role.
    DuplicateKeyRole {
        /// The role claimed twice.
        role: KeyRole,
    },
    /// A single field claims both key roles.
    ConflictingKeyRoles,
    /// The field's type has no wire representation.
    UnsupportedKind {
        /// Description of the unsupported shape.
        shape: String,
    },
    /// The field carries a key role but its type cannot be a key.
    UnsupportedKeyKind {
        /// Description of the field's shape.
        shape: String,
    },
    /// Resolving a key path re-entered a record type already being searched.
    CyclicKeyPath,
}

impl SchemaError {
    pub(crate) fn new(record: &'static str, kind: SchemaErrorKind) -> Self {
        Self {
            record,
            field: None,
            kind,
        }
    }

    pub(crate) fn for_field(
        record: &'static str,
        field: &'static str,
        kind: SchemaErrorKind,
    ) -> Self {
        Self {
            record,
            field: Some(field),
            kind,
        }
    }

    /// Creates an error for a record without a partition key.
    pub fn missing_partition_key(record: &'static str) -> Self {
        Self::new(record, SchemaErrorKind::MissingPartitionKey)
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &SchemaErrorKind {
        &self.kind
    }

    /// Returns the name of the record type the error was raised for.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Returns the declared name of the offending field, if the error is field-specific.
    pub fn field(&self) -> Option<&'static str> {
        self.field
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "record '{}' field '{}': ", self.record, field)?,
            None => write!(f, "record '{}': ", self.record)?,
        }
        match &self.kind {
            SchemaErrorKind::MissingPartitionKey => write!(f, "no partition key field"),
            SchemaErrorKind::KeyRoleNameCollision { name } => {
                write!(f, "wire name '{}' collides with a key role marker", name)
            }
            SchemaErrorKind::DuplicateWireName { name } => {
                write!(f, "wire name '{}' is used by more than one field", name)
            }
            SchemaErrorKind::DuplicateKeyRole { role } => {
                write!(f, "more than one field is marked {}", role.marker())
            }
            SchemaErrorKind::ConflictingKeyRoles => {
                write!(f, "a field cannot be both partition and sort key")
            }
            SchemaErrorKind::UnsupportedKind { shape } => {
                write!(f, "unsupported kind: {}", shape)
            }
            SchemaErrorKind::UnsupportedKeyKind { shape } => {
                write!(f, "key field has unsupported kind: {}", shape)
            }
            SchemaErrorKind::CyclicKeyPath => write!(f, "key path refers back to itself"),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Error that occurs while converting between records, key values and DynamoDB AttributeValues.
#[derive(Debug)]
pub struct ConversionError {
    kind: ConversionErrorKind,
    field: Option<String>,
}

/// The kind of conversion error that occurred.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConversionErrorKind {
    /// A required attribute was not present.
    MissingAttribute,
    /// The attribute value had an unexpected type.
    InvalidType {
        /// The expected DynamoDB type.
        expected: &'static str,
        /// The actual DynamoDB type found.
        actual: &'static str,
    },
    /// The attribute value could not be parsed or was invalid.
    InvalidValue {
        /// Description of why the value was invalid.
        message: String,
    },
    /// A key value did not match the type of its key field.
    KeyValueTypeMismatch {
        /// The kind of value the key field holds.
        expected: &'static str,
        /// The kind of value that was supplied.
        found: &'static str,
    },
    /// The wrong number of key values was supplied.
    KeyArity {
        /// The number of key fields the record declares.
        expected: usize,
        /// The number of values that were supplied.
        found: usize,
    },
    /// The decode target is not a registered record type.
    InvalidTarget,
}

impl ConversionError {
    /// Creates an error for a missing attribute.
    pub fn missing_attribute(field: impl Into<String>) -> Self {
        Self {
            kind: ConversionErrorKind::MissingAttribute,
            field: Some(field.into()),
        }
    }

    /// Creates an error for an invalid type.
    pub fn invalid_type(
        field: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self {
            kind: ConversionErrorKind::InvalidType { expected, actual },
            field: Some(field.into()),
        }
    }

    /// Creates an error for an invalid value.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ConversionErrorKind::InvalidValue {
                message: message.into(),
            },
            field: Some(field.into()),
        }
    }

    /// Creates an error for a key value of the wrong kind.
    pub fn key_value_type_mismatch(
        field: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self {
            kind: ConversionErrorKind::KeyValueTypeMismatch { expected, found },
            field: Some(field.into()),
        }
    }

    /// Creates an error for a key built from the wrong number of values.
    pub fn key_arity(expected: usize, found: usize) -> Self {
        Self {
            kind: ConversionErrorKind::KeyArity { expected, found },
            field: None,
        }
    }

    /// Creates an error for a decode target that is not a registered record.
    pub fn invalid_target() -> Self {
        Self {
            kind: ConversionErrorKind::InvalidTarget,
            field: None,
        }
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> &ConversionErrorKind {
        &self.kind
    }

    /// Returns the field name if available.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.field) {
            (ConversionErrorKind::MissingAttribute, Some(field)) => {
                write!(f, "missing required attribute '{}'", field)
            }
            (ConversionErrorKind::MissingAttribute, None) => {
                write!(f, "missing required attribute")
            }
            (ConversionErrorKind::InvalidType { expected, actual }, Some(field)) => {
                write!(
                    f,
                    "invalid type for '{}': expected {}, got {}",
                    field, expected, actual
                )
            }
            (ConversionErrorKind::InvalidType { expected, actual }, None) => {
                write!(f, "invalid type: expected {}, got {}", expected, actual)
            }
            (ConversionErrorKind::InvalidValue { message }, Some(field)) => {
                write!(f, "invalid value for '{}': {}", field, message)
            }
            (ConversionErrorKind::InvalidValue { message }, None) => {
                write!(f, "invalid value: {}", message)
            }
            (ConversionErrorKind::KeyValueTypeMismatch { expected, found }, Some(field)) => {
                write!(
                    f,
                    "key '{}' expects a {} value, found {}",
                    field, expected, found
                )
            }
            (ConversionErrorKind::KeyValueTypeMismatch { expected, found }, None) => {
                write!(f, "key expects a {} value, found {}", expected, found)
            }
            (ConversionErrorKind::KeyArity { expected, found }, _) => {
                write!(
                    f,
                    "key takes {} value(s) but {} were supplied",
                    expected, found
                )
            }
            (ConversionErrorKind::InvalidTarget, _) => {
                write!(f, "decode target is not a registered record type")
            }
        }
    }
}

impl std::error::Error for ConversionError {}

/// Any error returned by the record codec.
#[derive(Debug)]
pub enum Error {
    /// The record type could not be resolved into a schema.
    Schema(SchemaError),
    /// A value could not be converted.
    Conversion(ConversionError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema(_) => write!(f, "failed to resolve record schema"),
            Error::Conversion(_) => write!(f, "failed to convert record value"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Schema(err) => Some(err),
            Error::Conversion(err) => Some(err),
        }
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

impl From<ConversionError> for Error {
    fn from(err: ConversionError) -> Self {
        Error::Conversion(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_display_names_record_and_field() {
        let err = SchemaError::for_field(
            "Session",
            "id",
            SchemaErrorKind::KeyRoleNameCollision {
                name: "HASH".into(),
            },
        );
        assert_eq!(
            "record 'Session' field 'id': wire name 'HASH' collides with a key role marker",
            err.to_string()
        );
        assert_eq!(Some("id"), err.field());
    }

    #[test]
    fn test_error_source_is_inner_error() {
        use std::error::Error as _;

        let err = Error::from(ConversionError::key_arity(2, 1));
        let source = err.source().expect("source should be set");
        assert_eq!("key takes 2 value(s) but 1 were supplied", source.to_string());
    }
}
