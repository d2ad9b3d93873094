/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Locates key fields, possibly nested inside other records.

use std::any::TypeId;
use std::fmt;

use crate::error::{SchemaError, SchemaErrorKind};
use crate::shape::{IntWidth, RecordDef, Shape};
use crate::tag::{parse_tag, HASH, RANGE};

/// The role a field plays in the table's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    /// The partition (hash) key.
    Partition,
    /// The sort (range) key.
    Sort,
}

impl KeyRole {
    /// Returns the annotation option that marks this role.
    pub fn marker(self) -> &'static str {
        match self {
            KeyRole::Partition => HASH,
            KeyRole::Sort => RANGE,
        }
    }
}

/// The kind of scalar a key path ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// A string, `S` on the wire.
    Str,
    /// An integer, `N` on the wire.
    Int(IntWidth),
}

impl ScalarKind {
    /// Returns the wire type tag for this scalar.
    pub fn wire_type(self) -> &'static str {
        match self {
            ScalarKind::Str => "S",
            ScalarKind::Int(_) => "N",
        }
    }

    /// Returns a human readable name for this scalar.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Str => "string",
            ScalarKind::Int(width) => width.name(),
        }
    }
}

/// Field positions leading from a record to a scalar key leaf.
///
/// The first index selects a top-level field; each further index selects a
/// field of the record reached so far, looking through optional references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    indices: Vec<usize>,
    leaf: ScalarKind,
}

impl KeyPath {
    /// Returns the field positions from the root to the leaf.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns the index of the top-level field the path starts at.
    pub fn root(&self) -> usize {
        self.indices[0]
    }

    /// Returns the kind of the leaf scalar.
    pub fn leaf(&self) -> ScalarKind {
        self.leaf
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for index in &self.indices {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", index)?;
            first = false;
        }
        Ok(())
    }
}

/// What a key search can continue into from a given shape.
pub(crate) enum KeyTarget {
    Scalar(ScalarKind),
    Record(&'static RecordDef),
    Invalid,
}

impl KeyTarget {
    pub(crate) fn of(shape: Shape) -> Self {
        match shape {
            Shape::Str => KeyTarget::Scalar(ScalarKind::Str),
            Shape::Int(width) => KeyTarget::Scalar(ScalarKind::Int(width)),
            Shape::Record(def) => KeyTarget::Record(def()),
            Shape::Optional(inner) => match inner() {
                Shape::Record(def) => KeyTarget::Record(def()),
                _ => KeyTarget::Invalid,
            },
            Shape::List(_) => KeyTarget::Invalid,
        }
    }
}

/// Finds the path to the field holding `role` in `def`.
///
/// Fields are searched in declaration order and the first field carrying the role
/// wins. A scalar field ends the search; a nested record or an optional reference
/// to one continues into that record's partition key. Fields of any other kind are
/// skipped. Returns `Ok(None)` when no field carries the role; callers decide
/// whether that is an error.
pub fn resolve_key_path(
    def: &'static RecordDef,
    role: KeyRole,
) -> Result<Option<KeyPath>, SchemaError> {
    search(def, role, &mut Vec::new())
}

/// Like [`resolve_key_path`] for the partition key, which every stored record must have.
pub fn resolve_partition_key(def: &'static RecordDef) -> Result<KeyPath, SchemaError> {
    resolve_key_path(def, KeyRole::Partition)?
        .ok_or_else(|| SchemaError::missing_partition_key(def.name))
}

fn search(
    def: &'static RecordDef,
    role: KeyRole,
    stack: &mut Vec<TypeId>,
) -> Result<Option<KeyPath>, SchemaError> {
    let type_id = (def.type_id)();
    if stack.contains(&type_id) {
        return Err(SchemaError::new(def.name, SchemaErrorKind::CyclicKeyPath));
    }
    stack.push(type_id);
    let found = search_fields(def, role, stack);
    stack.pop();
    found
}

fn search_fields(
    def: &'static RecordDef,
    role: KeyRole,
    stack: &mut Vec<TypeId>,
) -> Result<Option<KeyPath>, SchemaError> {
    for (index, field) in def.fields.iter().enumerate() {
        let (_, options) = parse_tag(field.tag);
        if !options.contains(role.marker()) {
            continue;
        }
        match KeyTarget::of((field.shape)()) {
            KeyTarget::Scalar(leaf) => {
                return Ok(Some(KeyPath {
                    indices: vec![index],
                    leaf,
                }))
            }
            KeyTarget::Record(nested) => {
                let mut path = search(nested, KeyRole::Partition, stack)?
                    .ok_or_else(|| SchemaError::missing_partition_key(nested.name))?;
                path.indices.insert(0, index);
                return Ok(Some(path));
            }
            KeyTarget::Invalid => continue,
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RecordSchema;
    use crate::shape::Record;
    use dynamodb_codec_macros::Record;

    #[derive(Debug, Default, Record)]
    struct User {
        #[dynamo("Id,HASH")]
        id: String,
        name: String,
    }

    #[derive(Debug, Default, Record)]
    struct Session {
        #[dynamo("SessionId,HASH")]
        id: String,
        #[dynamo(",RANGE")]
        timestamp: i64,
    }

    #[derive(Debug, Default, Record)]
    struct Message {
        body: String,
        #[dynamo("Author,HASH")]
        author: Option<Box<User>>,
        #[dynamo(",RANGE")]
        session: Session,
    }

    #[derive(Debug, Default, Record)]
    struct Tagged {
        #[dynamo(",HASH")]
        labels: Vec<String>,
        #[dynamo(",HASH")]
        name: String,
    }

    // Only reachable as a nested record: resolving it as a top-level record
    // rejects the keyed collection.
    #[derive(Debug, Default, Record)]
    struct Labelled {
        #[dynamo(",HASH")]
        inner: Tagged,
    }

    #[derive(Debug, Default, Record)]
    struct Node {
        #[dynamo(",HASH")]
        parent: Option<Box<Node>>,
    }

    #[derive(Debug, Default, Record)]
    struct Unkeyed {
        value: u32,
    }

    #[test]
    fn test_scalar_partition_key() {
        let path = resolve_partition_key(User::describe()).unwrap();
        assert_eq!(&[0], path.indices());
        assert_eq!(ScalarKind::Str, path.leaf());
    }

    #[test]
    fn test_sort_key_is_optional() {
        assert_eq!(None, resolve_key_path(User::describe(), KeyRole::Sort).unwrap());
        let sort = resolve_key_path(Session::describe(), KeyRole::Sort)
            .unwrap()
            .unwrap();
        assert_eq!(&[1], sort.indices());
        assert_eq!(ScalarKind::Int(IntWidth::I64), sort.leaf());
    }

    #[test]
    fn test_key_through_optional_reference_and_nested_record() {
        let partition = resolve_partition_key(Message::describe()).unwrap();
        assert_eq!(&[1, 0], partition.indices());
        assert_eq!(1, partition.root());
        assert_eq!("1.0", partition.to_string());

        let sort = resolve_key_path(Message::describe(), KeyRole::Sort)
            .unwrap()
            .unwrap();
        // a nested record always continues into its partition key
        assert_eq!(&[2, 0], sort.indices());
        assert_eq!(ScalarKind::Str, sort.leaf());
    }

    #[test]
    fn test_invalid_key_fields_are_skipped() {
        let path = resolve_partition_key(Tagged::describe()).unwrap();
        assert_eq!(&[1], path.indices());

        let schema = RecordSchema::resolve(Labelled::describe()).unwrap();
        assert_eq!(&[0, 1], schema.partition_key().indices());
        assert_eq!(ScalarKind::Str, schema.partition_key().leaf());
    }

    #[test]
    fn test_missing_partition_key() {
        let err = resolve_partition_key(Unkeyed::describe()).unwrap_err();
        assert_eq!(&SchemaErrorKind::MissingPartitionKey, err.kind());
        assert_eq!("Unkeyed", err.record());
    }

    #[test]
    fn test_cycle_is_reported() {
        let err = resolve_partition_key(Node::describe()).unwrap_err();
        assert_eq!(&SchemaErrorKind::CyclicKeyPath, err.kind());
    }
}
