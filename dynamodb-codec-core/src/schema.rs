/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! One-time resolution of a record type into everything the codec needs.

use std::collections::HashSet;

use crate::error::{SchemaError, SchemaErrorKind};
use crate::resolve::{
    resolve_key_path, resolve_partition_key, KeyPath, KeyRole, KeyTarget, ScalarKind,
};
use crate::shape::{FieldDef, RecordDef, Shape};
use crate::tag::{parse_tag, HASH, RANGE};

/// Returns the name a field is stored under: its annotation name, or its declared name.
pub(crate) fn wire_name(field: &FieldDef) -> &'static str {
    let (name, _) = parse_tag(field.tag);
    if name.is_empty() {
        field.name
    } else {
        name
    }
}

/// A scalar reached by following `path` from a field value.
///
/// An empty path means the value itself is the scalar. Optional hops along the
/// way are looked through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Projection {
    pub(crate) path: Vec<usize>,
    pub(crate) leaf: ScalarKind,
}

impl From<KeyPath> for Projection {
    fn from(key: KeyPath) -> Self {
        Projection {
            path: key.indices().to_vec(),
            leaf: key.leaf(),
        }
    }
}

/// How a field is written to and read from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FieldCodec {
    /// `S` or `N`, possibly the identity of a referenced record.
    Scalar(Projection),
    /// `B`
    Bytes,
    /// `SS` or `NS`, one projected scalar per element.
    Set(Projection),
}

/// A field of a resolved record.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub(crate) index: usize,
    pub(crate) name: &'static str,
    pub(crate) wire_name: &'static str,
    pub(crate) role: Option<KeyRole>,
    pub(crate) codec: FieldCodec,
}

impl FieldSchema {
    /// Returns the declared field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the attribute name the field is stored under.
    pub fn wire_name(&self) -> &'static str {
        self.wire_name
    }

    /// Returns the key role declared on the field, if any.
    pub fn role(&self) -> Option<KeyRole> {
        self.role
    }
}

/// A validated record type: wire names, key paths and per-field codecs.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    def: &'static RecordDef,
    table_name: String,
    fields: Vec<FieldSchema>,
    partition_key: KeyPath,
    sort_key: Option<KeyPath>,
}

impl RecordSchema {
    /// Resolves `def`, rejecting any configuration the codec cannot honor.
    pub fn resolve(def: &'static RecordDef) -> Result<Self, SchemaError> {
        let mut wire_names = HashSet::new();
        let mut partition_field = None;
        let mut sort_field = None;
        let mut fields = Vec::with_capacity(def.fields.len());

        for (index, field) in def.fields.iter().enumerate() {
            let (_, options) = parse_tag(field.tag);
            let name = wire_name(field);
            if name == HASH || name == RANGE {
                return Err(SchemaError::for_field(
                    def.name,
                    field.name,
                    SchemaErrorKind::KeyRoleNameCollision { name: name.into() },
                ));
            }
            if !wire_names.insert(name) {
                return Err(SchemaError::for_field(
                    def.name,
                    field.name,
                    SchemaErrorKind::DuplicateWireName { name: name.into() },
                ));
            }

            let role = match (options.contains(HASH), options.contains(RANGE)) {
                (true, true) => {
                    return Err(SchemaError::for_field(
                        def.name,
                        field.name,
                        SchemaErrorKind::ConflictingKeyRoles,
                    ))
                }
                (true, false) => Some(KeyRole::Partition),
                (false, true) => Some(KeyRole::Sort),
                (false, false) => None,
            };
            if let Some(role) = role {
                let claimed = match role {
                    KeyRole::Partition => &mut partition_field,
                    KeyRole::Sort => &mut sort_field,
                };
                if claimed.replace(index).is_some() {
                    return Err(SchemaError::for_field(
                        def.name,
                        field.name,
                        SchemaErrorKind::DuplicateKeyRole { role },
                    ));
                }
            }

            let shape = (field.shape)();
            if role.is_some() && matches!(KeyTarget::of(shape), KeyTarget::Invalid) {
                return Err(SchemaError::for_field(
                    def.name,
                    field.name,
                    SchemaErrorKind::UnsupportedKeyKind {
                        shape: format!("{:?}", shape),
                    },
                ));
            }
            let codec = codec_for(shape)?.ok_or_else(|| {
                SchemaError::for_field(
                    def.name,
                    field.name,
                    SchemaErrorKind::UnsupportedKind {
                        shape: format!("{:?}", shape),
                    },
                )
            })?;

            fields.push(FieldSchema {
                index,
                name: field.name,
                wire_name: name,
                role,
                codec,
            });
        }

        let partition_key = resolve_partition_key(def)?;
        let sort_key = resolve_key_path(def, KeyRole::Sort)?;

        Ok(RecordSchema {
            def,
            table_name: format!("{}s", def.name),
            fields,
            partition_key,
            sort_key,
        })
    }

    /// Returns the description this schema was resolved from.
    pub fn def(&self) -> &'static RecordDef {
        self.def
    }

    /// Returns the declared record type name.
    pub fn name(&self) -> &'static str {
        self.def.name
    }

    /// Returns the table records of this type are stored in: the type name plus `s`.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Returns the path to the partition key leaf.
    pub fn partition_key(&self) -> &KeyPath {
        &self.partition_key
    }

    /// Returns the path to the sort key leaf, if the record has one.
    pub fn sort_key(&self) -> Option<&KeyPath> {
        self.sort_key.as_ref()
    }

    /// Returns the attribute name a key is stored under: the wire name of the
    /// top-level field its path starts at.
    pub fn key_attribute_name(&self, key: &KeyPath) -> &'static str {
        self.fields[key.root()].wire_name
    }
}

fn codec_for(shape: Shape) -> Result<Option<FieldCodec>, SchemaError> {
    if shape.is_bytes() {
        return Ok(Some(FieldCodec::Bytes));
    }
    match shape {
        Shape::List(element) => Ok(projection_for(element())?.map(FieldCodec::Set)),
        Shape::Optional(inner) => codec_for(inner()),
        other => Ok(projection_for(other)?.map(FieldCodec::Scalar)),
    }
}

// `None` when the shape has no scalar representation.
fn projection_for(shape: Shape) -> Result<Option<Projection>, SchemaError> {
    match shape {
        Shape::Str => Ok(Some(Projection {
            path: Vec::new(),
            leaf: ScalarKind::Str,
        })),
        Shape::Int(width) => Ok(Some(Projection {
            path: Vec::new(),
            leaf: ScalarKind::Int(width),
        })),
        Shape::Record(def) => Ok(Some(resolve_partition_key(def())?.into())),
        Shape::Optional(inner) => projection_for(inner()),
        Shape::List(_) => Ok(None),
    }
}
