/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Record to item encoding.

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashSet;

use crate::convert::{scalar_value, shape_mismatch};
use crate::error::ConversionError;
use crate::resolve::ScalarKind;
use crate::schema::{FieldCodec, FieldSchema, Projection, RecordSchema};
use crate::shape::{DynRecord, Field, FieldRef};
use crate::Item;

/// Encodes `record` into an item. Absent optional values and empty collections are omitted.
pub(crate) fn encode(
    schema: &RecordSchema,
    record: &dyn DynRecord,
) -> Result<Item, ConversionError> {
    let mut item = Item::with_capacity(schema.fields().len());
    for field in schema.fields() {
        let value = record
            .field(field.index)
            .ok_or_else(|| shape_mismatch(field.wire_name))?;
        if let Some(av) = encode_field(field, value)? {
            item.insert(field.wire_name.to_string(), av);
        }
    }
    tracing::trace!(record = schema.name(), attributes = item.len(), "encoded record");
    Ok(item)
}

fn encode_field(
    field: &FieldSchema,
    value: &dyn Field,
) -> Result<Option<AttributeValue>, ConversionError> {
    match &field.codec {
        FieldCodec::Scalar(projection) => Ok(project(value, &projection.path, field.wire_name)?
            .map(|text| scalar_value(projection.leaf, text))),
        FieldCodec::Bytes => match present(value).map(|value| value.view()) {
            None => Ok(None),
            Some(FieldRef::Bytes(bytes)) => Ok(Some(AttributeValue::B(Blob::new(bytes.to_vec())))),
            Some(_) => Err(shape_mismatch(field.wire_name)),
        },
        FieldCodec::Set(projection) => encode_set(projection, value, field.wire_name),
    }
}

fn encode_set(
    projection: &Projection,
    value: &dyn Field,
    wire_name: &str,
) -> Result<Option<AttributeValue>, ConversionError> {
    let items = match present(value).map(|value| value.view()) {
        None => return Ok(None),
        Some(FieldRef::List(items)) => items,
        Some(_) => return Err(shape_mismatch(wire_name)),
    };
    let mut seen = HashSet::with_capacity(items.len());
    let mut members = Vec::with_capacity(items.len());
    for item in items {
        // a set cannot hold duplicates, and elements without an identity have nothing to store
        if let Some(text) = project(item, &projection.path, wire_name)? {
            if seen.insert(text.clone()) {
                members.push(text);
            }
        }
    }
    if members.is_empty() {
        return Ok(None);
    }
    Ok(Some(match projection.leaf {
        ScalarKind::Str => AttributeValue::Ss(members),
        ScalarKind::Int(_) => AttributeValue::Ns(members),
    }))
}

// Looks through optional layers; `None` if any of them is empty.
fn present(value: &dyn Field) -> Option<&dyn Field> {
    match value.view() {
        FieldRef::Optional(None) => None,
        FieldRef::Optional(Some(inner)) => present(inner),
        _ => Some(value),
    }
}

/// Follows `path` from `value` and renders the scalar at its end as text.
fn project(
    value: &dyn Field,
    path: &[usize],
    wire_name: &str,
) -> Result<Option<String>, ConversionError> {
    match value.view() {
        FieldRef::Optional(None) => Ok(None),
        FieldRef::Optional(Some(inner)) => project(inner, path, wire_name),
        FieldRef::Record(record) => {
            let Some((&index, rest)) = path.split_first() else {
                return Err(shape_mismatch(wire_name));
            };
            let next = record
                .field(index)
                .ok_or_else(|| shape_mismatch(wire_name))?;
            project(next, rest, wire_name)
        }
        FieldRef::Str(s) if path.is_empty() => Ok(Some(s.to_owned())),
        FieldRef::Int(n) if path.is_empty() => Ok(Some(n.to_string())),
        _ => Err(shape_mismatch(wire_name)),
    }
}
