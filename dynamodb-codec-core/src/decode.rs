/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Item to record decoding.

use std::num::ParseIntError;

use aws_sdk_dynamodb::types::AttributeValue;

use crate::convert::{attribute_type_name, scalar_value, set_type_name, shape_mismatch};
use crate::error::ConversionError;
use crate::resolve::ScalarKind;
use crate::schema::{FieldCodec, FieldSchema, Projection, RecordSchema};
use crate::shape::{DynRecord, Field, FieldMut, IntWidth, Shape};
use crate::Item;

/// Decodes `item` into `record`.
///
/// Only fields with an entry in the item are written; everything else keeps its
/// current value. Absent optional references along an identity path are
/// instantiated with default values.
pub(crate) fn decode(
    schema: &RecordSchema,
    item: &Item,
    record: &mut dyn DynRecord,
) -> Result<(), ConversionError> {
    for field in schema.fields() {
        let Some(value) = item.get(field.wire_name) else {
            continue;
        };
        let shape = schema
            .def()
            .fields
            .get(field.index)
            .map(|def| (def.shape)())
            .ok_or_else(|| shape_mismatch(field.wire_name))?;
        let target = record
            .field_mut(field.index)
            .ok_or_else(|| shape_mismatch(field.wire_name))?;
        decode_field(field, shape, value, target)?;
    }
    tracing::trace!(record = schema.name(), attributes = item.len(), "decoded record");
    Ok(())
}

fn decode_field(
    field: &FieldSchema,
    shape: Shape,
    value: &AttributeValue,
    target: &mut dyn Field,
) -> Result<(), ConversionError> {
    let wire_name = field.wire_name;
    match &field.codec {
        FieldCodec::Scalar(projection) => {
            let leaf = leaf_value(shape, projection, &projection.path, value, wire_name)?;
            assign(target, &projection.path, leaf, wire_name)
        }
        FieldCodec::Bytes => {
            let AttributeValue::B(blob) = value else {
                return Err(ConversionError::invalid_type(
                    wire_name,
                    "B",
                    attribute_type_name(value),
                ));
            };
            match materialize(target) {
                FieldMut::Bytes(bytes) => {
                    *bytes = blob.as_ref().to_vec();
                    Ok(())
                }
                _ => Err(shape_mismatch(wire_name)),
            }
        }
        FieldCodec::Set(projection) => decode_set(projection, value, target, wire_name),
    }
}

// Finds the scalar a projected field is stored as, looking into the nested map
// written for a referenced record. Runs before any optional reference gets instantiated.
fn leaf_value<'v>(
    shape: Shape,
    projection: &Projection,
    path: &[usize],
    value: &'v AttributeValue,
    wire_name: &str,
) -> Result<&'v AttributeValue, ConversionError> {
    match (value, projection.leaf) {
        (AttributeValue::S(_), ScalarKind::Str) | (AttributeValue::N(_), ScalarKind::Int(_)) => {
            Ok(value)
        }
        (AttributeValue::M(map), _) => match (shape, path.split_first()) {
            (Shape::Optional(inner), _) => leaf_value(inner(), projection, path, value, wire_name),
            (Shape::Record(def), Some((&index, rest))) => {
                let nested = def()
                    .fields
                    .get(index)
                    .ok_or_else(|| shape_mismatch(wire_name))?;
                let nested_name = crate::schema::wire_name(nested);
                let Some(value) = map.get(nested_name) else {
                    return Err(ConversionError::missing_attribute(format!(
                        "{}.{}",
                        wire_name, nested_name
                    )));
                };
                leaf_value((nested.shape)(), projection, rest, value, wire_name)
            }
            _ => Err(ConversionError::invalid_type(
                wire_name,
                projection.leaf.wire_type(),
                "M",
            )),
        },
        (other, leaf) => Err(ConversionError::invalid_type(
            wire_name,
            leaf.wire_type(),
            attribute_type_name(other),
        )),
    }
}

fn decode_set(
    projection: &Projection,
    value: &AttributeValue,
    target: &mut dyn Field,
    wire_name: &str,
) -> Result<(), ConversionError> {
    let members = match (value, projection.leaf) {
        (AttributeValue::Ss(members), ScalarKind::Str) => members,
        (AttributeValue::Ns(members), ScalarKind::Int(width)) => {
            for member in members {
                width
                    .parse(member)
                    .map_err(|e| parse_error(wire_name, member, width, e))?;
            }
            members
        }
        (other, leaf) => {
            return Err(ConversionError::invalid_type(
                wire_name,
                set_type_name(leaf),
                attribute_type_name(other),
            ))
        }
    };
    let FieldMut::List(list) = materialize(target) else {
        return Err(shape_mismatch(wire_name));
    };
    // every member parses, so the collection is not left half written
    list.reset(members.len());
    for (index, member) in members.iter().enumerate() {
        let element = scalar_value(projection.leaf, member.clone());
        let slot = list
            .item_mut(index)
            .ok_or_else(|| shape_mismatch(wire_name))?;
        assign(slot, &projection.path, &element, wire_name)?;
    }
    Ok(())
}

fn parse_error(
    wire_name: &str,
    text: &str,
    width: IntWidth,
    err: ParseIntError,
) -> ConversionError {
    ConversionError::invalid_value(
        wire_name,
        format!("cannot parse '{}' as {}: {}", text, width.name(), err),
    )
}

// Instantiates any absent optional layers and returns the innermost value.
fn materialize(target: &mut dyn Field) -> FieldMut<'_> {
    match target.view_mut() {
        FieldMut::Optional(optional) => materialize(optional.get_or_insert_default()),
        other => other,
    }
}

/// Follows `path` from `target`, instantiating optional hops, and stores the
/// scalar `value` at its end.
fn assign(
    target: &mut dyn Field,
    path: &[usize],
    value: &AttributeValue,
    wire_name: &str,
) -> Result<(), ConversionError> {
    match target.view_mut() {
        FieldMut::Optional(optional) => {
            assign(optional.get_or_insert_default(), path, value, wire_name)
        }
        FieldMut::Record(record) => {
            let Some((&index, rest)) = path.split_first() else {
                return Err(shape_mismatch(wire_name));
            };
            let next = record
                .field_mut(index)
                .ok_or_else(|| shape_mismatch(wire_name))?;
            assign(next, rest, value, wire_name)
        }
        FieldMut::Str(s) if path.is_empty() => match value {
            AttributeValue::S(text) => {
                *s = text.clone();
                Ok(())
            }
            other => Err(ConversionError::invalid_type(
                wire_name,
                "S",
                attribute_type_name(other),
            )),
        },
        FieldMut::Int(n) if path.is_empty() => match value {
            AttributeValue::N(text) => n
                .set_from_str(text)
                .map_err(|e| parse_error(wire_name, text, n.width(), e)),
            other => Err(ConversionError::invalid_type(
                wire_name,
                "N",
                attribute_type_name(other),
            )),
        },
        _ => Err(shape_mismatch(wire_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;
    use crate::error::ConversionErrorKind;
    use crate::shape::Record;
    use aws_sdk_dynamodb::primitives::Blob;
    use dynamodb_codec_macros::Record;
    use proptest::prelude::any;
    use proptest::proptest;
    use std::collections::HashMap;

    #[derive(Debug, Default, Clone, PartialEq, Record)]
    struct User {
        #[dynamo("Id,HASH")]
        id: String,
        age: u8,
        mentor: Option<Box<User>>,
    }

    #[derive(Debug, Default, Clone, PartialEq, Record)]
    struct Tag {
        #[dynamo(",HASH")]
        label: String,
    }

    #[derive(Debug, Default, Clone, PartialEq, Record)]
    struct Post {
        #[dynamo("PostId,HASH")]
        id: i32,
        author: User,
        tags: Vec<Tag>,
        scores: Vec<i16>,
        body: Vec<u8>,
        editor: Option<User>,
    }

    fn schema<T: Record>() -> RecordSchema {
        RecordSchema::resolve(T::describe()).unwrap()
    }

    fn item(entries: &[(&str, AttributeValue)]) -> Item {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_scalars() {
        let mut user = User::default();
        let input = item(&[
            ("Id", AttributeValue::S("abc".into())),
            ("age", AttributeValue::N("10".into())),
        ]);
        decode(&schema::<User>(), &input, &mut user).unwrap();
        assert_eq!("abc", user.id);
        assert_eq!(10, user.age);
        assert_eq!(None, user.mentor);
    }

    #[test]
    fn test_absent_attributes_leave_fields_untouched() {
        let mut user = User {
            id: "keep".into(),
            age: 3,
            mentor: None,
        };
        decode(
            &schema::<User>(),
            &item(&[("age", AttributeValue::N("4".into()))]),
            &mut user,
        )
        .unwrap();
        assert_eq!("keep", user.id);
        assert_eq!(4, user.age);
    }

    #[test]
    fn test_reference_rehydrates_identity_only() {
        let mut user = User::default();
        decode(
            &schema::<User>(),
            &item(&[("mentor", AttributeValue::S("bobo".into()))]),
            &mut user,
        )
        .unwrap();
        let mentor = user.mentor.expect("mentor should be instantiated");
        assert_eq!("bobo", mentor.id);
        assert_eq!(0, mentor.age);
        assert_eq!(None, mentor.mentor);
    }

    #[test]
    fn test_reference_accepts_nested_map() {
        let mut user = User::default();
        let nested = HashMap::from([
            ("Id".to_string(), AttributeValue::S("bobo".into())),
            ("age".to_string(), AttributeValue::N("70".into())),
        ]);
        decode(
            &schema::<User>(),
            &item(&[("mentor", AttributeValue::M(nested))]),
            &mut user,
        )
        .unwrap();
        assert_eq!("bobo", user.mentor.unwrap().id);
    }

    #[test]
    fn test_nested_map_without_identity_is_an_error() {
        let mut user = User::default();
        let nested = HashMap::from([("age".to_string(), AttributeValue::N("70".into()))]);
        let err = decode(
            &schema::<User>(),
            &item(&[("mentor", AttributeValue::M(nested))]),
            &mut user,
        )
        .unwrap_err();
        assert!(matches!(err.kind(), ConversionErrorKind::MissingAttribute));
        assert_eq!(Some("mentor.Id"), err.field());
        assert_eq!(None, user.mentor);

        let nested = HashMap::from([("Id".to_string(), AttributeValue::N("1".into()))]);
        let err = decode(
            &schema::<User>(),
            &item(&[("mentor", AttributeValue::M(nested))]),
            &mut user,
        )
        .unwrap_err();
        assert!(matches!(
            err.kind(),
            ConversionErrorKind::InvalidType {
                expected: "S",
                actual: "N"
            }
        ));
        assert_eq!(None, user.mentor);
    }

    #[test]
    fn test_sets_resize_the_collection() {
        let mut post = Post {
            scores: vec![9, 9, 9, 9],
            ..Default::default()
        };
        let input = item(&[
            ("PostId", AttributeValue::N("5".into())),
            ("author", AttributeValue::S("ann".into())),
            (
                "tags",
                AttributeValue::Ss(vec!["rust".into(), "ddb".into()]),
            ),
            ("scores", AttributeValue::Ns(vec!["-1".into(), "2".into()])),
            ("body", AttributeValue::B(Blob::new(vec![1, 2]))),
            ("editor", AttributeValue::S("eve".into())),
        ]);
        decode(&schema::<Post>(), &input, &mut post).unwrap();
        assert_eq!(5, post.id);
        assert_eq!("ann", post.author.id);
        assert_eq!(
            vec![
                Tag {
                    label: "rust".into()
                },
                Tag {
                    label: "ddb".into()
                }
            ],
            post.tags
        );
        assert_eq!(vec![-1, 2], post.scores);
        assert_eq!(vec![1, 2], post.body);
        assert_eq!("eve", post.editor.unwrap().id);
    }

    #[test]
    fn test_wrong_wire_type_is_an_error() {
        let mut user = User::default();
        let err = decode(
            &schema::<User>(),
            &item(&[("mentor", AttributeValue::N("1".into()))]),
            &mut user,
        )
        .unwrap_err();
        assert!(matches!(
            err.kind(),
            ConversionErrorKind::InvalidType {
                expected: "S",
                actual: "N"
            }
        ));
        assert_eq!(Some("mentor"), err.field());
        // rejected before the reference was instantiated
        assert_eq!(None, user.mentor);

        let mut post = Post::default();
        let err = decode(
            &schema::<Post>(),
            &item(&[("scores", AttributeValue::Ss(vec!["1".into()]))]),
            &mut post,
        )
        .unwrap_err();
        assert!(matches!(
            err.kind(),
            ConversionErrorKind::InvalidType {
                expected: "NS",
                actual: "SS"
            }
        ));
    }

    #[test]
    fn test_out_of_range_number_is_an_error() {
        let mut user = User::default();
        let err = decode(
            &schema::<User>(),
            &item(&[("age", AttributeValue::N("256".into()))]),
            &mut user,
        )
        .unwrap_err();
        assert!(matches!(err.kind(), ConversionErrorKind::InvalidValue { .. }));
    }

    #[test]
    fn test_failed_set_leaves_collection_unchanged() {
        let mut post = Post {
            scores: vec![1, 2, 3],
            ..Default::default()
        };
        let err = decode(
            &schema::<Post>(),
            &item(&[("scores", AttributeValue::Ns(vec!["4".into(), "99999".into()]))]),
            &mut post,
        )
        .unwrap_err();
        assert!(matches!(err.kind(), ConversionErrorKind::InvalidValue { .. }));
        assert_eq!(Some("scores"), err.field());
        assert_eq!(vec![1, 2, 3], post.scores);
    }

    proptest! {
        #[test]
        fn round_trip_scalars_and_references(
            id in ".*",
            age in any::<u8>(),
            mentor in proptest::option::of(".*")
        ) {
            let user = User {
                id,
                age,
                mentor: mentor.map(|id| Box::new(User { id, ..Default::default() })),
            };
            let schema = schema::<User>();
            let encoded = encode(&schema, &user).unwrap();
            let mut decoded = User::default();
            decode(&schema, &encoded, &mut decoded).unwrap();
            assert_eq!(user, decoded);
        }

        #[test]
        fn sets_keep_distinct_members(scores in proptest::collection::vec(any::<i16>(), 0..16)) {
            let post = Post { scores: scores.clone(), ..Default::default() };
            let schema = schema::<Post>();
            let encoded = encode(&schema, &post).unwrap();
            let mut decoded = Post::default();
            decode(&schema, &encoded, &mut decoded).unwrap();

            let mut expected = scores;
            expected.sort_unstable();
            expected.dedup();
            let mut actual = decoded.scores;
            actual.sort_unstable();
            assert_eq!(expected, actual);
        }
    }
}
