/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Key construction for point lookups, batch lookups and partition queries.

use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

use crate::error::ConversionError;
use crate::request::{BatchGetRequest, GetItemRequest, QueryRequest};
use crate::resolve::{KeyPath, ScalarKind};
use crate::schema::RecordSchema;
use crate::shape::IntWidth;
use crate::Item;

const KEY_CONDITION: &str = "#name = :value";
const NAME_PLACEHOLDER: &str = "#name";
const VALUE_PLACEHOLDER: &str = ":value";

/// A value supplied for one key field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyValue {
    /// A string key value.
    String(String),
    /// An integer key value.
    Integer(i64),
}

impl KeyValue {
    fn kind_name(&self) -> &'static str {
        match self {
            KeyValue::String(_) => "string",
            KeyValue::Integer(_) => "integer",
        }
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::String(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::String(value)
    }
}

macro_rules! integer_key_value {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for KeyValue {
                fn from(value: $ty) -> Self {
                    KeyValue::Integer(i64::from(value))
                }
            }
        )+
    };
}

integer_key_value!(i8, i16, i32, i64, u8, u16, u32);

fn fits(width: IntWidth, value: i64) -> bool {
    match width {
        IntWidth::I8 => i8::try_from(value).is_ok(),
        IntWidth::I16 => i16::try_from(value).is_ok(),
        IntWidth::I32 => i32::try_from(value).is_ok(),
        IntWidth::I64 => true,
        IntWidth::U8 => u8::try_from(value).is_ok(),
        IntWidth::U16 => u16::try_from(value).is_ok(),
        IntWidth::U32 => u32::try_from(value).is_ok(),
    }
}

#[derive(Debug, Clone)]
struct KeyField {
    attribute_name: String,
    leaf: ScalarKind,
}

impl KeyField {
    fn new(schema: &RecordSchema, key: &KeyPath) -> Self {
        Self {
            attribute_name: schema.key_attribute_name(key).to_string(),
            leaf: key.leaf(),
        }
    }

    fn attribute_value(&self, value: KeyValue) -> Result<AttributeValue, ConversionError> {
        match (self.leaf, value) {
            (ScalarKind::Str, KeyValue::String(s)) => Ok(AttributeValue::S(s)),
            (ScalarKind::Int(width), KeyValue::Integer(n)) if fits(width, n) => {
                Ok(AttributeValue::N(n.to_string()))
            }
            (ScalarKind::Int(width), KeyValue::Integer(n)) => Err(ConversionError::invalid_value(
                self.attribute_name.clone(),
                format!("{} does not fit in {}", n, width.name()),
            )),
            (leaf, value) => Err(ConversionError::key_value_type_mismatch(
                self.attribute_name.clone(),
                leaf.name(),
                value.kind_name(),
            )),
        }
    }
}

/// Builds keys for one record type from positional values.
///
/// The maker takes one value (the partition key) for records without a sort key
/// and two values (partition, then sort) for records with one.
#[derive(Debug, Clone)]
pub struct KeyMaker {
    table_name: String,
    partition: KeyField,
    sort: Option<KeyField>,
}

impl KeyMaker {
    /// Creates a key maker for a resolved record.
    pub fn new(schema: &RecordSchema) -> Self {
        Self {
            table_name: schema.table_name().to_string(),
            partition: KeyField::new(schema, schema.partition_key()),
            sort: schema.sort_key().map(|key| KeyField::new(schema, key)),
        }
    }

    /// Returns the table keys are built for.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the number of values a key is built from.
    pub fn arity(&self) -> usize {
        if self.sort.is_some() {
            2
        } else {
            1
        }
    }

    /// Builds a key from exactly [`arity`](Self::arity) values.
    pub fn make_key(&self, values: Vec<KeyValue>) -> Result<Key, ConversionError> {
        if values.len() != self.arity() {
            return Err(ConversionError::key_arity(self.arity(), values.len()));
        }
        let mut values = values.into_iter();
        let mut attributes = Vec::with_capacity(2);
        for field in std::iter::once(&self.partition).chain(self.sort.as_ref()) {
            let Some(value) = values.next() else {
                break;
            };
            attributes.push((field.attribute_name.clone(), field.attribute_value(value)?));
        }
        tracing::trace!(table = %self.table_name, "built key");
        Ok(Key {
            table_name: self.table_name.clone(),
            attributes,
        })
    }

    /// Builds a key for a record without a sort key.
    pub fn partition(&self, partition: impl Into<KeyValue>) -> Result<Key, ConversionError> {
        self.make_key(vec![partition.into()])
    }

    /// Builds a key for a record with a sort key.
    pub fn composite(
        &self,
        partition: impl Into<KeyValue>,
        sort: impl Into<KeyValue>,
    ) -> Result<Key, ConversionError> {
        self.make_key(vec![partition.into(), sort.into()])
    }

    /// Builds a query for every record stored under one partition key value.
    ///
    /// The sort key, if any, is not constrained.
    pub fn query_on_partition(
        &self,
        partition: impl Into<KeyValue>,
    ) -> Result<QueryRequest, ConversionError> {
        let value = self.partition.attribute_value(partition.into())?;
        Ok(QueryRequest {
            table_name: self.table_name.clone(),
            key_condition_expression: KEY_CONDITION.to_string(),
            expression_attribute_names: HashMap::from([(
                NAME_PLACEHOLDER.to_string(),
                self.partition.attribute_name.clone(),
            )]),
            expression_attribute_values: HashMap::from([(VALUE_PLACEHOLDER.to_string(), value)]),
        })
    }
}

/// A table name plus the primary key attributes of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    table_name: String,
    attributes: Vec<(String, AttributeValue)>,
}

impl Key {
    /// Returns the table the key belongs to.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the key attributes, partition key first.
    pub fn attributes(&self) -> &[(String, AttributeValue)] {
        &self.attributes
    }

    /// Converts this key to a map suitable for DynamoDB API calls.
    pub fn to_key_map(&self) -> Item {
        self.attributes.iter().cloned().collect()
    }

    /// Builds a point lookup for this key.
    pub fn get_item(&self) -> GetItemRequest {
        GetItemRequest {
            table_name: self.table_name.clone(),
            key: self.to_key_map(),
        }
    }

    /// Adds this key to a batch lookup, under its table.
    pub fn append_to_batch_get(&self, batch: &mut BatchGetRequest) {
        batch
            .request_items
            .entry(self.table_name.clone())
            .or_default()
            .push(self.to_key_map());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionErrorKind;
    use crate::shape::Record;
    use dynamodb_codec_macros::Record;

    #[derive(Debug, Default, Record)]
    struct User {
        #[dynamo("Id,HASH")]
        id: String,
    }

    #[derive(Debug, Default, Record)]
    struct Message {
        #[dynamo("Id,HASH")]
        id: String,
        #[dynamo("Timestamp,RANGE")]
        timestamp: i64,
    }

    #[derive(Debug, Default, Record)]
    struct Membership {
        #[dynamo("Member,HASH")]
        user: Option<Box<User>>,
        #[dynamo(",RANGE")]
        rank: u8,
    }

    fn key_maker<T: Record>() -> KeyMaker {
        KeyMaker::new(&RecordSchema::resolve(T::describe()).unwrap())
    }

    #[test]
    fn test_composite_key() {
        let maker = key_maker::<Message>();
        assert_eq!(2, maker.arity());
        let key = maker.composite("abc", 42i64).unwrap();
        assert_eq!("Messages", key.table_name());
        let map = key.to_key_map();
        assert_eq!(2, map.len());
        assert_eq!(Some(&AttributeValue::S("abc".into())), map.get("Id"));
        assert_eq!(Some(&AttributeValue::N("42".into())), map.get("Timestamp"));
        assert_eq!("Id", key.attributes()[0].0);
    }

    #[test]
    fn test_arity_is_enforced() {
        let maker = key_maker::<Message>();
        let err = maker.partition("abc").unwrap_err();
        assert!(matches!(
            err.kind(),
            ConversionErrorKind::KeyArity {
                expected: 2,
                found: 1
            }
        ));

        let maker = key_maker::<User>();
        assert_eq!(1, maker.arity());
        let err = maker.composite("abc", 1).unwrap_err();
        assert!(matches!(
            err.kind(),
            ConversionErrorKind::KeyArity {
                expected: 1,
                found: 2
            }
        ));
        assert!(maker.make_key(vec![]).is_err());
    }

    #[test]
    fn test_value_types_are_checked() {
        let maker = key_maker::<Message>();
        let err = maker.composite(7, 42).unwrap_err();
        assert!(matches!(
            err.kind(),
            ConversionErrorKind::KeyValueTypeMismatch {
                expected: "string",
                found: "integer"
            }
        ));
        assert_eq!(Some("Id"), err.field());

        let maker = key_maker::<Membership>();
        let err = maker.composite("bobo", 300).unwrap_err();
        assert!(matches!(err.kind(), ConversionErrorKind::InvalidValue { .. }));
    }

    #[test]
    fn test_key_name_from_root_value_type_from_leaf() {
        let key = key_maker::<Membership>().composite("bobo", 3u8).unwrap();
        let map = key.to_key_map();
        assert_eq!(Some(&AttributeValue::S("bobo".into())), map.get("Member"));
        assert_eq!(Some(&AttributeValue::N("3".into())), map.get("rank"));
    }

    #[test]
    fn test_get_and_batch_get() {
        let users = key_maker::<User>();
        let messages = key_maker::<Message>();

        let get = users.partition("bobo").unwrap().get_item();
        assert_eq!("Users", get.table_name);
        assert_eq!(Some(&AttributeValue::S("bobo".into())), get.key.get("Id"));

        let mut batch = BatchGetRequest::default();
        users.partition("a").unwrap().append_to_batch_get(&mut batch);
        users.partition("b").unwrap().append_to_batch_get(&mut batch);
        messages
            .composite("c", 1)
            .unwrap()
            .append_to_batch_get(&mut batch);
        assert_eq!(2, batch.request_items.len());
        assert_eq!(2, batch.request_items["Users"].len());
        assert_eq!(1, batch.request_items["Messages"].len());
    }

    #[test]
    fn test_query_on_partition() {
        let query = key_maker::<Message>().query_on_partition("abc").unwrap();
        assert_eq!("Messages", query.table_name);
        assert_eq!("#name = :value", query.key_condition_expression);
        assert_eq!(
            Some(&"Id".to_string()),
            query.expression_attribute_names.get("#name")
        );
        assert_eq!(
            Some(&AttributeValue::S("abc".into())),
            query.expression_attribute_values.get(":value")
        );
        assert_eq!(1, query.expression_attribute_values.len());
    }
}
