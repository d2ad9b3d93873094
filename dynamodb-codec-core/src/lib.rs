/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Runtime for the DynamoDB record codec.
//!
//! Records are plain structs described by `#[derive(Record)]`. From that
//! description this crate:
//!
//! - parses the `#[dynamo("name,HASH|RANGE")]` field annotations ([`parse_tag`])
//! - finds the partition and sort key fields, including keys stored in nested
//!   records or behind references ([`resolve_key_path`])
//! - encodes records to DynamoDB items and decodes them back ([`RecordCodec`])
//! - derives the table key schema ([`TableSchema`])
//! - builds keys, batch lookups and partition queries ([`KeyMaker`])
//!
//! A field that holds another record is stored as that record's partition key
//! value, and a collection is stored as a string or number set.

#![warn(missing_docs)]

// Lets `::dynamodb_codec::...` paths emitted by the derive macro resolve inside this crate.
extern crate self as dynamodb_codec;

mod codec;
mod convert;
mod decode;
mod encode;
pub mod error;
mod key;
mod registry;
mod request;
mod resolve;
mod schema;
mod shape;
mod table;
mod tag;

use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

/// A DynamoDB item: attribute names mapped to values.
pub type Item = HashMap<String, AttributeValue>;

pub use codec::{Builder, RecordCodec};
pub use error::{ConversionError, ConversionErrorKind, Error, SchemaError, SchemaErrorKind};
pub use key::{Key, KeyMaker, KeyValue};
pub use registry::SchemaRegistry;
pub use request::{
    BatchGetRequest, CreateTableRequest, GetItemRequest, ProvisionedThroughput, PutItemRequest,
    QueryRequest,
};
pub use resolve::{resolve_key_path, resolve_partition_key, KeyPath, KeyRole, ScalarKind};
pub use schema::{FieldSchema, RecordSchema};
pub use shape::{
    DynRecord, Field, FieldDef, FieldMut, FieldRef, IntField, IntWidth, ListField, OptionalField,
    Record, RecordDef, Shape,
};
pub use table::{AttributeDefinition, KeySchemaElement, TableSchema};
pub use tag::{parse_tag, TagOptions, HASH, RANGE};
