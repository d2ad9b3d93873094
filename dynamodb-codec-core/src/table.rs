/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Table key schema generation.

use aws_sdk_dynamodb::types::{KeyType, ScalarAttributeType};

use crate::resolve::{KeyPath, ScalarKind};
use crate::schema::RecordSchema;

/// One entry of a table's key schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchemaElement {
    /// Name of the key attribute.
    pub attribute_name: String,
    /// `HASH` or `RANGE`.
    pub key_type: KeyType,
}

/// The scalar type of a key attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    /// Name of the key attribute.
    pub attribute_name: String,
    /// `S` or `N`.
    pub attribute_type: ScalarAttributeType,
}

/// Key schema and attribute declarations needed to create a record's table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Name of the table.
    pub table_name: String,
    /// Partition key first, then the sort key if there is one.
    pub key_schema: Vec<KeySchemaElement>,
    /// Types of the key attributes, in key schema order.
    pub attribute_definitions: Vec<AttributeDefinition>,
}

impl TableSchema {
    /// Builds the table schema of a resolved record.
    ///
    /// A key stored in a nested record or behind a reference is declared with the
    /// scalar type its identity is stored as.
    pub fn from_record(schema: &RecordSchema) -> Self {
        let mut table = TableSchema {
            table_name: schema.table_name().to_string(),
            key_schema: Vec::with_capacity(2),
            attribute_definitions: Vec::with_capacity(2),
        };
        table.push_key(schema, schema.partition_key(), KeyType::Hash);
        if let Some(sort_key) = schema.sort_key() {
            table.push_key(schema, sort_key, KeyType::Range);
        }
        table
    }

    fn push_key(&mut self, schema: &RecordSchema, key: &KeyPath, key_type: KeyType) {
        let attribute_name = schema.key_attribute_name(key).to_string();
        self.key_schema.push(KeySchemaElement {
            attribute_name: attribute_name.clone(),
            key_type,
        });
        self.attribute_definitions.push(AttributeDefinition {
            attribute_name,
            attribute_type: scalar_attribute_type(key.leaf()),
        });
    }
}

fn scalar_attribute_type(leaf: ScalarKind) -> ScalarAttributeType {
    match leaf {
        ScalarKind::Str => ScalarAttributeType::S,
        ScalarKind::Int(_) => ScalarAttributeType::N,
    }
}
