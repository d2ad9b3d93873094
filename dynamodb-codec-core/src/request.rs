/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Request payloads produced by the codec.
//!
//! These carry exactly the members the codec fills in. Sending them is left to
//! whichever DynamoDB client the caller uses.

use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;

use crate::table::{AttributeDefinition, KeySchemaElement};
use crate::Item;

/// Read and write capacity for a new table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionedThroughput {
    /// Read capacity units.
    pub read_capacity_units: i64,
    /// Write capacity units.
    pub write_capacity_units: i64,
}

impl ProvisionedThroughput {
    /// Creates a throughput setting.
    pub fn new(read_capacity_units: i64, write_capacity_units: i64) -> Self {
        Self {
            read_capacity_units,
            write_capacity_units,
        }
    }
}

impl Default for ProvisionedThroughput {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Stores one encoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct PutItemRequest {
    /// Table the record belongs to.
    pub table_name: String,
    /// The encoded record.
    pub item: Item,
}

/// Creates the table for a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableRequest {
    /// Name of the new table.
    pub table_name: String,
    /// Partition key first, then the sort key if there is one.
    pub key_schema: Vec<KeySchemaElement>,
    /// Scalar types of the key attributes, in key schema order.
    pub attribute_definitions: Vec<AttributeDefinition>,
    /// Capacity passed through from the caller.
    pub provisioned_throughput: ProvisionedThroughput,
}

/// Reads a single record by key.
#[derive(Debug, Clone, PartialEq)]
pub struct GetItemRequest {
    /// Table to read from.
    pub table_name: String,
    /// The full primary key.
    pub key: Item,
}

/// Reads many records, possibly from several tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchGetRequest {
    /// Keys to read, grouped by table name.
    pub request_items: HashMap<String, Vec<Item>>,
}

/// Reads every record sharing a partition key.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Table to query.
    pub table_name: String,
    /// Always `#name = :value`.
    pub key_condition_expression: String,
    /// Maps `#name` to the partition key attribute.
    pub expression_attribute_names: HashMap<String, String>,
    /// Maps `:value` to the partition key value.
    pub expression_attribute_values: HashMap<String, AttributeValue>,
}
