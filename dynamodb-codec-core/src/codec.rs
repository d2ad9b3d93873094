/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The configured entry point for encoding, decoding and key building.

use std::any::Any;
use std::sync::Arc;

use crate::decode::decode;
use crate::encode::encode;
use crate::error::{ConversionError, Error, SchemaError};
use crate::key::KeyMaker;
use crate::registry::SchemaRegistry;
use crate::request::{CreateTableRequest, ProvisionedThroughput, PutItemRequest};
use crate::schema::RecordSchema;
use crate::shape::Record;
use crate::table::TableSchema;
use crate::Item;

/// Encodes and decodes records using the schemas held in a [`SchemaRegistry`].
///
/// ```ignore
/// let codec = RecordCodec::builder()
///     .provisioned_throughput(ProvisionedThroughput::new(5, 5))
///     .build();
/// let put = codec.put_item(&session)?;
/// let key = codec.key_maker::<Session>()?.composite("abc", 42)?;
/// ```
#[derive(Debug, Clone)]
pub struct RecordCodec {
    registry: Arc<SchemaRegistry>,
    provisioned_throughput: ProvisionedThroughput,
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RecordCodec {
    /// Creates a codec backed by the process-wide registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a builder for a codec.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the registry schemas are cached in.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Resolves and caches the schema for `T`.
    ///
    /// Registering up front surfaces configuration errors before any record is
    /// encoded; every other method registers on demand.
    pub fn register<T: Record>(&self) -> Result<Arc<RecordSchema>, SchemaError> {
        self.registry.register::<T>()
    }

    /// Encodes a record into an item.
    pub fn encode<T: Record>(&self, record: &T) -> Result<Item, Error> {
        let schema = self.register::<T>()?;
        Ok(encode(&schema, record)?)
    }

    /// Encodes a record into a put request for its table.
    pub fn put_item<T: Record>(&self, record: &T) -> Result<PutItemRequest, Error> {
        let schema = self.register::<T>()?;
        Ok(PutItemRequest {
            table_name: schema.table_name().to_string(),
            item: encode(&schema, record)?,
        })
    }

    /// Decodes an item into an existing record.
    ///
    /// Fields without an attribute in the item keep their current value.
    pub fn decode<T: Record>(&self, item: &Item, record: &mut T) -> Result<(), Error> {
        let schema = self.register::<T>()?;
        Ok(decode(&schema, item, record)?)
    }

    /// Decodes an item into a record whose type is only known at runtime.
    ///
    /// The target's type must have been registered with this codec's registry;
    /// otherwise an invalid target error is returned and the target is left untouched.
    pub fn decode_any(&self, item: &Item, target: &mut dyn Any) -> Result<(), Error> {
        let Some((schema, record)) = self.registry.lookup_any(target) else {
            return Err(ConversionError::invalid_target().into());
        };
        let schema = schema?;
        let record = record.ok_or_else(ConversionError::invalid_target)?;
        Ok(decode(&schema, item, record)?)
    }

    /// Decodes an item into a new record, starting from `T::default()`.
    pub fn from_item<T: Record>(&self, item: &Item) -> Result<T, Error> {
        let mut record = T::default();
        self.decode(item, &mut record)?;
        Ok(record)
    }

    /// Returns the table name records of type `T` are stored in.
    pub fn table_name<T: Record>(&self) -> Result<String, SchemaError> {
        Ok(self.register::<T>()?.table_name().to_string())
    }

    /// Returns the key schema of `T`'s table.
    pub fn table_schema<T: Record>(&self) -> Result<TableSchema, SchemaError> {
        let schema = self.register::<T>()?;
        Ok(TableSchema::from_record(&schema))
    }

    /// Builds a create table request with the configured throughput.
    pub fn create_table<T: Record>(&self) -> Result<CreateTableRequest, SchemaError> {
        self.create_table_with_throughput::<T>(self.provisioned_throughput)
    }

    /// Builds a create table request with the given throughput.
    pub fn create_table_with_throughput<T: Record>(
        &self,
        provisioned_throughput: ProvisionedThroughput,
    ) -> Result<CreateTableRequest, SchemaError> {
        let table = self.table_schema::<T>()?;
        Ok(CreateTableRequest {
            table_name: table.table_name,
            key_schema: table.key_schema,
            attribute_definitions: table.attribute_definitions,
            provisioned_throughput,
        })
    }

    /// Returns a key maker for `T`.
    pub fn key_maker<T: Record>(&self) -> Result<KeyMaker, SchemaError> {
        let schema = self.register::<T>()?;
        Ok(KeyMaker::new(&schema))
    }
}

/// Builder for [`RecordCodec`].
#[derive(Debug, Default)]
pub struct Builder {
    registry: Option<Arc<SchemaRegistry>>,
    provisioned_throughput: Option<ProvisionedThroughput>,
}

impl Builder {
    /// Sets the registry schemas are cached in. Defaults to [`SchemaRegistry::global`].
    pub fn registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
        self.set_registry(Some(registry));
        self
    }

    /// Sets the registry schemas are cached in.
    pub fn set_registry(&mut self, registry: Option<Arc<SchemaRegistry>>) -> &mut Self {
        self.registry = registry;
        self
    }

    /// Sets the throughput used by [`RecordCodec::create_table`].
    ///
    /// Defaults to one read and one write unit.
    pub fn provisioned_throughput(mut self, provisioned_throughput: ProvisionedThroughput) -> Self {
        self.set_provisioned_throughput(Some(provisioned_throughput));
        self
    }

    /// Sets the throughput used by [`RecordCodec::create_table`].
    pub fn set_provisioned_throughput(
        &mut self,
        provisioned_throughput: Option<ProvisionedThroughput>,
    ) -> &mut Self {
        self.provisioned_throughput = provisioned_throughput;
        self
    }

    /// Builds the codec.
    pub fn build(self) -> RecordCodec {
        RecordCodec {
            registry: self.registry.unwrap_or_else(SchemaRegistry::global),
            provisioned_throughput: self.provisioned_throughput.unwrap_or_default(),
        }
    }
}
