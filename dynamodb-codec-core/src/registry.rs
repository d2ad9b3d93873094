/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Per-type cache of resolved record schemas.

use once_cell::sync::Lazy;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::SchemaError;
use crate::schema::RecordSchema;
use crate::shape::{DynRecord, Record};

static GLOBAL: Lazy<Arc<SchemaRegistry>> = Lazy::new(|| Arc::new(SchemaRegistry::new()));

#[derive(Clone)]
struct Registration {
    schema: Result<Arc<RecordSchema>, SchemaError>,
    as_record: fn(&mut dyn Any) -> Option<&mut dyn DynRecord>,
}

fn as_record<T: Record>(target: &mut dyn Any) -> Option<&mut dyn DynRecord> {
    target
        .downcast_mut::<T>()
        .map(|record| record as &mut dyn DynRecord)
}

/// Resolves each record type once and remembers the outcome, success or failure.
///
/// A registry can be shared between codecs, or [`SchemaRegistry::global`] can be
/// used as the process-wide default.
#[derive(Default)]
pub struct SchemaRegistry {
    inner: Mutex<HashMap<TypeId, Registration>>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry.
    pub fn global() -> Arc<SchemaRegistry> {
        GLOBAL.clone()
    }

    fn inner(&self) -> MutexGuard<'_, HashMap<TypeId, Registration>> {
        self.inner.lock().unwrap()
    }

    /// Returns the schema for `T`, resolving it on first use.
    ///
    /// A failed resolution is cached too, so every later call returns the same error.
    pub fn register<T: Record>(&self) -> Result<Arc<RecordSchema>, SchemaError> {
        let mut inner = self.inner();
        let registration = inner.entry(TypeId::of::<T>()).or_insert_with(|| {
            let def = T::describe();
            let schema = RecordSchema::resolve(def).map(Arc::new);
            match &schema {
                Ok(schema) => tracing::debug!(
                    record = def.name,
                    table = schema.table_name(),
                    partition_key = %schema.partition_key(),
                    "resolved record schema"
                ),
                Err(err) => {
                    tracing::debug!(record = def.name, error = %err, "record schema is invalid")
                }
            }
            Registration {
                schema,
                as_record: as_record::<T>,
            }
        });
        registration.schema.clone()
    }

    /// Returns true if `T` has been registered, whether or not it resolved.
    pub fn contains<T: Record>(&self) -> bool {
        self.inner().contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of registered record types.
    pub fn len(&self) -> usize {
        self.inner().len()
    }

    /// Returns true if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.inner().is_empty()
    }

    /// Looks up the schema registered for the concrete type behind `target`.
    ///
    /// Returns `None` without touching `target` when its type was never registered.
    pub(crate) fn lookup_any<'a>(
        &self,
        target: &'a mut dyn Any,
    ) -> Option<(
        Result<Arc<RecordSchema>, SchemaError>,
        Option<&'a mut dyn DynRecord>,
    )> {
        let registration = self.inner().get(&(*target).type_id()).cloned()?;
        Some((registration.schema, (registration.as_record)(target)))
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaErrorKind;
    use dynamodb_codec_macros::Record;
    use tracing_test::traced_test;

    #[derive(Debug, Default, Record)]
    struct Session {
        #[dynamo("SessionId,HASH")]
        id: String,
    }

    #[derive(Debug, Default, Record)]
    struct Unkeyed {
        name: String,
    }

    #[test]
    #[traced_test]
    fn test_resolves_once() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        let first = registry.register::<Session>().unwrap();
        let second = registry.register::<Session>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.contains::<Session>());
        assert_eq!(1, registry.len());
        assert!(logs_contain("resolved record schema"));
    }

    #[test]
    fn test_failures_are_cached() {
        let registry = SchemaRegistry::new();
        let first = registry.register::<Unkeyed>().unwrap_err();
        let second = registry.register::<Unkeyed>().unwrap_err();
        assert_eq!(first, second);
        assert_eq!(&SchemaErrorKind::MissingPartitionKey, second.kind());
        assert!(registry.contains::<Unkeyed>());
    }

    #[test]
    fn test_lookup_any() {
        let registry = SchemaRegistry::new();
        registry.register::<Session>().unwrap();

        let mut session = Session::default();
        let (schema, record) = registry.lookup_any(&mut session).unwrap();
        assert_eq!("Sessions", schema.unwrap().table_name());
        assert!(record.is_some());

        let mut other = String::new();
        assert!(registry.lookup_any(&mut other).is_none());
    }

    #[test]
    fn test_registries_are_independent() {
        let registry = SchemaRegistry::new();
        registry.register::<Session>().unwrap();
        assert!(!SchemaRegistry::new().contains::<Session>());
    }
}
