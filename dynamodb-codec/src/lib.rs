/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Schema-driven conversion between Rust records and DynamoDB items.
//!
//! Annotate a struct with `#[derive(Record)]`, mark its key fields, and the codec
//! produces put requests, table definitions and lookup keys for it.
//!
//! # Example
//!
//! ```ignore
//! use dynamodb_codec::{Record, RecordCodec};
//!
//! #[derive(Debug, Default, Record)]
//! struct User {
//!     #[dynamo("Id,HASH")]
//!     id: String,
//!     mentor: Option<Box<User>>,
//! }
//!
//! #[derive(Debug, Default, Record)]
//! struct Session {
//!     #[dynamo("SessionId,HASH")]
//!     id: String,
//!     #[dynamo("Timestamp,RANGE")]
//!     timestamp: i64,
//!     #[dynamo("Usr")]
//!     user: Option<Box<User>>,
//! }
//!
//! let codec = RecordCodec::new();
//! let table = codec.create_table::<Session>()?;
//! let put = codec.put_item(&session)?;
//! let get = codec.key_maker::<Session>()?.composite("abc", 42)?.get_item();
//! ```

#![warn(missing_docs)]

pub use dynamodb_codec_core::*;
pub use dynamodb_codec_macros::*;
