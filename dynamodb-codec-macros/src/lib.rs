/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Derive macro for dynamodb-codec records.
//!
//! `#[derive(Record)]` describes a struct with named fields to the codec. Each
//! field may carry a `#[dynamo("name,OPTIONS")]` annotation that renames the
//! attribute on the wire and marks it as the partition (`HASH`) or sort
//! (`RANGE`) key:
//!
//! ```ignore
//! #[derive(Default, Record)]
//! struct Session {
//!     #[dynamo("SessionId,HASH")]
//!     id: String,
//!     #[dynamo(",RANGE")]
//!     timestamp: i64,
//!     user: Option<Box<User>>,
//! }
//! ```

#![warn(missing_docs)]

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::DeriveInput;

use crate::macro_impl::derive_record_impl;

mod macro_impl;

/// Implements `Record`, `DynRecord` and `Field` for a struct with named fields.
#[proc_macro_derive(Record, attributes(dynamo))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    derive_record_impl(input).into()
}
