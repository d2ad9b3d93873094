/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Parsing of per-field `#[dynamo("...")]` annotations.

/// Option marking the partition key field.
pub const HASH: &str = "HASH";
/// Option marking the sort key field.
pub const RANGE: &str = "RANGE";

/// The comma-separated options that follow the name in a field annotation.
///
/// Options other than [`HASH`] and [`RANGE`] are kept verbatim and ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagOptions<'a>(&'a str);

impl<'a> TagOptions<'a> {
    /// Returns true if `option` appears as a whole entry in the option list.
    pub fn contains(&self, option: &str) -> bool {
        !self.0.is_empty() && !option.is_empty() && self.iter().any(|o| o == option)
    }

    /// Iterates over every option in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &'a str> {
        let raw = self.0;
        raw.split(',').filter(move |_| !raw.is_empty())
    }

    /// Returns the raw option text.
    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

/// Splits an annotation of the form `[name][,option]*` into its name and options.
///
/// An empty name means the field's declared name is used on the wire. Parsing never fails.
pub fn parse_tag(raw: &str) -> (&str, TagOptions<'_>) {
    match raw.split_once(',') {
        Some((name, options)) => (name, TagOptions(options)),
        None => (raw, TagOptions::default()),
    }
}
