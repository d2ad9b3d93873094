/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Helpers shared by the encoder and decoder.

use aws_sdk_dynamodb::types::AttributeValue;

use crate::error::ConversionError;
use crate::resolve::ScalarKind;

/// Wire type tag of `av`, as used in type mismatch errors.
pub(crate) fn attribute_type_name(av: &AttributeValue) -> &'static str {
    match av {
        AttributeValue::S(_) => "S",
        AttributeValue::N(_) => "N",
        AttributeValue::B(_) => "B",
        AttributeValue::Ss(_) => "SS",
        AttributeValue::Ns(_) => "NS",
        AttributeValue::Bs(_) => "BS",
        AttributeValue::M(_) => "M",
        AttributeValue::L(_) => "L",
        AttributeValue::Null(_) => "NULL",
        AttributeValue::Bool(_) => "BOOL",
        _ => "Unknown",
    }
}

pub(crate) fn scalar_value(leaf: ScalarKind, text: String) -> AttributeValue {
    match leaf {
        ScalarKind::Str => AttributeValue::S(text),
        ScalarKind::Int(_) => AttributeValue::N(text),
    }
}

pub(crate) fn set_type_name(leaf: ScalarKind) -> &'static str {
    match leaf {
        ScalarKind::Str => "SS",
        ScalarKind::Int(_) => "NS",
    }
}

// The record instance disagrees with the description its schema was resolved from.
pub(crate) fn shape_mismatch(field: &str) -> ConversionError {
    ConversionError::invalid_value(field, "value does not match its record description")
}
