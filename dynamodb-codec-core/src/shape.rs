/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Runtime descriptions of record types and object-safe access to their fields.
//!
//! `#[derive(Record)]` emits a `'static` [`RecordDef`] for each struct and implements
//! [`Record`], [`DynRecord`] and [`Field`] for it. The codec only ever walks these
//! descriptions; it never needs to know the concrete Rust types involved.

use std::any::{Any, TypeId};
use std::fmt;
use std::num::ParseIntError;

/// Width of an integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
}

impl IntWidth {
    /// Returns the Rust name of the integer type.
    pub fn name(self) -> &'static str {
        match self {
            IntWidth::I8 => "i8",
            IntWidth::I16 => "i16",
            IntWidth::I32 => "i32",
            IntWidth::I64 => "i64",
            IntWidth::U8 => "u8",
            IntWidth::U16 => "u16",
            IntWidth::U32 => "u32",
        }
    }

    /// Parses `text` as an integer of this width.
    pub fn parse(self, text: &str) -> Result<i64, ParseIntError> {
        Ok(match self {
            IntWidth::I8 => text.parse::<i8>()?.into(),
            IntWidth::I16 => text.parse::<i16>()?.into(),
            IntWidth::I32 => text.parse::<i32>()?.into(),
            IntWidth::I64 => text.parse::<i64>()?,
            IntWidth::U8 => text.parse::<u8>()?.into(),
            IntWidth::U16 => text.parse::<u16>()?.into(),
            IntWidth::U32 => text.parse::<u32>()?.into(),
        })
    }
}

/// The semantic kind of a field type.
///
/// Nested shapes are produced lazily through function pointers so that
/// self-referencing records (`Option<Box<Self>>`) can be described.
#[derive(Clone, Copy)]
pub enum Shape {
    /// A string scalar.
    Str,
    /// An integer scalar.
    Int(IntWidth),
    /// A nested record.
    Record(fn() -> &'static RecordDef),
    /// A sequence of elements. `List(Int(U8))` is a byte sequence.
    List(fn() -> Shape),
    /// An optional value.
    Optional(fn() -> Shape),
}

impl Shape {
    /// Returns true for the byte sequence shape (`Vec<u8>`).
    pub fn is_bytes(&self) -> bool {
        matches!(self, Shape::List(element) if matches!(element(), Shape::Int(IntWidth::U8)))
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Str => write!(f, "string"),
            Shape::Int(width) => write!(f, "{}", width.name()),
            Shape::Record(def) => write!(f, "record {}", def().name),
            Shape::List(element) => write!(f, "list of {:?}", element()),
            Shape::Optional(inner) => write!(f, "optional {:?}", inner()),
        }
    }
}

/// Static description of a record type.
pub struct RecordDef {
    /// Declared type name. The table name is derived from it.
    pub name: &'static str,
    /// Returns the `TypeId` of the described type.
    pub type_id: fn() -> TypeId,
    /// Fields in declaration order.
    pub fields: &'static [FieldDef],
}

impl fmt::Debug for RecordDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDef")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Static description of one record field.
pub struct FieldDef {
    /// Declared field name.
    pub name: &'static str,
    /// Raw annotation text, empty when the field is not annotated.
    pub tag: &'static str,
    /// Returns the shape of the field's type.
    pub shape: fn() -> Shape,
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("shape", &(self.shape)())
            .finish()
    }
}

/// Read access to a field value, by kind.
pub enum FieldRef<'a> {
    /// A string.
    Str(&'a str),
    /// An integer of any supported width.
    Int(i64),
    /// A byte sequence.
    Bytes(&'a [u8]),
    /// A nested record.
    Record(&'a dyn DynRecord),
    /// The elements of a sequence.
    List(Vec<&'a dyn Field>),
    /// An optional value.
    Optional(Option<&'a dyn Field>),
}

/// Write access to a field value, by kind.
pub enum FieldMut<'a> {
    /// A string.
    Str(&'a mut String),
    /// An integer.
    Int(&'a mut dyn IntField),
    /// A byte sequence.
    Bytes(&'a mut Vec<u8>),
    /// A nested record.
    Record(&'a mut dyn DynRecord),
    /// A sequence.
    List(&'a mut dyn ListField),
    /// An optional value.
    Optional(&'a mut dyn OptionalField),
}

/// A value that can be stored in a record field.
pub trait Field: Any + Send + Sync {
    /// Describes the type.
    fn shape() -> Shape
    where
        Self: Sized;

    /// Borrows the value for reading.
    fn view(&self) -> FieldRef<'_>;

    /// Borrows the value for writing.
    fn view_mut(&mut self) -> FieldMut<'_>;
}

/// An integer field that parses decimal text at its own width.
pub trait IntField {
    /// Returns the field's width.
    fn width(&self) -> IntWidth;

    /// Replaces the value with `text` parsed as a base-10 integer.
    fn set_from_str(&mut self, text: &str) -> Result<(), ParseIntError>;
}

/// A sequence field that can be resized and filled element by element.
pub trait ListField {
    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns true if there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the contents with `len` default elements.
    fn reset(&mut self, len: usize);

    /// Borrows the element at `index`.
    fn item_mut(&mut self, index: usize) -> Option<&mut dyn Field>;
}

/// An optional field that can be materialized in place.
pub trait OptionalField {
    /// Returns the contained value, inserting a default one first if absent.
    fn get_or_insert_default(&mut self) -> &mut dyn Field;
}

/// Object-safe access to the fields of a record.
pub trait DynRecord: Any + Send + Sync {
    /// Returns the description of the record's type.
    fn record_def(&self) -> &'static RecordDef;

    /// Borrows the field at `index` (declaration order).
    fn field(&self, index: usize) -> Option<&dyn Field>;

    /// Mutably borrows the field at `index` (declaration order).
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Field>;
}

/// A record type that can be encoded to and decoded from a DynamoDB item.
///
/// Implemented by `#[derive(Record)]`.
pub trait Record: DynRecord + Default + Sized {
    /// Returns the description of this type.
    fn describe() -> &'static RecordDef;
}

impl Field for String {
    fn shape() -> Shape {
        Shape::Str
    }

    fn view(&self) -> FieldRef<'_> {
        FieldRef::Str(self)
    }

    fn view_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Str(self)
    }
}

macro_rules! int_field {
    ($($ty:ty => $width:ident),+ $(,)?) => {
        $(
            impl IntField for $ty {
                fn width(&self) -> IntWidth {
                    IntWidth::$width
                }

                fn set_from_str(&mut self, text: &str) -> Result<(), ParseIntError> {
                    *self = text.parse()?;
                    Ok(())
                }
            }

            impl Field for $ty {
                fn shape() -> Shape {
                    Shape::Int(IntWidth::$width)
                }

                fn view(&self) -> FieldRef<'_> {
                    FieldRef::Int(i64::from(*self))
                }

                fn view_mut(&mut self) -> FieldMut<'_> {
                    FieldMut::Int(self)
                }
            }
        )+
    };
}

int_field!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
);

impl<T: Field + Default> ListField for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn reset(&mut self, len: usize) {
        self.clear();
        self.resize_with(len, T::default);
    }

    fn item_mut(&mut self, index: usize) -> Option<&mut dyn Field> {
        self.get_mut(index).map(|item| item as &mut dyn Field)
    }
}

impl<T: Field + Default> Field for Vec<T> {
    fn shape() -> Shape {
        Shape::List(T::shape)
    }

    fn view(&self) -> FieldRef<'_> {
        if let Some(bytes) = (self as &dyn Any).downcast_ref::<Vec<u8>>() {
            return FieldRef::Bytes(bytes);
        }
        FieldRef::List(self.iter().map(|item| item as &dyn Field).collect())
    }

    fn view_mut(&mut self) -> FieldMut<'_> {
        if TypeId::of::<T>() == TypeId::of::<u8>() {
            let bytes = (self as &mut dyn Any)
                .downcast_mut::<Vec<u8>>()
                .expect("type checked above");
            return FieldMut::Bytes(bytes);
        }
        FieldMut::List(self)
    }
}

impl<T: Field + Default> OptionalField for Option<T> {
    fn get_or_insert_default(&mut self) -> &mut dyn Field {
        self.get_or_insert_with(T::default)
    }
}

impl<T: Field + Default> Field for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(T::shape)
    }

    fn view(&self) -> FieldRef<'_> {
        FieldRef::Optional(self.as_ref().map(|value| value as &dyn Field))
    }

    fn view_mut(&mut self) -> FieldMut<'_> {
        FieldMut::Optional(self)
    }
}

// Boxing only breaks up recursive records, so it is invisible on the wire.
impl<T: Field> Field for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn view(&self) -> FieldRef<'_> {
        (**self).view()
    }

    fn view_mut(&mut self) -> FieldMut<'_> {
        (**self).view_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_vectors_are_viewed_as_bytes() {
        let mut bytes = vec![1u8, 2, 3];
        assert!(<Vec<u8> as Field>::shape().is_bytes());
        assert!(matches!(bytes.view(), FieldRef::Bytes(b) if b == [1, 2, 3]));
        match bytes.view_mut() {
            FieldMut::Bytes(b) => b.push(4),
            _ => panic!("expected bytes"),
        }
        assert_eq!(vec![1, 2, 3, 4], bytes);
    }

    #[test]
    fn test_other_vectors_are_lists() {
        let mut values = vec![1i32, 2];
        assert!(!<Vec<i32> as Field>::shape().is_bytes());
        assert!(matches!(values.view(), FieldRef::List(items) if items.len() == 2));
        match values.view_mut() {
            FieldMut::List(list) => {
                list.reset(3);
                assert_eq!(3, list.len());
            }
            _ => panic!("expected list"),
        }
        assert_eq!(vec![0, 0, 0], values);
    }

    #[test]
    fn test_int_fields_parse_at_their_width() {
        let mut small = 0i8;
        match small.view_mut() {
            FieldMut::Int(int) => {
                assert_eq!(IntWidth::I8, int.width());
                assert!(int.set_from_str("300").is_err());
                int.set_from_str("-12").unwrap();
            }
            _ => panic!("expected int"),
        }
        assert_eq!(-12, small);
    }

    #[test]
    fn test_int_width_parse() {
        assert_eq!(Ok(255), IntWidth::U8.parse("255"));
        assert!(IntWidth::U8.parse("256").is_err());
        assert!(IntWidth::U32.parse("-1").is_err());
        assert_eq!(Ok(i64::MIN), IntWidth::I64.parse(&i64::MIN.to_string()));
    }

    #[test]
    fn test_optional_materializes_default() {
        let mut value: Option<Box<String>> = None;
        match value.view_mut() {
            FieldMut::Optional(optional) => match optional.get_or_insert_default().view_mut() {
                FieldMut::Str(s) => s.push_str("bobo"),
                _ => panic!("expected string"),
            },
            _ => panic!("expected optional"),
        }
        assert_eq!(Some(Box::new("bobo".to_string())), value);
    }

    #[test]
    fn test_shape_debug() {
        let shape = <Option<Vec<u16>> as Field>::shape();
        assert_eq!("optional list of u16", format!("{:?}", shape));
    }
}
