//! Capability traits describing how a value can be walked.
//!
//! Every walkable type implements [`Node`]; its [`Shape`] says which one of
//! the five capabilities it offers. Records come from the
//! [`record!`](crate::record) macro, everything else is implemented here for
//! the standard library types that show up in configuration structs.

use super::error::{DecodeError, WriteError};
use serde_json::Value;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Type-erased plumbing shared by every node. Implemented for all
/// `Node + Clone` types.
pub trait Reflect: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn type_name(&self) -> &'static str;
    fn clone_node(&self) -> Box<dyn Node>;
    /// Overwrite `self` with `value`, which must hold the same concrete type.
    fn assign(&mut self, value: Box<dyn Node>) -> Result<(), WriteError>;
}

impl<T: Node + Clone> Reflect for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn clone_node(&self) -> Box<dyn Node> {
        Box::new(self.clone())
    }

    fn assign(&mut self, value: Box<dyn Node>) -> Result<(), WriteError> {
        let found = value.type_name();
        match value.into_any().downcast::<T>() {
            Ok(value) => {
                *self = *value;
                Ok(())
            }
            Err(_) => Err(WriteError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                found,
            }),
        }
    }
}

/// A value the path walker can navigate.
pub trait Node: Reflect + Send {
    fn shape(&self) -> Shape<'_>;
    fn shape_mut(&mut self) -> ShapeMut<'_>;
}

/// Read-only view of a node's capability.
pub enum Shape<'a> {
    Record(&'a dyn Record),
    Map(&'a dyn Associative),
    List(&'a dyn Ordered),
    Nullable(&'a dyn Nullable),
    Scalar(&'a dyn Scalar),
}

/// Mutable view of a node's capability.
pub enum ShapeMut<'a> {
    Record(&'a mut dyn Record),
    Map(&'a mut dyn Associative),
    List(&'a mut dyn Ordered),
    Nullable(&'a mut dyn Nullable),
    Scalar(&'a mut dyn Scalar),
}

/// Declared field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    /// Fields of an embedded record resolve as if declared on the parent.
    pub embedded: bool,
    /// Writes reached through this field need unsafe access.
    pub private: bool,
}

impl Field {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            embedded: false,
            private: false,
        }
    }

    pub const fn embedded(self) -> Self {
        Self {
            embedded: true,
            ..self
        }
    }

    pub const fn private(self) -> Self {
        Self {
            private: true,
            ..self
        }
    }

    /// Case-insensitive comparison that ignores `_` and `-`, so git's
    /// `invertschedule` matches the `invert_schedule` field.
    pub fn matches(&self, segment: &str) -> bool {
        let mut name = self.name.chars().filter(|c| !matches!(c, '_' | '-'));
        let mut segment = segment.chars().filter(|c| !matches!(c, '_' | '-'));
        loop {
            match (name.next(), segment.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if a.to_lowercase().eq(b.to_lowercase()) => {}
                _ => return false,
            }
        }
    }
}

/// Struct-like node with named fields.
pub trait Record {
    fn fields(&self) -> &'static [Field];
    fn field(&self, name: &str) -> Option<&dyn Node>;
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Node>;
}

/// String-keyed map.
pub trait Associative {
    fn get(&self, key: &str) -> Option<&dyn Node>;
    /// A default value of the element type, detached from the map.
    fn empty_value(&self) -> Box<dyn Node>;
    fn insert(&mut self, key: String, value: Box<dyn Node>) -> Result<(), WriteError>;
    fn entries(&self) -> Vec<(&str, &dyn Node)>;
}

/// Index-addressable list.
pub trait Ordered {
    fn len(&self) -> usize;
    fn element(&self, index: usize) -> Option<&dyn Node>;
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node>;
    /// A copy of this list padded with default elements up to `len`.
    fn grown(&self, len: usize) -> Box<dyn Node>;
    /// Replace the contents with `len` default elements.
    fn reset(&mut self, len: usize);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Optional value.
pub trait Nullable {
    fn inner(&self) -> Option<&dyn Node>;
    fn inner_mut(&mut self) -> Option<&mut dyn Node>;
    /// A default payload, detached from this slot.
    fn materialize(&self) -> Box<dyn Node>;
    /// Set the payload to `value`.
    fn attach(&mut self, value: Box<dyn Node>) -> Result<(), WriteError>;
    /// Set a default payload if unset and return it.
    fn ensure(&mut self) -> &mut dyn Node;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Bool,
    Int,
    Uint,
    Float,
}

/// Terminal value decoded from a literal.
pub trait Scalar {
    fn kind(&self) -> ScalarKind;
    /// Decode an already trimmed literal into `self`.
    fn parse_literal(&mut self, literal: &str) -> Result<(), DecodeError>;
    fn to_json(&self) -> Value;
}

macro_rules! scalar_node {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Node for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Scalar(self)
                }

                fn shape_mut(&mut self) -> ShapeMut<'_> {
                    ShapeMut::Scalar(self)
                }
            }
        )*
    };
}

scalar_node!(
    String, PathBuf, bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64
);

impl Scalar for String {
    fn kind(&self) -> ScalarKind {
        ScalarKind::String
    }

    fn parse_literal(&mut self, literal: &str) -> Result<(), DecodeError> {
        *self = literal.to_string();
        Ok(())
    }

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Scalar for PathBuf {
    fn kind(&self) -> ScalarKind {
        ScalarKind::String
    }

    fn parse_literal(&mut self, literal: &str) -> Result<(), DecodeError> {
        *self = PathBuf::from(literal);
        Ok(())
    }

    fn to_json(&self) -> Value {
        Value::String(self.to_string_lossy().into_owned())
    }
}

impl Scalar for bool {
    fn kind(&self) -> ScalarKind {
        ScalarKind::Bool
    }

    fn parse_literal(&mut self, literal: &str) -> Result<(), DecodeError> {
        *self = match literal {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => true,
            "0" | "f" | "F" | "FALSE" | "false" | "False" => false,
            _ => {
                return Err(DecodeError::Bool {
                    value: literal.to_string(),
                });
            }
        };
        Ok(())
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! integer_scalar {
    ($kind:ident, $error:ident: $($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                fn kind(&self) -> ScalarKind {
                    ScalarKind::$kind
                }

                fn parse_literal(&mut self, literal: &str) -> Result<(), DecodeError> {
                    *self = literal.parse::<$ty>().map_err(|source| DecodeError::$error {
                        value: literal.to_string(),
                        source,
                    })?;
                    Ok(())
                }

                fn to_json(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

integer_scalar!(Int, Int: i8, i16, i32, i64, isize);
integer_scalar!(Uint, Uint: u8, u16, u32, u64, usize);

macro_rules! float_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                fn kind(&self) -> ScalarKind {
                    ScalarKind::Float
                }

                fn parse_literal(&mut self, literal: &str) -> Result<(), DecodeError> {
                    *self = literal.parse::<$ty>().map_err(|source| DecodeError::Float {
                        value: literal.to_string(),
                        source,
                    })?;
                    Ok(())
                }

                fn to_json(&self) -> Value {
                    serde_json::Number::from_f64(f64::from(*self))
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
        )*
    };
}

float_scalar!(f32, f64);

impl<T: Node + Default + Clone> Node for Option<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Nullable(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Nullable(self)
    }
}

impl<T: Node + Default + Clone> Nullable for Option<T> {
    fn inner(&self) -> Option<&dyn Node> {
        self.as_ref().map(|v| v as &dyn Node)
    }

    fn inner_mut(&mut self) -> Option<&mut dyn Node> {
        self.as_mut().map(|v| v as &mut dyn Node)
    }

    fn materialize(&self) -> Box<dyn Node> {
        Box::new(T::default())
    }

    fn attach(&mut self, value: Box<dyn Node>) -> Result<(), WriteError> {
        let mut payload = T::default();
        payload.assign(value)?;
        *self = Some(payload);
        Ok(())
    }

    fn ensure(&mut self) -> &mut dyn Node {
        self.get_or_insert_with(T::default)
    }
}

impl<T: Node + Default + Clone> Node for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::List(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::List(self)
    }
}

impl<T: Node + Default + Clone> Ordered for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, index: usize) -> Option<&dyn Node> {
        self.get(index).map(|v| v as &dyn Node)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node> {
        self.get_mut(index).map(|v| v as &mut dyn Node)
    }

    fn grown(&self, len: usize) -> Box<dyn Node> {
        let mut grown = self.clone();
        grown.resize_with(len.max(Vec::len(self)), T::default);
        Box::new(grown)
    }

    fn reset(&mut self, len: usize) {
        self.clear();
        self.resize_with(len, T::default);
    }
}

macro_rules! map_node {
    ($map:ident) => {
        impl<V: Node + Default + Clone> Node for $map<String, V> {
            fn shape(&self) -> Shape<'_> {
                Shape::Map(self)
            }

            fn shape_mut(&mut self) -> ShapeMut<'_> {
                ShapeMut::Map(self)
            }
        }

        impl<V: Node + Default + Clone> Associative for $map<String, V> {
            fn get(&self, key: &str) -> Option<&dyn Node> {
                $map::get(self, key).map(|v| v as &dyn Node)
            }

            fn empty_value(&self) -> Box<dyn Node> {
                Box::new(V::default())
            }

            fn insert(&mut self, key: String, value: Box<dyn Node>) -> Result<(), WriteError> {
                let mut element = V::default();
                element.assign(value)?;
                $map::insert(self, key, element);
                Ok(())
            }

            fn entries(&self) -> Vec<(&str, &dyn Node)> {
                self.iter()
                    .map(|(k, v)| (k.as_str(), v as &dyn Node))
                    .collect()
            }
        }
    };
}

map_node!(HashMap);
map_node!(BTreeMap);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_matching() {
        let field = Field::new("invert_schedule");
        assert!(field.matches("invertschedule"));
        assert!(field.matches("InvertSchedule"));
        assert!(field.matches("invert-schedule"));
        assert!(!field.matches("invert"));
        assert!(!field.matches("invertschedules"));
    }

    #[test]
    fn test_field_flags() {
        const FIELD: Field = Field::new("base").embedded().private();
        assert!(FIELD.embedded);
        assert!(FIELD.private);
        assert!(!Field::new("x").embedded);
    }

    #[test]
    fn test_assign_checks_type() {
        let mut value = 1i64;
        value.assign(Box::new(7i64)).unwrap();
        assert_eq!(value, 7);

        let err = value.assign(Box::new(String::from("x"))).unwrap_err();
        assert!(matches!(err, WriteError::TypeMismatch { .. }), "{err}");
    }

    #[test]
    fn test_bool_literals() {
        let mut flag = false;
        for literal in ["1", "t", "T", "TRUE", "true", "True"] {
            flag.parse_literal(literal).unwrap();
            assert!(flag, "{literal}");
        }
        for literal in ["0", "f", "F", "FALSE", "false", "False"] {
            flag.parse_literal(literal).unwrap();
            assert!(!flag, "{literal}");
        }
        assert!(flag.parse_literal("yes").is_err());
        assert!(flag.parse_literal("42").is_err());
    }

    #[test]
    fn test_integer_width_is_checked() {
        let mut small = 0u8;
        small.parse_literal("255").unwrap();
        assert_eq!(small, 255);
        assert!(small.parse_literal("256").is_err());
        assert!(small.parse_literal("-1").is_err());
    }

    #[test]
    fn test_list_growth_keeps_elements() {
        let list = vec![1u32, 2, 3];
        let grown = list.grown(5);
        let grown = grown.as_any().downcast_ref::<Vec<u32>>().unwrap();
        assert_eq!(grown, &vec![1, 2, 3, 0, 0]);
    }

    #[test]
    fn test_nullable_attach() {
        let mut slot: Option<String> = None;
        slot.attach(Box::new(String::from("set"))).unwrap();
        assert_eq!(slot.as_deref(), Some("set"));
        assert!(slot.attach(Box::new(3u8)).is_err());
    }
}
