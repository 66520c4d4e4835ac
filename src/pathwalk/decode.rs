//! Literal decoding into a node.

use super::error::{DecodeError, WriteError};
use super::node::{Node, ShapeMut};

/// Decode `literal` into `node` according to its shape.
///
/// The literal is trimmed first. Lists take a comma separated literal and are
/// rebuilt from scratch. Records and maps cannot be decoded from a literal.
pub fn assign(node: &mut dyn Node, literal: &str) -> Result<(), DecodeError> {
    let literal = literal.trim();
    let type_name = node.type_name();

    match node.shape_mut() {
        ShapeMut::Scalar(scalar) => scalar.parse_literal(literal),
        ShapeMut::Nullable(nullable) => assign(nullable.ensure(), literal),
        ShapeMut::List(list) => {
            let parts: Vec<&str> = literal.split(',').collect();
            list.reset(parts.len());
            for (index, part) in parts.into_iter().enumerate() {
                let element = list.element_mut(index).ok_or_else(|| {
                    WriteError::InvalidHandle(format!("list element {index} missing after reset"))
                })?;
                assign(element, part).map_err(|source| DecodeError::Element {
                    index,
                    source: Box::new(source),
                })?;
            }
            Ok(())
        }
        ShapeMut::Record(_) | ShapeMut::Map(_) => Err(DecodeError::Unsupported { type_name }),
    }
}
