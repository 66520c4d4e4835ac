//! Dot-path addressing into typed configuration records.
//!
//! A path like `remote.origin.url` is resolved field by field against a
//! destination record, creating unset optionals, map entries and list slots
//! on the way. Nothing is written to the destination until the returned
//! [`Located`] handle is committed, so a failed walk or a bad literal leaves
//! it exactly as it was.
//!
//! ```
//! use git_config_source::{pathwalk, record};
//!
//! #[derive(Debug, Clone, Default)]
//! struct Hooks {
//!     schedule: String,
//!     strict: Option<bool>,
//! }
//!
//! record!(Hooks { schedule, strict });
//!
//! let mut hooks = Hooks::default();
//! pathwalk::apply(&mut hooks, "strict", "true").unwrap();
//! assert_eq!(hooks.strict, Some(true));
//! ```

mod decode;
mod error;
mod node;
mod record;
mod snapshot;
mod walk;

pub use decode::assign;
pub use error::{DecodeError, Error, WalkError, WriteError};
pub use node::{
    Associative, Field, Node, Nullable, Ordered, Record, Reflect, Scalar, ScalarKind, Shape,
    ShapeMut,
};
pub use snapshot::snapshot;
pub use walk::MAX_LIST_LEN;

use tracing::trace;
use walk::{PendingWrites, Slot};

/// Path walker configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Walker {
    allow_unsafe: bool,
}

impl Walker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow writes that pass through `#[private]` record fields.
    pub fn with_unsafe_access(mut self) -> Self {
        self.allow_unsafe = true;
        self
    }

    /// Resolve `path` inside `dest` and return a handle to the leaf.
    pub fn locate<'a>(&self, dest: &'a mut dyn Node, path: &str) -> Result<Located<'a>, Error> {
        if !matches!(dest.shape(), Shape::Record(_)) {
            return Err(Error::InvalidDestination {
                type_name: dest.type_name(),
            });
        }
        if path.is_empty() {
            return Err(Error::EmptyPath);
        }

        let (leaf, writes) = walk::walk(dest, path).map_err(|source| Error::Walk {
            path: path.to_string(),
            source,
        })?;
        trace!(path, pending = writes.len(), "located path");

        Ok(Located {
            dest,
            writes,
            leaf,
            allow_unsafe: self.allow_unsafe,
            path: path.to_string(),
        })
    }

    /// Decode `literal` into the value at `path` and write it to `dest`.
    pub fn apply(&self, dest: &mut dyn Node, path: &str, literal: &str) -> Result<(), Error> {
        let mut located = self.locate(dest, path)?;
        located.set_literal(literal)?;
        located.commit()
    }
}

/// Locate `path` in `dest` with the default walker.
pub fn locate<'a>(dest: &'a mut dyn Node, path: &str) -> Result<Located<'a>, Error> {
    Walker::new().locate(dest, path)
}

/// Apply `literal` at `path` in `dest` with the default walker.
pub fn apply(dest: &mut dyn Node, path: &str, literal: &str) -> Result<(), Error> {
    Walker::new().apply(dest, path, literal)
}

/// A resolved path together with the writes needed to reach it.
///
/// The leaf may live in a staged value rather than in the destination. Reads
/// and writes through the handle see the staged value; [`commit`](Self::commit)
/// splices everything into the destination.
pub struct Located<'a> {
    dest: &'a mut dyn Node,
    writes: PendingWrites,
    leaf: Slot,
    allow_unsafe: bool,
    path: String,
}

impl<'a> Located<'a> {
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Number of writes waiting for [`commit`](Self::commit).
    pub fn pending(&self) -> usize {
        self.writes.len()
    }

    pub fn get(&self) -> Result<&dyn Node, Error> {
        self.writes
            .resolve(&*self.dest, &self.leaf)
            .map_err(|source| self.access_error(source))
    }

    /// Mutable access to the leaf. Leaves inside the destination are written
    /// immediately, leaves inside staged values on commit.
    pub fn get_mut(&mut self) -> Result<&mut dyn Node, Error> {
        let path = &self.path;
        let access_error = |source| Error::Access {
            path: path.clone(),
            source,
        };

        let node = self
            .writes
            .resolve_mut(&mut *self.dest, &self.leaf)
            .map_err(access_error)?;
        if self.leaf.private && !self.allow_unsafe {
            return Err(access_error(WriteError::NeedsUnsafe {
                type_name: node.type_name(),
            }));
        }
        Ok(node)
    }

    pub fn downcast_mut<V: Node>(&mut self) -> Result<&mut V, Error> {
        let path = self.path.clone();
        let node = self.get_mut()?;
        let found = node.type_name();
        node.as_any_mut()
            .downcast_mut::<V>()
            .ok_or_else(|| Error::Access {
                path,
                source: WriteError::TypeMismatch {
                    expected: std::any::type_name::<V>(),
                    found,
                },
            })
    }

    /// Decode `literal` into a copy of the leaf and stage it as a write.
    ///
    /// On failure nothing is staged.
    pub fn set_literal(&mut self, literal: &str) -> Result<(), Error> {
        let mut value = self.get()?.clone_node();
        assign(&mut *value, literal).map_err(|source| Error::Decode {
            path: self.path.clone(),
            source,
        })?;
        self.writes.replace(self.leaf.clone(), value);
        Ok(())
    }

    /// Apply the staged writes to the destination, latest first.
    ///
    /// Not transactional: writes applied before a failing one stay applied.
    pub fn commit(self) -> Result<(), Error> {
        self.writes
            .commit(self.dest, self.allow_unsafe)
            .map_err(|source| Error::Commit { source })
    }

    fn access_error(&self, source: WriteError) -> Error {
        Error::Access {
            path: self.path.clone(),
            source,
        }
    }
}
