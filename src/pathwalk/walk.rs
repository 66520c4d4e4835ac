//! Path resolution and deferred writes.
//!
//! Walking never mutates the destination. Whenever the path passes through a
//! value that does not exist yet (an unset optional, a missing map key, a list
//! index past the end) the walk stages a detached replacement in an arena and
//! records the write that will splice it back in. Slots are paths from either
//! the destination or an arena entry, and are re-resolved when needed, so no
//! borrow outlives a single step.

use super::error::{WalkError, WriteError};
use super::node::{Field, Node, Record, Shape, ShapeMut};

/// Largest length a list may be grown to by addressing an index past its end.
pub const MAX_LIST_LEN: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Root {
    Dest,
    Detached(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Field(&'static str),
    Inner,
    Index(usize),
}

/// Location of a value, relative to the destination or a staged value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Slot {
    pub root: Root,
    pub steps: Vec<Step>,
    /// Reached through a `#[private]` field since the root.
    pub private: bool,
}

impl Slot {
    pub fn dest() -> Self {
        Self {
            root: Root::Dest,
            steps: Vec::new(),
            private: false,
        }
    }

    fn detached(index: usize) -> Self {
        Self {
            root: Root::Detached(index),
            steps: Vec::new(),
            private: false,
        }
    }

    fn with(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

/// A write recorded during the walk. `value` indexes the detached arena.
#[derive(Debug)]
pub(crate) enum PendingWrite {
    Attach { target: Slot, value: usize },
    Replace { target: Slot, value: usize },
    Insert { target: Slot, key: String, value: usize },
}

impl PendingWrite {
    fn target(&self) -> &Slot {
        match self {
            PendingWrite::Attach { target, .. }
            | PendingWrite::Replace { target, .. }
            | PendingWrite::Insert { target, .. } => target,
        }
    }

    fn value(&self) -> usize {
        match self {
            PendingWrite::Attach { value, .. }
            | PendingWrite::Replace { value, .. }
            | PendingWrite::Insert { value, .. } => *value,
        }
    }
}

/// Staged values plus the writes that splice them into the destination.
#[derive(Default)]
pub(crate) struct PendingWrites {
    ops: Vec<PendingWrite>,
    detached: Vec<Option<Box<dyn Node>>>,
}

enum Next {
    Deref,
    Attach(Box<dyn Node>),
    Route(Vec<Field>),
    Entry(Box<dyn Node>),
    Index(usize),
    Grow(Box<dyn Node>, usize),
}

/// Resolve `path` against `dest`, returning the leaf slot and the writes
/// needed to make it reachable.
pub(crate) fn walk(dest: &dyn Node, path: &str) -> Result<(Slot, PendingWrites), WalkError> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut writes = PendingWrites::default();
    let mut slot = Slot::dest();
    let mut index = 0;

    while index < segments.len() {
        let segment = segments[index].trim();

        let next = {
            let node = writes.resolve(dest, &slot)?;
            match node.shape() {
                Shape::Nullable(nullable) => match nullable.inner() {
                    Some(_) => Next::Deref,
                    None => Next::Attach(nullable.materialize()),
                },
                Shape::Record(record) => match find_route(record, segment) {
                    Some(route) => Next::Route(route),
                    None => {
                        return Err(WalkError::NotFound {
                            segment: segment.to_string(),
                        });
                    }
                },
                Shape::Map(map) => Next::Entry(match map.get(segment) {
                    Some(existing) => existing.clone_node(),
                    None => map.empty_value(),
                }),
                Shape::List(list) => {
                    let position =
                        segment
                            .parse::<usize>()
                            .map_err(|source| WalkError::InvalidIndex {
                                segment: segment.to_string(),
                                source,
                            })?;
                    if position < list.len() {
                        Next::Index(position)
                    } else {
                        let len = position
                            .checked_add(1)
                            .filter(|len| *len <= MAX_LIST_LEN)
                            .ok_or(WalkError::IndexOutOfRange {
                                index: position,
                                limit: MAX_LIST_LEN,
                            })?;
                        Next::Grow(list.grown(len), position)
                    }
                }
                Shape::Scalar(_) => {
                    return Err(WalkError::Unhandled {
                        type_name: node.type_name(),
                        remaining: segments[index..].join("."),
                    });
                }
            }
        };

        slot = match next {
            // nullables do not consume a segment
            Next::Deref => slot.with(Step::Inner),
            Next::Attach(payload) => writes.attach(slot, payload),
            Next::Route(route) => {
                index += 1;
                let last = route.len() - 1;
                for (hop, field) in route.into_iter().enumerate() {
                    slot.private |= field.private;
                    slot = slot.with(Step::Field(field.name));
                    if hop < last {
                        slot = writes.enter_nullable(dest, slot)?;
                    }
                }
                slot
            }
            Next::Entry(element) => {
                index += 1;
                writes.insert(slot, segment.to_string(), element)
            }
            Next::Index(position) => {
                index += 1;
                slot.with(Step::Index(position))
            }
            Next::Grow(grown, position) => {
                index += 1;
                writes.replace(slot, grown).with(Step::Index(position))
            }
        };
    }

    Ok((slot, writes))
}

/// Find the fields leading to `segment`, descending into embedded records.
///
/// The shallowest match wins. Several matches at that depth are ambiguous
/// and resolve to nothing.
pub(crate) fn find_route(record: &dyn Record, segment: &str) -> Option<Vec<Field>> {
    let mut routes = Vec::new();
    collect_routes(record, segment, &mut Vec::new(), &mut routes);

    let shortest = routes.iter().map(Vec::len).min()?;
    let mut candidates = routes.into_iter().filter(|route| route.len() == shortest);
    let route = candidates.next()?;
    match candidates.next() {
        Some(_) => None,
        None => Some(route),
    }
}

fn collect_routes(
    record: &dyn Record,
    segment: &str,
    prefix: &mut Vec<Field>,
    routes: &mut Vec<Vec<Field>>,
) {
    for field in record.fields() {
        prefix.push(*field);

        if field.matches(segment) {
            routes.push(prefix.clone());
        }

        if let Some(child) = record.field(field.name).filter(|_| field.embedded) {
            match child.shape() {
                Shape::Record(inner) => collect_routes(inner, segment, prefix, routes),
                Shape::Nullable(nullable) => match nullable.inner() {
                    Some(payload) => {
                        if let Shape::Record(inner) = payload.shape() {
                            collect_routes(inner, segment, prefix, routes);
                        }
                    }
                    None => {
                        let probe = nullable.materialize();
                        if let Shape::Record(inner) = probe.shape() {
                            collect_routes(inner, segment, prefix, routes);
                        }
                    }
                },
                _ => {}
            }
        }

        prefix.pop();
    }
}

impl PendingWrites {
    /// Number of writes waiting for commit.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn resolve<'n>(&'n self, dest: &'n dyn Node, slot: &Slot) -> Result<&'n dyn Node, WriteError> {
        let mut node: &dyn Node = match slot.root {
            Root::Dest => dest,
            Root::Detached(index) => self
                .detached
                .get(index)
                .and_then(|value| value.as_deref())
                .ok_or_else(|| WriteError::InvalidHandle(format!("staged value {index} is gone")))?,
        };
        for step in &slot.steps {
            node = descend(node, step).ok_or_else(|| unreachable_step(step))?;
        }
        Ok(node)
    }

    pub fn resolve_mut<'n>(
        &'n mut self,
        dest: &'n mut dyn Node,
        slot: &Slot,
    ) -> Result<&'n mut dyn Node, WriteError> {
        let mut node: &mut dyn Node = match slot.root {
            Root::Dest => dest,
            Root::Detached(index) => self
                .detached
                .get_mut(index)
                .and_then(|value| value.as_deref_mut())
                .ok_or_else(|| WriteError::InvalidHandle(format!("staged value {index} is gone")))?,
        };
        for step in &slot.steps {
            node = descend_mut(node, step).ok_or_else(|| unreachable_step(step))?;
        }
        Ok(node)
    }

    fn stash(&mut self, value: Box<dyn Node>) -> usize {
        self.detached.push(Some(value));
        self.detached.len() - 1
    }

    fn attach(&mut self, target: Slot, payload: Box<dyn Node>) -> Slot {
        let value = self.stash(payload);
        self.ops.push(PendingWrite::Attach { target, value });
        Slot::detached(value)
    }

    pub fn replace(&mut self, target: Slot, payload: Box<dyn Node>) -> Slot {
        let value = self.stash(payload);
        self.ops.push(PendingWrite::Replace { target, value });
        Slot::detached(value)
    }

    fn insert(&mut self, target: Slot, key: String, element: Box<dyn Node>) -> Slot {
        let value = self.stash(element);
        self.ops.push(PendingWrite::Insert { target, key, value });
        Slot::detached(value)
    }

    /// Step through the optional at `slot`, if it is one.
    fn enter_nullable(&mut self, dest: &dyn Node, slot: Slot) -> Result<Slot, WriteError> {
        let payload = match self.resolve(dest, &slot)?.shape() {
            Shape::Nullable(nullable) => match nullable.inner() {
                Some(_) => return Ok(slot.with(Step::Inner)),
                None => nullable.materialize(),
            },
            _ => return Ok(slot),
        };
        Ok(self.attach(slot, payload))
    }

    /// Apply every write, most recently discovered first.
    ///
    /// Stops at the first failure. Writes applied before it stay applied.
    pub fn commit(mut self, dest: &mut dyn Node, allow_unsafe: bool) -> Result<(), WriteError> {
        while let Some(op) = self.ops.pop() {
            self.apply(dest, op, allow_unsafe)?;
        }
        Ok(())
    }

    fn apply(&mut self, dest: &mut dyn Node, op: PendingWrite, allow_unsafe: bool) -> Result<(), WriteError> {
        let index = op.value();
        let value = self
            .detached
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| WriteError::InvalidHandle(format!("staged value {index} was already applied")))?;

        let target = self.resolve_mut(dest, op.target())?;
        let type_name = target.type_name();
        if op.target().private && !allow_unsafe {
            return Err(WriteError::NeedsUnsafe { type_name });
        }

        let misfit = || WriteError::InvalidHandle(format!("staged write does not fit a {type_name}"));
        match op {
            PendingWrite::Replace { .. } => target.assign(value),
            PendingWrite::Attach { .. } => match target.shape_mut() {
                ShapeMut::Nullable(nullable) => nullable.attach(value),
                _ => Err(misfit()),
            },
            PendingWrite::Insert { key, .. } => match target.shape_mut() {
                ShapeMut::Map(map) => map.insert(key, value),
                _ => Err(misfit()),
            },
        }
    }
}

fn descend<'n>(node: &'n dyn Node, step: &Step) -> Option<&'n dyn Node> {
    match (node.shape(), step) {
        (Shape::Record(record), Step::Field(name)) => record.field(name),
        (Shape::Nullable(nullable), Step::Inner) => nullable.inner(),
        (Shape::List(list), Step::Index(index)) => list.element(*index),
        _ => None,
    }
}

fn descend_mut<'n>(node: &'n mut dyn Node, step: &Step) -> Option<&'n mut dyn Node> {
    match (node.shape_mut(), step) {
        (ShapeMut::Record(record), Step::Field(name)) => record.field_mut(name),
        (ShapeMut::Nullable(nullable), Step::Inner) => nullable.inner_mut(),
        (ShapeMut::List(list), Step::Index(index)) => list.element_mut(*index),
        _ => None,
    }
}

fn unreachable_step(step: &Step) -> WriteError {
    WriteError::InvalidHandle(format!("slot step {step:?} no longer resolves"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Clone, Default)]
    struct Leaf {
        value: i64,
    }

    #[derive(Debug, Clone, Default)]
    struct Base {
        shared: String,
        depth: u8,
    }

    #[derive(Debug, Clone, Default)]
    struct Other {
        shared: String,
    }

    #[derive(Debug, Clone, Default)]
    struct Tree {
        name: String,
        leaf: Option<Leaf>,
        list: Vec<u32>,
        map: HashMap<String, Leaf>,
        count: u16,
        count_: u16,
        base: Option<Base>,
    }

    #[derive(Debug, Clone, Default)]
    struct Ambiguous {
        base: Base,
        other: Other,
    }

    crate::record!(Leaf { value });
    crate::record!(Base { shared, depth });
    crate::record!(Other { shared });
    crate::record!(Tree {
        name,
        leaf,
        list,
        map,
        count,
        count_,
        #[embedded]
        base,
    });
    crate::record!(Ambiguous {
        #[embedded]
        base,
        #[embedded]
        other,
    });

    #[test]
    fn test_existing_field_needs_no_writes() {
        let tree = Tree::default();
        let (slot, writes) = walk(&tree, "name").unwrap();
        assert_eq!(slot.steps, vec![Step::Field("name")]);
        assert_eq!(slot.root, Root::Dest);
        assert_eq!(writes.len(), 0);
    }

    #[test]
    fn test_unset_optional_is_staged() {
        let tree = Tree::default();
        let (slot, writes) = walk(&tree, "leaf.value").unwrap();
        assert_eq!(slot.root, Root::Detached(0));
        assert_eq!(slot.steps, vec![Step::Field("value")]);
        assert_eq!(writes.len(), 1);
        assert!(tree.leaf.is_none());
    }

    #[test]
    fn test_set_optional_is_entered() {
        let tree = Tree {
            leaf: Some(Leaf { value: 3 }),
            ..Tree::default()
        };
        let (slot, writes) = walk(&tree, "leaf.value").unwrap();
        assert_eq!(
            slot.steps,
            vec![Step::Field("leaf"), Step::Inner, Step::Field("value")]
        );
        assert_eq!(writes.len(), 0);
    }

    #[test]
    fn test_embedded_optional_is_materialized() {
        let mut tree = Tree::default();
        let (slot, writes) = walk(&tree, "Depth").unwrap();
        assert_eq!(slot.root, Root::Detached(0));
        assert_eq!(slot.steps, vec![Step::Field("depth")]);

        writes.commit(&mut tree, false).unwrap();
        assert!(tree.base.is_some());
    }

    #[test]
    fn test_same_depth_duplicates_are_ambiguous() {
        let tree = Tree::default();
        let err = walk(&tree, "count").err().unwrap();
        assert!(matches!(err, WalkError::NotFound { .. }), "{err}");

        let ambiguous = Ambiguous::default();
        let err = walk(&ambiguous, "shared").err().unwrap();
        assert!(matches!(err, WalkError::NotFound { .. }), "{err}");
        assert!(walk(&ambiguous, "depth").is_ok());
    }

    #[test]
    fn test_scalar_with_remaining_path() {
        let tree = Tree::default();
        let err = walk(&tree, "leaf.value.deeper.still").err().unwrap();
        assert_eq!(
            err.to_string(),
            "unhandled type i64 to handle remaining path deeper.still"
        );
    }

    #[test]
    fn test_list_index_must_be_unsigned() {
        let tree = Tree::default();
        let err = walk(&tree, "list.-1").err().unwrap();
        assert!(matches!(err, WalkError::InvalidIndex { .. }), "{err}");
    }

    #[test]
    fn test_list_index_growth_is_bounded() {
        let tree = Tree::default();

        let err = walk(&tree, "list.18446744073709551615").err().unwrap();
        assert!(
            matches!(err, WalkError::IndexOutOfRange { index: usize::MAX, .. }),
            "{err}"
        );

        let err = walk(&tree, "list.1000000000000").err().unwrap();
        assert!(matches!(err, WalkError::IndexOutOfRange { .. }), "{err}");

        let last = (MAX_LIST_LEN - 1).to_string();
        assert!(walk(&tree, &format!("list.{last}")).is_ok());
        let err = walk(&tree, &format!("list.{MAX_LIST_LEN}")).err().unwrap();
        assert_eq!(
            err.to_string(),
            format!("slice index {MAX_LIST_LEN} exceeds the maximum list length {MAX_LIST_LEN}")
        );
    }

    #[test]
    fn test_commit_is_reverse_order() {
        let mut tree = Tree::default();
        let (slot, mut writes) = walk(&tree, "map.key.value").unwrap();
        assert_eq!(writes.len(), 1);

        writes.replace(slot, Box::new(9i64));
        writes.commit(&mut tree, false).unwrap();
        assert_eq!(tree.map.get("key").map(|leaf| leaf.value), Some(9));
    }

    #[test]
    fn test_commit_stops_at_first_failure() {
        let mut tree = Tree::default();
        let (_, mut writes) = walk(&tree, "leaf").unwrap();

        writes.replace(Slot::dest().with(Step::Field("name")), Box::new(1u8));
        writes.replace(Slot::dest().with(Step::Field("list")), Box::new(vec![7u32]));

        let err = writes.commit(&mut tree, false).unwrap_err();
        assert!(matches!(err, WriteError::TypeMismatch { .. }), "{err}");
        assert_eq!(tree.list, vec![7]);
        assert!(tree.name.is_empty());
    }
}
