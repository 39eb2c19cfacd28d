//! This module contains the interface through which the engine queries the
//! symbolic heap, along with [`HeapSnapshot`], an in-memory implementation
//! of it.
//!
//! The engine never mutates the heap. Changes that follow from taking an
//! alternative are described by the alternative itself and applied by the
//! host once the branch commits.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
};

use crate::{
    class::{ClassHierarchy, ClassName},
    value::{HeapPosition, Origin},
};

/// An object already present in the heap that a symbolic reference may
/// alias.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AliasCandidate {
    /// The position of the object in the heap.
    pub position: HeapPosition,

    /// The origin through which the object was first reached.
    pub origin: Origin,
}

/// The queries that the engine issues against the symbolic heap.
pub trait HeapQuery
where
    Self: Debug,
{
    /// Gets the objects that a reference with the provided `origin` and
    /// static type `required` may alias, in a deterministic order.
    #[must_use]
    fn alias_candidates(&self, required: &ClassName, origin: &Origin) -> Vec<AliasCandidate>;

    /// Checks if a reference of static type `required` may point to an
    /// object that has not been seen before.
    #[must_use]
    fn fresh_object_admissible(&self, required: &ClassName) -> bool;

    /// Checks if the reference with the provided `origin` and static type
    /// `required` may be null.
    #[must_use]
    fn null_admissible(&self, required: &ClassName, origin: &Origin) -> bool;

    /// Gets the classes that a fresh object of static type `required` may
    /// have, in ascending order.
    #[must_use]
    fn expansion_classes(&self, required: &ClassName) -> Vec<ClassName> {
        if self.fresh_object_admissible(required) {
            vec![required.clone()]
        } else {
            vec![]
        }
    }

    /// Gets the class of the object at `position`, if there is one.
    #[must_use]
    fn dynamic_type(&self, position: HeapPosition) -> Option<ClassName>;

    /// Gets the position of the object that was discovered by resolving the
    /// reference with `origin` to a fresh object, if the heap holds it.
    ///
    /// A reference is never its own alias candidate, so once its expansion
    /// has been committed this is how the engine finds the object again.
    #[must_use]
    fn materialized(&self, _origin: &Origin) -> Option<HeapPosition> {
        None
    }
}

/// An object in a [`HeapSnapshot`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeapObject {
    /// The exact class of the object.
    pub class: ClassName,

    /// The origin through which the object was first reached, or [`None`] if
    /// the object was created by the analyzed program.
    pub origin: Option<Origin>,
}

/// An in-memory heap.
///
/// Positions are allocated in increasing order starting from zero.
#[derive(Clone, Debug)]
pub struct HeapSnapshot<'a> {
    hierarchy: &'a dyn ClassHierarchy,
    objects:   BTreeMap<HeapPosition, HeapObject>,
    non_null:  BTreeSet<Origin>,
}

impl<'a> HeapSnapshot<'a> {
    /// Constructs an empty heap whose classes are described by `hierarchy`.
    #[must_use]
    pub fn new(hierarchy: &'a dyn ClassHierarchy) -> Self {
        Self {
            hierarchy,
            objects: BTreeMap::new(),
            non_null: BTreeSet::new(),
        }
    }

    /// Allocates an object of `class` created by the analyzed program.
    pub fn allocate(&mut self, class: impl Into<ClassName>) -> HeapPosition {
        self.insert(HeapObject {
            class:  class.into(),
            origin: None,
        })
    }

    /// Adds an object of `class` that was discovered by resolving the
    /// symbolic reference with `origin`.
    pub fn discover(&mut self, class: impl Into<ClassName>, origin: Origin) -> HeapPosition {
        self.insert(HeapObject {
            class:  class.into(),
            origin: Some(origin),
        })
    }

    /// Records that the reference with `origin` is known not to be null.
    pub fn assume_non_null(&mut self, origin: Origin) {
        self.non_null.insert(origin);
    }

    /// Gets the object at `position`.
    #[must_use]
    pub fn object(&self, position: HeapPosition) -> Option<&HeapObject> {
        self.objects.get(&position)
    }

    /// Gets the number of objects in the heap.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Checks if the heap contains no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn insert(&mut self, object: HeapObject) -> HeapPosition {
        let position = self.objects.last_key_value().map_or(0, |(p, _)| p + 1);
        self.objects.insert(position, object);
        position
    }
}

impl HeapQuery for HeapSnapshot<'_> {
    fn alias_candidates(&self, required: &ClassName, origin: &Origin) -> Vec<AliasCandidate> {
        self.objects
            .iter()
            .filter_map(|(position, object)| {
                let candidate_origin = object.origin.as_ref()?;
                (candidate_origin != origin
                    && self.hierarchy.is_subclass(&object.class, required))
                .then(|| AliasCandidate {
                    position: *position,
                    origin:   candidate_origin.clone(),
                })
            })
            .collect()
    }

    fn fresh_object_admissible(&self, required: &ClassName) -> bool {
        !self.expansion_classes(required).is_empty()
    }

    fn null_admissible(&self, _required: &ClassName, origin: &Origin) -> bool {
        !self.non_null.contains(origin)
    }

    fn expansion_classes(&self, required: &ClassName) -> Vec<ClassName> {
        self.hierarchy.concrete_subclasses(required)
    }

    fn dynamic_type(&self, position: HeapPosition) -> Option<ClassName> {
        self.objects.get(&position).map(|o| o.class.clone())
    }

    fn materialized(&self, origin: &Origin) -> Option<HeapPosition> {
        self.objects
            .iter()
            .find(|(_, object)| object.origin.as_ref() == Some(origin))
            .map(|(position, _)| *position)
    }
}
