//! This module contains the values that the engine reasons about: positions
//! in the heap, references to heap objects, and the symbolic origins that
//! identify how a symbolic reference was first reached.

pub mod expression;

use std::fmt::{Display, Formatter};

pub use expression::Expression;

use crate::class::ClassName;

/// The position of an object in the heap. Positions are never reused within
/// a single heap, so they identify objects.
pub type HeapPosition = u64;

/// The access path by which a symbolic reference was first reached from the
/// roots of the analysis.
///
/// Two symbolic references with the same origin stand for the same unknown
/// value.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Origin {
    /// A root of the analysis, such as a parameter of the method under
    /// analysis.
    Root { name: String },

    /// A static field of a class.
    Static { class: ClassName, field: String },

    /// An instance field of the object reached through `container`.
    Field { container: Box<Origin>, field: String },

    /// An element of the array reached through `array`.
    ArrayElement { array: Box<Origin>, index: Expression },
}

impl Origin {
    /// Constructs a root origin called `name`.
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self::Root { name: name.into() }
    }

    /// Constructs the origin of a static `field` of `class`.
    #[must_use]
    pub fn static_field(class: impl Into<ClassName>, field: impl Into<String>) -> Self {
        Self::Static {
            class: class.into(),
            field: field.into(),
        }
    }

    /// Constructs the origin of the instance `field` of the object with this
    /// origin.
    #[must_use]
    pub fn field(&self, field: impl Into<String>) -> Self {
        Self::Field {
            container: Box::new(self.clone()),
            field:     field.into(),
        }
    }

    /// Constructs the origin of the element at `index` of the array with this
    /// origin.
    #[must_use]
    pub fn element(&self, index: Expression) -> Self {
        Self::ArrayElement {
            array: Box::new(self.clone()),
            index,
        }
    }

    /// Gets the number of dereferences between a root and this origin.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Root { .. } | Self::Static { .. } => 0,
            Self::Field { container, .. } => container.depth() + 1,
            Self::ArrayElement { array, .. } => array.depth() + 1,
        }
    }

    /// Checks if `self` is `other`, or is reached by dereferencing through
    /// `other`.
    #[must_use]
    pub fn descends_from(&self, other: &Origin) -> bool {
        if self == other {
            return true;
        }
        match self {
            Self::Root { .. } | Self::Static { .. } => false,
            Self::Field { container, .. } => container.descends_from(other),
            Self::ArrayElement { array, .. } => array.descends_from(other),
        }
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root { name } => write!(f, "{{ROOT}}:{name}"),
            Self::Static { class, field } => write!(f, "[{class}].{field}"),
            Self::Field { container, field } => write!(f, "{container}.{field}"),
            Self::ArrayElement { array, index } => write!(f, "{array}[{index}]"),
        }
    }
}

/// A reference whose value is unknown, standing for any object compatible
/// with its static type (or null).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ReferenceSymbolic {
    pub origin:      Origin,
    pub static_type: ClassName,
}

impl ReferenceSymbolic {
    /// Constructs a symbolic reference with `origin` and `static_type`.
    #[must_use]
    pub fn new(origin: Origin, static_type: impl Into<ClassName>) -> Self {
        Self {
            origin,
            static_type: static_type.into(),
        }
    }
}

impl Display for ReferenceSymbolic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.origin)
    }
}

/// A reference value.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Reference {
    /// The null reference.
    Null,

    /// A reference to the object at a known heap position.
    Concrete(HeapPosition),

    /// A reference that is not yet resolved.
    Symbolic(ReferenceSymbolic),
}

impl Reference {
    /// Gets the symbolic reference, if this reference is unresolved.
    #[must_use]
    pub fn as_symbolic(&self) -> Option<&ReferenceSymbolic> {
        match self {
            Self::Symbolic(reference) => Some(reference),
            _ => None,
        }
    }

    /// Checks if this is the null reference.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Concrete(position) => write!(f, "Object[{position}]"),
            Self::Symbolic(reference) => write!(f, "{reference}"),
        }
    }
}

impl From<ReferenceSymbolic> for Reference {
    fn from(value: ReferenceSymbolic) -> Self {
        Self::Symbolic(value)
    }
}
