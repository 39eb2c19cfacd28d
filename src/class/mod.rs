//! This module contains the vocabulary for talking about classes and their
//! members, along with the class-metadata service that the resolver and the
//! heap consult.

pub mod hierarchy;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use hierarchy::{ClassFile, ClassFlags, ClassHierarchy, ClassTable, MethodFlags, MethodInfo};

/// The name of a class, interface or array type in internal binary form (e.g.
/// `java/lang/Object` or `[Ljava/lang/String;`).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ClassName(String);

impl ClassName {
    /// Constructs a class name from its internal binary form.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Gets the internal binary form of the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks if the name denotes an array type.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.0.starts_with('[')
    }

    /// Constructs the name of the array type whose components are of type
    /// `self`.
    #[must_use]
    pub fn array_of(&self) -> Self {
        if self.is_array() {
            Self(format!("[{}", self.0))
        } else if let Some(primitive) = self.primitive_descriptor() {
            Self(format!("[{primitive}"))
        } else {
            Self(format!("[L{};", self.0))
        }
    }

    /// Gets the component type of an array type, or [`None`] if `self` is not
    /// an array type.
    #[must_use]
    pub fn component(&self) -> Option<Self> {
        let component = self.0.strip_prefix('[')?;
        if component.starts_with('[') {
            Some(Self(component.into()))
        } else if let Some(class) =
            component.strip_prefix('L').and_then(|c| c.strip_suffix(';'))
        {
            Some(Self(class.into()))
        } else {
            Some(Self(component.into()))
        }
    }

    /// Checks if the name denotes a reference type, as opposed to one of the
    /// primitive types.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.primitive_descriptor().is_none()
    }

    /// Gets the descriptor character of a primitive type name.
    fn primitive_descriptor(&self) -> Option<char> {
        match self.0.as_str() {
            "Z" | "boolean" => Some('Z'),
            "B" | "byte" => Some('B'),
            "C" | "char" => Some('C'),
            "S" | "short" => Some('S'),
            "I" | "int" => Some('I'),
            "J" | "long" => Some('J'),
            "F" | "float" => Some('F'),
            "D" | "double" => Some('D'),
            _ => None,
        }
    }
}

impl Display for ClassName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClassName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The symbolic signature of a method: the class that declares it (or is
/// referenced as declaring it), its descriptor and its name.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MethodSignature {
    pub class:      ClassName,
    pub descriptor: String,
    pub name:       String,
}

impl MethodSignature {
    /// Constructs a new method signature.
    #[must_use]
    pub fn new(
        class: impl Into<ClassName>,
        descriptor: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            class:      class.into(),
            descriptor: descriptor.into(),
            name:       name.into(),
        }
    }

    /// Gets the same name and descriptor as declared in `class`.
    #[must_use]
    pub fn in_class(&self, class: &ClassName) -> Self {
        Self {
            class:      class.clone(),
            descriptor: self.descriptor.clone(),
            name:       self.name.clone(),
        }
    }
}

impl Display for MethodSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.class, self.descriptor, self.name)
    }
}

/// The symbolic signature of a field.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FieldSignature {
    pub class:      ClassName,
    pub descriptor: String,
    pub name:       String,
}

impl FieldSignature {
    /// Constructs a new field signature.
    #[must_use]
    pub fn new(
        class: impl Into<ClassName>,
        descriptor: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            class:      class.into(),
            descriptor: descriptor.into(),
            name:       name.into(),
        }
    }

    /// Gets the type of the field, if it is a reference type.
    #[must_use]
    pub fn reference_type(&self) -> Option<ClassName> {
        if self.descriptor.starts_with('[') {
            Some(ClassName::new(self.descriptor.clone()))
        } else {
            self.descriptor
                .strip_prefix('L')
                .and_then(|d| d.strip_suffix(';'))
                .map(ClassName::new)
        }
    }
}

impl Display for FieldSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.class, self.descriptor, self.name)
    }
}
