//! This module contains the method resolver, which computes the method that
//! an invocation executes under each of the dispatch disciplines of the
//! instruction set.
//!
//! Failures to find a method are properties of the analyzed program, and are
//! hence reported as [`Resolution::Failed`] values rather than as errors. The
//! interpreter turns them into a fault on the branch being dispatched.

pub mod resolver;

use std::fmt::{Display, Formatter};

use itertools::Itertools;

pub use resolver::MethodResolver;

use crate::{
    class::{ClassName, MethodFlags, MethodSignature},
    constant::{
        ABSTRACT_METHOD_ERROR,
        INCOMPATIBLE_CLASS_CHANGE_ERROR,
        NO_CLASS_DEFINITION_FOUND_ERROR,
        NO_SUCH_METHOD_ERROR,
        UNSATISFIED_LINK_ERROR,
    },
    operand::MethodOperands,
};

/// The way in which an invocation selects the method it executes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Discipline {
    /// The resolved method is executed, without regard for any receiver.
    Static,

    /// The method is selected from the invoking class or its superclass, as
    /// for constructors, private methods and `super` calls.
    Special,

    /// The method is selected from the dynamic type of the receiver.
    Virtual,

    /// As [`Self::Virtual`], for methods declared by interfaces.
    Interface,
}

impl Discipline {
    /// Checks if the discipline selects the method from the dynamic type of
    /// the receiver.
    #[must_use]
    pub fn uses_receiver(self) -> bool {
        matches!(self, Self::Virtual | Self::Interface)
    }
}

impl Display for Discipline {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Static => "static",
            Self::Special => "special",
            Self::Virtual => "virtual",
            Self::Interface => "interface",
        };
        write!(f, "{name}")
    }
}

/// A request to resolve the method invoked by an instruction.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ResolutionRequest {
    /// The symbolic reference to the invoked method.
    pub method: MethodSignature,

    /// Whether the symbolic reference is to an interface method.
    pub is_interface_method: bool,

    /// The class declaring the method that contains the invocation.
    pub invoking_class: Option<ClassName>,

    /// The dynamic type of the receiver on the branch being dispatched.
    pub receiver_type: Option<ClassName>,
}

impl ResolutionRequest {
    /// Constructs a request for the invocation whose operands are
    /// `operands`.
    #[must_use]
    pub fn new(operands: &MethodOperands) -> Self {
        Self {
            method:              operands.signature.clone(),
            is_interface_method: operands.is_interface_method,
            invoking_class:      None,
            receiver_type:       None,
        }
    }

    /// Sets the class containing the invocation.
    #[must_use]
    pub fn from_class(mut self, class: impl Into<ClassName>) -> Self {
        self.invoking_class = Some(class.into());
        self
    }

    /// Sets the dynamic type of the receiver.
    #[must_use]
    pub fn on_receiver(mut self, class: impl Into<ClassName>) -> Self {
        self.receiver_type = Some(class.into());
        self
    }
}

/// A method selected for execution.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ResolvedMethod {
    /// The signature of the method, with the class that declares it.
    pub signature: MethodSignature,

    pub flags: MethodFlags,
}

impl ResolvedMethod {
    #[must_use]
    pub fn is_native(&self) -> bool {
        self.flags.is_native
    }
}

impl Display for ResolvedMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.signature)
    }
}

/// The reasons for which an invocation cannot execute any method.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ResolutionFailure {
    /// A class needed by the resolution is not loaded.
    NoClassDefFound { class: ClassName },

    /// No method matches the symbolic reference.
    NoSuchMethod { method: MethodSignature },

    /// The method found is not compatible with the instruction, or the
    /// receiver does not implement the interface that declares it.
    IncompatibleClassChange { method: MethodSignature },

    /// More than one default method could be selected.
    AmbiguousDefault {
        method:     MethodSignature,
        candidates: Vec<ClassName>,
    },

    /// The method selected has no implementation.
    AbstractMethod { method: MethodSignature },

    /// The method selected is native and has no override.
    UnresolvedNative { method: MethodSignature },
}

impl ResolutionFailure {
    /// Gets the class of the error that the analyzed program raises for this
    /// failure.
    #[must_use]
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::NoClassDefFound { .. } => NO_CLASS_DEFINITION_FOUND_ERROR,
            Self::NoSuchMethod { .. } => NO_SUCH_METHOD_ERROR,
            Self::IncompatibleClassChange { .. } | Self::AmbiguousDefault { .. } => {
                INCOMPATIBLE_CLASS_CHANGE_ERROR
            }
            Self::AbstractMethod { .. } => ABSTRACT_METHOD_ERROR,
            Self::UnresolvedNative { .. } => UNSATISFIED_LINK_ERROR,
        }
    }
}

impl Display for ResolutionFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoClassDefFound { class } => write!(f, "Class {class} is not loaded"),
            Self::NoSuchMethod { method } => write!(f, "No method matches {method}"),
            Self::IncompatibleClassChange { method } => {
                write!(f, "The invocation is incompatible with {method}")
            }
            Self::AmbiguousDefault { method, candidates } => write!(
                f,
                "Default methods for {method} conflict in {}",
                candidates.iter().join(", ")
            ),
            Self::AbstractMethod { method } => write!(f, "Method {method} is abstract"),
            Self::UnresolvedNative { method } => {
                write!(f, "Native method {method} has no implementation")
            }
        }
    }
}

/// The outcome of resolving an invocation on one branch.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedMethod),
    Failed(ResolutionFailure),
}

impl Resolution {
    /// Gets the resolved method, if resolution succeeded.
    #[must_use]
    pub fn method(&self) -> Option<&ResolvedMethod> {
        match self {
            Self::Resolved(method) => Some(method),
            Self::Failed(_) => None,
        }
    }

    /// Gets the failure, if resolution failed.
    #[must_use]
    pub fn failure(&self) -> Option<&ResolutionFailure> {
        match self {
            Self::Resolved(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}
