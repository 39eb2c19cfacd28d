//! This module contains errors pertaining to the enumeration of the
//! alternatives of a heap-dependent instruction.
//!
//! Every error here is a contract violation by the caller of the enumerator.

use thiserror::Error;

use crate::{class::ClassName, error::container, value::HeapPosition};

/// Errors that occur while enumerating the alternatives of an instruction.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The reference {reference} is not symbolic and cannot be resolved by enumeration")]
    NotSymbolic { reference: String },

    #[error("The reference {reference} must be resolved before this instruction executes")]
    UnresolvedReference { reference: String },

    #[error("There is no object at heap position {position}")]
    UnknownObject { position: HeapPosition },

    #[error("A value of type {actual} was supplied where type {required} is required")]
    RequiredTypeMismatch { required: ClassName, actual: ClassName },

    #[error("The class {class} is not known to the class hierarchy")]
    UnknownClass { class: ClassName },

    #[error("The type {class} is not an array type")]
    NotAnArray { class: ClassName },

    #[error("The type {class} is not a reference type")]
    NotAReference { class: ClassName },

    #[error("Enumeration of a well-typed access produced no alternatives")]
    NoAlternatives,

    #[error("Enumeration was stopped by the watchdog")]
    StoppedByWatchdog,
}

/// An enumeration error with the program counter of its instruction.
pub type LocatedError = container::Located<Error>;

/// A container of enumeration errors.
pub type Errors = container::Errors<LocatedError>;

/// The result type for enumeration operations.
pub type Result<T> = std::result::Result<T, LocatedError>;

impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, pc: u32) -> Self::Located {
        container::Located { pc, payload: self }
    }
}
