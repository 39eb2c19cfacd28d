//! This module contains errors pertaining to misuse of the method resolver.
//!
//! Failures to resolve a method in the analyzed program are not errors, see
//! [`crate::dispatch::ResolutionFailure`].

use thiserror::Error;

use crate::{class::ClassName, error::container};

/// Errors that occur when the resolver is constructed or invoked in a way
/// that violates its contract.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("An invocation cannot be both special and static")]
    SpecialAndStatic,

    #[error("An invocation cannot be both static and through invokeinterface")]
    StaticInterface,

    #[error("An invocation cannot be both special and through invokeinterface")]
    SpecialInterface,

    #[error("Special dispatch requires the class of the invoking method")]
    MissingInvokingClass,

    #[error("Dispatch through {owner} requires the dynamic type of the receiver")]
    MissingReceiverType { owner: ClassName },
}

/// A resolver error with the program counter of its invocation.
pub type LocatedError = container::Located<Error>;

/// A container of resolver errors.
pub type Errors = container::Errors<LocatedError>;

/// The result type for resolver operations.
pub type Result<T> = std::result::Result<T, LocatedError>;

impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, pc: u32) -> Self::Located {
        container::Located { pc, payload: self }
    }
}
