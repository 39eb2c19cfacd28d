//! This module contains errors pertaining to the decoding of instruction
//! operands.

use thiserror::Error;

use crate::error::container;

/// Errors that occur when decoding the operands of an instruction.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("The instruction needs an immediate of {length} bytes past the end of the code")]
    TruncatedImmediate { length: usize },

    #[error("Constant pool index {index} is outside of the pool of size {size}")]
    InvalidPoolIndex { index: u16, size: usize },

    #[error("Constant pool entry {index} is a {found} but a {expected} was expected")]
    UnexpectedEntry {
        index:    u16,
        expected: &'static str,
        found:    &'static str,
    },
}

/// An operand error with the program counter of its instruction.
pub type LocatedError = container::Located<Error>;

/// A container of operand errors.
pub type Errors = container::Errors<LocatedError>;

/// The result type for operand decoding.
pub type Result<T> = std::result::Result<T, LocatedError>;

impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, pc: u32) -> Self::Located {
        container::Located { pc, payload: self }
    }
}
