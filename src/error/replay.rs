//! This module contains errors pertaining to the replay of a recorded
//! exploration.

use thiserror::Error;

use crate::{decision::BranchNumber, error::container};

/// Errors that occur when a replay does not match the program being
/// replayed.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("Branch {expected} was recorded but only branches {available:?} exist")]
    Diverged {
        expected:  BranchNumber,
        available: Vec<BranchNumber>,
    },

    #[error("Branch {branch} was recorded with identity {expected} but has identity {found}")]
    IdentityMismatch {
        branch:   BranchNumber,
        expected: String,
        found:    String,
    },

    #[error("The recorded exploration has no decisions left")]
    Exhausted,
}

/// A replay error with the program counter of its decision point.
pub type LocatedError = container::Located<Error>;

/// A container of replay errors.
pub type Errors = container::Errors<LocatedError>;

/// The result type for replay operations.
pub type Result<T> = std::result::Result<T, LocatedError>;

impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, pc: u32) -> Self::Located {
        container::Located { pc, payload: self }
    }
}
