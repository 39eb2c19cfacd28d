//! This module contains the primary error type for the engine's interface.
//! It also re-exports the more specific error types that are
//! subsystem-specific.
//!
//! Only contract violations by the caller are errors. Outcomes that belong to
//! a single branch of the analyzed program (faults, resolution failures,
//! infeasible or undecided alternatives) are ordinary values and never travel
//! through these types.

pub mod container;
pub mod decision;
pub mod dispatch;
pub mod operand;
pub mod replay;

use thiserror::Error;

/// The interface result type for the library.
pub type Result<T> = std::result::Result<T, Errors>;

/// The interface error type for the library.
///
/// All errors returned from the library interface should be members of this
/// enum.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// Errors from enumerating the alternatives of an instruction.
    #[error(transparent)]
    Decision(#[from] decision::Error),

    /// Errors from the method resolver.
    #[error(transparent)]
    Dispatch(#[from] dispatch::Error),

    /// Errors from decoding instruction operands.
    #[error(transparent)]
    Operand(#[from] operand::Error),

    /// Errors from replaying a recorded exploration.
    #[error(transparent)]
    Replay(#[from] replay::Error),

    /// An unknown error, represented as a string.
    #[error("Unknown Error: {_0:?}")]
    Other(String),
}

impl Error {
    /// Constructs an unknown error with the provided `message`.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, pc: u32) -> Self::Located {
        container::Located { pc, payload: self }
    }
}

/// A library error with the program counter of the instruction it arose at.
pub type LocatedError = container::Located<Error>;

/// A container of errors that may occur in the engine.
pub type Errors = container::Errors<LocatedError>;

/// Generates the conversions from each subsystem's located errors (and
/// containers of them) into the general located error and container.
macro_rules! located_conversions {
    ($($subsystem:ident),* $(,)?) => {
        $(
            impl From<$subsystem::LocatedError> for LocatedError {
                fn from(value: $subsystem::LocatedError) -> Self {
                    value.map(Error::from)
                }
            }

            impl From<$subsystem::LocatedError> for Errors {
                fn from(value: $subsystem::LocatedError) -> Self {
                    let re_wrapped: LocatedError = value.into();
                    re_wrapped.into()
                }
            }

            impl From<$subsystem::Errors> for Errors {
                fn from(value: $subsystem::Errors) -> Self {
                    let errs: Vec<$subsystem::LocatedError> = value.into();
                    let new_errs: Vec<LocatedError> =
                        errs.into_iter().map(std::convert::Into::into).collect();

                    new_errs.into()
                }
            }
        )*
    };
}

located_conversions!(decision, dispatch, operand, replay);

#[cfg(test)]
mod test {
    use crate::error::{container::Locatable, decision, operand, Error, Errors};

    #[test]
    fn subsystem_errors_convert_into_the_interface_container() {
        let located = operand::Error::TruncatedImmediate { length: 2 }.locate(4);
        let errors: Errors = located.into();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.payloads()[0].pc, 4);
        assert_eq!(
            errors.payloads()[0].payload,
            Error::Operand(operand::Error::TruncatedImmediate { length: 2 })
        );
    }

    #[test]
    fn subsystem_containers_convert_into_the_interface_container() {
        let mut errors = decision::Errors::new();
        errors.add_located(9, decision::Error::StoppedByWatchdog);
        errors.add_located(1, decision::Error::NoAlternatives);
        let converted: Errors = errors.into();

        assert_eq!(converted.len(), 2);
        assert_eq!(converted.payloads()[0].pc, 1);
        assert!(converted.to_string().starts_with("Encountered 2 errors:"));
    }
}
