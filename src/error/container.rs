//! Containers that attach the program counter of the faulting instruction to
//! an error, and that aggregate many such errors.

use std::fmt::Formatter;

use thiserror::Error;

/// An error that is localised to the instruction at a particular program
/// counter in the bytecode of the method being analyzed.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Located<E>
where
    E: Clone,
{
    /// The program counter of the instruction that was being processed.
    pub pc: u32,

    /// The error data.
    pub payload: E,
}

impl<E> Located<E>
where
    E: Clone,
{
    /// Re-wraps the located payload into another payload type, keeping the
    /// program counter.
    #[must_use]
    pub fn map<F>(self, wrap: impl FnOnce(E) -> F) -> Located<F>
    where
        F: Clone,
    {
        Located {
            pc:      self.pc,
            payload: wrap(self.payload),
        }
    }
}

/// Displays the error after the hexadecimal program counter.
impl<E> std::fmt::Display for Located<E>
where
    E: std::fmt::Display + Clone,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[pc 0x{}]: {}", hex::encode(self.pc.to_be_bytes()), self.payload)
    }
}

/// A trait for types that can have a program counter attached to them.
pub trait Locatable
where
    Self: Sized,
{
    /// The return type with the attached program counter.
    type Located;

    /// Attach the program counter `pc` to the error.
    fn locate(self, pc: u32) -> Self::Located;
}

/// Any result whose error can be located can itself be located.
impl<T, E> Locatable for Result<T, E>
where
    E: std::error::Error + Clone,
{
    type Located = Result<T, Located<E>>;

    fn locate(self, pc: u32) -> Self::Located {
        self.map_err(|payload| Located { pc, payload })
    }
}

/// An error that is a collection of errors.
///
/// Errors are kept in insertion order unless they are located, in which case
/// they are kept sorted by program counter.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Errors<E> {
    payloads: Vec<E>,
}

impl<E> Errors<E> {
    /// Creates a new, empty, container for errors.
    #[must_use]
    pub fn new() -> Self {
        let payloads = vec![];
        Self { payloads }
    }

    /// Gets the errors contained within this container.
    #[must_use]
    pub fn payloads(&self) -> &[E] {
        self.payloads.as_slice()
    }

    /// Gets the number of errors in the container.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Checks if the container holds no errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

impl<E> Errors<E>
where
    E: std::error::Error,
{
    /// Adds the provided `error` to the container.
    pub fn add(&mut self, error: E) {
        self.payloads.push(error);
    }

    /// Adds all of the provided `errors` to the container.
    pub fn add_many(&mut self, errors: impl Into<Vec<E>>) {
        self.payloads.extend(errors.into());
    }
}

impl<E> Errors<Located<E>>
where
    E: std::error::Error + Clone,
{
    /// Adds an error `payload` that occurred at the instruction at `pc`.
    pub fn add_located(&mut self, pc: u32, payload: E) {
        self.payloads.push(Located { pc, payload });
        self.sort();
    }

    /// Gets the errors that occurred at the instruction at `pc`.
    #[must_use]
    pub fn at(&self, pc: u32) -> Vec<&Located<E>> {
        self.payloads.iter().filter(|e| e.pc == pc).collect()
    }

    /// Sorts the errors by program counter, keeping insertion order among
    /// errors at the same instruction.
    fn sort(&mut self) {
        self.payloads.sort_by_key(|item| item.pc);
    }
}

impl<E> Default for Errors<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> From<E> for Errors<E>
where
    E: std::error::Error,
{
    fn from(value: E) -> Self {
        let mut errors = Self::default();
        errors.add(value);
        errors
    }
}

impl<E> From<Errors<E>> for Vec<E>
where
    E: std::error::Error,
{
    fn from(value: Errors<E>) -> Self {
        value.payloads
    }
}

impl<E> From<Vec<E>> for Errors<E>
where
    E: std::error::Error,
{
    fn from(value: Vec<E>) -> Self {
        Self { payloads: value }
    }
}

/// Displays a header with the error count, followed by one error per line.
impl<E> std::fmt::Display for Errors<E>
where
    E: std::fmt::Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.payloads.is_empty() {
            write!(f, "Encountered no errors")?;
        } else {
            writeln!(f, "Encountered {} errors:", self.payloads.len())?;
            for error in &self.payloads {
                writeln!(f, "{error}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::error::{
        container::{Locatable, Located},
        decision,
        Errors,
    };

    #[test]
    fn located_errors_are_kept_in_program_order() {
        let mut errors = Errors::new();
        errors.add_located(12, decision::Error::StoppedByWatchdog.into());
        errors.add_located(3, decision::Error::StoppedByWatchdog.into());

        let pcs: Vec<u32> = errors.payloads().iter().map(|e| e.pc).collect();
        assert_eq!(pcs, vec![3, 12]);
        assert_eq!(errors.at(12).len(), 1);
    }

    #[test]
    fn results_can_be_located() {
        let result: Result<(), decision::Error> = Err(decision::Error::StoppedByWatchdog);
        let located = result.locate(7).unwrap_err();

        assert_eq!(
            located,
            Located {
                pc:      7,
                payload: decision::Error::StoppedByWatchdog,
            }
        );
        assert_eq!(
            located.to_string(),
            "[pc 0x00000007]: Enumeration was stopped by the watchdog"
        );
    }
}
