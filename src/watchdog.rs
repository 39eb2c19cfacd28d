//! Cooperative cancellation for the engine.
//!
//! The engine counts the operations it performs and, every so many of them,
//! asks its [`Watchdog`] whether the analysis should be abandoned. A watchdog
//! is only ever consulted between operations, so a single enumeration that
//! takes a long time to complete cannot be interrupted part of the way
//! through.

use std::{
    fmt::Debug,
    rc::Rc,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::constant::DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS;

/// A dynamically dispatched [`Watchdog`] instance.
pub type DynWatchdog = Rc<dyn Watchdog>;

/// An object that the engine polls to find out whether it should stop.
///
/// Implementations are free to base the decision on anything they like, such
/// as elapsed time, the depth of the current path, or an external signal.
pub trait Watchdog
where
    Self: Debug,
{
    /// Checks if the engine should stop and return an error from the
    /// operation in progress.
    #[must_use]
    fn should_stop(&self) -> bool;

    /// Gets the number of operations the engine should perform between polls
    /// of the watchdog.
    #[must_use]
    fn poll_every(&self) -> usize;
}

/// A watchdog that never stops the engine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LazyWatchdog;

impl LazyWatchdog {
    /// Wraps `self` into an [`Rc`].
    #[must_use]
    pub fn in_rc(self) -> DynWatchdog {
        Rc::new(self)
    }
}

impl Watchdog for LazyWatchdog {
    fn should_stop(&self) -> bool {
        false
    }

    fn poll_every(&self) -> usize {
        usize::MAX
    }
}

/// A watchdog that stops the engine once a shared flag is set.
///
/// The engine polls it every [`DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS`]
/// operations unless told otherwise through [`Self::polling_every`].
#[derive(Clone, Debug)]
pub struct FlagWatchdog {
    /// The flag that gets set from elsewhere to stop the engine.
    flag: Arc<AtomicBool>,

    /// The number of operations between polls.
    poll_operations: usize,
}

impl FlagWatchdog {
    /// Constructs a new `FlagWatchdog` observing the provided `flag`.
    #[must_use]
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        let poll_operations = DEFAULT_WATCHDOG_POLL_LOOP_ITERATIONS;
        Self {
            flag,
            poll_operations,
        }
    }

    /// Sets the number of operations the engine performs between polls.
    #[must_use]
    pub fn polling_every(mut self, operations: usize) -> Self {
        self.poll_operations = operations;
        self
    }

    /// Wraps the watchdog into an [`Rc`].
    #[must_use]
    pub fn in_rc(self) -> DynWatchdog {
        Rc::new(self)
    }
}

impl Watchdog for FlagWatchdog {
    fn should_stop(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    fn poll_every(&self) -> usize {
        self.poll_operations
    }
}
