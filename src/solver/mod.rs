//! This module contains the interface to the store of path conditions and
//! the procedure that decides whether a candidate alternative is feasible
//! under the current path condition.

pub mod clause;
pub mod decider;

use std::fmt::Debug;

pub use clause::{Clause, Guard, PathCondition};
pub use decider::ClauseDecider;

/// The answer of a decision procedure to a feasibility query.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Feasibility {
    /// The guard is satisfiable together with the path condition.
    Sat,

    /// The guard contradicts the path condition.
    Unsat,

    /// The procedure could not decide.
    Unknown,
}

impl Feasibility {
    /// Checks if an alternative with this feasibility must be kept.
    ///
    /// Undecided alternatives are kept.
    #[must_use]
    pub fn is_feasible(self) -> bool {
        !matches!(self, Self::Unsat)
    }
}

/// The interface to a decision procedure for path conditions.
///
/// Queries are synchronous and must not mutate the path condition. An
/// implementation that cannot decide a query must answer
/// [`Feasibility::Unknown`] rather than guess.
pub trait DecisionProcedure
where
    Self: Debug,
{
    /// Checks if `guard` can hold on a path whose condition is `path`.
    #[must_use]
    fn check_feasible(&self, path: &PathCondition, guard: &Guard) -> Feasibility;
}
