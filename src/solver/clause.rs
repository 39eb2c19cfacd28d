//! This module contains the clauses out of which guards and path conditions
//! are built.

use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::{
    class::ClassName,
    value::{Expression, HeapPosition, Origin},
};

/// An assumption about the state of the analyzed program.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Clause {
    /// The reference with origin `reference` points to the already-discovered
    /// object at `position`, which was first reached through `target`.
    Aliases {
        reference: Origin,
        target:    Origin,
        position:  HeapPosition,
    },

    /// The reference with origin `reference` points to an object of exactly
    /// `class` that is distinct from every object discovered so far.
    Expands { reference: Origin, class: ClassName },

    /// The reference with origin `reference` is null.
    Null { reference: Origin },

    /// `0 <= index < length`.
    InBounds { index: Expression, length: Expression },

    /// `index < 0 || index >= length`.
    OutOfBounds { index: Expression, length: Expression },
}

impl Clause {
    /// Gets the origin of the reference this clause resolves, if it is a
    /// clause about a reference.
    #[must_use]
    pub fn resolved_reference(&self) -> Option<&Origin> {
        match self {
            Self::Aliases { reference, .. }
            | Self::Expands { reference, .. }
            | Self::Null { reference } => Some(reference),
            Self::InBounds { .. } | Self::OutOfBounds { .. } => None,
        }
    }

    /// Gets the index and length this clause bounds, along with whether it
    /// asserts that the index is in bounds, if it is a bounds clause.
    #[must_use]
    pub fn bounds(&self) -> Option<(&Expression, &Expression, bool)> {
        match self {
            Self::InBounds { index, length } => Some((index, length, true)),
            Self::OutOfBounds { index, length } => Some((index, length, false)),
            _ => None,
        }
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aliases {
                reference,
                target,
                position,
            } => write!(f, "{reference} == Object[{position}] ({target})"),
            Self::Expands { reference, class } => write!(f, "{reference} fresh {class}"),
            Self::Null { reference } => write!(f, "{reference} == null"),
            Self::InBounds { index, length } => write!(f, "0 <= {index} < {length}"),
            Self::OutOfBounds { index, length } => write!(f, "!(0 <= {index} < {length})"),
        }
    }
}

/// The condition under which an alternative is taken: a conjunction of
/// clauses in the order in which they were assumed.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Guard {
    clauses: Vec<Clause>,
}

impl Guard {
    /// Constructs the trivially true guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a guard consisting of the single `clause`.
    #[must_use]
    pub fn of(clause: Clause) -> Self {
        Self {
            clauses: vec![clause],
        }
    }

    /// Gets the guard that additionally assumes `clause`.
    #[must_use]
    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Gets the clauses of the guard.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Checks if the guard assumes nothing.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl Display for Guard {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.clauses.is_empty() {
            write!(f, "true")
        } else {
            write!(f, "{}", self.clauses.iter().join(" && "))
        }
    }
}

/// The conjunction of the clauses assumed along one branch of the execution.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PathCondition {
    clauses: Vec<Clause>,
}

impl PathCondition {
    /// Constructs the path condition of the initial state, which assumes
    /// nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assumes `clause` on the path.
    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// Assumes all of the clauses of `guard` on the path.
    pub fn extend_with(&mut self, guard: &Guard) {
        self.clauses.extend(guard.clauses().iter().cloned());
    }

    /// Gets a new path condition that assumes both this path and `guard`.
    #[must_use]
    pub fn conjoin(&self, guard: &Guard) -> Self {
        let mut conjoined = self.clone();
        conjoined.extend_with(guard);
        conjoined
    }

    /// Gets the clauses assumed on the path.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Gets the clause resolving the reference with `origin`, if the path
    /// has already resolved it.
    #[must_use]
    pub fn resolution_of(&self, origin: &Origin) -> Option<&Clause> {
        self.clauses
            .iter()
            .find(|c| c.resolved_reference() == Some(origin))
    }
}

impl Display for PathCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.clauses.is_empty() {
            write!(f, "true")
        } else {
            write!(f, "{}", self.clauses.iter().join(" && "))
        }
    }
}
