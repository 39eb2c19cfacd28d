//! This module contains the history of the decisions taken along one branch
//! of the execution, and the replay of such histories.
//!
//! # Write-Back
//!
//! An alternative whose accessed value is fresh carries the store that makes
//! the value visible to later accesses. That store is handed to the host only
//! when a branch commits to the alternative, which happens on the child path
//! after the fork. Sibling branches therefore never observe each other's
//! write-backs, whatever order they are explored in.

pub mod replay;

use std::fmt::{Display, Formatter};

pub use replay::{RecordedDecision, Replay};

use crate::{
    decision::{BranchNumber, DecisionAlternative, Identity, WriteBack},
    solver::PathCondition,
};

/// A decision committed to by a path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Decision {
    /// The program counter of the decision point.
    pub pc: u32,

    /// The alternative taken.
    pub alternative: DecisionAlternative,
}

/// The decisions taken along one branch of the execution, along with the
/// path condition that they accumulate.
#[derive(Clone, Debug, Default)]
pub struct Path {
    decisions: Vec<Decision>,
    condition: PathCondition,
}

impl Path {
    /// Constructs the path of the initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forks a copy of this path that shares its history up to this point.
    #[must_use]
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Commits the path to taking `alternative` at the decision point at
    /// `pc`, assuming its guard.
    ///
    /// Returns the write-back that the host must now apply to the heap of
    /// this path, if any.
    pub fn commit(&mut self, pc: u32, alternative: DecisionAlternative) -> Option<WriteBack> {
        self.condition.extend_with(alternative.guard());
        let write_back = alternative.write_back().cloned();
        log::debug!("Path {self} commits to {alternative} at pc {pc}");
        self.decisions.push(Decision { pc, alternative });
        write_back
    }

    /// Forks one child of this path per alternative of the decision point at
    /// `pc`, each committed to its alternative.
    #[must_use]
    pub fn branch(
        &self,
        pc: u32,
        alternatives: Vec<DecisionAlternative>,
    ) -> Vec<(Path, Option<WriteBack>)> {
        alternatives
            .into_iter()
            .map(|alternative| {
                let mut child = self.fork();
                let write_back = child.commit(pc, alternative);
                (child, write_back)
            })
            .collect()
    }

    /// Gets the accumulated path condition.
    #[must_use]
    pub fn condition(&self) -> &PathCondition {
        &self.condition
    }

    /// Gets the decisions taken, in order.
    #[must_use]
    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Gets the branch numbers of the decisions taken, in order.
    #[must_use]
    pub fn branch_numbers(&self) -> Vec<BranchNumber> {
        self.decisions
            .iter()
            .map(|d| d.alternative.branch_number())
            .collect()
    }

    /// Gets the identities of the alternatives taken, in order.
    #[must_use]
    pub fn identities(&self) -> Vec<Identity> {
        self.decisions.iter().map(|d| d.alternative.identity()).collect()
    }

    /// Gets the number of decisions taken.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.decisions.len()
    }

    /// Gets the stable name of the path, made of its branch numbers.
    #[must_use]
    pub fn name(&self) -> String {
        self.branch_numbers()
            .iter()
            .map(|number| format!(".{number}"))
            .collect()
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.decisions.is_empty() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.name())
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        decision::{AlternativeKind, DecisionAlternative, Family, Referent, Slot, WriteBack},
        path::Path,
        solver::{Clause, Guard},
        value::{Expression, Origin, ReferenceSymbolic},
    };

    fn alternative(kind: AlternativeKind, number: u32, write_back: Option<WriteBack>) -> DecisionAlternative {
        DecisionAlternative::new(Family::ArrayLoad, kind, Guard::new(), write_back).numbered(number)
    }

    #[test]
    fn names_are_made_of_branch_numbers() {
        let mut path = Path::new();
        assert_eq!(path.to_string(), ".");

        path.commit(0, alternative(AlternativeKind::InBounds, 1, None));
        path.commit(4, alternative(AlternativeKind::OutOfBounds, 3, None));

        assert_eq!(path.name(), ".1.3");
        assert_eq!(path.depth(), 2);
        assert_eq!(path.branch_numbers(), vec![1, 3]);
    }

    #[test]
    fn write_backs_are_local_to_the_committing_branch() {
        let index = Expression::Int(0);
        let value = ReferenceSymbolic::new(Origin::root("a").element(index.clone()), "java/lang/Object");
        let write_back = WriteBack {
            container: 2,
            slot:      Slot::Element(index),
            value,
        };
        let fresh = alternative(
            AlternativeKind::Resolved(Referent::Fresh {
                class: "java/lang/Object".into(),
            }),
            1,
            Some(write_back.clone()),
        );
        let null = DecisionAlternative::new(
            Family::ArrayLoad,
            AlternativeKind::Resolved(Referent::Null),
            Guard::of(Clause::Null {
                reference: Origin::root("a"),
            }),
            None,
        )
        .numbered(2);

        let root = Path::new();
        let children = root.branch(9, vec![fresh, null]);

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].1, Some(write_back));
        assert_eq!(children[1].1, None);
        assert_eq!(children[1].0.condition().clauses().len(), 1);
        assert_eq!(root.depth(), 0);
    }
}
