//! Replaying a recorded exploration.

use std::collections::VecDeque;

use crate::{
    decision::{BranchNumber, DecisionAlternative, Identity},
    error::{
        container::Locatable,
        replay::{Error, Result},
    },
    path::Path,
};

/// A decision as recorded by an earlier exploration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RecordedDecision {
    /// The branch number of the alternative taken.
    pub branch: BranchNumber,

    /// The identity of the alternative taken, if it was recorded.
    pub identity: Option<Identity>,
}

/// Steers an exploration down a recorded sequence of decisions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Replay {
    record: VecDeque<RecordedDecision>,
}

impl Replay {
    /// Constructs a replay of the decisions with `branches` as branch
    /// numbers.
    #[must_use]
    pub fn new(branches: impl IntoIterator<Item = BranchNumber>) -> Self {
        let record = branches
            .into_iter()
            .map(|branch| RecordedDecision {
                branch,
                identity: None,
            })
            .collect();
        Self { record }
    }

    /// Constructs a replay of the decisions taken by `path`, which also
    /// checks that the replayed alternatives have the recorded identities.
    #[must_use]
    pub fn of_path(path: &Path) -> Self {
        let record = path
            .decisions()
            .iter()
            .map(|d| RecordedDecision {
                branch:   d.alternative.branch_number(),
                identity: Some(d.alternative.identity()),
            })
            .collect();
        Self { record }
    }

    /// Selects the recorded alternative from the `alternatives` of the
    /// decision point at `pc`.
    ///
    /// # Errors
    ///
    /// If the record has no decisions left, if no alternative has the
    /// recorded branch number, or if the alternative with that number does
    /// not have the recorded identity.
    pub fn select(
        &mut self,
        pc: u32,
        alternatives: &[DecisionAlternative],
    ) -> Result<DecisionAlternative> {
        let recorded = self.record.pop_front().ok_or(Error::Exhausted).locate(pc)?;
        let Some(selected) = alternatives
            .iter()
            .find(|a| a.branch_number() == recorded.branch)
        else {
            return Err(Error::Diverged {
                expected:  recorded.branch,
                available: alternatives.iter().map(DecisionAlternative::branch_number).collect(),
            }
            .locate(pc));
        };

        if let Some(expected) = recorded.identity {
            if selected.identity() != expected {
                return Err(Error::IdentityMismatch {
                    branch:   recorded.branch,
                    expected: expected.to_string(),
                    found:    selected.identity().to_string(),
                }
                .locate(pc));
            }
        }

        Ok(selected.clone())
    }

    /// Gets the number of recorded decisions not yet replayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.record.len()
    }

    /// Checks if every recorded decision has been replayed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.record.is_empty()
    }
}

#[cfg(test)]
mod test {
    use crate::{
        decision::{AlternativeKind, DecisionAlternative, Family},
        error::replay::Error,
        path::{Path, Replay},
        solver::Guard,
    };

    fn siblings() -> Vec<DecisionAlternative> {
        vec![
            DecisionAlternative::new(Family::ArrayStore, AlternativeKind::InBounds, Guard::new(), None)
                .numbered(1),
            DecisionAlternative::new(
                Family::ArrayStore,
                AlternativeKind::OutOfBounds,
                Guard::new(),
                None,
            )
            .numbered(2),
        ]
    }

    #[test]
    fn replays_branch_numbers() -> anyhow::Result<()> {
        let mut replay = Replay::new([2]);
        let selected = replay.select(5, &siblings())?;

        assert_eq!(selected.kind(), &AlternativeKind::OutOfBounds);
        assert!(replay.is_finished());
        assert_eq!(
            replay.select(5, &siblings()).unwrap_err().payload,
            Error::Exhausted
        );

        Ok(())
    }

    #[test]
    fn detects_divergence() {
        let mut replay = Replay::new([3]);
        let error = replay.select(8, &siblings()).unwrap_err();

        assert_eq!(error.pc, 8);
        assert_eq!(
            error.payload,
            Error::Diverged {
                expected:  3,
                available: vec![1, 2],
            }
        );
    }

    #[test]
    fn checks_recorded_identities() {
        let mut path = Path::new();
        let taken = siblings().remove(0);
        path.commit(0, taken);
        let mut replay = Replay::of_path(&path);

        let mut changed = siblings();
        changed[0] = DecisionAlternative::new(
            Family::ArrayLoad,
            AlternativeKind::InBounds,
            Guard::new(),
            None,
        )
        .numbered(1);

        assert!(matches!(
            replay.select(0, &changed).unwrap_err().payload,
            Error::IdentityMismatch { branch: 1, .. }
        ));
    }
}
