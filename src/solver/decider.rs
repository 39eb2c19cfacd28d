//! This module contains [`ClauseDecider`], the in-memory decision procedure
//! used by the engine when no external solver is attached.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    solver::{Clause, DecisionProcedure, Feasibility, Guard, PathCondition},
    value::{Expression, Origin},
};

/// A decision procedure that reasons directly over clauses.
///
/// Reference clauses are decided exactly: every origin is resolved at most
/// once on a path, so two different resolutions of the same origin
/// contradict each other. Bounds clauses are decided exactly when both sides
/// are concrete, and otherwise by treating every symbolic term as a free
/// integer. Queries in which distinct bounds constraints share a term are
/// outside that fragment and answered with [`Feasibility::Unknown`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ClauseDecider;

impl ClauseDecider {
    /// Constructs a new decider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DecisionProcedure for ClauseDecider {
    fn check_feasible(&self, path: &PathCondition, guard: &Guard) -> Feasibility {
        let clauses: Vec<&Clause> = path.clauses().iter().chain(guard.clauses()).collect();

        let references = check_references(&clauses);
        if references == Feasibility::Unsat {
            return Feasibility::Unsat;
        }

        let bounds = check_bounds(&clauses);
        match (references, bounds) {
            (_, Feasibility::Unsat) => Feasibility::Unsat,
            (Feasibility::Sat, Feasibility::Sat) => Feasibility::Sat,
            _ => Feasibility::Unknown,
        }
    }
}

/// Checks that no origin is resolved in two different ways.
fn check_references(clauses: &[&Clause]) -> Feasibility {
    let mut resolutions: HashMap<&Origin, &Clause> = HashMap::new();
    for clause in clauses {
        let Some(origin) = clause.resolved_reference() else {
            continue;
        };
        match resolutions.get(origin) {
            Some(existing) if existing != clause => {
                log::trace!("{origin} is resolved as both `{existing}` and `{clause}`");
                return Feasibility::Unsat;
            }
            _ => {
                resolutions.insert(origin, clause);
            }
        }
    }
    Feasibility::Sat
}

/// Checks the bounds clauses, grouped by the index and length that they
/// constrain.
fn check_bounds(clauses: &[&Clause]) -> Feasibility {
    let mut pairs: BTreeMap<(&Expression, &Expression), (bool, bool)> = BTreeMap::new();
    for (index, length, inside) in clauses.iter().filter_map(|c| c.bounds()) {
        let polarity = pairs.entry((index, length)).or_insert((false, false));
        if inside {
            polarity.0 = true;
        } else {
            polarity.1 = true;
        }
    }

    let mut result = Feasibility::Sat;
    let mut seen_terms: HashSet<&str> = HashSet::new();
    for ((index, length), (inside, outside)) in pairs {
        if inside && outside {
            return Feasibility::Unsat;
        }

        let mut pair_terms = index.terms();
        pair_terms.extend(length.terms());
        let unique: HashSet<&str> = pair_terms.iter().copied().collect();
        let independent =
            unique.len() == pair_terms.len() && unique.is_disjoint(&seen_terms);
        seen_terms.extend(unique);

        match check_pair(index, length, inside) {
            Feasibility::Unsat => return Feasibility::Unsat,
            Feasibility::Sat if independent => {}
            _ => result = Feasibility::Unknown,
        }
    }
    result
}

/// Checks a single bounds constraint in isolation.
///
/// The answer is only meaningful when the index and length share no terms.
fn check_pair(index: &Expression, length: &Expression, inside: bool) -> Feasibility {
    let sat = |holds: bool| {
        if holds {
            Feasibility::Sat
        } else {
            Feasibility::Unsat
        }
    };

    match (index.as_concrete(), length.as_concrete(), inside) {
        (Some(i), Some(l), true) => sat(0 <= i && i < l),
        (Some(i), Some(l), false) => sat(i < 0 || i >= l),
        (Some(i), None, true) => sat(i >= 0),
        (None, Some(l), true) => sat(l > 0),
        (Some(_) | None, None, false) | (None, Some(_), false) | (None, None, true) => {
            Feasibility::Sat
        }
    }
}
