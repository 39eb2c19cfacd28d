//! This module is an integration test that checks the alternatives produced
//! at decision points against the hierarchy and heap they were computed on.
#![cfg(test)]

use decision_engine::{
    decision::{AlternativeKind, ArrayAccess, Referent, Slot},
    engine::Config,
    heap::HeapSnapshot,
    operand::ClassOperands,
    path::Path,
    solver::{ClauseDecider, DecisionProcedure, Feasibility, PathCondition},
    value::{Expression, Origin, Reference, ReferenceSymbolic},
    DecisionAlternative,
};

mod common;

fn shape(origin: Origin) -> Reference {
    ReferenceSymbolic::new(origin, "pkg/Shape").into()
}

/// Checks that no two of the `alternatives` can hold at the same time.
fn assert_disjoint(alternatives: &[DecisionAlternative]) {
    let decider = ClauseDecider::new();
    for (i, first) in alternatives.iter().enumerate() {
        for second in &alternatives[i + 1..] {
            let both = PathCondition::new().conjoin(first.guard());
            assert_eq!(
                decider.check_feasible(&both, second.guard()),
                Feasibility::Unsat,
                "{first} and {second} overlap"
            );
        }
    }
}

#[test]
fn array_loads_cover_every_resolution_and_the_fault() -> anyhow::Result<()> {
    let classes = common::shapes();
    let mut heap = HeapSnapshot::new(&classes);
    let array = heap.allocate("[Lpkg/Shape;");
    heap.discover("pkg/Square", Origin::root("other"));
    let mut engine = common::new_engine(&classes, Config::default());

    let index = Expression::term("i");
    let element = ReferenceSymbolic::new(Origin::root("shapes").element(index.clone()), "pkg/Shape");
    let access = ArrayAccess {
        array,
        length: Expression::term("n"),
        index,
        element: element.into(),
        fresh: true,
    };
    let alternatives = engine.array_load(5, &heap, &PathCondition::new(), &access)?;

    // One alias, three concrete subclasses, null, and out of bounds.
    assert_eq!(alternatives.len(), 6);
    assert!(matches!(
        alternatives[0].referent(),
        Some(Referent::Aliases { .. })
    ));
    assert_eq!(alternatives[4].referent(), Some(&Referent::Null));
    assert_eq!(alternatives[5].kind(), &AlternativeKind::OutOfBounds);
    assert!(alternatives[5].is_fault());
    assert!(alternatives.iter().all(|a| !a.needs_recheck()));
    assert_disjoint(&alternatives);

    Ok(())
}

#[test]
fn fresh_elements_are_written_back_only_on_their_own_branch() -> anyhow::Result<()> {
    let classes = common::shapes();
    let mut heap = HeapSnapshot::new(&classes);
    let array = heap.allocate("[Lpkg/Shape;");
    let mut engine = common::new_engine(&classes, Config::default());

    let access = ArrayAccess {
        array,
        length: Expression::Int(2),
        index: Expression::Int(0),
        element: shape(Origin::root("shapes").element(Expression::Int(0))),
        fresh: true,
    };
    let alternatives = engine.array_load(0, &heap, &PathCondition::new(), &access)?;
    let root = Path::new();
    let children = root.branch(0, alternatives);

    // The concrete index is within the concrete length, so no fault remains.
    assert_eq!(children.len(), 4);
    for (child, write_back) in &children {
        let write_back = write_back.as_ref().expect("fresh elements are written back");
        assert_eq!(write_back.container, array);
        assert_eq!(write_back.slot, Slot::Element(Expression::Int(0)));
        assert_eq!(child.depth(), 1);
    }
    assert_eq!(root.depth(), 0);
    assert!(root.condition().clauses().is_empty());

    Ok(())
}

#[test]
fn enumeration_is_stable_across_runs() -> anyhow::Result<()> {
    let classes = common::shapes();
    let mut heap = HeapSnapshot::new(&classes);
    heap.discover("pkg/Circle", Origin::root("a"));
    heap.discover("pkg/Square", Origin::root("b"));
    let operands = ClassOperands {
        class: "pkg/Circle".into(),
    };
    let reference = shape(Origin::root("r"));

    let mut first_engine = common::new_engine(&classes, Config::default());
    let mut second_engine = common::new_engine(&classes, Config::default());
    let first =
        first_engine.check_cast(3, &heap, &PathCondition::new(), &operands, &reference)?;
    let second =
        second_engine.check_cast(3, &heap, &PathCondition::new(), &operands, &reference)?;

    assert_eq!(first, second);
    let identities = |alts: &[DecisionAlternative]| -> Vec<String> {
        alts.iter().map(|a| a.identity().to_string()).collect()
    };
    assert_eq!(identities(&first), identities(&second));

    Ok(())
}

#[test]
fn resolutions_already_taken_prune_their_siblings() -> anyhow::Result<()> {
    let classes = common::shapes();
    let mut heap = HeapSnapshot::new(&classes);
    heap.discover("pkg/Circle", Origin::root("a"));
    let mut engine = common::new_engine(&classes, Config::default());
    let operands = ClassOperands {
        class: "pkg/Rounded".into(),
    };
    let reference = shape(Origin::root("r"));

    let first = engine.instance_of(1, &heap, &PathCondition::new(), &operands, &reference)?;
    let mut path = Path::new();
    let taken = first[0].clone();
    path.commit(1, taken.clone());

    // Asking again on the same path leaves only the resolution taken.
    let second = engine.instance_of(1, &heap, path.condition(), &operands, &reference)?;
    assert_eq!(second.len(), 1);
    assert_eq!(second[0], taken);

    Ok(())
}

#[test]
fn disabling_checks_keeps_everything_for_a_recheck() -> anyhow::Result<()> {
    let classes = common::shapes();
    let mut heap = HeapSnapshot::new(&classes);
    let array = heap.allocate("[Lpkg/Shape;");
    let config = Config::default().with_feasibility_checks(false);
    let mut engine = common::new_engine(&classes, config);

    let access = ArrayAccess {
        array,
        length: Expression::Int(2),
        index: Expression::Int(7),
        element: Reference::Null,
        fresh: false,
    };
    let alternatives = engine.array_load(0, &heap, &PathCondition::new(), &access)?;

    assert_eq!(alternatives.len(), 2);
    assert!(alternatives.iter().all(DecisionAlternative::needs_recheck));

    Ok(())
}

#[test]
fn disabling_faults_removes_fault_alternatives() -> anyhow::Result<()> {
    let classes = common::shapes();
    let heap = HeapSnapshot::new(&classes);
    let config = Config::default().with_fault_alternatives(false);
    let mut engine = common::new_engine(&classes, config);
    let operands = ClassOperands {
        class: "pkg/Circle".into(),
    };

    let alternatives = engine.check_cast(
        0,
        &heap,
        &PathCondition::new(),
        &operands,
        &shape(Origin::root("r")),
    )?;

    assert!(alternatives.iter().all(|a| !a.is_fault()));
    assert!(!alternatives.is_empty());

    Ok(())
}
