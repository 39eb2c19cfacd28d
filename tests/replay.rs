//! This module is an integration test that records an exploration and steers
//! a second one down the same path.
#![cfg(test)]

use decision_engine::{
    class::ClassTable,
    engine::{Config, Engine},
    error::replay,
    heap::HeapSnapshot,
    operand::ClassOperands,
    path::{Path, Replay},
    value::{Origin, Reference, ReferenceSymbolic},
    DecisionAlternative,
};

mod common;

/// Runs two decision points, choosing each alternative with `choose`.
fn explore(
    engine: &mut Engine<'_>,
    classes: &ClassTable,
    mut choose: impl FnMut(u32, Vec<DecisionAlternative>) -> anyhow::Result<DecisionAlternative>,
) -> anyhow::Result<Path> {
    let mut heap = HeapSnapshot::new(classes);
    heap.discover("pkg/Circle", Origin::root("seen"));
    let operands = ClassOperands {
        class: "pkg/Circle".into(),
    };
    let first: Reference = ReferenceSymbolic::new(Origin::root("first"), "pkg/Shape").into();
    let second: Reference = ReferenceSymbolic::new(Origin::root("second"), "pkg/Shape").into();

    let mut path = Path::new();
    let alternatives = engine.check_cast(10, &heap, path.condition(), &operands, &first)?;
    let taken = choose(10, alternatives)?;
    path.commit(10, taken);

    let alternatives = engine.instance_of(20, &heap, path.condition(), &operands, &second)?;
    let taken = choose(20, alternatives)?;
    path.commit(20, taken);

    Ok(path)
}

#[test]
fn replaying_a_path_reproduces_it() -> anyhow::Result<()> {
    let classes = common::shapes();
    let mut engine = common::new_engine(&classes, Config::default());
    let recorded = explore(&mut engine, &classes, |_, mut alternatives| {
        Ok(alternatives.remove(alternatives.len() - 1))
    })?;

    let mut replay = Replay::of_path(&recorded);
    let mut engine = common::new_engine(&classes, Config::default());
    let replayed = explore(&mut engine, &classes, |pc, alternatives| {
        Ok(replay.select(pc, &alternatives)?)
    })?;

    assert_eq!(replayed.name(), recorded.name());
    assert_eq!(replayed.identities(), recorded.identities());
    assert_eq!(replayed.condition(), recorded.condition());

    Ok(())
}

#[test]
fn replaying_past_the_record_is_an_error() -> anyhow::Result<()> {
    let classes = common::shapes();
    let mut engine = common::new_engine(&classes, Config::default());
    let mut replay = Replay::new([1]);

    let result = explore(&mut engine, &classes, |pc, alternatives| {
        Ok(replay.select(pc, &alternatives)?)
    });
    let error = result.expect_err("only one decision was recorded");
    let located = error
        .downcast_ref::<replay::LocatedError>()
        .expect("replay errors are kept as is");
    assert_eq!(located.pc, 20);
    assert_eq!(located.payload, replay::Error::Exhausted);

    Ok(())
}
