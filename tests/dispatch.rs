//! This module is an integration test for the resolution and dispatch of
//! invocations through the engine.
#![cfg(test)]

use decision_engine::{
    class::{ClassFile, ClassName, MethodInfo, MethodSignature},
    constant::{ABSTRACT_METHOD_ERROR, NULL_POINTER_EXCEPTION},
    dispatch::ResolutionFailure,
    engine::{Config, Dispatched, Invocation, Target},
    heap::HeapSnapshot,
    operand::MethodOperands,
    solver::PathCondition,
    value::{Origin, Reference, ReferenceSymbolic},
};

mod common;

fn invocation(class: &str, descriptor: &str, name: &str, receiver: Option<Reference>) -> Invocation {
    Invocation {
        operands: MethodOperands {
            signature:           MethodSignature::new(class, descriptor, name),
            is_interface_method: false,
        },
        is_interface: false,
        is_special: false,
        is_static: false,
        invoking_class: ClassName::new("pkg/Main"),
        receiver,
    }
}

fn selected(dispatched: &[Dispatched]) -> Vec<String> {
    dispatched
        .iter()
        .map(|d| match &d.target {
            Target::Method(method) | Target::Overridden(method) => method.signature.to_string(),
            other => other.to_string(),
        })
        .collect()
}

#[test]
fn virtual_dispatch_follows_the_receiver_and_special_does_not() -> anyhow::Result<()> {
    let classes = common::shapes();
    let mut heap = HeapSnapshot::new(&classes);
    let main = heap.allocate("pkg/Main");
    let mut engine = common::new_engine(&classes, Config::default());
    let path = PathCondition::new();

    let on_virtual = invocation("pkg/Circle", "()I", "area", Some(Reference::Concrete(main)));
    let mut on_special = on_virtual.clone();
    on_special.is_special = true;

    let virtual_targets = engine.invoke(0, &heap, &path, &on_virtual)?;
    let special_targets = engine.invoke(0, &heap, &path, &on_special)?;

    assert_eq!(selected(&virtual_targets), vec!["pkg/Main:()I:area"]);
    assert_eq!(selected(&special_targets), vec!["pkg/Circle:()I:area"]);

    // The same holds from within the code of the declaring class itself.
    on_special.invoking_class = ClassName::new("pkg/Circle");
    let own_targets = engine.invoke(0, &heap, &path, &on_special)?;
    assert_eq!(selected(&own_targets), vec!["pkg/Circle:()I:area"]);

    Ok(())
}

#[test]
fn symbolic_receivers_fork_once_per_resolution() -> anyhow::Result<()> {
    let classes = common::shapes();
    let heap = HeapSnapshot::new(&classes);
    let mut engine = common::new_engine(&classes, Config::default());
    let receiver = ReferenceSymbolic::new(Origin::root("this"), "pkg/Shape");

    let dispatched = engine.invoke(
        2,
        &heap,
        &PathCondition::new(),
        &invocation("pkg/Shape", "()Ljava/lang/String;", "describe", Some(receiver.into())),
    )?;

    assert_eq!(selected(&dispatched), vec![
        "pkg/Circle:()Ljava/lang/String;:describe",
        "pkg/Circle:()Ljava/lang/String;:describe",
        "pkg/Shape:()Ljava/lang/String;:describe",
        "null receiver",
    ]);
    let numbers: Vec<_> = dispatched
        .iter()
        .filter_map(|d| d.alternative.as_ref())
        .map(|a| a.branch_number())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    assert_eq!(dispatched[3].target.fault(), Some(NULL_POINTER_EXCEPTION));

    Ok(())
}

#[test]
fn null_receivers_can_be_excluded() -> anyhow::Result<()> {
    let classes = common::shapes();
    let heap = HeapSnapshot::new(&classes);
    let mut engine = common::new_engine(&classes, Config::default().with_null_receivers(false));
    let receiver = ReferenceSymbolic::new(Origin::root("this"), "pkg/Shape");

    let dispatched = engine.invoke(
        2,
        &heap,
        &PathCondition::new(),
        &invocation("pkg/Shape", "()I", "area", Some(receiver.into())),
    )?;

    assert_eq!(dispatched.len(), 3);
    assert!(dispatched.iter().all(|d| d.target.fault().is_none()));

    Ok(())
}

#[test]
fn interface_defaults_are_selected_when_not_overridden() -> anyhow::Result<()> {
    let classes = common::shapes();
    let mut heap = HeapSnapshot::new(&classes);
    let circle = heap.allocate("pkg/Circle");
    let square = heap.allocate("pkg/Square");
    let mut engine = common::new_engine(&classes, Config::default());
    let path = PathCondition::new();

    let corners = |position| {
        let mut invocation =
            invocation("pkg/Rounded", "()I", "corners", Some(Reference::Concrete(position)));
        invocation.operands.is_interface_method = true;
        invocation.is_interface = true;
        invocation
    };

    let on_circle = engine.invoke(0, &heap, &path, &corners(circle))?;
    let on_square = engine.invoke(0, &heap, &path, &corners(square))?;
    assert_eq!(selected(&on_circle), vec!["pkg/Rounded:()I:corners"]);
    assert_eq!(selected(&on_square), vec!["pkg/Square:()I:corners"]);

    Ok(())
}

#[test]
fn special_invocations_still_check_the_receiver() -> anyhow::Result<()> {
    let classes = common::shapes();
    let heap = HeapSnapshot::new(&classes);
    let mut engine = common::new_engine(&classes, Config::default());
    let path = PathCondition::new();

    let mut on_null = invocation("pkg/Circle", "()I", "area", Some(Reference::Null));
    on_null.is_special = true;
    let dispatched = engine.invoke(0, &heap, &path, &on_null)?;
    assert_eq!(dispatched.len(), 1);
    assert_eq!(dispatched[0].target, Target::NullReceiver);
    assert_eq!(dispatched[0].target.fault(), Some(NULL_POINTER_EXCEPTION));

    // A symbolic receiver forks over its resolutions, but every non-null
    // branch selects the same method regardless of its dynamic type.
    let receiver = ReferenceSymbolic::new(Origin::root("this"), "pkg/Circle");
    let mut on_symbolic = invocation("pkg/Circle", "()I", "area", Some(receiver.into()));
    on_symbolic.is_special = true;
    let dispatched = engine.invoke(0, &heap, &path, &on_symbolic)?;
    assert_eq!(selected(&dispatched), vec![
        "pkg/Circle:()I:area",
        "pkg/Circle:()I:area",
        "null receiver",
    ]);
    assert!(dispatched.iter().all(|d| d.alternative.is_some()));

    Ok(())
}

#[test]
fn static_interface_methods_are_invoked_statically() -> anyhow::Result<()> {
    let classes = common::shapes().with(
        ClassFile::interface("pkg/Shapes").with_method(MethodInfo::new("of", "()I").as_static()),
    );
    let heap = HeapSnapshot::new(&classes);
    let mut engine = common::new_engine(&classes, Config::default());

    let mut of = invocation("pkg/Shapes", "()I", "of", None);
    of.is_static = true;
    of.operands.is_interface_method = true;
    let dispatched = engine.invoke(0, &heap, &PathCondition::new(), &of)?;

    assert_eq!(selected(&dispatched), vec!["pkg/Shapes:()I:of"]);
    assert!(dispatched[0].alternative.is_none());

    Ok(())
}

#[test]
fn static_invocations_do_not_depend_on_the_heap() -> anyhow::Result<()> {
    let classes = common::shapes();
    let empty = HeapSnapshot::new(&classes);
    let mut populated = HeapSnapshot::new(&classes);
    populated.discover("pkg/Square", Origin::root("a"));
    populated.allocate("pkg/Main");
    let mut engine = common::new_engine(&classes, Config::default());

    let mut unit = invocation("pkg/Geometry", "()Lpkg/Shape;", "unit", None);
    unit.is_static = true;
    let on_empty = engine.invoke(0, &empty, &PathCondition::new(), &unit)?;
    let on_populated = engine.invoke(0, &populated, &PathCondition::new(), &unit)?;

    assert_eq!(on_empty, on_populated);
    assert_eq!(selected(&on_empty), vec!["pkg/Geometry:()Lpkg/Shape;:unit"]);
    assert!(on_empty[0].alternative.is_none());

    Ok(())
}

#[test]
fn resolution_failures_are_targets_not_errors() -> anyhow::Result<()> {
    let classes = common::shapes();
    let heap = HeapSnapshot::new(&classes);
    let mut engine = common::new_engine(&classes, Config::default());
    let path = PathCondition::new();

    let mut missing = invocation("pkg/Geometry", "()V", "absent", None);
    missing.is_static = true;
    let dispatched = engine.invoke(0, &heap, &path, &missing)?;
    assert!(matches!(
        dispatched[0].target,
        Target::Failure(ResolutionFailure::NoSuchMethod { .. })
    ));

    let mut abstract_call = invocation("pkg/Shape", "()I", "area", None);
    abstract_call.is_special = true;
    abstract_call.invoking_class = ClassName::new("pkg/Geometry");
    let dispatched = engine.invoke(0, &heap, &path, &abstract_call)?;
    assert_eq!(dispatched[0].target.fault(), Some(ABSTRACT_METHOD_ERROR));

    Ok(())
}
