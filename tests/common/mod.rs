//! This module contains common utilities for simplifying the writing of
//! integration tests for this library.

#![cfg(test)]

use decision_engine::{
    class::{ClassFile, ClassTable, MethodInfo},
    engine::{Config, Engine},
    solver::ClauseDecider,
    watchdog::LazyWatchdog,
};

/// Sets up logging for the test binary, so that `RUST_LOG` can be used to
/// inspect the engine while debugging a test.
#[allow(unused)] // It is actually
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Constructs the class hierarchy shared by the integration tests.
///
/// - `pkg/Shape` is abstract, and declares an abstract `area()I`.
/// - `pkg/Circle` and `pkg/Square` extend it and implement `area()I`.
/// - `pkg/Rounded` is an interface with a default `corners()I`, implemented
///   by `pkg/Circle`.
/// - `pkg/Geometry` has a static `unit()Lpkg/Shape;`.
/// - `pkg/Main` extends `pkg/Circle` and overrides `area()I`.
#[allow(unused)] // It is actually
pub fn shapes() -> ClassTable {
    ClassTable::new()
        .with(
            ClassFile::class("pkg/Shape", "java/lang/Object")
                .as_abstract()
                .with_method(MethodInfo::new("area", "()I").as_abstract())
                .with_method(MethodInfo::new("describe", "()Ljava/lang/String;")),
        )
        .with(ClassFile::interface("pkg/Rounded").with_method(MethodInfo::new("corners", "()I")))
        .with(
            ClassFile::class("pkg/Circle", "pkg/Shape")
                .implementing("pkg/Rounded")
                .with_method(MethodInfo::new("area", "()I"))
                .with_method(MethodInfo::new("describe", "()Ljava/lang/String;")),
        )
        .with(
            ClassFile::class("pkg/Square", "pkg/Shape")
                .implementing("pkg/Rounded")
                .with_method(MethodInfo::new("area", "()I"))
                .with_method(MethodInfo::new("corners", "()I")),
        )
        .with(
            ClassFile::class("pkg/Geometry", "java/lang/Object")
                .with_method(MethodInfo::new("unit", "()Lpkg/Shape;").as_static()),
        )
        .with(
            ClassFile::class("pkg/Main", "pkg/Circle")
                .with_method(MethodInfo::new("area", "()I")),
        )
}

/// Constructs an engine over `classes` with the provided `config`, deciding
/// feasibility with the in-memory decider.
#[allow(unused)] // It is actually
pub fn new_engine(classes: &ClassTable, config: Config) -> Engine<'_> {
    init_logging();
    Engine::new(config, classes, &ClauseDecider, LazyWatchdog.in_rc())
}
