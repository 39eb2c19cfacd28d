//! This library implements the decision and dispatch engine of a symbolic
//! interpreter for JVM bytecode.
//!
//! Whenever the interpreter reaches an instruction whose outcome depends on
//! the shape of a heap it only partially knows, it asks the engine for the
//! complete list of ways in which the instruction can behave. Each such
//! [`decision::DecisionAlternative`] carries a guard that the interpreter
//! adds to its path condition when it commits to the alternative, and an
//! identity that stays the same across runs so that explorations can be
//! replayed. Invocations are resolved and dispatched following the rules of
//! the JVM, forking once per possible receiver type when the receiver is
//! symbolic.
//!
//! # How it Works
//!
//! 1. The interpreter decodes the operands of the instruction through an
//!    [`operand::OperandSupplier`].
//! 2. It hands them to the [`Engine`] along with a view of its heap through
//!    [`heap::HeapQuery`] and the [`solver::PathCondition`] of the branch.
//! 3. The [`decision::Enumerator`] lists the candidate resolutions of the
//!    symbolic references involved, and keeps those that the
//!    [`solver::DecisionProcedure`] does not reject.
//! 4. The interpreter forks one [`path::Path`] per alternative, applying the
//!    write-back of the alternative when there is one.
//!
//! # Basic Usage
//!
//! ```
//! use decision_engine::{
//!     class::{ClassFile, ClassName, ClassTable},
//!     heap::HeapSnapshot,
//!     operand::ClassOperands,
//!     solver::{ClauseDecider, PathCondition},
//!     value::{Origin, Reference, ReferenceSymbolic},
//!     watchdog::LazyWatchdog,
//!     Config,
//!     Engine,
//! };
//!
//! let classes = ClassTable::new()
//!     .with(ClassFile::class("pkg/Shape", "java/lang/Object").as_abstract())
//!     .with(ClassFile::class("pkg/Circle", "pkg/Shape"))
//!     .with(ClassFile::class("pkg/Square", "pkg/Shape"));
//! let heap = HeapSnapshot::new(&classes);
//! let mut engine = Engine::new(
//!     Config::default(),
//!     &classes,
//!     &ClauseDecider,
//!     LazyWatchdog.in_rc(),
//! );
//!
//! let shape: Reference = ReferenceSymbolic::new(Origin::root("shape"), "pkg/Shape").into();
//! let operands = ClassOperands {
//!     class: ClassName::new("pkg/Circle"),
//! };
//! let alternatives = engine
//!     .check_cast(0, &heap, &PathCondition::new(), &operands, &shape)
//!     .unwrap();
//!
//! // A fresh circle and null pass the cast, and a fresh square fails it.
//! assert_eq!(alternatives.len(), 3);
//! assert!(alternatives[2].is_fault());
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod class;
pub mod constant;
pub mod decision;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod heap;
pub mod native;
pub mod operand;
pub mod path;
pub mod solver;
pub mod value;
pub mod watchdog;

// Re-exports to provide the library interface.
pub use decision::DecisionAlternative;
pub use engine::{Config, Engine};
