//! This module contains the [`Engine`], the entry point through which the
//! interpreter asks for the alternatives of heap-dependent instructions and
//! for the targets of invocations.
//!
//! The engine holds everything that is fixed for the duration of an
//! analysis: the configuration, the class hierarchy, the decision procedure,
//! the native overrides and the watchdog. The heap and the path condition
//! belong to the branch being executed, and are passed to every call.

pub mod config;

use std::fmt::{Display, Formatter};

pub use config::Config;

use crate::{
    class::{ClassHierarchy, ClassName},
    constant::NULL_POINTER_EXCEPTION,
    decision::{ArrayAccess, ArrayStore, DecisionAlternative, Enumerator, Referent},
    dispatch::{
        Discipline,
        MethodResolver,
        Resolution,
        ResolutionFailure,
        ResolutionRequest,
        ResolvedMethod,
    },
    error::{
        container::Locatable,
        decision::{self, Error as DecisionError},
        Result,
    },
    heap::HeapQuery,
    native::NativeOverrideRegistry,
    operand::{ClassOperands, FieldOperands, MethodOperands},
    solver::{DecisionProcedure, PathCondition},
    value::{HeapPosition, Reference},
    watchdog::DynWatchdog,
};

/// An invocation instruction as seen by the engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    /// The decoded operands of the instruction.
    pub operands: MethodOperands,

    /// Whether the instruction is `invokeinterface`. This is distinct from
    /// whether the referenced method is an interface method, as static and
    /// special invocations may also reference interface methods.
    pub is_interface: bool,

    /// Whether the instruction is `invokespecial`.
    pub is_special: bool,

    /// Whether the instruction is `invokestatic`.
    pub is_static: bool,

    /// The class declaring the method that contains the instruction.
    pub invoking_class: ClassName,

    /// The receiver of the invocation, or [`None`] for static invocations.
    pub receiver: Option<Reference>,
}

/// What an invocation does on one branch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Target {
    /// Execute the bytecode of the method.
    Method(ResolvedMethod),

    /// Run the registered override of the native method.
    Overridden(ResolvedMethod),

    /// The receiver is null.
    NullReceiver,

    /// No method can be executed.
    Failure(ResolutionFailure),
}

impl Target {
    /// Gets the class of the exception or error that the analyzed program
    /// raises on this branch, if any.
    #[must_use]
    pub fn fault(&self) -> Option<&'static str> {
        match self {
            Self::Method(_) | Self::Overridden(_) => None,
            Self::NullReceiver => Some(NULL_POINTER_EXCEPTION),
            Self::Failure(failure) => Some(failure.error_class()),
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Method(method) => write!(f, "{method}"),
            Self::Overridden(method) => write!(f, "{method} (overridden)"),
            Self::NullReceiver => write!(f, "null receiver"),
            Self::Failure(failure) => write!(f, "{failure}"),
        }
    }
}

/// The target of an invocation on one branch, along with the alternative
/// for the receiver that selects the branch.
///
/// The alternative is [`None`] when the invocation does not fork.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dispatched {
    pub alternative: Option<DecisionAlternative>,
    pub target:      Target,
}

impl Dispatched {
    fn unforked(target: Target) -> Self {
        Self {
            alternative: None,
            target,
        }
    }
}

/// The decision and dispatch engine.
#[derive(Debug)]
pub struct Engine<'a> {
    /// The configuration of the engine.
    config: Config,

    /// The classes of the analyzed program.
    hierarchy: &'a dyn ClassHierarchy,

    /// The procedure that decides the feasibility of alternatives.
    solver: &'a dyn DecisionProcedure,

    /// The overrides for environment-dependent native methods.
    natives: NativeOverrideRegistry,

    /// A watchdog that gets polled at intervals to check whether the analysis
    /// needs to exit.
    watchdog: DynWatchdog,

    /// The number of operations performed, for polling the watchdog.
    operations: usize,
}

impl<'a> Engine<'a> {
    /// Constructs a new engine, building its native overrides from the
    /// environment in `config`.
    #[must_use]
    pub fn new(
        config: Config,
        hierarchy: &'a dyn ClassHierarchy,
        solver: &'a dyn DecisionProcedure,
        watchdog: DynWatchdog,
    ) -> Self {
        let natives = NativeOverrideRegistry::new(&config.environment);
        Self {
            config,
            hierarchy,
            solver,
            natives,
            watchdog,
            operations: 0,
        }
    }

    /// Gets the configuration of the engine.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gets the watchdog that can stop the engine.
    #[must_use]
    pub fn watchdog(&self) -> DynWatchdog {
        self.watchdog.clone()
    }

    /// Gets the native overrides of the engine.
    #[must_use]
    pub fn natives(&self) -> &NativeOverrideRegistry {
        &self.natives
    }

    /// Gets the alternatives of the array load at `pc`.
    ///
    /// # Errors
    ///
    /// If the access violates the contract of the enumerator, or the watchdog
    /// stops the engine.
    pub fn array_load(
        &mut self,
        pc: u32,
        heap: &dyn HeapQuery,
        path: &PathCondition,
        access: &ArrayAccess,
    ) -> Result<Vec<DecisionAlternative>> {
        self.poll_watchdog(pc)?;
        Ok(self.enumerator(heap, path).array_load(pc, access)?)
    }

    /// Gets the alternatives of loading the symbolic reference `loaded` from
    /// the field named by `operands`.
    ///
    /// # Errors
    ///
    /// If the access violates the contract of the enumerator, or the watchdog
    /// stops the engine.
    pub fn field_load(
        &mut self,
        pc: u32,
        heap: &dyn HeapQuery,
        path: &PathCondition,
        operands: &FieldOperands,
        loaded: &Reference,
    ) -> Result<Vec<DecisionAlternative>> {
        self.poll_watchdog(pc)?;
        Ok(self
            .enumerator(heap, path)
            .field_load(pc, &operands.signature, loaded)?)
    }

    /// Gets the alternatives of the array store at `pc`.
    ///
    /// # Errors
    ///
    /// If the store violates the contract of the enumerator, or the watchdog
    /// stops the engine.
    pub fn array_store(
        &mut self,
        pc: u32,
        heap: &dyn HeapQuery,
        path: &PathCondition,
        store: &ArrayStore,
    ) -> Result<Vec<DecisionAlternative>> {
        self.poll_watchdog(pc)?;
        Ok(self.enumerator(heap, path).array_store(pc, store)?)
    }

    /// Gets the alternatives of casting `reference` to the class named by
    /// `operands`.
    ///
    /// # Errors
    ///
    /// If the cast violates the contract of the enumerator, or the watchdog
    /// stops the engine.
    pub fn check_cast(
        &mut self,
        pc: u32,
        heap: &dyn HeapQuery,
        path: &PathCondition,
        operands: &ClassOperands,
        reference: &Reference,
    ) -> Result<Vec<DecisionAlternative>> {
        self.poll_watchdog(pc)?;
        Ok(self
            .enumerator(heap, path)
            .check_cast(pc, reference, &operands.class)?)
    }

    /// Gets the alternatives of testing whether `reference` is an instance of
    /// the class named by `operands`.
    ///
    /// # Errors
    ///
    /// If the test violates the contract of the enumerator, or the watchdog
    /// stops the engine.
    pub fn instance_of(
        &mut self,
        pc: u32,
        heap: &dyn HeapQuery,
        path: &PathCondition,
        operands: &ClassOperands,
        reference: &Reference,
    ) -> Result<Vec<DecisionAlternative>> {
        self.poll_watchdog(pc)?;
        Ok(self
            .enumerator(heap, path)
            .instance_of(pc, reference, &operands.class)?)
    }

    /// Computes the target of the invocation at `pc` on every branch.
    ///
    /// Invocations through a symbolic receiver fork into one branch per
    /// resolution of the receiver. Virtual and interface invocations are
    /// dispatched on the dynamic type the receiver has on each branch, while
    /// special invocations select the same method on every non-null branch.
    /// Static invocations have no receiver and never fork.
    ///
    /// # Errors
    ///
    /// If the flags of the invocation are contradictory, if a required part
    /// of the invocation is missing, if the receiver cannot be enumerated, or
    /// if the watchdog stops the engine.
    pub fn invoke(
        &mut self,
        pc: u32,
        heap: &dyn HeapQuery,
        path: &PathCondition,
        invocation: &Invocation,
    ) -> Result<Vec<Dispatched>> {
        self.poll_watchdog(pc)?;
        let resolver = MethodResolver::new(
            invocation.is_interface,
            invocation.is_special,
            invocation.is_static,
        )
        .locate(pc)?;
        let request = ResolutionRequest::new(&invocation.operands)
            .from_class(invocation.invoking_class.clone());
        let discipline = resolver.discipline();

        if discipline == Discipline::Static {
            let target = self.dispatch(pc, &resolver, &request)?;
            return Ok(vec![Dispatched::unforked(target)]);
        }

        let receiver = match &invocation.receiver {
            Some(receiver @ Reference::Symbolic(_)) => receiver,
            Some(Reference::Null) => return Ok(vec![Dispatched::unforked(Target::NullReceiver)]),
            Some(Reference::Concrete(position)) if discipline.uses_receiver() => {
                let receiver_type = dynamic_type(pc, heap, *position)?;
                let target = self.dispatch(pc, &resolver, &request.on_receiver(receiver_type))?;
                return Ok(vec![Dispatched::unforked(target)]);
            }
            Some(Reference::Concrete(_)) | None => {
                let target = self.dispatch(pc, &resolver, &request)?;
                return Ok(vec![Dispatched::unforked(target)]);
            }
        };
        let alternatives = self.enumerator(heap, path).receivers(pc, receiver)?;
        let mut dispatched = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let receiver_type = match alternative.referent() {
                Some(Referent::Aliases {
                    object_position, ..
                }) => Some(dynamic_type(pc, heap, *object_position)?),
                Some(Referent::Fresh { class }) => Some(class.clone()),
                Some(Referent::Null) | None => None,
            };
            let target = match receiver_type {
                Some(class) if discipline.uses_receiver() => {
                    self.dispatch(pc, &resolver, &request.clone().on_receiver(class))?
                }
                Some(_) => self.dispatch(pc, &resolver, &request)?,
                None => Target::NullReceiver,
            };
            log::debug!(
                "Branch {} at pc {pc} invokes {target}",
                alternative.branch_number()
            );
            dispatched.push(Dispatched {
                alternative: Some(alternative),
                target,
            });
        }

        Ok(dispatched)
    }

    /// Resolves `request`, and routes native targets to their overrides.
    fn dispatch(
        &self,
        pc: u32,
        resolver: &MethodResolver,
        request: &ResolutionRequest,
    ) -> Result<Target> {
        let resolution = resolver.resolve(self.hierarchy, request).locate(pc)?;
        let target = match resolution {
            Resolution::Resolved(method) if method.is_native() => {
                if self.natives.is_overridden(&method.signature) {
                    Target::Overridden(method)
                } else {
                    log::warn!("Native method {method} invoked at pc {pc} has no override");
                    Target::Failure(ResolutionFailure::UnresolvedNative {
                        method: method.signature,
                    })
                }
            }
            Resolution::Resolved(method) => Target::Method(method),
            Resolution::Failed(failure) => {
                if resolver.discipline() == Discipline::Static {
                    log::debug!("Static invocation at pc {pc} fails: {failure}");
                }
                Target::Failure(failure)
            }
        };
        Ok(target)
    }

    fn enumerator<'e>(&'e self, heap: &'e dyn HeapQuery, path: &'e PathCondition) -> Enumerator<'e> {
        Enumerator::new(&self.config, heap, self.hierarchy, self.solver, path)
    }

    /// Counts an operation, and checks if the watchdog asks for the engine to
    /// stop whenever the polling interval is reached.
    fn poll_watchdog(&mut self, pc: u32) -> decision::Result<()> {
        self.operations += 1;
        let polling_interval = self.watchdog.poll_every().max(1);
        if self.operations % polling_interval == 0 && self.watchdog.should_stop() {
            log::warn!("Engine stopped by the watchdog at pc {pc}");
            return Err(DecisionError::StoppedByWatchdog.locate(pc));
        }
        Ok(())
    }
}

/// Gets the dynamic type of the object at `position`.
fn dynamic_type(pc: u32, heap: &dyn HeapQuery, position: HeapPosition) -> Result<ClassName> {
    Ok(heap
        .dynamic_type(position)
        .ok_or(DecisionError::UnknownObject { position })
        .locate(pc)?)
}
