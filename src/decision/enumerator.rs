//! This module contains the [`Enumerator`], which computes the alternatives
//! of the instructions whose outcome depends on unresolved heap content.
//!
//! # Ordering
//!
//! The alternatives of a decision point are always produced in the same
//! order: objects that the reference may alias in the order reported by the
//! heap, then fresh objects by ascending class name, then null, and finally
//! the alternatives in which the instruction faults. Branch numbers are
//! assigned in that order once the infeasible alternatives have been pruned,
//! so that re-enumerating the same access against the same heap and path
//! yields the same numbering.

use crate::{
    class::{ClassHierarchy, ClassName, FieldSignature},
    constant::FIRST_BRANCH_NUMBER,
    decision::{AlternativeKind, DecisionAlternative, Family, Referent, Slot, WriteBack},
    engine::Config,
    error::{
        container::Locatable,
        decision::{Error, Result},
    },
    heap::HeapQuery,
    solver::{Clause, DecisionProcedure, Feasibility, Guard, PathCondition},
    value::{Expression, HeapPosition, Origin, Reference, ReferenceSymbolic},
};

/// A load from an element of an array of references.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArrayAccess {
    /// The position of the array in the heap.
    pub array: HeapPosition,

    /// The length of the array.
    pub length: Expression,

    /// The index being accessed.
    pub index: Expression,

    /// The value currently held by the accessed element.
    pub element: Reference,

    /// Whether the element value was only just made up for this access, and
    /// so must be written back into the array by the branch that loads it.
    pub fresh: bool,
}

/// A store of a reference into an element of an array.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArrayStore {
    /// The position of the array in the heap.
    pub array: HeapPosition,

    /// The length of the array.
    pub length: Expression,

    /// The index being written.
    pub index: Expression,

    /// The reference being stored, which must already be resolved.
    pub value: Reference,
}

/// A candidate alternative that has not yet been checked for feasibility.
type Candidate = (AlternativeKind, Guard, Option<WriteBack>);

/// Computes the alternatives of heap-dependent instructions against a
/// snapshot of the heap and the current path condition.
///
/// The enumerator only ever queries its collaborators, and is hence safe to
/// use on any number of snapshots at once.
#[derive(Clone, Copy, Debug)]
pub struct Enumerator<'a> {
    config:    &'a Config,
    heap:      &'a dyn HeapQuery,
    hierarchy: &'a dyn ClassHierarchy,
    solver:    &'a dyn DecisionProcedure,
    path:      &'a PathCondition,
}

impl<'a> Enumerator<'a> {
    /// Constructs a new enumerator.
    #[must_use]
    pub fn new(
        config: &'a Config,
        heap: &'a dyn HeapQuery,
        hierarchy: &'a dyn ClassHierarchy,
        solver: &'a dyn DecisionProcedure,
        path: &'a PathCondition,
    ) -> Self {
        Self {
            config,
            heap,
            hierarchy,
            solver,
            path,
        }
    }

    /// Enumerates the alternatives of loading a reference from an array.
    ///
    /// When the element is symbolic, its resolutions are produced under the
    /// assumption that the index is in bounds, and each carries the
    /// write-back of the element if the element is fresh. A concrete element
    /// gives a single in-bounds alternative.
    ///
    /// # Errors
    ///
    /// If the array is not a known array of references, or if the static
    /// type of the element does not fit the array.
    pub fn array_load(&self, pc: u32, access: &ArrayAccess) -> Result<Vec<DecisionAlternative>> {
        let component = self.component_type(pc, access.array)?;
        let in_bounds = Clause::InBounds {
            index:  access.index.clone(),
            length: access.length.clone(),
        };

        let mut candidates: Vec<Candidate> = Vec::new();
        match &access.element {
            Reference::Symbolic(element) => {
                if !self.hierarchy.is_subclass(&component, &element.static_type) {
                    return Err(Error::RequiredTypeMismatch {
                        required: component,
                        actual:   element.static_type.clone(),
                    }
                    .locate(pc));
                }

                let write_back = access.fresh.then(|| WriteBack {
                    container: access.array,
                    slot:      Slot::Element(access.index.clone()),
                    value:     element.clone(),
                });
                let resolutions = self.resolutions(pc, element, &Guard::of(in_bounds), true)?;
                candidates.extend(resolutions.into_iter().map(|(referent, guard)| {
                    (AlternativeKind::Resolved(referent), guard, write_back.clone())
                }));
            }
            Reference::Null | Reference::Concrete(_) => {
                candidates.push((AlternativeKind::InBounds, Guard::of(in_bounds), None));
            }
        }

        if self.config.fault_alternatives {
            candidates.push(out_of_bounds(&access.index, &access.length));
        }

        self.finish(pc, Family::ArrayLoad, candidates)
    }

    /// Enumerates the resolutions of a symbolic reference loaded from the
    /// field `field`.
    ///
    /// # Errors
    ///
    /// If the loaded reference is not symbolic, or is not of the type of the
    /// field.
    pub fn field_load(
        &self,
        pc: u32,
        field: &FieldSignature,
        loaded: &Reference,
    ) -> Result<Vec<DecisionAlternative>> {
        let symbolic = symbolic(pc, loaded)?;
        let Some(declared) = field.reference_type() else {
            return Err(Error::NotAReference {
                class: ClassName::new(field.descriptor.clone()),
            }
            .locate(pc));
        };
        if declared != symbolic.static_type {
            return Err(Error::RequiredTypeMismatch {
                required: declared,
                actual:   symbolic.static_type.clone(),
            }
            .locate(pc));
        }

        let candidates = self
            .resolutions(pc, symbolic, &Guard::new(), true)?
            .into_iter()
            .map(|(referent, guard)| (AlternativeKind::Resolved(referent), guard, None))
            .collect();

        self.finish(pc, Family::FieldLoad, candidates)
    }

    /// Enumerates the alternatives of storing a reference into an array.
    ///
    /// # Errors
    ///
    /// If the array is not a known array of references, or if the stored
    /// reference is not resolved.
    pub fn array_store(&self, pc: u32, store: &ArrayStore) -> Result<Vec<DecisionAlternative>> {
        let component = self.component_type(pc, store.array)?;
        let stored = match &store.value {
            Reference::Null => None,
            Reference::Concrete(position) => Some(self.dynamic_type(pc, *position)?),
            Reference::Symbolic(reference) => {
                return Err(Error::UnresolvedReference {
                    reference: reference.to_string(),
                }
                .locate(pc))
            }
        };
        let assignable = stored
            .as_ref()
            .map_or(true, |class| self.hierarchy.is_subclass(class, &component));

        let in_bounds = Guard::of(Clause::InBounds {
            index:  store.index.clone(),
            length: store.length.clone(),
        });
        let mut candidates: Vec<Candidate> = Vec::new();
        if assignable {
            candidates.push((AlternativeKind::InBounds, in_bounds, None));
        } else if self.config.fault_alternatives {
            candidates.push((AlternativeKind::TypeMismatch { referent: None }, in_bounds, None));
        }
        if self.config.fault_alternatives {
            candidates.push(out_of_bounds(&store.index, &store.length));
        }

        self.finish(pc, Family::ArrayStore, candidates)
    }

    /// Enumerates the alternatives of casting a symbolic reference to
    /// `target`.
    ///
    /// Resolutions to objects that are not instances of `target` become type
    /// mismatches, placed after the resolutions for which the cast succeeds.
    ///
    /// # Errors
    ///
    /// If the reference is not symbolic, or `target` is not known.
    pub fn check_cast(
        &self,
        pc: u32,
        reference: &Reference,
        target: &ClassName,
    ) -> Result<Vec<DecisionAlternative>> {
        let symbolic = symbolic(pc, reference)?;
        self.ensure_known(pc, target)?;

        let mut passing: Vec<Candidate> = Vec::new();
        let mut failing: Vec<Candidate> = Vec::new();
        for (referent, guard) in self.resolutions(pc, symbolic, &Guard::new(), true)? {
            if self.is_instance(pc, &referent, target)? || referent == Referent::Null {
                passing.push((AlternativeKind::Resolved(referent), guard, None));
            } else if self.config.fault_alternatives {
                let kind = AlternativeKind::TypeMismatch {
                    referent: Some(referent),
                };
                failing.push((kind, guard, None));
            }
        }
        passing.extend(failing);

        self.finish(pc, Family::CheckCast, passing)
    }

    /// Enumerates the alternatives of testing whether a symbolic reference
    /// is an instance of `target`.
    ///
    /// # Errors
    ///
    /// If the reference is not symbolic, or `target` is not known.
    pub fn instance_of(
        &self,
        pc: u32,
        reference: &Reference,
        target: &ClassName,
    ) -> Result<Vec<DecisionAlternative>> {
        let symbolic = symbolic(pc, reference)?;
        self.ensure_known(pc, target)?;

        let mut candidates: Vec<Candidate> = Vec::new();
        for (referent, guard) in self.resolutions(pc, symbolic, &Guard::new(), true)? {
            let holds = self.is_instance(pc, &referent, target)?;
            candidates.push((AlternativeKind::TypeTest { referent, holds }, guard, None));
        }

        self.finish(pc, Family::InstanceOf, candidates)
    }

    /// Enumerates the resolutions of the symbolic receiver of an invocation.
    ///
    /// # Errors
    ///
    /// If the receiver is not symbolic.
    pub fn receivers(&self, pc: u32, receiver: &Reference) -> Result<Vec<DecisionAlternative>> {
        let symbolic = symbolic(pc, receiver)?;
        let candidates = self
            .resolutions(pc, symbolic, &Guard::new(), self.config.null_receivers)?
            .into_iter()
            .map(|(referent, guard)| (AlternativeKind::Resolved(referent), guard, None))
            .collect();

        self.finish(pc, Family::Invoke, candidates)
    }

    /// Computes the ways in which `reference` can be resolved, each with the
    /// guard `base` extended by the clause that selects it.
    fn resolutions(
        &self,
        pc: u32,
        reference: &ReferenceSymbolic,
        base: &Guard,
        allow_null: bool,
    ) -> Result<Vec<(Referent, Guard)>> {
        let required = &reference.static_type;
        let origin = &reference.origin;
        if !required.is_reference() {
            return Err(Error::NotAReference {
                class: required.clone(),
            }
            .locate(pc));
        }
        self.ensure_known(pc, required)?;

        if let Some(clause) = self.path.resolution_of(origin) {
            return Ok(self.resolved(origin, clause, base).into_iter().collect());
        }

        let mut resolutions = Vec::new();
        for candidate in self.heap.alias_candidates(required, origin) {
            let guard = base.clone().and(Clause::Aliases {
                reference: origin.clone(),
                target:    candidate.origin.clone(),
                position:  candidate.position,
            });
            let referent = Referent::Aliases {
                object_position: candidate.position,
                object_origin:   candidate.origin,
            };
            resolutions.push((referent, guard));
        }

        if self.heap.fresh_object_admissible(required) {
            let mut classes = self.heap.expansion_classes(required);
            classes.sort();
            classes.dedup();
            for class in classes {
                let guard = base.clone().and(Clause::Expands {
                    reference: origin.clone(),
                    class:     class.clone(),
                });
                resolutions.push((Referent::Fresh { class }, guard));
            }
        }

        if allow_null && self.heap.null_admissible(required, origin) {
            let guard = base.clone().and(Clause::Null {
                reference: origin.clone(),
            });
            resolutions.push((Referent::Null, guard));
        }

        Ok(resolutions)
    }

    /// Gets the single resolution of the reference with `origin` that the path
    /// condition already commits to through `clause`.
    ///
    /// An expansion that the heap has since materialized becomes an alias of
    /// the materialized object, under the same clause.
    fn resolved(&self, origin: &Origin, clause: &Clause, base: &Guard) -> Option<(Referent, Guard)> {
        let referent = match clause {
            Clause::Aliases {
                target, position, ..
            } => Referent::Aliases {
                object_position: *position,
                object_origin:   target.clone(),
            },
            Clause::Expands { class, .. } => match self.heap.materialized(origin) {
                Some(position) => Referent::Aliases {
                    object_position: position,
                    object_origin:   origin.clone(),
                },
                None => Referent::Fresh {
                    class: class.clone(),
                },
            },
            Clause::Null { .. } => Referent::Null,
            Clause::InBounds { .. } | Clause::OutOfBounds { .. } => return None,
        };
        log::trace!("Reference {origin} is already resolved by {clause}");
        Some((referent, base.clone().and(clause.clone())))
    }

    /// Checks the feasibility of each candidate in turn, and numbers the
    /// alternatives that survive.
    fn finish(
        &self,
        pc: u32,
        family: Family,
        candidates: Vec<Candidate>,
    ) -> Result<Vec<DecisionAlternative>> {
        let mut kept = Vec::new();
        for (kind, guard, write_back) in candidates {
            let feasibility = if self.config.feasibility_checks {
                self.solver.check_feasible(self.path, &guard)
            } else {
                Feasibility::Unknown
            };

            let alternative = DecisionAlternative::new(family, kind, guard, write_back);
            match feasibility {
                Feasibility::Unsat => {
                    log::debug!(
                        "Pruned infeasible {family} alternative {} under {}",
                        alternative.kind(),
                        alternative.guard()
                    );
                    continue;
                }
                Feasibility::Unknown => {
                    if self.config.feasibility_checks {
                        log::warn!(
                            "Could not decide the feasibility of {family} alternative {} under {}",
                            alternative.kind(),
                            alternative.guard()
                        );
                    }
                    kept.push(alternative.flagged_for_recheck(true));
                }
                Feasibility::Sat => kept.push(alternative),
            }
        }

        if kept.is_empty() {
            if self.config.fault_alternatives {
                return Err(Error::NoAlternatives.locate(pc));
            }
            log::debug!("Every non-faulting alternative of {family} at pc {pc} is infeasible");
        }

        let numbered: Vec<DecisionAlternative> = (FIRST_BRANCH_NUMBER..)
            .zip(kept)
            .map(|(number, alternative)| alternative.numbered(number))
            .collect();
        for alternative in &numbered {
            log::debug!("Kept alternative {alternative}");
        }

        Ok(numbered)
    }

    fn ensure_known(&self, pc: u32, class: &ClassName) -> Result<()> {
        if self.hierarchy.is_known(class) {
            Ok(())
        } else {
            Err(Error::UnknownClass {
                class: class.clone(),
            }
            .locate(pc))
        }
    }

    fn dynamic_type(&self, pc: u32, position: HeapPosition) -> Result<ClassName> {
        self.heap
            .dynamic_type(position)
            .ok_or_else(|| Error::UnknownObject { position }.locate(pc))
    }

    /// Gets the component type of the array of references at `array`.
    fn component_type(&self, pc: u32, array: HeapPosition) -> Result<ClassName> {
        let class = self.dynamic_type(pc, array)?;
        let Some(component) = class.component() else {
            return Err(Error::NotAnArray { class }.locate(pc));
        };
        if component.is_reference() {
            Ok(component)
        } else {
            Err(Error::NotAReference { class: component }.locate(pc))
        }
    }

    /// Checks if the object `referent` resolves to is an instance of
    /// `target`. Null is an instance of nothing.
    fn is_instance(&self, pc: u32, referent: &Referent, target: &ClassName) -> Result<bool> {
        let class = match referent {
            Referent::Aliases {
                object_position, ..
            } => self.dynamic_type(pc, *object_position)?,
            Referent::Fresh { class } => class.clone(),
            Referent::Null => return Ok(false),
        };
        Ok(self.hierarchy.is_subclass(&class, target))
    }
}

fn out_of_bounds(index: &Expression, length: &Expression) -> Candidate {
    let guard = Guard::of(Clause::OutOfBounds {
        index:  index.clone(),
        length: length.clone(),
    });
    (AlternativeKind::OutOfBounds, guard, None)
}

/// Gets the symbolic reference that the engine must resolve. Concrete
/// references never reach the enumerator.
fn symbolic(pc: u32, reference: &Reference) -> Result<&ReferenceSymbolic> {
    reference.as_symbolic().ok_or_else(|| {
        Error::NotSymbolic {
            reference: reference.to_string(),
        }
        .locate(pc)
    })
}
