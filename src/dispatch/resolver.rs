//! The resolution of symbolic method references, and the selection of the
//! method to execute from the resolved one.

use crate::{
    class::{ClassFile, ClassHierarchy, ClassName, MethodInfo, MethodSignature},
    constant::{INIT_METHOD_NAME, JAVA_OBJECT},
    dispatch::{Discipline, Resolution, ResolutionFailure, ResolutionRequest, ResolvedMethod},
    error::dispatch::Error,
};

/// A method together with the class that declares it.
type Found<'h> = (&'h ClassFile, &'h MethodInfo);

/// The result of a resolution step.
type Selection<'h> = Result<Found<'h>, ResolutionFailure>;

/// Resolves the invocations of a single invocation instruction.
///
/// The dispatch discipline is fixed when the resolver is constructed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MethodResolver {
    discipline: Discipline,
}

impl MethodResolver {
    /// Constructs the resolver for an instruction with the provided flags.
    ///
    /// The flags name the instruction (`invokeinterface`, `invokespecial` or
    /// `invokestatic`, and `invokevirtual` when none is set), not the kind of
    /// constant pool entry it references. Static and special invocations of
    /// interface methods are therefore constructed with `is_interface` unset.
    ///
    /// # Errors
    ///
    /// If more than one flag is set, as no instruction is more than one of
    /// these.
    pub fn new(is_interface: bool, is_special: bool, is_static: bool) -> Result<Self, Error> {
        let discipline = match (is_interface, is_special, is_static) {
            (_, true, true) => return Err(Error::SpecialAndStatic),
            (true, false, true) => return Err(Error::StaticInterface),
            (true, true, false) => return Err(Error::SpecialInterface),
            (false, false, true) => Discipline::Static,
            (false, true, false) => Discipline::Special,
            (true, false, false) => Discipline::Interface,
            (false, false, false) => Discipline::Virtual,
        };
        Ok(Self { discipline })
    }

    /// Gets the discipline used by the resolver.
    #[must_use]
    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// Resolves the method referenced by `request` and selects the method to
    /// execute.
    ///
    /// The receiver type of the request is only consulted by the virtual and
    /// interface disciplines.
    ///
    /// # Errors
    ///
    /// If the request lacks the invoking class for special dispatch, or the
    /// receiver type for virtual and interface dispatch.
    pub fn resolve(
        &self,
        hierarchy: &dyn ClassHierarchy,
        request: &ResolutionRequest,
    ) -> Result<Resolution, Error> {
        let selection = match resolve_reference(hierarchy, request) {
            Ok(resolved) => match self.discipline {
                Discipline::Static => select_static(request, resolved),
                Discipline::Special => select_special(hierarchy, request, resolved)?,
                Discipline::Virtual | Discipline::Interface => {
                    self.select_virtual(hierarchy, request, resolved)?
                }
            },
            Err(failure) => Err(failure),
        };

        let resolution = match selection {
            Ok(found) => Resolution::Resolved(resolved_method(found)),
            Err(failure) => Resolution::Failed(failure),
        };
        log::trace!(
            "Resolved {} invocation of {} to {resolution:?}",
            self.discipline,
            request.method
        );

        Ok(resolution)
    }

    /// Selects the override of `resolved` in the dynamic type of the
    /// receiver.
    fn select_virtual<'h>(
        &self,
        hierarchy: &'h dyn ClassHierarchy,
        request: &ResolutionRequest,
        resolved: Found<'h>,
    ) -> Result<Selection<'h>, Error> {
        let (_, method) = resolved;
        if method.flags.is_static {
            return Ok(Err(incompatible(request)));
        }
        if method.flags.is_private {
            return Ok(Ok(resolved));
        }

        let receiver = request
            .receiver_type
            .as_ref()
            .ok_or_else(|| Error::MissingReceiverType {
                owner: request.method.class.clone(),
            })?;
        let root = if receiver.is_array() {
            ClassName::new(JAVA_OBJECT)
        } else {
            receiver.clone()
        };
        if hierarchy.class(&root).is_none() {
            return Ok(Err(ResolutionFailure::NoClassDefFound { class: root }));
        }
        if self.discipline == Discipline::Interface
            && !hierarchy.is_subclass(receiver, &request.method.class)
        {
            log::trace!("{receiver} does not implement {}", request.method.class);
            return Ok(Err(incompatible(request)));
        }

        Ok(select_from(hierarchy, &root, request, false))
    }
}

/// Resolves the symbolic reference of `request` to a declared method.
fn resolve_reference<'h>(
    hierarchy: &'h dyn ClassHierarchy,
    request: &ResolutionRequest,
) -> Selection<'h> {
    let method = &request.method;
    let owner_name = if method.class.is_array() {
        ClassName::new(JAVA_OBJECT)
    } else {
        method.class.clone()
    };
    let Some(owner) = hierarchy.class(&owner_name) else {
        return Err(ResolutionFailure::NoClassDefFound { class: owner_name });
    };
    if request.is_interface_method != owner.is_interface() {
        return Err(incompatible(request));
    }

    if let Some(found) = hierarchy
        .superclasses(&owner.name)
        .into_iter()
        .find_map(|c| c.method(&method.name, &method.descriptor).map(|m| (c, m)))
    {
        return Ok(found);
    }

    let candidates = maximally_specific(hierarchy, &owner.name, &method.name, &method.descriptor);
    candidates
        .iter()
        .find(|(_, m)| !m.flags.is_abstract)
        .or_else(|| candidates.first())
        .copied()
        .ok_or_else(|| ResolutionFailure::NoSuchMethod {
            method: method.clone(),
        })
}

/// Checks that the resolved method can be invoked statically.
fn select_static<'h>(request: &ResolutionRequest, resolved: Found<'h>) -> Selection<'h> {
    if resolved.1.flags.is_static {
        Ok(resolved)
    } else {
        Err(incompatible(request))
    }
}

/// Selects the method executed by a special invocation, searching from the
/// superclass of the invoking class for `super` calls and from the class of
/// the symbolic reference otherwise.
fn select_special<'h>(
    hierarchy: &'h dyn ClassHierarchy,
    request: &ResolutionRequest,
    resolved: Found<'h>,
) -> Result<Selection<'h>, Error> {
    let (_, method) = resolved;
    if method.flags.is_static {
        return Ok(Err(incompatible(request)));
    }
    let invoking = request
        .invoking_class
        .as_ref()
        .ok_or(Error::MissingInvokingClass)?;

    let owner = &request.method.class;
    let is_super_call = method.name != INIT_METHOD_NAME
        && !request.is_interface_method
        && owner != invoking
        && hierarchy.is_subclass(invoking, owner);
    let root = if is_super_call {
        let Some(superclass) = hierarchy.class(invoking).and_then(|c| c.superclass.clone()) else {
            return Ok(Err(ResolutionFailure::NoClassDefFound {
                class: invoking.clone(),
            }));
        };
        superclass
    } else {
        owner.clone()
    };

    Ok(select_from(hierarchy, &root, request, true))
}

/// Selects the method executed from `root`: the first instance method with
/// the referenced name and descriptor declared by `root` or one of its
/// superclasses, or else the single maximally-specific default method.
///
/// Private methods do not override, and are only selected when
/// `allow_private` is set.
fn select_from<'h>(
    hierarchy: &'h dyn ClassHierarchy,
    root: &ClassName,
    request: &ResolutionRequest,
    allow_private: bool,
) -> Selection<'h> {
    let name = &request.method.name;
    let descriptor = &request.method.descriptor;

    let declared = hierarchy.superclasses(root).into_iter().find_map(|c| {
        c.method(name, descriptor)
            .filter(|m| !m.flags.is_static && (allow_private || !m.flags.is_private))
            .map(|m| (c, m))
    });
    if let Some(found) = declared {
        log::trace!("Selected {name}{descriptor} declared in {}", found.0.name);
        return if found.1.flags.is_abstract {
            Err(ResolutionFailure::AbstractMethod {
                method: resolved_method(found).signature,
            })
        } else {
            Ok(found)
        };
    }

    let defaults: Vec<Found<'h>> = maximally_specific(hierarchy, root, name, descriptor)
        .into_iter()
        .filter(|(_, m)| !m.flags.is_abstract)
        .collect();
    match defaults.as_slice() {
        [found] => Ok(*found),
        [] => Err(ResolutionFailure::AbstractMethod {
            method: request.method.clone(),
        }),
        _ => Err(ResolutionFailure::AmbiguousDefault {
            method:     request.method.clone(),
            candidates: defaults.iter().map(|(c, _)| c.name.clone()).collect(),
        }),
    }
}

/// Gets the maximally-specific superinterface methods of `class` with `name`
/// and `descriptor`: those declared by an interface that no other declaring
/// interface extends.
fn maximally_specific<'h>(
    hierarchy: &'h dyn ClassHierarchy,
    class: &ClassName,
    name: &str,
    descriptor: &str,
) -> Vec<Found<'h>> {
    let candidates: Vec<Found<'h>> = hierarchy
        .superinterfaces(class)
        .into_iter()
        .filter_map(|i| {
            i.method(name, descriptor)
                .filter(|m| !m.flags.is_private && !m.flags.is_static)
                .map(|m| (i, m))
        })
        .collect();

    candidates
        .iter()
        .filter(|(interface, _)| {
            !candidates.iter().any(|(other, _)| {
                other.name != interface.name && hierarchy.is_subclass(&other.name, &interface.name)
            })
        })
        .copied()
        .collect()
}

fn resolved_method((class, method): Found<'_>) -> ResolvedMethod {
    ResolvedMethod {
        signature: MethodSignature::new(
            class.name.clone(),
            method.descriptor.clone(),
            method.name.clone(),
        ),
        flags:     method.flags,
    }
}

fn incompatible(request: &ResolutionRequest) -> ResolutionFailure {
    ResolutionFailure::IncompatibleClassChange {
        method: request.method.clone(),
    }
}
