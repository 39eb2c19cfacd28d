//! This module contains the model of the alternatives produced at the
//! decision points of the analyzed program, along with the enumerator that
//! computes them.
//!
//! # Identity
//!
//! Every alternative has an [`Identity`] computed once, at construction, from
//! its canonical form: the code of its family and kind, its guard, and the
//! fields that distinguish it from its siblings. Equality and hashing of
//! alternatives consider the identity alone. In particular the branch number
//! is not part of the identity, as it only reflects the position of the
//! alternative among its siblings.

pub mod cache;
pub mod enumerator;
pub mod identity;

use std::fmt::{Display, Formatter};

use derivative::Derivative;

pub use cache::AlternativeCache;
pub use enumerator::{ArrayAccess, ArrayStore, Enumerator};
pub use identity::Identity;

use crate::{
    class::ClassName,
    constant::{
        ARRAY_INDEX_OUT_OF_BOUNDS_EXCEPTION,
        ARRAY_LOAD_CODE,
        ARRAY_STORE_CODE,
        ARRAY_STORE_EXCEPTION,
        CHECK_CAST_CODE,
        CLASS_CAST_EXCEPTION,
        FIELD_LOAD_CODE,
        FIRST_BRANCH_NUMBER,
        INSTANCE_OF_CODE,
        INVOKE_CODE,
        NULL_POINTER_EXCEPTION,
    },
    solver::Guard,
    value::{Expression, HeapPosition, Origin, ReferenceSymbolic},
};

/// The position of an alternative among its siblings, starting from
/// [`FIRST_BRANCH_NUMBER`].
pub type BranchNumber = u32;

/// The family of instructions that gave rise to a decision.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Family {
    ArrayLoad,
    FieldLoad,
    ArrayStore,
    CheckCast,
    InstanceOf,
    Invoke,
}

impl Family {
    /// Gets the stable code of the family.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::ArrayLoad => ARRAY_LOAD_CODE,
            Self::FieldLoad => FIELD_LOAD_CODE,
            Self::ArrayStore => ARRAY_STORE_CODE,
            Self::CheckCast => CHECK_CAST_CODE,
            Self::InstanceOf => INSTANCE_OF_CODE,
            Self::Invoke => INVOKE_CODE,
        }
    }
}

impl Display for Family {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// What a symbolic reference resolves to on a branch.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Referent {
    /// An object that was already discovered.
    Aliases {
        object_position: HeapPosition,
        object_origin:   Origin,
    },

    /// An object that has not been seen before, of exactly `class`.
    Fresh { class: ClassName },

    /// The null reference.
    Null,
}

impl Display for Referent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aliases {
                object_position,
                object_origin,
            } => write!(f, "Aliases(pos={object_position},origin={object_origin})"),
            Self::Fresh { class } => write!(f, "Fresh(class={class})"),
            Self::Null => write!(f, "Null"),
        }
    }
}

/// The outcome that an alternative stands for.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum AlternativeKind {
    /// The accessed reference resolves to `_0` and execution proceeds
    /// normally.
    Resolved(Referent),

    /// The tested reference resolves to `referent`, for which the type test
    /// evaluates to `holds`.
    TypeTest { referent: Referent, holds: bool },

    /// The array access is within bounds and its value needs no resolution.
    InBounds,

    /// The array access is outside of the bounds of the array.
    OutOfBounds,

    /// The accessed value does not have the type required by the
    /// instruction.
    TypeMismatch { referent: Option<Referent> },
}

impl AlternativeKind {
    /// Gets the name of the variant.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resolved(Referent::Aliases { .. }) => "Aliases",
            Self::Resolved(Referent::Fresh { .. }) => "Fresh",
            Self::Resolved(Referent::Null) => "Null",
            Self::TypeTest { .. } => "TypeTest",
            Self::InBounds => "InBounds",
            Self::OutOfBounds => "OutOfBounds",
            Self::TypeMismatch { .. } => "TypeMismatch",
        }
    }

    /// Gets what the accessed reference resolves to, if resolving it is part
    /// of this outcome.
    #[must_use]
    pub fn referent(&self) -> Option<&Referent> {
        match self {
            Self::Resolved(referent) | Self::TypeTest { referent, .. } => Some(referent),
            Self::TypeMismatch { referent } => referent.as_ref(),
            Self::InBounds | Self::OutOfBounds => None,
        }
    }
}

impl Display for AlternativeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved(referent) => write!(f, "{referent}"),
            Self::TypeTest { referent, holds } => write!(f, "{referent}/holds={holds}"),
            Self::InBounds => write!(f, "InBounds"),
            Self::OutOfBounds => write!(f, "OutOfBounds"),
            Self::TypeMismatch { referent: None } => write!(f, "TypeMismatch"),
            Self::TypeMismatch {
                referent: Some(referent),
            } => write!(f, "TypeMismatch({referent})"),
        }
    }
}

/// A slot of a container object.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Slot {
    Field(String),
    Element(Expression),
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(name) => write!(f, ".{name}"),
            Self::Element(index) => write!(f, "[{index}]"),
        }
    }
}

/// A store that the branch taking an alternative must perform so that later
/// accesses to the same slot observe the same value.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct WriteBack {
    /// The position of the object that owns the slot.
    pub container: HeapPosition,

    /// The slot to be written.
    pub slot: Slot,

    /// The reference to store.
    pub value: ReferenceSymbolic,
}

impl Display for WriteBack {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object[{}]{} := {}", self.container, self.slot, self.value)
    }
}

/// One guarded, mutually-exclusive outcome of a decision point.
///
/// Alternatives are immutable once they leave the enumerator.
#[derive(Clone, Debug, Derivative)]
#[derivative(Hash, Eq, PartialEq)]
pub struct DecisionAlternative {
    /// The key by which alternatives are compared and hashed.
    identity: Identity,

    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    family: Family,

    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    kind: AlternativeKind,

    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    guard: Guard,

    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    write_back: Option<WriteBack>,

    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    branch_number: BranchNumber,

    #[derivative(PartialEq = "ignore", Hash = "ignore")]
    needs_recheck: bool,
}

impl DecisionAlternative {
    /// Constructs a new alternative of the given `family` and `kind`, taken
    /// under `guard`.
    ///
    /// The alternative is numbered as the first of its siblings until the
    /// enumerator numbers it.
    #[must_use]
    pub fn new(
        family: Family,
        kind: AlternativeKind,
        guard: Guard,
        write_back: Option<WriteBack>,
    ) -> Self {
        let identity = Identity::of(&canonical_form(family, &kind, &guard, write_back.as_ref()));
        Self {
            identity,
            family,
            kind,
            guard,
            write_back,
            branch_number: FIRST_BRANCH_NUMBER,
            needs_recheck: false,
        }
    }

    pub(crate) fn numbered(mut self, branch_number: BranchNumber) -> Self {
        self.branch_number = branch_number;
        self
    }

    pub(crate) fn flagged_for_recheck(mut self, needs_recheck: bool) -> Self {
        self.needs_recheck = needs_recheck;
        self
    }

    #[must_use]
    pub fn identity(&self) -> Identity {
        self.identity
    }

    #[must_use]
    pub fn family(&self) -> Family {
        self.family
    }

    /// Gets the stable code of the alternative's family.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.family.code()
    }

    #[must_use]
    pub fn kind(&self) -> &AlternativeKind {
        &self.kind
    }

    #[must_use]
    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    #[must_use]
    pub fn branch_number(&self) -> BranchNumber {
        self.branch_number
    }

    /// Checks if the decision procedure could not decide whether this
    /// alternative is feasible, so that it must be checked again later.
    #[must_use]
    pub fn needs_recheck(&self) -> bool {
        self.needs_recheck
    }

    /// Gets the store that the branch taking this alternative must perform
    /// when it commits.
    #[must_use]
    pub fn write_back(&self) -> Option<&WriteBack> {
        self.write_back.as_ref()
    }

    /// Checks if the accessed value is new and has to be written back into
    /// its container.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.write_back.is_some()
    }

    /// Gets what the accessed reference resolves to on this branch, if
    /// anything.
    #[must_use]
    pub fn referent(&self) -> Option<&Referent> {
        self.kind.referent()
    }

    /// Gets the class of the exception that the analyzed program raises on
    /// this branch, if the branch faults.
    #[must_use]
    pub fn fault(&self) -> Option<&'static str> {
        match (&self.kind, self.family) {
            (AlternativeKind::OutOfBounds, _) => Some(ARRAY_INDEX_OUT_OF_BOUNDS_EXCEPTION),
            (AlternativeKind::TypeMismatch { .. }, Family::ArrayStore) => {
                Some(ARRAY_STORE_EXCEPTION)
            }
            (AlternativeKind::TypeMismatch { .. }, _) => Some(CLASS_CAST_EXCEPTION),
            (AlternativeKind::Resolved(Referent::Null), Family::Invoke) => {
                Some(NULL_POINTER_EXCEPTION)
            }
            _ => None,
        }
    }

    /// Checks if the analyzed program raises an exception on this branch.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        self.fault().is_some()
    }
}

impl Display for DecisionAlternative {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {}_{} [{}] <{}>",
            self.branch_number,
            self.family,
            self.kind.name(),
            self.guard,
            self.identity.short()
        )
    }
}

/// Builds the canonical form from which the identity of an alternative is
/// computed.
fn canonical_form(
    family: Family,
    kind: &AlternativeKind,
    guard: &Guard,
    write_back: Option<&WriteBack>,
) -> String {
    let write_back = write_back.map_or_else(|| "-".to_string(), ToString::to_string);
    format!("{}_{}:{guard}:{kind}:{write_back}", family.code(), kind.name())
}
