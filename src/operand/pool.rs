//! The constant pool of the class whose method is being analyzed.

use crate::{
    class::{ClassName, FieldSignature, MethodSignature},
    error::operand::Error,
};

/// An entry in the constant pool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PoolEntry {
    Class(ClassName),
    FieldRef(FieldSignature),
    MethodRef(MethodSignature),
    InterfaceMethodRef(MethodSignature),
    Integer(i32),
    Utf8(String),
}

impl PoolEntry {
    pub const CLASS: &'static str = "Class";
    pub const FIELD_REF: &'static str = "Fieldref";
    pub const INTEGER: &'static str = "Integer";
    pub const INTERFACE_METHOD_REF: &'static str = "InterfaceMethodref";
    pub const METHOD_REF: &'static str = "Methodref";
    pub const UTF8: &'static str = "Utf8";

    /// Gets the name of the kind of the entry, as used in class files.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Class(_) => Self::CLASS,
            Self::FieldRef(_) => Self::FIELD_REF,
            Self::MethodRef(_) => Self::METHOD_REF,
            Self::InterfaceMethodRef(_) => Self::INTERFACE_METHOD_REF,
            Self::Integer(_) => Self::INTEGER,
            Self::Utf8(_) => Self::UTF8,
        }
    }
}

/// A constant pool, indexed from one.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConstantPool {
    entries: Vec<PoolEntry>,
}

impl ConstantPool {
    /// Constructs an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry` to the pool, returning its index, or [`None`] without
    /// adding it if the pool is full.
    pub fn push(&mut self, entry: PoolEntry) -> Option<u16> {
        let index = u16::try_from(self.entries.len() + 1).ok()?;
        self.entries.push(entry);
        Some(index)
    }

    /// Adds `entry` to the pool.
    #[must_use]
    pub fn with(mut self, entry: PoolEntry) -> Self {
        self.push(entry);
        self
    }

    /// Gets the entry at `index`.
    ///
    /// # Errors
    ///
    /// If no entry has that index.
    pub fn get(&self, index: u16) -> Result<&PoolEntry, Error> {
        usize::from(index)
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .ok_or(Error::InvalidPoolIndex {
                index,
                size: self.entries.len(),
            })
    }

    /// Gets the number of entries in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the pool has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
