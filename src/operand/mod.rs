//! This module contains the operand supplier, which decodes the immediate
//! operands of the instructions that the engine handles into typed records.
//!
//! Every such instruction carries a single big-endian `u16` index into the
//! constant pool immediately after its opcode byte.

pub mod pool;

use crate::{
    class::{ClassName, FieldSignature, MethodSignature},
    error::{
        container::Locatable,
        operand::{Error, Result},
    },
};
pub use pool::{ConstantPool, PoolEntry};

/// The decoded operands of an invocation instruction.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MethodOperands {
    /// The symbolic reference to the invoked method.
    pub signature: MethodSignature,

    /// Whether the constant pool entry denotes an interface method.
    pub is_interface_method: bool,
}

/// The decoded operands of a field access instruction.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FieldOperands {
    pub signature: FieldSignature,
}

/// The decoded operands of an instruction that names a class.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ClassOperands {
    pub class: ClassName,
}

/// Decodes instruction operands from the bytecode of a single method.
#[derive(Clone, Copy, Debug)]
pub struct OperandSupplier<'a> {
    code: &'a [u8],
    pool: &'a ConstantPool,
}

impl<'a> OperandSupplier<'a> {
    /// Constructs a supplier over the method body `code` whose indices refer
    /// to `pool`.
    #[must_use]
    pub fn new(code: &'a [u8], pool: &'a ConstantPool) -> Self {
        Self { code, pool }
    }

    /// Reads the `u16` immediate of the instruction at `pc`.
    ///
    /// # Errors
    ///
    /// If the code ends before the immediate does.
    pub fn immediate_u16(&self, pc: u32) -> Result<u16> {
        let start = pc as usize + 1;
        match self.code.get(start..start + 2) {
            Some(&[high, low]) => Ok(u16::from_be_bytes([high, low])),
            _ => Err(Error::TruncatedImmediate { length: 2 }.locate(pc)),
        }
    }

    /// Decodes the method referenced by the invocation at `pc`.
    ///
    /// `interface_method` selects whether the instruction expects an
    /// interface method reference, as `invokeinterface` does.
    ///
    /// # Errors
    ///
    /// If the immediate is truncated, does not index the pool, or indexes an
    /// entry of the wrong kind.
    pub fn method_operands(&self, pc: u32, interface_method: bool) -> Result<MethodOperands> {
        let index = self.immediate_u16(pc)?;
        let entry = self.pool.get(index).locate(pc)?;
        match (entry, interface_method) {
            (PoolEntry::MethodRef(signature), false) => Ok(MethodOperands {
                signature:           signature.clone(),
                is_interface_method: false,
            }),
            (PoolEntry::InterfaceMethodRef(signature), true) => Ok(MethodOperands {
                signature:           signature.clone(),
                is_interface_method: true,
            }),
            (found, _) => Err(Error::UnexpectedEntry {
                index,
                expected: if interface_method {
                    PoolEntry::INTERFACE_METHOD_REF
                } else {
                    PoolEntry::METHOD_REF
                },
                found: found.kind(),
            }
            .locate(pc)),
        }
    }

    /// Decodes the field referenced by the field access at `pc`.
    ///
    /// # Errors
    ///
    /// If the immediate is truncated, does not index the pool, or indexes an
    /// entry that is not a field reference.
    pub fn field_operands(&self, pc: u32) -> Result<FieldOperands> {
        let index = self.immediate_u16(pc)?;
        match self.pool.get(index).locate(pc)? {
            PoolEntry::FieldRef(signature) => Ok(FieldOperands {
                signature: signature.clone(),
            }),
            found => Err(Error::UnexpectedEntry {
                index,
                expected: PoolEntry::FIELD_REF,
                found: found.kind(),
            }
            .locate(pc)),
        }
    }

    /// Decodes the class named by the instruction at `pc`.
    ///
    /// # Errors
    ///
    /// If the immediate is truncated, does not index the pool, or indexes an
    /// entry that is not a class.
    pub fn class_operands(&self, pc: u32) -> Result<ClassOperands> {
        let index = self.immediate_u16(pc)?;
        match self.pool.get(index).locate(pc)? {
            PoolEntry::Class(class) => Ok(ClassOperands {
                class: class.clone(),
            }),
            found => Err(Error::UnexpectedEntry {
                index,
                expected: PoolEntry::CLASS,
                found: found.kind(),
            }
            .locate(pc)),
        }
    }
}
