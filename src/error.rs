//! Error types for class file decoding and the runtime data area.
use crate::constant_pool::ConstantTag;

/// `ClassFormatError` is raised while decoding a class file. Any of these
/// aborts the whole decode, there is no partially decoded class.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassFormatError {
    #[error("unexpected end of class file at offset {offset} (needed {needed} bytes)")]
    Truncated { offset: usize, needed: usize },

    #[error("bad magic {0:#010x}")]
    BadMagic(u32),

    #[error("unsupported class version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("unknown constant pool tag {tag} at offset {offset}")]
    UnknownConstantTag { tag: u8, offset: usize },

    #[error("constant pool index {index} out of range (pool length {len})")]
    ConstantIndexOutOfRange { index: u16, len: usize },

    #[error("constant pool index {index} is not usable")]
    UnusableConstant { index: u16 },

    #[error("constant pool index {index}: expected {expected}, found {found}")]
    ConstantTypeMismatch {
        index: u16,
        expected: ConstantTag,
        found: ConstantTag,
    },

    #[error("constant pool index {index}: expected a field or method reference, found {found}")]
    NotAMemberRef { index: u16, found: ConstantTag },
    #[error("wide constant at index {index} has no room for its second slot")]
    WideConstantAtEnd { index: u16 },
    #[error("invalid modified UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("invalid type descriptor {0:?}")]
    InvalidDescriptor(String),
}

/// `RuntimeError` represents failures of the runtime data area, these are
/// reported to the interpreter as VM level conditions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("stack overflow: max depth of {max_depth} frames reached")]
    StackOverflow { max_depth: usize },

    #[error("jvm stack is empty")]
    EmptyStack,

    #[error("operand stack overflow (capacity {capacity})")]
    OperandStackOverflow { capacity: usize },

    #[error("operand stack underflow")]
    OperandStackUnderflow,

    #[error("local variable index {index} out of range (max locals {max_locals})")]
    LocalIndexOutOfRange { index: usize, max_locals: usize },

    #[error("method {method} has no Code attribute")]
    MissingCode { method: String },

    #[error("method {method} needs {needed} local slots for its arguments but declares {max_locals}")]
    LocalsTooSmall {
        method: String,
        needed: usize,
        max_locals: usize,
    },

    #[error(transparent)]
    Class(#[from] ClassFormatError),
}
