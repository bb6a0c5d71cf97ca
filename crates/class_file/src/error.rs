use thiserror::Error;

use crate::constant_pool;

/// A failure while decoding attribute bytes. Every variant is fatal to the decode call that
/// produced it and records the offset at which the failing read started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unknown element value tag 0x{tag:02X} at offset {offset}")]
    UnknownElementValueTag { tag: u8, offset: usize },
    #[error("Unknown target type 0x{target_type:02X} at offset {offset}")]
    UnknownTargetType { target_type: u8, offset: usize },
    #[error("Unknown type path kind {kind} at offset {offset}")]
    UnknownTypePathKind { kind: u8, offset: usize },
    #[error("Truncated input: needed {needed} byte(s) at offset {offset}")]
    TruncatedInput { offset: usize, needed: usize },
    #[error("Nesting deeper than {max_depth} at offset {offset}")]
    MaxDepthExceeded { max_depth: usize, offset: usize },
}
impl DecodeError {
    pub fn offset(&self) -> usize {
        match *self {
            DecodeError::UnknownElementValueTag { offset, .. }
            | DecodeError::UnknownTargetType { offset, .. }
            | DecodeError::UnknownTypePathKind { offset, .. }
            | DecodeError::TruncatedInput { offset, .. }
            | DecodeError::MaxDepthExceeded { offset, .. } => offset,
        }
    }
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Too many {what} to encode: {len}")]
    LengthOverflow { what: &'static str, len: usize },
}

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("Expected {0}, found {1:?}")]
    UnexpectedConstantPoolEntry(&'static str, constant_pool::CpInfo),
    #[error(transparent)]
    BadConstantPoolIndex(#[from] constant_pool::IndexOutOfRange),
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Invalid cp info tag: {0}")]
    InvalidCpInfoTag(u8),
    #[error("Attribute {name} declares {length} byte(s) but {consumed} were decoded")]
    AttributeLengthMismatch {
        name: &'static str,
        length: usize,
        consumed: usize,
    },
}
