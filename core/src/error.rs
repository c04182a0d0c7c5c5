//! Error types shared by the class-file reader and the execution engine.

use thiserror::Error;

/// Failures while parsing or resolving against a `.class` file.
///
/// These cover malformed input to the class-file reader and resolver. The
/// engine itself trusts its input and never produces this error; see
/// [`EngineTrap`] for the engine's own fatal conditions.
#[derive(Debug, Error)]
pub enum ClassFileError {
    /// The buffer ended before a field/structure could be fully read.
    #[error("truncated class file: needed {needed} more byte(s) at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    /// The leading 4 bytes were not `0xCAFEBABE`.
    #[error("not a class file: expected magic 0xCAFEBABE, got {found:#010X}")]
    BadMagic { found: u32 },

    /// A constant-pool entry used a tag byte this reader doesn't know.
    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { index: u16, tag: u8 },

    /// A constant-pool index was out of range, or pointed at the wrong kind
    /// of entry for the context it was used in (e.g. `ldc` on a `Utf8`).
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },

    /// No `Code` attribute was found on a method that the resolver expected
    /// to be runnable.
    #[error("method {name} has no Code attribute")]
    MissingCode { name: String },

    /// A `Methodref` at the given constant-pool index did not resolve to any
    /// method declared in the (single) loaded class.
    #[error("method reference at constant pool index {index} does not resolve to any declared method")]
    UnresolvedMethodRef { index: u16 },

    /// The class had no method matching the requested name and descriptor.
    #[error("no method named {name} with descriptor {descriptor}")]
    MethodNotFound { name: String, descriptor: String },

    /// A method descriptor could not be parsed (unbalanced parens, unknown
    /// field-type character outside TeenyJVM's supported `I`/`[I` domain).
    #[error("malformed method descriptor: {descriptor}")]
    BadDescriptor { descriptor: String },
}

/// Fatal, unrecoverable conditions the bytecode engine detects while
/// executing a method. These are the conditions the reference interpreter
/// treats as an assertion failure; this type gives that abort a concrete
/// shape that unwinds through `execute`'s `Result` rather than panicking
/// with no context.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineTrap {
    /// `idiv` or `irem` with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// `ishl`, `ishr`, or `iushr` with a negative shift count.
    #[error("negative shift count")]
    NegativeShiftCount,

    /// `newarray` with a negative requested length.
    #[error("negative array length: {0}")]
    NegativeArrayLength(i32),
}
