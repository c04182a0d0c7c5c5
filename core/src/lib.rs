//! TeenyJVM: a minimal interpreter for a statically-verified, stack-based
//! bytecode subset of the JVM, restricted to 32-bit signed integers and
//! references to integer arrays on a managed heap.
//!
//! [`class`] is the class-file reader and method resolver, a layer the
//! engine never second-guesses; [`heap`] is the managed heap; [`engine`] is
//! the decode–dispatch loop itself. `cli` (the driver crate) wires the
//! three together.

pub mod class;
pub mod engine;
pub mod error;
pub mod heap;
pub mod opcode;

mod frame;

#[cfg(test)]
mod test_support;

pub use class::{find_method, find_method_from_index, ClassFile, Constant, ConstantPool, Method};
pub use engine::{execute, OptionalValue};
pub use error::{ClassFileError, EngineTrap};
pub use heap::{Heap, JvmArray, Reference};
