//! Method table entries and descriptor parsing.

use crate::error::ClassFileError;

/// A method loaded from the class file's method table, with its `Code`
/// attribute already extracted: name, descriptor, stack/locals capacity,
/// and the raw bytecode.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub descriptor: String,
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
}

impl Method {
    /// Number of parameters implied by the method's descriptor. TeenyJVM's
    /// descriptor grammar is restricted to `I` (int) and `[I` (int array)
    /// parameter groups.
    pub fn num_parameters(&self) -> Result<u16, ClassFileError> {
        count_parameters(&self.descriptor)
    }
}

/// Counts the parameter groups between the parens of a method descriptor,
/// e.g. `(I[II)I` has three parameters (`I`, `[I`, `I`).
fn count_parameters(descriptor: &str) -> Result<u16, ClassFileError> {
    let bytes = descriptor.as_bytes();
    let open = bytes
        .iter()
        .position(|&b| b == b'(')
        .ok_or_else(|| ClassFileError::BadDescriptor { descriptor: descriptor.to_string() })?;
    let close = bytes[open..]
        .iter()
        .position(|&b| b == b')')
        .map(|i| i + open)
        .ok_or_else(|| ClassFileError::BadDescriptor { descriptor: descriptor.to_string() })?;

    let mut count = 0u16;
    let mut i = open + 1;
    while i < close {
        match bytes[i] {
            b'I' => {
                count += 1;
                i += 1;
            }
            b'[' => {
                // Array prefix; TeenyJVM only supports single-dimension int
                // arrays, so the element that follows must be `I`.
                if i + 1 >= close || bytes[i + 1] != b'I' {
                    return Err(ClassFileError::BadDescriptor { descriptor: descriptor.to_string() });
                }
                count += 1;
                i += 2;
            }
            _ => {
                return Err(ClassFileError::BadDescriptor { descriptor: descriptor.to_string() });
            }
        }
    }
    Ok(count)
}
