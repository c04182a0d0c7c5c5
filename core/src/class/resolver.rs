//! Method resolution by (name, descriptor) and by constant-pool index.

use crate::class::class_file::ClassFile;
use crate::class::method::Method;
use crate::error::ClassFileError;

/// Finds a declared method by exact name and descriptor match, e.g. the
/// driver locating `main`/`([Ljava/lang/String;)V`.
pub fn find_method<'a>(class: &'a ClassFile, name: &str, descriptor: &str) -> Option<&'a Method> {
    class
        .methods()
        .iter()
        .find(|m| m.name == name && m.descriptor == descriptor)
}

/// Resolves an `invokestatic`/`Methodref` constant-pool index to the method
/// it names, within the single class TeenyJVM ever loads.
pub fn find_method_from_index<'a>(
    class: &'a ClassFile,
    cp_index: u16,
) -> Result<&'a Method, ClassFileError> {
    let (name, descriptor) = class.constant_pool().method_ref_name_and_descriptor(cp_index)?;
    class
        .methods()
        .iter()
        .find(|m| m.name == name && m.descriptor == descriptor)
        .ok_or(ClassFileError::UnresolvedMethodRef { index: cp_index })
}
