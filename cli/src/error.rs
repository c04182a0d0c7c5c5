//! The driver's single top-level error, wrapping every layer below it.

use teenyjvm_core::{ClassFileError, EngineTrap};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("could not read class file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    ClassFile(#[from] ClassFileError),

    #[error("fatal trap: {0}")]
    Engine(#[from] EngineTrap),

    #[error("main() should return void, but it returned a value")]
    MainReturnedValue,
}
