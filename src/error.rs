//! Error handling for the attrforge application.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for attrforge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Represents validation failures in an input asset document
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents errors during configuration loading or resolution
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents errors while serializing the manifest or a cache sidecar
    #[error("Manifest error: {0}")]
    Manifest(String),
}

/// Convenience type alias for Results with attrforge's Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("{err}");
    std::process::exit(1);
}
