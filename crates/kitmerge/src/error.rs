use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A module named in the module list could not be located or read.
///
/// Fatal to the whole bundle: nothing is assembled or persisted once a
/// module fails to load.
#[derive(Debug, Error)]
#[error("failed to read module `{module_id}`")]
pub struct ReadError {
    pub module_id: String,
    #[source]
    pub source: io::Error,
}

impl ReadError {
    pub fn new(module_id: impl Into<String>, source: io::Error) -> Self {
        Self {
            module_id: module_id.into(),
            source,
        }
    }
}

/// Writing the bundle to its destination failed.
#[derive(Debug, Error)]
#[error("failed to write bundle to {}", destination.display())]
pub struct PersistError {
    pub destination: PathBuf,
    #[source]
    pub source: io::Error,
}

impl PersistError {
    pub fn new(destination: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            destination: destination.into(),
            source,
        }
    }
}
