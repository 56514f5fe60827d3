use indexmap::IndexMap;
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ReadError;
use crate::util::{split_lines, text_to_lines};

/// Supplies the lines of a named module
pub trait SourceProvider {
    /// Load a module's lines, each keeping its line terminator.
    fn load_lines(&self, module_id: &str) -> Result<Vec<String>, ReadError>;
}

impl<T: SourceProvider + ?Sized> SourceProvider for &T {
    fn load_lines(&self, module_id: &str) -> Result<Vec<String>, ReadError> {
        (**self).load_lines(module_id)
    }
}

/// Reads modules from files under a base directory.
///
/// Module ids are paths relative to the base directory. Files are decoded as
/// UTF-8 and their line endings normalized to `\n`.
#[derive(Debug, Clone)]
pub struct FsSourceProvider {
    base_dir: PathBuf,
}

impl FsSourceProvider {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path a module id resolves to
    pub fn module_path(&self, module_id: &str) -> PathBuf {
        self.base_dir.join(module_id)
    }
}

impl SourceProvider for FsSourceProvider {
    fn load_lines(&self, module_id: &str) -> Result<Vec<String>, ReadError> {
        let path = self.module_path(module_id);
        debug!("Reading module {} from {:?}", module_id, path);
        let content = fs::read_to_string(&path).map_err(|e| ReadError::new(module_id, e))?;
        Ok(text_to_lines(&content))
    }
}

/// Holds module contents in memory, keyed by module id
#[derive(Debug, Clone, Default)]
pub struct MemorySourceProvider {
    modules: IndexMap<String, Vec<String>>,
}

impl MemorySourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module from already split lines.
    pub fn insert_lines<I, S>(&mut self, module_id: impl Into<String>, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules
            .insert(module_id.into(), lines.into_iter().map(Into::into).collect());
    }

    /// Register a module from its full text.
    pub fn insert_text(&mut self, module_id: impl Into<String>, text: &str) {
        self.modules.insert(module_id.into(), split_lines(text));
    }

    #[must_use]
    pub fn with_text(mut self, module_id: impl Into<String>, text: &str) -> Self {
        self.insert_text(module_id, text);
        self
    }
}

impl SourceProvider for MemorySourceProvider {
    fn load_lines(&self, module_id: &str) -> Result<Vec<String>, ReadError> {
        self.modules.get(module_id).cloned().ok_or_else(|| {
            ReadError::new(
                module_id,
                io::Error::new(io::ErrorKind::NotFound, "module is not registered"),
            )
        })
    }
}
