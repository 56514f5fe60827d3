use log::info;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::bundler::Bundle;
use crate::error::PersistError;

/// Persists a finished bundle
pub trait Sink {
    fn persist(&mut self, destination: &Path, bundle: &Bundle) -> Result<(), PersistError>;
}

/// Options for writing bundles to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistOptions {
    /// Mark the written file read-only to discourage hand edits
    pub read_only: bool,
}

impl Default for PersistOptions {
    fn default() -> Self {
        Self { read_only: true }
    }
}

/// Writes bundles to files, replacing any previous content atomically
#[derive(Debug, Clone, Default)]
pub struct FileSink {
    options: PersistOptions,
}

impl FileSink {
    pub fn new(options: PersistOptions) -> Self {
        Self { options }
    }

    fn write_atomic(&self, destination: &Path, bundle: &Bundle) -> io::Result<()> {
        let parent = match destination.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let relock = unlock_for_replace(destination)?;
        if let Err(err) = replace_contents(parent, destination, bundle) {
            if relock {
                let _ = set_output_permissions(destination, true);
            }
            return Err(err);
        }

        set_output_permissions(destination, self.options.read_only)
    }
}

impl Sink for FileSink {
    fn persist(&mut self, destination: &Path, bundle: &Bundle) -> Result<(), PersistError> {
        self.write_atomic(destination, bundle)
            .map_err(|e| PersistError::new(destination, e))?;
        info!(
            "Bundle written to: {:?}{}",
            destination,
            if self.options.read_only {
                " (read-only)"
            } else {
                ""
            }
        );
        Ok(())
    }
}

/// Streams bundles into any writer, such as stdout
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn persist(&mut self, destination: &Path, bundle: &Bundle) -> Result<(), PersistError> {
        bundle
            .lines()
            .iter()
            .try_for_each(|line| self.writer.write_all(line.as_bytes()))
            .and_then(|()| self.writer.flush())
            .map_err(|e| PersistError::new(destination, e))
    }
}

fn replace_contents(parent: &Path, destination: &Path, bundle: &Bundle) -> io::Result<()> {
    let mut temp = NamedTempFile::new_in(parent)?;
    for line in bundle.lines() {
        temp.write_all(line.as_bytes())?;
    }
    temp.as_file().sync_all()?;
    temp.persist(destination).map_err(|e| e.error)?;
    Ok(())
}

/// Renaming over a read-only file is allowed on Unix
#[cfg(unix)]
fn unlock_for_replace(_destination: &Path) -> io::Result<bool> {
    Ok(false)
}

/// Clears the read-only flag on a previous bundle so it can be replaced.
/// Returns whether the flag was set.
#[cfg(not(unix))]
fn unlock_for_replace(destination: &Path) -> io::Result<bool> {
    if !fs::metadata(destination).is_ok_and(|meta| meta.permissions().readonly()) {
        return Ok(false);
    }
    log::debug!("Clearing read-only flag on {:?}", destination);
    set_output_permissions(destination, false)?;
    Ok(true)
}

#[cfg(unix)]
fn set_output_permissions(path: &Path, read_only: bool) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = if read_only { 0o444 } else { 0o644 };
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_output_permissions(path: &Path, read_only: bool) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(read_only);
    fs::set_permissions(path, permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::Bundler;
    use crate::source::MemorySourceProvider;
    use tempfile::TempDir;

    fn sample_bundle() -> Bundle {
        let provider =
            MemorySourceProvider::new().with_text("a.ts", "import { b } from './b';\nlet a = b;\n");
        Bundler::new(provider)
            .bundle(&["a.ts"], None)
            .expect("sample bundle")
    }

    #[test]
    fn test_file_sink_writes_and_marks_read_only() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let output = temp_dir.path().join("kit.ts");
        let bundle = sample_bundle();

        FileSink::default().persist(&output, &bundle)?;

        assert_eq!(fs::read_to_string(&output)?, bundle.contents());
        assert!(fs::metadata(&output)?.permissions().readonly());
        Ok(())
    }

    #[test]
    fn test_file_sink_replaces_read_only_output() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let output = temp_dir.path().join("kit.ts");
        let mut sink = FileSink::default();

        sink.persist(&output, &sample_bundle())?;

        let provider = MemorySourceProvider::new().with_text("c.ts", "let c = 3;\n");
        let second = Bundler::new(provider).bundle(&["c.ts"], None)?;
        sink.persist(&output, &second)?;

        assert_eq!(fs::read_to_string(&output)?, second.contents());
        Ok(())
    }

    #[test]
    fn test_file_sink_writable_output() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let output = temp_dir.path().join("kit.ts");

        FileSink::new(PersistOptions { read_only: false }).persist(&output, &sample_bundle())?;

        assert!(!fs::metadata(&output)?.permissions().readonly());
        Ok(())
    }

    #[test]
    fn test_file_sink_missing_directory_fails() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let output = temp_dir.path().join("no-such-dir").join("kit.ts");

        let err = FileSink::default()
            .persist(&output, &sample_bundle())
            .expect_err("missing parent directory");
        assert_eq!(err.destination, output);
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn test_failed_replace_keeps_read_only_flag() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        // A read-only directory in place of the output makes the final rename fail
        let output = temp_dir.path().join("kit.ts");
        fs::create_dir(&output)?;
        fs::write(output.join("keep"), "")?;
        let mut permissions = fs::metadata(&output)?.permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&output, permissions.clone())?;

        let result = FileSink::default().persist(&output, &sample_bundle());
        let still_read_only = fs::metadata(&output)?.permissions().readonly();

        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(&output, permissions)?;

        assert!(result.is_err());
        assert!(still_read_only);
        Ok(())
    }

    #[test]
    fn test_writer_sink() -> anyhow::Result<()> {
        let bundle = sample_bundle();
        let mut sink = WriterSink::new(Vec::new());
        sink.persist(Path::new("<memory>"), &bundle)?;

        assert_eq!(String::from_utf8(sink.into_inner())?, bundle.contents());
        Ok(())
    }
}
