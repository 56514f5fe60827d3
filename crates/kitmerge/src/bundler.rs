use log::{debug, info, warn};
use std::fmt;

use crate::error::ReadError;
use crate::scanner::{ScanMode, scan_imports};
use crate::source::SourceProvider;

const BANNER_OPEN: &str = "/*-----------------------------------------------------------\n";
const BANNER_CLOSE: &str = " *-----------------------------------------------------------*/\n";

/// Banner comment naming a module, placed right before its body
pub fn banner(module_id: &str) -> [String; 3] {
    [
        BANNER_OPEN.to_owned(),
        format!(" * {module_id}\n"),
        BANNER_CLOSE.to_owned(),
    ]
}

/// The merged output: every line of the bundle in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    lines: Vec<String>,
}

impl Bundle {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The bundle as a single string
    pub fn contents(&self) -> String {
        self.lines.concat()
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.lines.iter().try_for_each(|line| f.write_str(line))
    }
}

/// Merges modules in list order, dropping each module's leading imports
#[derive(Debug, Clone)]
pub struct Bundler<P> {
    provider: P,
    scan_mode: ScanMode,
}

impl<P: SourceProvider> Bundler<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            scan_mode: ScanMode::default(),
        }
    }

    #[must_use]
    pub fn with_scan_mode(mut self, scan_mode: ScanMode) -> Self {
        self.scan_mode = scan_mode;
        self
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.scan_mode
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Assemble the bundle for `modules`, prefixed by `header` if given.
    ///
    /// Each module contributes two blank lines, its banner, one blank line and
    /// then its body. The first module that fails to load aborts the whole
    /// bundle.
    pub fn bundle<S: AsRef<str>>(
        &self,
        modules: &[S],
        header: Option<&[String]>,
    ) -> Result<Bundle, ReadError> {
        info!("Bundling {} modules", modules.len());
        let mut lines: Vec<String> = header.map(<[String]>::to_vec).unwrap_or_default();

        for module_id in modules {
            let module_id = module_id.as_ref();
            let mut module_lines = self.provider.load_lines(module_id)?;

            let scan = scan_imports(&module_lines, self.scan_mode);
            if let Some(line) = scan.unterminated_import {
                warn!(
                    "Module {} has an unterminated multi-line import starting at line {}",
                    module_id,
                    line + 1
                );
            }
            debug!(
                "Module {}: skipping {} of {} lines",
                module_id,
                scan.body_start,
                module_lines.len()
            );

            lines.extend(["\n".to_owned(), "\n".to_owned()]);
            lines.extend(banner(module_id));
            lines.push("\n".to_owned());
            lines.extend(module_lines.drain(scan.body_start..));
        }

        debug!("Bundle has {} lines", lines.len());
        Ok(Bundle { lines })
    }
}
