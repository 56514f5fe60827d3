use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use std::path::Path;

use crate::bundler::{Bundle, Bundler};
use crate::config::BundlePlan;
use crate::sink::{FileSink, PersistOptions, Sink};
use crate::source::FsSourceProvider;

/// Runs a [`BundlePlan`] against the filesystem
#[derive(Debug)]
pub struct BundleOrchestrator {
    plan: BundlePlan,
}

impl BundleOrchestrator {
    pub fn new(plan: BundlePlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &BundlePlan {
        &self.plan
    }

    /// Core bundling logic shared between file and string output modes
    fn bundle_core(&self) -> Result<Bundle> {
        self.plan.validate()?;
        if let Some(profile) = &self.plan.profile {
            info!("Using profile: {}", profile);
        }
        debug!("Base directory: {:?}", self.plan.base_dir);
        debug!("Scan mode: {:?}", self.plan.scan_mode);

        let bundler = Bundler::new(FsSourceProvider::new(&self.plan.base_dir))
            .with_scan_mode(self.plan.scan_mode);
        let header = self.plan.header_lines();

        bundler
            .bundle(&self.plan.modules, header.as_deref())
            .with_context(|| format!("Failed to bundle from {:?}", self.plan.base_dir))
    }

    /// Bundle to string for stdout output
    pub fn bundle_to_string(&self) -> Result<String> {
        info!("Starting bundle process for stdout output");
        Ok(self.bundle_core()?.contents())
    }

    /// Assemble the bundle and hand it to `sink` for `output_path`.
    pub fn bundle_into<S: Sink>(&self, sink: &mut S, output_path: &Path) -> Result<()> {
        info!("Starting bundle process");
        debug!("Output: {:?}", output_path);

        let bundle = self.bundle_core()?;
        sink.persist(output_path, &bundle)?;
        Ok(())
    }

    /// Main bundling function: writes to `output_path`, or the plan's output
    /// when `None`
    pub fn bundle(&self, output_path: Option<&Path>) -> Result<()> {
        let output_path = output_path
            .or(self.plan.output.as_deref())
            .ok_or_else(|| anyhow!("No output path configured for this bundle"))?;

        let mut sink = FileSink::new(PersistOptions {
            read_only: self.plan.read_only,
        });
        self.bundle_into(&mut sink, output_path)
    }
}
