use anyhow::{Context, Result, anyhow};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::combine::Combine;
use crate::dirs::{project_config_file, system_config_file, user_config_file};
use crate::scanner::ScanMode;
use crate::util::terminate_line;

/// Settings for producing bundles, merged from every configuration layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Directory module names are resolved against (defaults to `.`)
    pub base_dir: Option<PathBuf>,

    /// Destination of the bundle
    pub output: Option<PathBuf>,

    /// Lines written once at the top of the bundle
    pub header: Vec<String>,

    /// Mark the written bundle read-only (defaults to true)
    pub read_only: Option<bool>,

    /// Stop stripping at the first non-import line (defaults to false)
    pub strict_imports: Option<bool>,

    /// Module list used when no profile is selected
    pub modules: Vec<String>,

    /// Profile used when none is given on the command line
    pub default_profile: Option<String>,

    /// Named module lists, e.g. one per release of the library
    pub profiles: IndexMap<String, Profile>,
}

/// A named bundle: its module list plus optional overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Profile {
    pub modules: Vec<String>,
    pub output: Option<PathBuf>,
    pub header: Option<Vec<String>>,
    pub base_dir: Option<PathBuf>,
}

impl Combine for Config {
    fn combine(self, other: Self) -> Self {
        Self {
            base_dir: self.base_dir.combine(other.base_dir),
            output: self.output.combine(other.output),
            header: self.header.combine(other.header),
            read_only: self.read_only.combine(other.read_only),
            strict_imports: self.strict_imports.combine(other.strict_imports),
            modules: self.modules.combine(other.modules),
            default_profile: self.default_profile.combine(other.default_profile),
            profiles: self.profiles.combine(other.profiles),
        }
    }
}

/// Configuration values from environment variables with KITMERGE_ prefix
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub base_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub modules: Option<Vec<String>>,
    pub read_only: Option<bool>,
    pub strict_imports: Option<bool>,
    pub profile: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables with KITMERGE_ prefix
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        // KITMERGE_MODULES - comma-separated module list, order preserved
        let modules = non_empty("KITMERGE_MODULES").map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect::<Vec<_>>()
        });

        Self {
            base_dir: non_empty("KITMERGE_BASE_DIR").map(PathBuf::from),
            output: non_empty("KITMERGE_OUTPUT").map(PathBuf::from),
            modules: modules.filter(|m| !m.is_empty()),
            read_only: lookup("KITMERGE_READ_ONLY").and_then(|v| parse_bool(&v)),
            strict_imports: lookup("KITMERGE_STRICT_IMPORTS").and_then(|v| parse_bool(&v)),
            profile: non_empty("KITMERGE_PROFILE"),
        }
    }

    /// Apply environment config to base config
    pub fn apply_to(self, mut config: Config) -> Config {
        if let Some(base_dir) = self.base_dir {
            config.base_dir = Some(base_dir);
        }
        if let Some(output) = self.output {
            config.output = Some(output);
        }
        if let Some(modules) = self.modules {
            config.modules = modules;
        }
        if let Some(read_only) = self.read_only {
            config.read_only = Some(read_only);
        }
        if let Some(strict_imports) = self.strict_imports {
            config.strict_imports = Some(strict_imports);
        }
        if let Some(profile) = self.profile {
            config.default_profile = Some(profile);
        }
        config
    }
}

/// Parse a boolean value from string, supporting various common formats
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Everything needed to produce one bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePlan {
    pub profile: Option<String>,
    pub base_dir: PathBuf,
    pub modules: Vec<String>,
    pub output: Option<PathBuf>,
    pub header: Vec<String>,
    pub read_only: bool,
    pub scan_mode: ScanMode,
}

impl BundlePlan {
    /// Header lines as written to the bundle, each terminated
    pub fn header_lines(&self) -> Option<Vec<String>> {
        (!self.header.is_empty())
            .then(|| self.header.iter().map(|line| terminate_line(line)).collect())
    }

    /// Reject plans that cannot produce a meaningful bundle
    pub fn validate(&self) -> Result<()> {
        if self.modules.is_empty() {
            return Err(match &self.profile {
                Some(name) => anyhow!("Profile '{}' does not list any modules", name),
                None => anyhow!(
                    "No modules to bundle: pass them on the command line, set `modules`, or select a profile"
                ),
            });
        }
        Ok(())
    }
}

impl Config {
    pub fn read_only(&self) -> bool {
        self.read_only.unwrap_or(true)
    }

    pub fn scan_mode(&self) -> ScanMode {
        if self.strict_imports.unwrap_or(false) {
            ScanMode::Strict
        } else {
            ScanMode::Compatible
        }
    }

    /// Names of the configured profiles, in declaration order
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Build the plan for `profile`, or for the default profile when `None`.
    ///
    /// Values set by the profile override the top-level ones.
    pub fn resolve(&self, profile: Option<&str>) -> Result<BundlePlan> {
        let base_dir = self
            .base_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        let mut plan = BundlePlan {
            profile: None,
            base_dir,
            modules: self.modules.clone(),
            output: self.output.clone(),
            header: self.header.clone(),
            read_only: self.read_only(),
            scan_mode: self.scan_mode(),
        };

        let Some(name) = profile.or(self.default_profile.as_deref()) else {
            return Ok(plan);
        };

        let selected = self.profiles.get(name).ok_or_else(|| {
            let known = self.profile_names().collect::<Vec<_>>();
            if known.is_empty() {
                anyhow!("Unknown profile '{}': no profiles are configured", name)
            } else {
                anyhow!(
                    "Unknown profile '{}'. Available profiles: {}",
                    name,
                    known.join(", ")
                )
            }
        })?;

        plan.profile = Some(name.to_owned());
        if !selected.modules.is_empty() {
            plan.modules = selected.modules.clone();
        }
        if let Some(output) = &selected.output {
            plan.output = Some(output.clone());
        }
        if let Some(header) = &selected.header {
            plan.header = header.clone();
        }
        if let Some(base_dir) = &selected.base_dir {
            plan.base_dir = base_dir.clone();
        }
        Ok(plan)
    }

    /// Load a single config file from a path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration with hierarchical precedence:
    /// 1. CLI-provided config path (highest precedence)
    /// 2. Environment variables (KITMERGE_*)
    /// 3. Project config (kitmerge.toml in current directory)
    /// 4. User config (~/.config/kitmerge/kitmerge.toml)
    /// 5. System config (/etc/kitmerge/kitmerge.toml or equivalent)
    /// 6. Default values (lowest precedence)
    pub fn load(cli_config_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(system_config_path) = system_config_file() {
            log::debug!("Loading system config from: {:?}", system_config_path);
            let system_config = Self::load_from_file(&system_config_path).with_context(|| {
                format!("Failed to load system config from {:?}", system_config_path)
            })?;
            config = system_config.combine(config);
        }

        if let Some(user_config_path) = user_config_file() {
            log::debug!("Loading user config from: {:?}", user_config_path);
            let user_config = Self::load_from_file(&user_config_path).with_context(|| {
                format!("Failed to load user config from {:?}", user_config_path)
            })?;
            config = user_config.combine(config);
        }

        if let Some(project_config_path) = project_config_file(Path::new(".")) {
            log::debug!("Loading project config from: {:?}", project_config_path);
            let project_config = Self::load_from_file(&project_config_path).with_context(|| {
                format!(
                    "Failed to load project config from {:?}",
                    project_config_path
                )
            })?;
            config = project_config.combine(config);
        }

        config = EnvConfig::from_env().apply_to(config);

        if let Some(cli_config_path) = cli_config_path {
            log::debug!("Loading CLI config from: {:?}", cli_config_path);
            let cli_config = Self::load_from_file(cli_config_path)
                .with_context(|| format!("Failed to load CLI config from {:?}", cli_config_path))?;
            config = cli_config.combine(config);
        }

        Ok(config)
    }
}
