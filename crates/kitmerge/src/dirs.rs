use std::{
    env,
    path::{Path, PathBuf},
};

use etcetera::BaseStrategy;

/// Configuration directory name
pub const CONFIG_DIR: &str = "kitmerge";

/// Configuration file name, also looked up in the project directory
pub const CONFIG_FILE: &str = "kitmerge.toml";

/// Returns the path to the user's `kitmerge` configuration directory.
///
/// On Windows this lives under e.g. `C:\Users\Alice\AppData\Roaming`; on Linux and
/// macOS under `XDG_CONFIG_HOME` or `$HOME/.config`.
pub fn user_kitmerge_config_dir() -> Option<PathBuf> {
    let mut path = etcetera::choose_base_strategy().ok()?.config_dir();
    path.push(CONFIG_DIR);
    Some(path)
}

/// Returns the user configuration file if it exists.
pub fn user_config_file() -> Option<PathBuf> {
    user_kitmerge_config_dir()
        .map(|dir| dir.join(CONFIG_FILE))
        .filter(|path| path.is_file())
}

/// Returns the project configuration file in `dir` if it exists.
pub fn project_config_file(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

#[cfg(not(windows))]
fn locate_system_config_xdg(value: Option<&str>) -> Option<PathBuf> {
    let config_dirs = value.filter(|s| !s.is_empty()).unwrap_or("/etc/xdg");

    config_dirs
        .split(':')
        .take_while(|s| !s.is_empty())
        .map(|dir| Path::new(dir).join(CONFIG_DIR).join(CONFIG_FILE))
        .find(|path| path.is_file())
}

#[cfg(windows)]
fn locate_system_config_windows(system_drive: impl AsRef<Path>) -> Option<PathBuf> {
    // `%SYSTEMDRIVE%\ProgramData\kitmerge\kitmerge.toml`
    let candidate = system_drive
        .as_ref()
        .join("ProgramData")
        .join(CONFIG_DIR)
        .join(CONFIG_FILE);
    candidate.as_path().is_file().then_some(candidate)
}

/// Returns the path to the system configuration file.
///
/// On Unix-like systems, searches `XDG_CONFIG_DIRS` (default `/etc/xdg`) and then
/// falls back to `/etc/kitmerge/kitmerge.toml`.
///
/// On Windows, uses `%SYSTEMDRIVE%\ProgramData\kitmerge\kitmerge.toml`.
pub fn system_config_file() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        env::var("SYSTEMDRIVE")
            .ok()
            .and_then(|system_drive| locate_system_config_windows(PathBuf::from(system_drive)))
    }

    #[cfg(not(windows))]
    {
        let xdg_config_dirs = env::var("XDG_CONFIG_DIRS").ok();
        if let Some(path) = locate_system_config_xdg(xdg_config_dirs.as_deref()) {
            return Some(path);
        }

        let candidate = Path::new("/etc").join(CONFIG_DIR).join(CONFIG_FILE);
        match candidate.try_exists() {
            Ok(true) => Some(candidate),
            Ok(false) => None,
            Err(err) => {
                log::warn!("Failed to query system configuration file: {err}");
                None
            }
        }
    }
}
