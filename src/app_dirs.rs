//! Where churnguard keeps its own files.
//!
//! Everything lives under one `.churnguard` folder in the OS config directory,
//! or under `$CHURNGUARD_CONFIG_HOME` when that is set. Resolving paths never
//! touches the filesystem; only the `ensure_*` methods create directories.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application directory that lives under the config base.
pub const APP_DIR_NAME: &str = ".churnguard";

/// Environment variable overriding the base config directory.
pub const CONFIG_HOME_ENV: &str = "CHURNGUARD_CONFIG_HOME";

/// File name of the TOML configuration inside [`APP_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

const LOGS_DIR_NAME: &str = "logs";

/// Errors that can occur while resolving or preparing application directories.
#[derive(Debug, Error)]
pub enum AppDirError {
    /// Neither the override variable nor the OS provided a config directory.
    #[error("No suitable base config directory available for application files")]
    NoBaseDir,
    /// Failed to create the application directory.
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Resolved application directory layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    root: PathBuf,
}

impl AppDirs {
    /// Layout rooted at `base/.churnguard`.
    pub fn at(base: impl AsRef<Path>) -> Self {
        Self {
            root: base.as_ref().join(APP_DIR_NAME),
        }
    }

    /// Layout under `$CHURNGUARD_CONFIG_HOME`, else the OS config directory.
    pub fn resolve() -> Result<Self, AppDirError> {
        let base = std::env::var_os(CONFIG_HOME_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .or_else(|| BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()))
            .ok_or(AppDirError::NoBaseDir)?;
        Ok(Self::at(base))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn logs(&self) -> PathBuf {
        self.root.join(LOGS_DIR_NAME)
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    /// Create the root directory if needed and return it.
    pub fn ensure_root(&self) -> Result<PathBuf, AppDirError> {
        create_dir(&self.root)?;
        Ok(self.root.clone())
    }

    /// Create the logs directory (and the root) if needed and return it.
    pub fn ensure_logs(&self) -> Result<PathBuf, AppDirError> {
        let logs = self.logs();
        create_dir(&logs)?;
        Ok(logs)
    }
}

/// Resolve and create `.churnguard/logs`.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    AppDirs::resolve()?.ensure_logs()
}

/// Path of the default config file. Nothing is created.
pub fn config_file() -> Result<PathBuf, AppDirError> {
    Ok(AppDirs::resolve()?.config_file())
}

fn create_dir(path: &Path) -> Result<(), AppDirError> {
    std::fs::create_dir_all(path).map_err(|source| AppDirError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn layout_paths_hang_off_the_app_dir() {
        let dirs = AppDirs::at("/home/ops/.config");
        assert_eq!(dirs.root(), Path::new("/home/ops/.config/.churnguard"));
        assert_eq!(dirs.logs(), dirs.root().join("logs"));
        assert_eq!(dirs.config_file(), dirs.root().join("config.toml"));
    }

    #[test]
    fn resolving_paths_creates_nothing() {
        let base = tempdir().unwrap();
        let dirs = AppDirs::at(base.path());
        let _ = dirs.config_file();
        let _ = dirs.logs();
        assert!(!dirs.root().exists());
    }

    #[test]
    fn ensure_logs_creates_root_and_logs() {
        let base = tempdir().unwrap();
        let dirs = AppDirs::at(base.path());
        let logs = dirs.ensure_logs().unwrap();
        assert!(logs.is_dir());
        assert_eq!(dirs.ensure_root().unwrap(), base.path().join(APP_DIR_NAME));
    }

    #[test]
    fn unwritable_base_reports_the_path() {
        let base = tempdir().unwrap();
        let blocker = base.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        let err = AppDirs::at(&blocker).ensure_root().unwrap_err();
        assert!(matches!(err, AppDirError::CreateDir { path, .. } if path.starts_with(&blocker)));
    }
}
