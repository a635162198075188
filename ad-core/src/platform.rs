//! Platform detection and per-user directories.

use std::path::PathBuf;
use crate::constants::APP_NAME;
use crate::error::{AdError, AdResult};

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    /// Detect the current platform at compile time.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Per-user configuration directory.
    ///
    /// - Windows: `%APPDATA%/alldebrid`
    /// - macOS: `~/Library/Application Support/alldebrid`
    /// - Linux: `~/.config/alldebrid`
    pub fn config_dir() -> AdResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| AdError::Config("could not determine config directory".into()))?;
        Ok(base.join(APP_NAME))
    }

    /// Human-readable platform name.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOs => "macOS",
            Platform::Linux => "Linux",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
