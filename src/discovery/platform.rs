//! Host platform detection and per-fixture platform markers.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Platforms a fixture directory can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other,
}

static HOST: Lazy<Platform> = Lazy::new(Platform::detect);

impl Platform {
    /// Platform the harness is running on.
    pub fn host() -> Platform {
        *HOST
    }

    fn detect() -> Platform {
        cfg_if::cfg_if! {
            if #[cfg(target_os = "linux")] {
                Platform::Linux
            } else if #[cfg(target_os = "macos")] {
                Platform::MacOs
            } else if #[cfg(target_os = "windows")] {
                Platform::Windows
            } else {
                Platform::Other
            }
        }
    }

    /// Marker file that restricts a fixture to this platform.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Platform::Linux => Some("ONLY_LINUX"),
            Platform::MacOs => Some("ONLY_MACOS"),
            Platform::Windows => Some("ONLY_WINDOWS"),
            Platform::Other => None,
        }
    }

    /// Read the restriction marker of a fixture directory, if any.
    pub fn restriction_for(dir: &Path) -> Option<Platform> {
        [Platform::Linux, Platform::MacOs, Platform::Windows]
            .into_iter()
            .find(|platform| {
                platform
                    .marker()
                    .is_some_and(|marker| dir.join(marker).exists())
            })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Other => "other",
        };
        f.write_str(name)
    }
}
