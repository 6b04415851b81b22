// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session configuration.

use crate::sync::SyncConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use subcue_timeline::{ReflowConfig, DEFAULT_MAX_UNDO_DEPTH};

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Everything tunable about a session, in one serializable record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Configuration format version.
    pub version: u32,
    /// Bound on per-entry edit history.
    pub max_undo_depth: usize,
    /// Display line budget applied by reflow operations.
    pub max_lines: usize,
    /// Display width budget applied by reflow operations.
    pub max_chars: usize,
    /// Sync policy tuning.
    pub sync: SyncConfig,
    /// Reflow word lists.
    pub reflow: ReflowConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            max_undo_depth: DEFAULT_MAX_UNDO_DEPTH,
            max_lines: 2,
            max_chars: 42,
            sync: SyncConfig::default(),
            reflow: ReflowConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from a RON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SessionConfig = ron::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "config version {} is newer than supported version {}",
                    config.version, CONFIG_FORMAT_VERSION
                ),
            ));
        }

        Ok(config)
    }

    /// Save configuration to a RON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, pretty)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;

        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.version, CONFIG_FORMAT_VERSION);
        assert_eq!(config.max_lines, 2);
        assert_eq!(config.sync.sample_count, 5);
    }

    #[test]
    fn test_ron_roundtrip() {
        let mut config = SessionConfig::default();
        config.max_chars = 37;
        config.sync.uniform_shift_limit = 2.0;

        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: SessionConfig = ron::from_str(&text).unwrap();
        assert_eq!(loaded.max_chars, 37);
        assert_eq!(loaded.sync.uniform_shift_limit, 2.0);
    }
}
