// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor settings.
//!
//! Stored as pretty RON next to the user's other editor configuration.

use crate::viewport::GRID_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "workflow_editor.ron";

/// Shortest delay between auto-run steps, in milliseconds
pub const MIN_AUTO_RUN_INTERVAL_MS: u64 = 50;

/// Most steps a single auto-run may take
pub const MAX_AUTO_STEPS_LIMIT: usize = 10_000;

/// Editor behaviour that users may tune
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Format version
    pub version: u32,
    /// Grid size node positions snap to
    pub grid_size: f32,
    /// Snap dropped nodes to the grid
    pub snap_on_drop: bool,
    /// Delay between auto-run steps, in milliseconds
    pub auto_run_interval_ms: u64,
    /// Auto-run gives up after this many steps
    pub max_auto_steps: usize,
    /// Entity name used when the test panel is left blank
    pub default_entity_label: String,
    /// Padding used when fitting the view to the graph
    pub fit_padding: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            grid_size: GRID_SIZE,
            snap_on_drop: true,
            auto_run_interval_ms: 800,
            max_auto_steps: 100,
            default_entity_label: "Test Entity".to_string(),
            fit_padding: 48.0,
        }
    }
}

impl EditorSettings {
    /// Auto-run step interval, never below [`MIN_AUTO_RUN_INTERVAL_MS`]
    pub fn auto_run_interval(&self) -> Duration {
        Duration::from_millis(self.auto_run_interval_ms.max(MIN_AUTO_RUN_INTERVAL_MS))
    }

    /// Auto-run step limit, never above [`MAX_AUTO_STEPS_LIMIT`]
    pub fn auto_run_step_limit(&self) -> usize {
        self.max_auto_steps.min(MAX_AUTO_STEPS_LIMIT)
    }

    /// Pull auto-run values back into their supported range
    pub fn clamped(mut self) -> Self {
        if self.auto_run_interval_ms < MIN_AUTO_RUN_INTERVAL_MS {
            tracing::warn!(
                "auto_run_interval_ms {} is below {}, clamping",
                self.auto_run_interval_ms,
                MIN_AUTO_RUN_INTERVAL_MS
            );
            self.auto_run_interval_ms = MIN_AUTO_RUN_INTERVAL_MS;
        }
        if self.max_auto_steps > MAX_AUTO_STEPS_LIMIT {
            tracing::warn!(
                "max_auto_steps {} is above {}, clamping",
                self.max_auto_steps,
                MAX_AUTO_STEPS_LIMIT
            );
            self.max_auto_steps = MAX_AUTO_STEPS_LIMIT;
        }
        self
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: EditorSettings = ron::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            ));
        }

        Ok(settings.clamped())
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, content)
    }

    /// Load settings if the file exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to load settings from {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EditorSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.grid_size, 24.0);
        assert_eq!(settings.auto_run_interval(), Duration::from_millis(800));
    }

    #[test]
    fn test_serialization() {
        let settings = EditorSettings {
            max_auto_steps: 12,
            default_entity_label: "Globex".to_string(),
            ..EditorSettings::default()
        };
        let ron_str = ron::ser::to_string_pretty(&settings, ron::ser::PrettyConfig::default()).unwrap();
        let loaded: EditorSettings = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: EditorSettings = ron::from_str("(grid_size: 12.0)").unwrap();
        assert_eq!(loaded.grid_size, 12.0);
        assert_eq!(loaded.max_auto_steps, 100);
    }

    #[test]
    fn test_load_clamps_auto_run() {
        let path = std::env::temp_dir().join(format!("workflow-settings-clamp-{}.ron", std::process::id()));
        std::fs::write(&path, "(auto_run_interval_ms: 0, max_auto_steps: 1000000000)").unwrap();
        let loaded = EditorSettings::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.auto_run_interval_ms, MIN_AUTO_RUN_INTERVAL_MS);
        assert_eq!(loaded.max_auto_steps, MAX_AUTO_STEPS_LIMIT);

        let unchecked = EditorSettings {
            auto_run_interval_ms: 0,
            max_auto_steps: usize::MAX,
            ..EditorSettings::default()
        };
        assert_eq!(unchecked.auto_run_interval(), Duration::from_millis(MIN_AUTO_RUN_INTERVAL_MS));
        assert_eq!(unchecked.auto_run_step_limit(), MAX_AUTO_STEPS_LIMIT);
        assert_eq!(EditorSettings::default().clamped(), EditorSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("workflow-settings-{}.ron", std::process::id()));
        let settings = EditorSettings {
            snap_on_drop: false,
            ..EditorSettings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(EditorSettings::load(&path).unwrap(), settings);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(EditorSettings::load_or_default(&path), EditorSettings::default());
    }
}
