//! # Configuration management for Tessera Core
//!
//! This module provides configuration management for the dashboard grid
//! engine. It handles loading, saving, and validating engine settings, with
//! defaults matching the production dashboard (70 px cells, 8 px gaps, a
//! 12-column desktop grid, and a 768 px mobile breakpoint below which the
//! grid engine is bypassed in favor of single-column stacking).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for the grid engine.
///
/// Settings are organized into logical groups and support TOML
/// serialization for persistence.
///
/// # Example
///
/// ```rust
/// use tessera_core::Config;
///
/// let config = Config::default();
/// assert_eq!(config.grid.cols, 12);
/// assert_eq!(config.grid.cell_size, 70.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Grid geometry settings
    pub grid: GridConfig,
    /// Gesture and reflow settings
    pub interaction: InteractionConfig,
    /// Backend submission settings
    pub persistence: PersistenceConfig,
    /// Advanced/diagnostic settings
    pub advanced: AdvancedConfig,
}

/// Grid geometry configuration.
///
/// Columns may be fixed or derived from the container width; cell size and
/// gap are constant. Invariant: `cols >= min_cols`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of columns in the grid
    pub cols: i32,
    /// Cell edge length in pixels
    pub cell_size: f32,
    /// Gap between cells in pixels
    pub gap: f32,
    /// Minimum number of columns when deriving from container width
    pub min_cols: i32,
    /// Viewport width in pixels below which the grid collapses to a
    /// single-column stack
    pub breakpoint_width: f32,
}

/// Gesture and reflow configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Repack the whole grid on every gesture tick instead of the
    /// push-away reflow (denser, more visual churn)
    pub auto_compact: bool,
    /// Maximum widget height in rows a resize may reach
    pub max_widget_rows: i32,
}

/// Backend submission configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Base URL of the dashboard backend
    pub base_url: String,
    /// Dashboard whose layout this grid edits
    pub dashboard_id: String,
    /// Quiet interval in milliseconds before a position batch is submitted
    pub debounce_ms: u64,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Advanced/diagnostic configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Enable debug mode
    pub debug_mode: bool,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

/// How the current viewport renders the panel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Full tile grid with drag/resize gestures
    Grid,
    /// Single-column free-flow stacking; the grid engine is bypassed
    Stacked,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            interaction: InteractionConfig::default(),
            persistence: PersistenceConfig::default(),
            advanced: AdvancedConfig::default(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: 12,
            cell_size: 70.0,
            gap: 8.0,
            min_cols: 12,
            breakpoint_width: 768.0,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            auto_compact: false,
            max_widget_rows: 8,
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            dashboard_id: "default".to_string(),
            debounce_ms: 300,
            request_timeout_secs: 30,
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            log_level: "info".to_string(),
        }
    }
}

impl GridConfig {
    /// Pixel span of one cell including its trailing gap.
    ///
    /// This is the divisor that converts pointer deltas into grid cells.
    pub fn cell_span(&self) -> f32 {
        self.cell_size + self.gap
    }

    /// Number of columns the given container width can hold, never fewer
    /// than `min_cols`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_core::config::GridConfig;
    ///
    /// let grid = GridConfig::default();
    /// // A narrow desktop container still gets the minimum column count.
    /// assert_eq!(grid.columns_for_width(900.0), 12);
    /// // A wide container earns more columns.
    /// assert!(grid.columns_for_width(1600.0) > 12);
    /// ```
    pub fn columns_for_width(&self, width: f32) -> i32 {
        let derived = ((width + self.gap) / self.cell_span()).floor() as i32;
        derived.max(self.min_cols)
    }

    /// Whether the given viewport width uses the tile grid or the mobile
    /// single-column stack.
    pub fn mode_for_width(&self, width: f32) -> LayoutMode {
        if width < self.breakpoint_width {
            LayoutMode::Stacked
        } else {
            LayoutMode::Grid
        }
    }
}

impl Config {
    /// Load configuration from the default location or create default config.
    ///
    /// If the file doesn't exist or can't be loaded, the default
    /// configuration is returned (and written back when possible).
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_core::Config;
    ///
    /// let config = Config::load_or_default().unwrap();
    /// ```
    pub fn load_or_default() -> Result<Self> {
        match Self::load() {
            Ok(config) => Ok(config),
            Err(_) => {
                let config = Self::default();
                // Try to save default config
                let _ = config.save();
                Ok(config)
            }
        }
    }

    /// Load configuration from the default config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from_file(&config_path)
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// loaded values fail validation.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use tessera_core::Config;
    /// use std::path::Path;
    ///
    /// let config = Config::load_from_file(Path::new("tessera.toml"))?;
    /// # Ok::<(), tessera_core::Error>(())
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;
        self.save_to_file(&config_path)
    }

    /// Save configuration to a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the values fail validation or the file cannot be
    /// written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;

        // Ensure directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::config(format!("Failed to create config directory: {}", e)))?;
        }

        std::fs::write(path, content)
            .map_err(|e| Error::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any configuration value is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_core::Config;
    ///
    /// let config = Config::default();
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.grid.cols < 1 {
            return Err(Error::validation(
                "grid.cols",
                "Column count must be at least 1",
            ));
        }

        if self.grid.min_cols < 1 {
            return Err(Error::validation(
                "grid.min_cols",
                "Minimum column count must be at least 1",
            ));
        }

        if self.grid.cols < self.grid.min_cols {
            return Err(Error::validation(
                "grid.cols",
                "Column count cannot be below the minimum column count",
            ));
        }

        if self.grid.cell_size <= 0.0 {
            return Err(Error::validation(
                "grid.cell_size",
                "Cell size must be positive",
            ));
        }

        if self.grid.gap < 0.0 {
            return Err(Error::validation("grid.gap", "Gap cannot be negative"));
        }

        if self.grid.breakpoint_width <= 0.0 {
            return Err(Error::validation(
                "grid.breakpoint_width",
                "Breakpoint width must be positive",
            ));
        }

        if self.interaction.max_widget_rows < 1 {
            return Err(Error::validation(
                "interaction.max_widget_rows",
                "Maximum widget height must be at least 1 row",
            ));
        }

        if self.persistence.debounce_ms > 10_000 {
            return Err(Error::validation(
                "persistence.debounce_ms",
                "Debounce interval cannot exceed 10 seconds",
            ));
        }

        if self.persistence.base_url.is_empty() {
            return Err(Error::validation(
                "persistence.base_url",
                "Backend base URL cannot be empty",
            ));
        }

        Ok(())
    }

    /// Get the path to the default config file.
    fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::config("Could not determine config directory"))?
            .join("tessera");

        Ok(config_dir.join("config.toml"))
    }
}
