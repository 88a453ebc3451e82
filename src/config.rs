//! Configuration management for satcom-forecast
//!
//! Settings come from an optional TOML file and `SATCOM_`-prefixed
//! environment variables, with validation applied after loading.

use crate::ForecastError;
use crate::models::{DeviceProfile, FormatKind};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Smallest and largest accepted device character limits
const DEVICE_LIMIT_RANGE: std::ops::RangeInclusive<usize> = 20..=10000;

/// Largest accepted prefix reserve
const MAX_PREFIX_OVERHEAD: usize = 16;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SatcomConfig {
    /// Device character limits
    pub devices: DeviceConfig,
    /// Output defaults
    pub formatting: FormattingConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Satellite messenger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Characters per message on a ZOLEO
    #[serde(default = "default_zoleo_limit")]
    pub zoleo_limit: usize,
    /// Characters per message on an inReach
    #[serde(default = "default_inreach_limit")]
    pub inreach_limit: usize,
    /// Characters reserved for the "(i/M) " part prefix
    #[serde(default = "default_prefix_overhead")]
    pub prefix_overhead: usize,
    #[serde(default)]
    pub default_device: DeviceProfile,
}

/// Output defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattingConfig {
    #[serde(default)]
    pub default_format: FormatKind,
    /// Days of forecast when the request does not say
    #[serde(default = "default_days")]
    pub default_days: u8,
    /// Length budget of the single-message summary
    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_zoleo_limit() -> usize {
    DeviceProfile::Zoleo.default_limit()
}

fn default_inreach_limit() -> usize {
    DeviceProfile::InReach.default_limit()
}

fn default_prefix_overhead() -> usize {
    7
}

fn default_days() -> u8 {
    3
}

fn default_summary_max_chars() -> usize {
    150
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            zoleo_limit: default_zoleo_limit(),
            inreach_limit: default_inreach_limit(),
            prefix_overhead: default_prefix_overhead(),
            default_device: DeviceProfile::default(),
        }
    }
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            default_format: FormatKind::default(),
            default_days: default_days(),
            summary_max_chars: default_summary_max_chars(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SatcomConfig {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from the given file, falling back to the default
    /// location; a missing file is not an error
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SATCOM_DEVICES__ZOLEO_LIMIT=180 overrides devices.zoleo_limit
        builder = builder.add_source(
            Environment::with_prefix("SATCOM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SatcomConfig = settings
            .try_deserialize()
            .with_context(|| {
                format!(
                    "Failed to deserialize configuration from {}",
                    config_file.display()
                )
            })?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("satcom-forecast").join("config.toml"))
    }

    /// Replace zero or empty values with their defaults
    pub fn apply_defaults(&mut self) {
        if self.devices.zoleo_limit == 0 {
            self.devices.zoleo_limit = default_zoleo_limit();
        }
        if self.devices.inreach_limit == 0 {
            self.devices.inreach_limit = default_inreach_limit();
        }
        if self.formatting.default_days == 0 {
            self.formatting.default_days = default_days();
        }
        if self.formatting.summary_max_chars == 0 {
            self.formatting.summary_max_chars = default_summary_max_chars();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Character limit configured for a device
    #[must_use]
    pub fn device_limit(&self, device: DeviceProfile) -> usize {
        match device {
            DeviceProfile::Zoleo => self.devices.zoleo_limit,
            DeviceProfile::InReach => self.devices.inreach_limit,
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_devices()?;
        self.validate_formatting()?;
        self.validate_logging()?;
        Ok(())
    }

    fn validate_devices(&self) -> Result<()> {
        for (name, limit) in [
            ("zoleo_limit", self.devices.zoleo_limit),
            ("inreach_limit", self.devices.inreach_limit),
        ] {
            if !DEVICE_LIMIT_RANGE.contains(&limit) {
                return Err(ForecastError::config(format!(
                    "devices.{name} must be between {} and {}, got {limit}",
                    DEVICE_LIMIT_RANGE.start(),
                    DEVICE_LIMIT_RANGE.end()
                ))
                .into());
            }
        }

        let smallest = self.devices.zoleo_limit.min(self.devices.inreach_limit);
        if self.devices.prefix_overhead >= smallest {
            return Err(ForecastError::config(format!(
                "devices.prefix_overhead ({}) must be smaller than every device limit",
                self.devices.prefix_overhead
            ))
            .into());
        }
        if self.devices.prefix_overhead > MAX_PREFIX_OVERHEAD {
            return Err(ForecastError::config(format!(
                "devices.prefix_overhead cannot exceed {MAX_PREFIX_OVERHEAD}"
            ))
            .into());
        }

        Ok(())
    }

    fn validate_formatting(&self) -> Result<()> {
        if !(1..=7).contains(&self.formatting.default_days) {
            return Err(ForecastError::config(
                "formatting.default_days must be between 1 and 7",
            )
            .into());
        }

        if !(40..=2000).contains(&self.formatting.summary_max_chars) {
            return Err(ForecastError::config(
                "formatting.summary_max_chars must be between 40 and 2000",
            )
            .into());
        }

        let single_message = self
            .devices
            .zoleo_limit
            .min(self.devices.inreach_limit)
            .saturating_sub(self.devices.prefix_overhead);
        if self.formatting.summary_max_chars > single_message {
            return Err(ForecastError::config(format!(
                "formatting.summary_max_chars ({}) must fit the smallest device message \
                 after the part prefix ({single_message})",
                self.formatting.summary_max_chars
            ))
            .into());
        }

        Ok(())
    }

    fn validate_logging(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(ForecastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
