//! Forecast pipeline service
//!
//! Wires the stages together for one request: raw records are extracted,
//! limited to the requested number of days, analyzed for weather events,
//! rendered in the requested layout and split for the target device.

use crate::config::SatcomConfig;
use crate::forecast::{SplitOptions, analyze_periods, extract_periods, render, split_message};
use crate::models::{
    AnalyzedPeriod, DeviceProfile, FormatKind, FormattedOutput, MessagePart, Period, RawPeriod,
};
use crate::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Accepted range for the number of forecast days
pub const DAYS_RANGE: std::ops::RangeInclusive<u8> = 1..=7;

/// What the caller wants rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub format: FormatKind,
    pub device: DeviceProfile,
    /// Overrides the device limit; `Some(0)` sends everything as one part
    pub character_limit: Option<usize>,
    pub days: u8,
}

impl ForecastRequest {
    #[must_use]
    pub fn new(format: FormatKind, device: DeviceProfile, days: u8) -> Self {
        Self {
            format,
            device,
            character_limit: None,
            days,
        }
    }

    /// Request built from the configured defaults
    #[must_use]
    pub fn from_config(config: &SatcomConfig) -> Self {
        Self::new(
            config.formatting.default_format,
            config.devices.default_device,
            config.formatting.default_days,
        )
    }

    #[must_use]
    pub fn with_character_limit(mut self, limit: usize) -> Self {
        self.character_limit = Some(limit);
        self
    }

    /// Build a request from user-supplied names, e.g. the words of an
    /// inbound message
    pub fn parse(format: &str, device: &str, days: u8) -> Result<Self> {
        let request = Self::new(format.parse()?, device.parse()?, days);
        request.validate()?;
        Ok(request)
    }

    /// Check the request against the caller contract
    pub fn validate(&self) -> Result<()> {
        validate_days(self.days)
    }
}

fn validate_days(days: u8) -> Result<()> {
    if !DAYS_RANGE.contains(&days) {
        return Err(ForecastError::validation(format!(
            "days must be between {} and {}, got {days}",
            DAYS_RANGE.start(),
            DAYS_RANGE.end()
        )));
    }
    Ok(())
}

/// Keep the periods of the first `days` calendar days
///
/// A new day starts when a daytime period follows a night period, so
/// "Tonight, Monday, Monday Night" is two days.
#[must_use]
pub fn filter_periods_by_days(periods: Vec<Period>, days: u8) -> Vec<Period> {
    let total = periods.len();
    let mut day: u32 = 1;
    let mut previous_was_night = false;

    let kept: Vec<Period> = periods
        .into_iter()
        .take_while(|period| {
            if period.is_daytime && previous_was_night {
                day += 1;
            }
            previous_was_night = !period.is_daytime;
            day <= u32::from(days)
        })
        .collect();

    debug!("Kept {} of {} periods for {} days", kept.len(), total, days);
    kept
}

/// Read raw period records from a JSON file
pub fn load_periods(path: &Path) -> Result<Vec<RawPeriod>> {
    let json = std::fs::read_to_string(path)?;
    RawPeriod::from_json_array(&json)
}

/// Forecast pipeline service
#[derive(Debug, Clone, Default)]
pub struct ForecastPipeline {
    config: SatcomConfig,
}

impl ForecastPipeline {
    #[must_use]
    pub fn new(config: SatcomConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SatcomConfig {
        &self.config
    }

    /// Extract, limit to `days` and detect events
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn analyze(&self, records: &[RawPeriod], days: u8) -> Result<Vec<AnalyzedPeriod>> {
        validate_days(days)?;

        let periods = filter_periods_by_days(extract_periods(records), days);
        let analyzed = analyze_periods(periods);
        debug!(
            "Analyzed {} periods, {} events",
            analyzed.len(),
            analyzed.iter().map(|a| a.events.len()).sum::<usize>()
        );
        Ok(analyzed)
    }

    /// Render the requested layout without splitting
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn format(
        &self,
        records: &[RawPeriod],
        request: &ForecastRequest,
    ) -> Result<FormattedOutput> {
        request.validate()?;
        let analyzed = self.analyze(records, request.days)?;
        Ok(render(&analyzed, request.format, self.summary_budget(request)))
    }

    /// Render and split into the parts to deliver
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn render(
        &self,
        records: &[RawPeriod],
        request: &ForecastRequest,
    ) -> Result<Vec<MessagePart>> {
        let output = self.format(records, request)?;
        let parts = split_message(&output, &self.split_options(request));

        info!(
            "Rendered {}-day {} forecast for {} in {} part(s)",
            request.days,
            request.format,
            request.device,
            parts.len()
        );
        Ok(parts)
    }

    /// Limit and prefix reserve for a request
    #[must_use]
    pub fn split_options(&self, request: &ForecastRequest) -> SplitOptions {
        let limit = request
            .character_limit
            .unwrap_or_else(|| self.config.device_limit(request.device));
        SplitOptions::new(limit, self.config.devices.prefix_overhead)
    }

    /// Summary length that still goes out as one unprefixed message
    #[must_use]
    pub fn summary_budget(&self, request: &ForecastRequest) -> usize {
        let max_chars = self.config.formatting.summary_max_chars;
        match self.split_options(request).limit {
            0 => max_chars,
            limit => max_chars.min(limit),
        }
    }
}
