//! `satcom-forecast` - Weather forecasts for character-constrained
//! satellite messengers
//!
//! This library turns multi-day forecast period records into short
//! Summary, Compact or Full text and packs the result into numbered
//! messages that fit a device's character limit.

pub mod config;
pub mod error;
pub mod forecast;
pub mod logging;
pub mod models;
pub mod pipeline;

// Re-export core types for public API
pub use config::SatcomConfig;
pub use error::ForecastError;
pub use forecast::{SplitOptions, detect_events, extract_periods, render, split_message};
pub use logging::init_logging;
pub use models::{
    AnalyzedPeriod, DeviceProfile, EventKind, FormatKind, FormattedOutput, MessagePart, Period,
    RawPeriod, Severity, WeatherEvent, reassemble,
};
pub use pipeline::{ForecastPipeline, ForecastRequest, filter_periods_by_days, load_periods};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ForecastError>;
