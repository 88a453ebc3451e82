//! Data models for the forecast pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Period: raw source records and normalized forecast periods
//! - Event: detected weather conditions and their severity
//! - Message: output layouts, device profiles and message parts

pub mod event;
pub mod message;
pub mod period;

// Re-export all public types for convenient access
pub use event::{EXTREME_KINDS, EventKind, Severity, WeatherEvent};
pub use message::{
    DeviceProfile, FormatKind, FormattedOutput, MessagePart, part_prefix, reassemble,
};
pub use period::{AnalyzedPeriod, Period, RawPeriod};
