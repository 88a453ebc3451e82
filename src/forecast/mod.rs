//! Forecast text pipeline stages
//!
//! Data flows strictly through the stages in this order:
//! - extractor: raw records to normalized periods
//! - detector (driven by the rules table): weather events per period
//! - attributes: temperature and wind display fragments
//! - formatter: Summary, Compact or Full text
//! - splitter: numbered parts within a device's character budget

pub mod attributes;
pub mod detector;
pub mod extractor;
pub mod formatter;
pub mod rules;
pub mod splitter;

pub use attributes::{abbreviate_period_name, temperature_fragment, wind_fragment};
pub use detector::{analyze_periods, detect_events};
pub use extractor::{direction_abbr, extract_period, extract_periods, normalize_whitespace};
pub use formatter::{
    NO_SIGNIFICANT_WEATHER, WARNING_MARKER, format_compact, format_full, format_summary, render,
};
pub use rules::{EVENT_RULES, EventRule, SIGNIFICANT_WIND_MPH, Trigger, rule_for};
pub use splitter::{SplitOptions, split_message, truncate_to_budget};
