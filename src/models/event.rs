//! Weather events detected in a forecast period

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of weather conditions the detector can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Tornado,
    Hurricane,
    Blizzard,
    IceStorm,
    SevereThunderstorm,
    HighWindWarning,
    FloodWarning,
    DenseFog,
    Smoke,
    Thunderstorm,
    Hail,
    FreezingRain,
    Sleet,
    Snow,
    Rain,
    Wind,
    PatchyFog,
    Fog,
}

/// Kinds that always carry the warning marker, whatever their probability
pub const EXTREME_KINDS: &[EventKind] = &[
    EventKind::Blizzard,
    EventKind::IceStorm,
    EventKind::Tornado,
    EventKind::Hurricane,
    EventKind::SevereThunderstorm,
    EventKind::HighWindWarning,
    EventKind::FloodWarning,
    EventKind::DenseFog,
    EventKind::Smoke,
];

impl EventKind {
    /// Short label used by the Summary and Compact layouts
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tornado => "Tornado",
            Self::Hurricane => "Hurricane",
            Self::Blizzard => "Blizzard",
            Self::IceStorm => "IceStorm",
            Self::SevereThunderstorm => "SvrTstorm",
            Self::HighWindWarning => "HiWindWarn",
            Self::FloodWarning => "FloodWarn",
            Self::DenseFog => "DenseFog",
            Self::Smoke => "Smoke",
            Self::Thunderstorm => "Tstorm",
            Self::Hail => "Hail",
            Self::FreezingRain => "FzRain",
            Self::Sleet => "Sleet",
            Self::Snow => "Snow",
            Self::Rain => "Rain",
            Self::Wind => "Wind",
            Self::PatchyFog => "PatchyFog",
            Self::Fog => "Fog",
        }
    }

    #[must_use]
    pub fn is_extreme(&self) -> bool {
        EXTREME_KINDS.contains(self)
    }

    /// Kinds that an explicit precipitation percentage applies to
    #[must_use]
    pub fn is_precipitation(&self) -> bool {
        matches!(
            self,
            Self::Rain | Self::Snow | Self::Sleet | Self::FreezingRain
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Coarse impact rating derived from kind and probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Extreme,
}

impl Severity {
    /// Rate an event from its kind and resolved probability
    #[must_use]
    pub fn classify(kind: EventKind, probability_pct: u8) -> Self {
        use EventKind::{
            Blizzard, FloodWarning, HighWindWarning, Hurricane, IceStorm, SevereThunderstorm,
            Tornado,
        };

        if probability_pct >= 90 || matches!(kind, Tornado | Hurricane | Blizzard | IceStorm) {
            Self::Extreme
        } else if probability_pct >= 70
            || matches!(kind, SevereThunderstorm | HighWindWarning | FloodWarning)
        {
            Self::High
        } else if probability_pct >= 40 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// A detected weather condition for one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherEvent {
    pub kind: EventKind,
    /// Resolved probability (0-100)
    pub probability_pct: u8,
    pub is_extreme: bool,
    pub severity: Severity,
}

impl WeatherEvent {
    #[must_use]
    pub fn new(kind: EventKind, probability_pct: u8) -> Self {
        let probability_pct = probability_pct.min(100);
        Self {
            kind,
            probability_pct,
            is_extreme: kind.is_extreme(),
            severity: Severity::classify(kind, probability_pct),
        }
    }
}
