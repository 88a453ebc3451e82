//! Event rule table
//!
//! Detection is driven entirely by [`EVENT_RULES`]. Table order is the
//! rendering priority (most severe first) and also decides which rule
//! claims a phrase when keywords overlap: "dense fog" is claimed by
//! `DenseFog` before `Fog` ever sees it.

use crate::models::EventKind;

/// Wind speed at or above which a wind event is reported
pub const SIGNIFICANT_WIND_MPH: u32 = 15;

/// Maximum distance in bytes between a keyword and a percentage it owns
pub const PERCENT_CONTEXT_CHARS: usize = 100;

/// What makes a rule fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Any keyword at a word start in unclaimed text
    Keywords,
    /// The period's representative wind speed reaching the threshold
    WindSpeed(u32),
}

/// One row of the rule table
#[derive(Debug)]
pub struct EventRule {
    pub kind: EventKind,
    pub trigger: Trigger,
    pub keywords: &'static [&'static str],
    /// Phrase-specific probabilities, first hit wins
    pub tiers: &'static [(&'static str, u8)],
    /// Whether intensity qualifiers ("likely", "isolated") apply
    pub qualified: bool,
    pub baseline: u8,
}

/// Intensity qualifiers, checked in order within the keyword's sentence
pub const QUALIFIERS: &[(&str, u8)] = &[
    ("likely", 70),
    ("scattered", 40),
    ("isolated", 20),
    ("slight chance", 10),
    ("chance", 30),
];

pub static EVENT_RULES: &[EventRule] = &[
    EventRule {
        kind: EventKind::Tornado,
        trigger: Trigger::Keywords,
        keywords: &["tornado"],
        tiers: &[],
        qualified: false,
        baseline: 90,
    },
    EventRule {
        kind: EventKind::Hurricane,
        trigger: Trigger::Keywords,
        keywords: &["hurricane", "tropical storm"],
        tiers: &[],
        qualified: false,
        baseline: 90,
    },
    EventRule {
        kind: EventKind::Blizzard,
        trigger: Trigger::Keywords,
        keywords: &["blizzard"],
        tiers: &[],
        qualified: false,
        baseline: 90,
    },
    EventRule {
        kind: EventKind::IceStorm,
        trigger: Trigger::Keywords,
        keywords: &["ice storm"],
        tiers: &[],
        qualified: false,
        baseline: 90,
    },
    EventRule {
        kind: EventKind::SevereThunderstorm,
        trigger: Trigger::Keywords,
        keywords: &["severe thunderstorm", "severe t-storm", "severe tstorm"],
        tiers: &[],
        qualified: false,
        baseline: 90,
    },
    EventRule {
        kind: EventKind::HighWindWarning,
        trigger: Trigger::Keywords,
        keywords: &["high wind warning"],
        tiers: &[],
        qualified: false,
        baseline: 90,
    },
    EventRule {
        kind: EventKind::FloodWarning,
        trigger: Trigger::Keywords,
        keywords: &["flash flood warning", "flood warning"],
        tiers: &[],
        qualified: false,
        baseline: 90,
    },
    EventRule {
        kind: EventKind::DenseFog,
        trigger: Trigger::Keywords,
        keywords: &["dense fog", "thick fog", "heavy fog"],
        tiers: &[],
        qualified: false,
        baseline: 90,
    },
    EventRule {
        kind: EventKind::Smoke,
        trigger: Trigger::Keywords,
        keywords: &[
            "wildfire smoke",
            "fire smoke",
            "smoke from fires",
            "areas of smoke",
            "widespread haze",
            "smoke",
            "smoky",
        ],
        tiers: &[
            ("heavy smoke", 90),
            ("thick smoke", 90),
            ("dense smoke", 90),
            ("wildfire smoke", 75),
            ("fire smoke", 75),
            ("smoke from fires", 75),
            ("areas of smoke", 65),
            ("widespread haze", 50),
        ],
        qualified: false,
        baseline: 65,
    },
    EventRule {
        kind: EventKind::Thunderstorm,
        trigger: Trigger::Keywords,
        keywords: &["thunderstorm", "t-storm", "tstorm"],
        tiers: &[("severe", 80)],
        qualified: true,
        baseline: 50,
    },
    EventRule {
        kind: EventKind::Hail,
        trigger: Trigger::Keywords,
        keywords: &["hail"],
        tiers: &[],
        qualified: true,
        baseline: 50,
    },
    EventRule {
        kind: EventKind::FreezingRain,
        trigger: Trigger::Keywords,
        keywords: &["freezing rain", "freezing drizzle", "icy", "ice"],
        tiers: &[],
        qualified: true,
        baseline: 50,
    },
    EventRule {
        kind: EventKind::Sleet,
        trigger: Trigger::Keywords,
        keywords: &["sleet"],
        tiers: &[],
        qualified: true,
        baseline: 50,
    },
    EventRule {
        kind: EventKind::Snow,
        trigger: Trigger::Keywords,
        keywords: &["snow showers", "snowfall", "snow", "flurries"],
        tiers: &[("heavy snow", 70), ("flurries", 30)],
        qualified: true,
        baseline: 50,
    },
    EventRule {
        kind: EventKind::Rain,
        trigger: Trigger::Keywords,
        keywords: &["rain", "showers", "drizzle", "sprinkles"],
        tiers: &[("drizzle", 25), ("sprinkles", 25)],
        qualified: true,
        baseline: 50,
    },
    EventRule {
        kind: EventKind::Wind,
        trigger: Trigger::WindSpeed(SIGNIFICANT_WIND_MPH),
        keywords: &["high wind", "gust", "windy", "breezy"],
        tiers: &[("high wind", 80), ("gust", 80), ("windy", 60), ("breezy", 40)],
        qualified: false,
        baseline: 30,
    },
    EventRule {
        kind: EventKind::PatchyFog,
        trigger: Trigger::Keywords,
        keywords: &["patchy fog"],
        tiers: &[],
        qualified: false,
        baseline: 50,
    },
    EventRule {
        kind: EventKind::Fog,
        trigger: Trigger::Keywords,
        keywords: &["foggy", "fog", "mist"],
        tiers: &[("mist", 30)],
        qualified: false,
        baseline: 60,
    },
];

/// Look up the rule for a kind
#[must_use]
pub fn rule_for(kind: EventKind) -> Option<&'static EventRule> {
    EVENT_RULES.iter().find(|rule| rule.kind == kind)
}
