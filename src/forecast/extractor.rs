//! Period extraction
//!
//! Turns raw source records into [`Period`]s: trims names, collapses the
//! forecast text onto one line, decides day/night, parses wind and picks
//! up an explicit chance of precipitation.

use crate::models::{Period, RawPeriod};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Compass words, longest first so alternation prefers "south southeast"
pub(crate) const DIRECTION_WORDS: &str = "north northeast|east northeast|\
east southeast|south southeast|south southwest|west southwest|west northwest|\
north northwest|northeast|northwest|southeast|southwest|north|south|east|west|variable";

static WIND_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^\s*(?:(?P<dir>[a-z]+(?:\s+[a-z]+)?)\s+)?",
        r"(?P<lo>\d+)(?:\s*(?:to|-)\s*(?P<hi>\d+))?\s*mph",
    ))
    .expect("wind field pattern is valid")
});

static WIND_IN_TEXT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let speed = r"(?:around |near |up to |to )?(?P<lo>\d+)(?: to (?P<hi>\d+))? mph";
    [
        format!(r"\b(?P<dir>{DIRECTION_WORDS}) winds? {speed}"),
        format!(
            r"\bwinds? (?P<lo>\d+)(?: to (?P<hi>\d+))? mph from the (?P<dir>{DIRECTION_WORDS})\b"
        ),
        format!(r"\bbecoming (?P<dir>{DIRECTION_WORDS}) (?:winds? )?{speed}"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("wind text pattern is valid"))
    .collect()
});

static GUST_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bgusts? (?:as high as |up to |to |near |around )?(\d+) mph")
        .expect("gust pattern is valid")
});

static PRECIP_CHANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)chance of precipitation is (?:near |around )?(\d{1,3})\s*(?:%|percent)")
        .expect("precipitation pattern is valid")
});

/// Wind as read from a record or from the forecast text
#[derive(Debug, Clone, PartialEq, Eq)]
struct WindReading {
    direction: Option<String>,
    speed_text: String,
    speed_mph: u32,
}

/// Normalize every record, keeping source order
pub fn extract_periods(records: &[RawPeriod]) -> Vec<Period> {
    let periods: Vec<Period> = records.iter().map(extract_period).collect();
    debug!("Extracted {} periods", periods.len());
    periods
}

/// Normalize one record; missing fields become empty defaults
#[must_use]
pub fn extract_period(raw: &RawPeriod) -> Period {
    let name = raw.name.as_deref().unwrap_or_default().trim().to_string();
    if name.is_empty() {
        debug!("Period record has no name, using empty default");
    }

    let raw_text = normalize_whitespace(raw.text.as_deref().unwrap_or_default());
    let is_daytime = raw.is_daytime.unwrap_or_else(|| infer_daytime(&name));

    let wind = raw
        .wind
        .as_deref()
        .and_then(|phrase| parse_wind_field(phrase, raw.wind_direction.as_deref()))
        .or_else(|| parse_wind_from_text(&raw_text));

    let explicit_precip_pct = raw
        .precipitation_pct
        .map(|pct| pct.min(100))
        .or_else(|| explicit_precip_from_text(&raw_text));

    let (wind_direction, wind_speed_text, sustained_mph) = match wind {
        Some(w) => (w.direction, Some(w.speed_text), Some(w.speed_mph)),
        None => (None, None, None),
    };
    let wind_gust_mph = raw.wind_gust.max(gust_from_text(&raw_text));
    let wind_speed_mph = sustained_mph.max(wind_gust_mph);

    Period {
        name,
        raw_text,
        is_daytime,
        temperature: raw.temperature,
        temp_is_high: is_daytime,
        wind_speed_mph,
        wind_direction,
        wind_speed_text,
        wind_gust_mph,
        explicit_precip_pct,
    }
}

/// Collapse runs of whitespace, newlines included, to single spaces
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn infer_daytime(name: &str) -> bool {
    !name.to_lowercase().contains("night")
}

/// Abbreviate a compass direction ("south southeast" -> "SSE")
///
/// Returns `None` for words that are not a direction.
#[must_use]
pub fn direction_abbr(direction: &str) -> Option<String> {
    let normalized = normalize_whitespace(direction).to_lowercase();
    let abbr = match normalized.as_str() {
        "north" => "N",
        "northeast" => "NE",
        "east" => "E",
        "southeast" => "SE",
        "south" => "S",
        "southwest" => "SW",
        "west" => "W",
        "northwest" => "NW",
        "north northeast" => "NNE",
        "east northeast" => "ENE",
        "east southeast" => "ESE",
        "south southeast" => "SSE",
        "south southwest" => "SSW",
        "west southwest" => "WSW",
        "west northwest" => "WNW",
        "north northwest" => "NNW",
        "variable" | "var" => "VAR",
        short if (1..=3).contains(&short.len())
            && short.chars().all(|c| matches!(c, 'n' | 's' | 'e' | 'w')) =>
        {
            return Some(short.to_uppercase());
        }
        _ => return None,
    };
    Some(abbr.to_string())
}

fn parse_wind_field(phrase: &str, separate_direction: Option<&str>) -> Option<WindReading> {
    let caps = WIND_FIELD.captures(phrase)?;
    let lo: u32 = caps.name("lo")?.as_str().parse().ok()?;
    let hi: Option<u32> = caps.name("hi").and_then(|m| m.as_str().parse().ok());

    let direction = caps
        .name("dir")
        .and_then(|m| direction_abbr(m.as_str()))
        .or_else(|| separate_direction.and_then(direction_abbr));

    Some(reading(direction, lo, hi))
}

/// Read wind from forecast prose
///
/// The first phrase found supplies the display fragment; the representative
/// speed is the highest upper bound among all wind phrases in the text.
fn parse_wind_from_text(text: &str) -> Option<WindReading> {
    let lower = text.to_lowercase();
    let mut first: Option<(usize, WindReading)> = None;
    let mut strongest = 0;

    for pattern in WIND_IN_TEXT.iter() {
        for caps in pattern.captures_iter(&lower) {
            let Some(lo) = caps.name("lo").and_then(|m| m.as_str().parse::<u32>().ok()) else {
                continue;
            };
            let hi = caps.name("hi").and_then(|m| m.as_str().parse::<u32>().ok());
            let direction = caps.name("dir").and_then(|m| direction_abbr(m.as_str()));
            let found = reading(direction, lo, hi);
            strongest = strongest.max(found.speed_mph);

            let start = caps.get(0).map_or(usize::MAX, |m| m.start());
            if first.as_ref().is_none_or(|(pos, _)| start < *pos) {
                first = Some((start, found));
            }
        }
    }

    first.map(|(_, mut found)| {
        found.speed_mph = strongest;
        found
    })
}

fn reading(direction: Option<String>, lo: u32, hi: Option<u32>) -> WindReading {
    match hi {
        Some(hi) => WindReading {
            direction,
            speed_text: format!("{lo}-{hi}"),
            speed_mph: lo.max(hi),
        },
        None => WindReading {
            direction,
            speed_text: lo.to_string(),
            speed_mph: lo,
        },
    }
}

/// Highest gust speed mentioned in the text
fn gust_from_text(text: &str) -> Option<u32> {
    GUST_IN_TEXT
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .max()
}

fn explicit_precip_from_text(text: &str) -> Option<u8> {
    PRECIP_CHANCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok())
        .map(|pct| pct.min(100) as u8)
}
