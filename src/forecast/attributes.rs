//! Short display fragments shared by the layouts

use crate::models::Period;

/// `"H:61°"` for day periods, `"L:46°"` for night periods
#[must_use]
pub fn temperature_fragment(period: &Period) -> Option<String> {
    let marker = if period.temp_is_high { 'H' } else { 'L' };
    period.temperature.map(|t| format!("{marker}:{t}°"))
}

/// Direction and speed range with no spaces, e.g. `"SE5-10mph"`, followed
/// by the gust speed when there is one: `"SW10-14mph (G:35mph)"`
///
/// A speed without a direction still renders (`"10mph"`); a direction or
/// gust without a sustained speed does not.
#[must_use]
pub fn wind_fragment(period: &Period) -> Option<String> {
    let speed = period.wind_speed_text.as_deref()?;
    let direction = period.wind_direction.as_deref().unwrap_or_default();
    Some(match period.wind_gust_mph {
        Some(gust) => format!("{direction}{speed}mph (G:{gust}mph)"),
        None => format!("{direction}{speed}mph"),
    })
}

/// Short name for a forecast period used by the summary layout
///
/// Unknown names pass through unchanged.
#[must_use]
pub fn abbreviate_period_name(name: &str) -> String {
    let trimmed = name.trim();
    let lower = trimmed.to_lowercase();

    let fixed = match lower.as_str() {
        "today" => Some("Tdy"),
        "tonight" => Some("Tngt"),
        "this afternoon" => Some("Aft"),
        "overnight" => Some("ON"),
        _ => None,
    };
    if let Some(abbr) = fixed {
        return abbr.to_string();
    }

    if let Some(day) = lower.strip_suffix(" night") {
        if let Some(abbr) = weekday_abbr(day) {
            return format!("{abbr}N");
        }
    }
    if let Some(abbr) = weekday_abbr(&lower) {
        return abbr.to_string();
    }

    trimmed.to_string()
}

fn weekday_abbr(day: &str) -> Option<&'static str> {
    match day.trim() {
        "monday" => Some("Mon"),
        "tuesday" => Some("Tue"),
        "wednesday" => Some("Wed"),
        "thursday" => Some("Thu"),
        "friday" => Some("Fri"),
        "saturday" => Some("Sat"),
        "sunday" => Some("Sun"),
        _ => None,
    }
}
