//! The three output layouts
//!
//! Each layout is its own pure function over analyzed periods; [`render`]
//! only dispatches. None of them truncates except Summary, which must fit
//! a single message and drops later periods to do so. Length limits for
//! Compact and Full are enforced by the splitter.

use crate::forecast::attributes::{abbreviate_period_name, temperature_fragment, wind_fragment};
use crate::forecast::extractor::{DIRECTION_WORDS, normalize_whitespace};
use crate::forecast::rules::EVENT_RULES;
use crate::forecast::splitter::sentence_ends;
use crate::models::{AnalyzedPeriod, EventKind, FormatKind, FormattedOutput, Period, WeatherEvent};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Marker placed before extreme events
pub const WARNING_MARKER: &str = "⚠";

/// Summary text when no period has anything to report
pub const NO_SIGNIFICANT_WEATHER: &str = "No significant weather expected.";

/// Phrases removed from the display copy of a period's text before its
/// first sentence is shown in Compact
static DISPLAY_NOISE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let speed = r"(?:around |near |up to )?\d+(?: to \d+)? mph";
    [
        r"(?i)\b(?:with )?(?:a )?(?:high|low) (?:near|around) -?\d+".to_string(),
        format!(
            r"(?i)\b(?:{DIRECTION_WORDS}) winds? {speed}(?:, with gusts as high as \d+ mph)?"
        ),
        format!(r"(?i)\bwinds? \d+(?: to \d+)? mph from the (?:{DIRECTION_WORDS})\b"),
        format!(r"(?i)\bbecoming (?:{DIRECTION_WORDS}) (?:winds? )?{speed}"),
        r"(?i)chance of precipitation is (?:near |around )?\d{1,3}\s*(?:%|percent)".to_string(),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("display cleanup pattern is valid"))
    .collect()
});

/// Render periods in the requested layout
#[must_use]
pub fn render(
    periods: &[AnalyzedPeriod],
    kind: FormatKind,
    summary_max_chars: usize,
) -> FormattedOutput {
    let text = match kind {
        FormatKind::Summary => format_summary(periods, summary_max_chars),
        FormatKind::Compact => format_compact(periods),
        FormatKind::Full => format_full(periods),
    };
    debug!(
        "Rendered {} periods as {} ({} chars)",
        periods.len(),
        kind,
        text.chars().count()
    );
    FormattedOutput::new(kind, text)
}

/// `"Tngt:Rain(80%),L:46°,SE5-10mph|Mon:Rain(70%),H:61°,SW10-20mph,L:41°"`
///
/// A day and the night that follows it share one token named after the
/// day. Tokens are added while the whole string stays within `max_chars`.
/// The first token is always kept so the nearest period is never lost.
#[must_use]
pub fn format_summary(periods: &[AnalyzedPeriod], max_chars: usize) -> String {
    let tokens = summary_tokens(periods);
    if tokens.is_empty() {
        return NO_SIGNIFICANT_WEATHER.to_string();
    }

    let mut out = String::new();
    let mut len = 0;
    for (i, token) in tokens.iter().enumerate() {
        let token_len = token.chars().count();
        if i > 0 {
            if len + 1 + token_len > max_chars {
                debug!(
                    "Summary budget of {} chars reached, dropping {} later tokens",
                    max_chars,
                    tokens.len() - i
                );
                break;
            }
            out.push(FormatKind::Summary.unit_separator());
            len += 1;
        }
        out.push_str(token);
        len += token_len;
    }
    out
}

fn summary_tokens(periods: &[AnalyzedPeriod]) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < periods.len() {
        let day = &periods[i];
        let night = periods
            .get(i + 1)
            .filter(|next| is_night_of(&day.period, &next.period));
        tokens.extend(summary_token(day, night));
        i += if night.is_some() { 2 } else { 1 };
    }
    tokens
}

/// "Monday" is followed by "Monday Night", "Today" or "This Afternoon" by
/// "Tonight"
fn is_night_of(day: &Period, night: &Period) -> bool {
    if !day.is_daytime || night.is_daytime {
        return false;
    }
    let day_name = day.name.to_lowercase();
    let night_name = night.name.to_lowercase();
    match night_name.strip_suffix(" night") {
        Some(base) => !base.is_empty() && base == day_name,
        None => night_name == "tonight" && matches!(day_name.as_str(), "today" | "this afternoon"),
    }
}

fn summary_token(day: &AnalyzedPeriod, night: Option<&AnalyzedPeriod>) -> Option<String> {
    let events = match night {
        Some(night) => merge_events(&day.events, &night.events),
        None => day.events.clone(),
    };

    let mut fragments: Vec<String> = events.iter().map(event_fragment).collect();
    fragments.extend(temperature_fragment(&day.period));
    fragments.extend(
        wind_fragment(&day.period).or_else(|| night.and_then(|n| wind_fragment(&n.period))),
    );
    if let Some(night) = night {
        fragments.extend(temperature_fragment(&night.period));
    }

    if fragments.is_empty() {
        return None;
    }
    Some(format!(
        "{}:{}",
        abbreviate_period_name(&day.period.name),
        fragments.join(",")
    ))
}

/// One event per kind with the higher probability, in rule priority order
fn merge_events(day: &[WeatherEvent], night: &[WeatherEvent]) -> Vec<WeatherEvent> {
    let mut merged = day.to_vec();
    for event in night {
        match merged.iter_mut().find(|e| e.kind == event.kind) {
            Some(existing) if event.probability_pct > existing.probability_pct => {
                *existing = event.clone();
            }
            Some(_) => {}
            None => merged.push(event.clone()),
        }
    }
    merged.sort_by_key(|event| rule_priority(event.kind));
    merged
}

fn rule_priority(kind: EventKind) -> usize {
    EVENT_RULES
        .iter()
        .position(|rule| rule.kind == kind)
        .unwrap_or(EVENT_RULES.len())
}

/// One line per period
///
/// With events: `"Name: ⚠Smoke(75%), Rain(40%) (H:61°, SE5-10mph) | Sentence"`.
/// Without: `"Name: Sentence (H:61°, SE5-10mph)"`.
#[must_use]
pub fn format_compact(periods: &[AnalyzedPeriod]) -> String {
    periods
        .iter()
        .map(compact_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn compact_line(analyzed: &AnalyzedPeriod) -> String {
    let period = &analyzed.period;
    let sentence = first_display_sentence(&period.raw_text);

    let details: Vec<String> = temperature_fragment(period)
        .into_iter()
        .chain(wind_fragment(period))
        .collect();
    let details = if details.is_empty() {
        String::new()
    } else {
        format!(" ({})", details.join(", "))
    };

    let body = if analyzed.events.is_empty() {
        format!("{sentence}{details}")
    } else {
        let events: Vec<String> = analyzed.events.iter().map(event_fragment).collect();
        let mut body = format!("{}{details}", events.join(", "));
        if !sentence.is_empty() {
            body.push_str(" | ");
            body.push_str(&sentence);
        }
        body
    };

    label_line(&period.name, body.trim())
}

/// First sentence of the text with temperature, wind and
/// precipitation-chance phrases removed
fn first_display_sentence(text: &str) -> String {
    let mut display = text.to_string();
    for pattern in DISPLAY_NOISE.iter() {
        display = pattern.replace_all(&display, "").into_owned();
    }
    let display = normalize_whitespace(&display)
        .replace(" ,", ",")
        .replace(" .", ".");
    let display = display.trim_matches(|c: char| matches!(c, ' ' | ',' | '.'));

    let end = sentence_ends(display).next().unwrap_or(display.len());
    display[..end]
        .trim_end_matches(|c: char| matches!(c, '.' | ','))
        .trim()
        .to_string()
}

/// The forecast text verbatim, `"Name: text"` per line
#[must_use]
pub fn format_full(periods: &[AnalyzedPeriod]) -> String {
    periods
        .iter()
        .map(|analyzed| label_line(&analyzed.period.name, &analyzed.period.raw_text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn label_line(name: &str, body: &str) -> String {
    match (name.is_empty(), body.is_empty()) {
        (true, _) => body.to_string(),
        (false, true) => format!("{name}:"),
        (false, false) => format!("{name}: {body}"),
    }
}

fn event_fragment(event: &WeatherEvent) -> String {
    let marker = if event.is_extreme { WARNING_MARKER } else { "" };
    format!("{marker}{}({}%)", event.kind.label(), event.probability_pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::detector::analyze_periods;
    use crate::forecast::extractor::extract_periods;
    use crate::models::RawPeriod;
    use rstest::rstest;

    fn analyzed(records: &[RawPeriod]) -> Vec<AnalyzedPeriod> {
        analyze_periods(extract_periods(records))
    }

    fn tonight_rain() -> RawPeriod {
        RawPeriod::new("Tonight", "Rain showers likely... Chance of precipitation is 80%.")
            .with_daytime(false)
            .with_temperature(46)
            .with_wind("SE 5 to 10 mph")
    }

    #[test]
    fn test_summary_token_for_tonight() {
        let periods = analyzed(&[tonight_rain()]);
        assert_eq!(format_summary(&periods, 150), "Tngt:Rain(80%),L:46°,SE5-10mph");
    }

    #[test]
    fn test_summary_marks_extreme_events() {
        let periods = analyzed(&[RawPeriod::new("Monday", "Areas of wildfire smoke.")
            .with_daytime(true)
            .with_temperature(88)]);
        assert_eq!(format_summary(&periods, 150), "Mon:⚠Smoke(75%),H:88°");
    }

    #[test]
    fn test_summary_drops_later_periods_first() {
        let records: Vec<RawPeriod> = [
            "Today",
            "Tonight",
            "Monday",
            "Monday Night",
            "Tuesday",
            "Tuesday Night",
            "Wednesday",
            "Wednesday Night",
            "Thursday",
            "Thursday Night",
        ]
        .iter()
        .map(|name| {
            RawPeriod::new(*name, "Showers and thunderstorms likely.")
                .with_temperature(70)
                .with_wind("SW 10 to 20 mph")
        })
        .collect();
        let periods = analyzed(&records);

        let summary = format_summary(&periods, 150);
        assert!(summary.chars().count() <= 150);
        assert!(summary.starts_with("Tdy:"));
        assert!(!summary.contains("Thu:"));

        let tokens: Vec<&str> = summary.split('|').collect();
        assert!(tokens.len() < 5);
        assert_eq!(tokens[1].split(':').next(), Some("Mon"));
    }

    #[test]
    fn test_summary_merges_day_and_night() {
        let periods = analyzed(&[
            RawPeriod::new("Monday", "Rain likely.")
                .with_temperature(61)
                .with_wind("SW 10 to 20 mph"),
            RawPeriod::new("Monday Night", "Rain. Patchy fog after midnight.").with_temperature(41),
        ]);
        assert_eq!(
            format_summary(&periods, 150),
            "Mon:Rain(70%),Wind(30%),PatchyFog(50%),H:61°,SW10-20mph,L:41°"
        );
    }

    #[test]
    fn test_summary_merges_today_with_tonight_only() {
        let periods = analyzed(&[
            RawPeriod::new("Today", "Sunny.").with_temperature(75),
            tonight_rain(),
            RawPeriod::new("Tuesday Night", "Clear.").with_temperature(50),
        ]);
        assert_eq!(
            format_summary(&periods, 150),
            "Tdy:Rain(80%),H:75°,SE5-10mph,L:46°|TueN:L:50°"
        );
    }

    #[test]
    fn test_merged_events_keep_priority_order() {
        let day = vec![WeatherEvent::new(EventKind::Rain, 40)];
        let night = vec![
            WeatherEvent::new(EventKind::Thunderstorm, 30),
            WeatherEvent::new(EventKind::Rain, 60),
        ];
        assert_eq!(
            merge_events(&day, &night),
            vec![
                WeatherEvent::new(EventKind::Thunderstorm, 30),
                WeatherEvent::new(EventKind::Rain, 60),
            ]
        );
    }

    #[test]
    fn test_summary_keeps_first_period_even_over_budget() {
        let periods = analyzed(&[tonight_rain()]);
        assert_eq!(format_summary(&periods, 10), "Tngt:Rain(80%),L:46°,SE5-10mph");
    }

    #[test]
    fn test_summary_without_anything_to_report() {
        let periods = analyzed(&[RawPeriod::new("Today", "Sunny.")]);
        assert_eq!(format_summary(&periods, 150), NO_SIGNIFICANT_WEATHER);
        assert_eq!(format_summary(&[], 150), NO_SIGNIFICANT_WEATHER);
    }

    #[test]
    fn test_compact_line_with_events() {
        let periods = analyzed(&[tonight_rain()]);
        assert_eq!(
            format_compact(&periods),
            "Tonight: Rain(80%) (L:46°, SE5-10mph) | Rain showers likely"
        );
    }

    #[test]
    fn test_compact_line_without_events() {
        let periods = analyzed(&[RawPeriod::new(
            "Monday",
            "Sunny, with a high near 61. South wind 5 to 10 mph.",
        )
        .with_daytime(true)
        .with_temperature(61)]);
        assert_eq!(format_compact(&periods), "Monday: Sunny (H:61°, S5-10mph)");
    }

    #[test]
    fn test_compact_joins_lines_with_newline() {
        let periods = analyzed(&[
            RawPeriod::new("Today", "Patchy fog before 9am. Otherwise, mostly sunny."),
            RawPeriod::new("Tonight", "Clear."),
        ]);
        let compact = format_compact(&periods);
        let lines: Vec<&str> = compact.lines().collect();
        assert_eq!(lines, vec!["Today: PatchyFog(50%) | Patchy fog before 9am", "Tonight: Clear"]);
    }

    #[test]
    fn test_compact_gust_detail() {
        let periods = analyzed(&[RawPeriod::new(
            "Monday",
            "Sunny. Southwest wind 10 to 14 mph, with gusts as high as 35 mph.",
        )]);
        assert_eq!(
            format_compact(&periods),
            "Monday: Wind(80%) (SW10-14mph (G:35mph)) | Sunny"
        );
    }

    #[rstest]
    #[case("Rain totals of 0.5 inches possible. Cloudy.", "Rain totals of 0.5 inches possible")]
    #[case("Heavy snow! Travel not advised.", "Heavy snow!")]
    #[case("Rain showers likely... Mostly cloudy.", "Rain showers likely")]
    #[case(
        "Temperatures falling to below around 20 by morning.",
        "Temperatures falling to below around 20 by morning"
    )]
    #[case("Mostly sunny, with a high near 61.", "Mostly sunny")]
    fn test_first_display_sentence(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(first_display_sentence(text), expected);
    }

    #[test]
    fn test_full_is_verbatim() {
        let text = "Rain showers likely... Chance of precipitation is 80%.";
        let periods = analyzed(&[tonight_rain(), RawPeriod::new("Monday", "Sunny.")]);
        assert_eq!(format_full(&periods), format!("Tonight: {text}\nMonday: Sunny."));
    }

    #[test]
    fn test_render_is_deterministic() {
        let periods = analyzed(&[
            tonight_rain(),
            RawPeriod::new("Monday", "Windy, with a west wind 20 to 30 mph."),
        ]);
        for kind in [FormatKind::Summary, FormatKind::Compact, FormatKind::Full] {
            let first = render(&periods, kind, 150);
            let second = render(&periods, kind, 150);
            assert_eq!(first, second);
            assert_eq!(first.format_kind, kind);
        }
    }
}
