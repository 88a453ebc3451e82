//! Event detection
//!
//! A single matcher walks [`EVENT_RULES`] in order and resolves one
//! probability per detected kind. Resolution order:
//!
//! 1. the period's explicit chance of precipitation (precipitation kinds)
//! 2. a percentage written next to the event's own keyword
//! 3. an intensity qualifier in the keyword's sentence (qualified kinds)
//! 4. the kind's phrase tiers
//! 5. the kind's baseline

use crate::forecast::rules::{EVENT_RULES, EventRule, PERCENT_CONTEXT_CHARS, QUALIFIERS, Trigger};
use crate::models::{AnalyzedPeriod, Period, WeatherEvent};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::debug;

static PERCENTAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,3})\s*(?:%|percent\b)").expect("percentage pattern is valid")
});

/// A rule that fired, with the keyword spans it claimed
struct Detection {
    rule: &'static EventRule,
    hits: Vec<Range<usize>>,
}

/// Detect events for every period, keeping period order
pub fn analyze_periods(periods: Vec<Period>) -> Vec<AnalyzedPeriod> {
    periods
        .into_iter()
        .map(|period| {
            let events = detect_events(&period);
            AnalyzedPeriod { period, events }
        })
        .collect()
}

/// Detect the weather events described by one period
///
/// Returns events in rule-table order. No match is a normal outcome and
/// yields an empty list.
#[must_use]
pub fn detect_events(period: &Period) -> Vec<WeatherEvent> {
    let text = period.raw_text.to_lowercase();
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut detections: Vec<Detection> = Vec::new();

    for rule in EVENT_RULES {
        let hits = keyword_hits(&text, rule.keywords, &claimed);
        let fires = match rule.trigger {
            Trigger::Keywords => !hits.is_empty(),
            Trigger::WindSpeed(threshold) => {
                period.wind_speed_mph.is_some_and(|speed| speed >= threshold)
            }
        };
        if !fires {
            continue;
        }
        claimed.extend(hits.iter().cloned());
        detections.push(Detection { rule, hits });
    }

    let assigned = assign_percentages(&text, &detections);

    let events: Vec<WeatherEvent> = detections
        .iter()
        .zip(assigned)
        .map(|(detection, in_text)| {
            let pct = resolve_probability(detection, period, &text, in_text);
            WeatherEvent::new(detection.rule.kind, pct)
        })
        .collect();

    debug!(
        "Detected {} events for period '{}': {:?}",
        events.len(),
        period.name,
        events.iter().map(|e| e.kind).collect::<Vec<_>>()
    );
    events
}

/// Keyword occurrences at a word start that no earlier rule claimed
fn keyword_hits(text: &str, keywords: &[&str], claimed: &[Range<usize>]) -> Vec<Range<usize>> {
    let mut hits: Vec<Range<usize>> = keywords
        .iter()
        .flat_map(|keyword| {
            text.match_indices(keyword)
                .map(|(start, kw)| start..start + kw.len())
        })
        .filter(|hit| is_word_start(text, hit.start))
        .filter(|hit| !claimed.iter().any(|c| c.start < hit.end && hit.start < c.end))
        .collect();

    hits.sort_by_key(|hit| (hit.start, hit.end));
    hits.dedup();
    hits
}

fn is_word_start(text: &str, idx: usize) -> bool {
    !text[..idx]
        .chars()
        .next_back()
        .is_some_and(char::is_alphanumeric)
}

/// Hand each written percentage to the single nearest detected event
///
/// Percentages in the "chance of precipitation" statement are skipped: the
/// extractor already captured that one as the explicit value.
fn assign_percentages(text: &str, detections: &[Detection]) -> Vec<Option<u8>> {
    let mut best: Vec<Option<(usize, u8)>> = vec![None; detections.len()];

    for caps in PERCENTAGE.captures_iter(text) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Ok(value) = number.as_str().parse::<u16>() else {
            continue;
        };
        let pos = whole.start();
        if text[sentence_bounds(text, pos)].contains("precipitation") {
            continue;
        }

        let nearest = detections
            .iter()
            .enumerate()
            .filter_map(|(idx, detection)| {
                detection
                    .hits
                    .iter()
                    .map(|hit| hit.start.abs_diff(pos))
                    .min()
                    .map(|distance| (idx, distance))
            })
            .filter(|(_, distance)| *distance <= PERCENT_CONTEXT_CHARS)
            .min_by_key(|(_, distance)| *distance);

        if let Some((idx, distance)) = nearest {
            if best[idx].is_none_or(|(current, _)| distance < current) {
                best[idx] = Some((distance, value.min(100) as u8));
            }
        }
    }

    best.into_iter().map(|b| b.map(|(_, pct)| pct)).collect()
}

fn resolve_probability(
    detection: &Detection,
    period: &Period,
    text: &str,
    in_text: Option<u8>,
) -> u8 {
    let rule = detection.rule;

    if rule.kind.is_precipitation() {
        if let Some(pct) = period.explicit_precip_pct {
            return pct;
        }
    }

    if let Some(pct) = in_text {
        return pct;
    }

    if rule.qualified {
        if let Some(first) = detection.hits.first() {
            let sentence = &text[sentence_bounds(text, first.start)];
            if let Some((_, pct)) = QUALIFIERS.iter().find(|(q, _)| sentence.contains(q)) {
                return *pct;
            }
        }
    }

    rule.tiers
        .iter()
        .find(|(phrase, _)| text.contains(phrase))
        .map_or(rule.baseline, |(_, pct)| *pct)
}

/// Byte range of the sentence containing `pos`
fn sentence_bounds(text: &str, pos: usize) -> Range<usize> {
    let is_end = |c: char| matches!(c, '.' | '!' | '?');
    let start = text[..pos].rfind(is_end).map_or(0, |i| i + 1);
    let end = text[pos..].find(is_end).map_or(text.len(), |i| pos + i);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::extractor::extract_period;
    use crate::models::{EventKind, RawPeriod};
    use rstest::rstest;

    fn period(text: &str) -> Period {
        extract_period(&RawPeriod::new("Today", text))
    }

    fn kinds(events: &[WeatherEvent]) -> Vec<EventKind> {
        events.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_wildfire_smoke_is_extreme() {
        let events = detect_events(&period("Areas of wildfire smoke. Otherwise sunny."));
        assert_eq!(events, vec![WeatherEvent::new(EventKind::Smoke, 75)]);
        assert!(events[0].is_extreme);
    }

    #[rstest]
    #[case("Heavy smoke through the evening.", 90)]
    #[case("Areas of smoke after noon.", 65)]
    #[case("Widespread haze.", 50)]
    #[case("Smoky skies.", 65)]
    fn test_smoke_tiers(#[case] text: &str, #[case] expected: u8) {
        let events = detect_events(&period(text));
        assert_eq!(kinds(&events), vec![EventKind::Smoke]);
        assert_eq!(events[0].probability_pct, expected);
    }

    #[test]
    fn test_calm_wind_produces_no_wind_event() {
        let events = detect_events(&period("Calm wind becoming south around 5 mph."));
        assert!(events.iter().all(|e| e.kind != EventKind::Wind));
    }

    #[rstest]
    #[case("Breezy, with a south wind 10 to 14 mph.", false)]
    #[case("Breezy, with a south wind 10 to 15 mph.", true)]
    #[case("South wind 20 to 25 mph.", true)]
    #[case("Windy.", false)]
    #[case("Southwest wind 10 to 14 mph, with gusts as high as 35 mph.", true)]
    #[case("Southwest wind 5 to 10 mph, with gusts as high as 14 mph.", false)]
    fn test_wind_gate(#[case] text: &str, #[case] expect_wind: bool) {
        let events = detect_events(&period(text));
        assert_eq!(events.iter().any(|e| e.kind == EventKind::Wind), expect_wind);
    }

    #[test]
    fn test_wind_probability_tiers() {
        let events = detect_events(&period(
            "Windy, with a west wind 20 to 30 mph, with gusts as high as 45 mph.",
        ));
        let wind = events.iter().find(|e| e.kind == EventKind::Wind).unwrap();
        assert_eq!(wind.probability_pct, 80);

        let events = detect_events(&period("Breezy, with a north wind 15 to 20 mph."));
        assert_eq!(events[0].probability_pct, 40);
    }

    #[test]
    fn test_gusts_alone_make_a_gust_wind_event() {
        let events = detect_events(&period(
            "Sunny. Southwest wind 10 to 14 mph, with gusts as high as 35 mph.",
        ));
        assert_eq!(events, vec![WeatherEvent::new(EventKind::Wind, 80)]);
    }

    #[test]
    fn test_explicit_percentage_wins_for_precipitation() {
        let text = "Rain showers likely... Chance of precipitation is 80%.";
        let raw = RawPeriod::new("Tonight", text);
        let events = detect_events(&extract_period(&raw));
        assert_eq!(events, vec![WeatherEvent::new(EventKind::Rain, 80)]);
    }

    #[test]
    fn test_explicit_percentage_does_not_leak_to_other_kinds() {
        let raw = RawPeriod::new(
            "Today",
            "Showers and thunderstorms likely. Chance of precipitation is 90%.",
        );
        let events = detect_events(&extract_period(&raw));
        assert_eq!(kinds(&events), vec![EventKind::Thunderstorm, EventKind::Rain]);
        assert_eq!(events[0].probability_pct, 70);
        assert_eq!(events[1].probability_pct, 90);
    }

    #[rstest]
    #[case("Rain likely.", 70)]
    #[case("Scattered showers.", 40)]
    #[case("Isolated showers.", 20)]
    #[case("Slight chance of rain.", 10)]
    #[case("A chance of rain.", 30)]
    #[case("Rain.", 50)]
    #[case("Patchy drizzle.", 25)]
    fn test_rain_qualifiers(#[case] text: &str, #[case] expected: u8) {
        let events = detect_events(&period(text));
        assert_eq!(kinds(&events), vec![EventKind::Rain]);
        assert_eq!(events[0].probability_pct, expected);
    }

    #[rstest]
    #[case("Heavy snow.", 70)]
    #[case("Snow flurries.", 30)]
    #[case("Snow.", 50)]
    #[case("Snow likely.", 70)]
    fn test_snow_tiers(#[case] text: &str, #[case] expected: u8) {
        let events = detect_events(&period(text));
        assert_eq!(kinds(&events), vec![EventKind::Snow]);
        assert_eq!(events[0].probability_pct, expected);
    }

    #[test]
    fn test_qualifier_is_scoped_to_sentence() {
        let events = detect_events(&period("Rain likely. A chance of thunderstorms after 2pm."));
        assert_eq!(kinds(&events), vec![EventKind::Thunderstorm, EventKind::Rain]);
        assert_eq!(events[0].probability_pct, 30);
        assert_eq!(events[1].probability_pct, 70);
    }

    #[test]
    fn test_in_text_percentages_go_to_nearest_event() {
        let events = detect_events(&period(
            "30% chance of snow in the morning, 60% chance of rain in the afternoon.",
        ));
        assert_eq!(kinds(&events), vec![EventKind::Snow, EventKind::Rain]);
        assert_eq!(events[0].probability_pct, 30);
        assert_eq!(events[1].probability_pct, 60);
    }

    #[test]
    fn test_percent_word_and_far_percentages() {
        let events = detect_events(&period("80 percent chance of thunderstorms this afternoon."));
        assert_eq!(events, vec![WeatherEvent::new(EventKind::Thunderstorm, 80)]);

        let text = format!("Rain likely. {} 90% humidity expected.", "x".repeat(120));
        let events = detect_events(&period(&text));
        assert_eq!(events[0].probability_pct, 70);
    }

    #[test]
    fn test_percentage_is_not_shared_between_kinds() {
        let events = detect_events(&period("70% chance of rain. Patchy fog before 9am."));
        assert_eq!(kinds(&events), vec![EventKind::Rain, EventKind::PatchyFog]);
        assert_eq!(events[0].probability_pct, 70);
        assert_eq!(events[1].probability_pct, 50);
    }

    #[rstest]
    #[case("Dense fog before 10am.", vec![EventKind::DenseFog])]
    #[case("Freezing rain after midnight.", vec![EventKind::FreezingRain])]
    #[case("Rain and snow showers.", vec![EventKind::Snow, EventKind::Rain])]
    #[case("Severe thunderstorms possible.", vec![EventKind::SevereThunderstorm])]
    #[case(
        "Ice storm warning. Freezing rain likely.",
        vec![EventKind::IceStorm, EventKind::FreezingRain]
    )]
    #[case(
        "Patchy fog, then dense fog after midnight.",
        vec![EventKind::DenseFog, EventKind::PatchyFog]
    )]
    fn test_overlapping_phrases_claimed_once(
        #[case] text: &str,
        #[case] expected: Vec<EventKind>,
    ) {
        assert_eq!(kinds(&detect_events(&period(text))), expected);
    }

    #[test]
    fn test_keywords_match_at_word_start_only() {
        assert!(detect_events(&period("A nice sunny day with a light breeze.")).is_empty());
        assert!(detect_events(&period("Mostly sunny, with a high near 61.")).is_empty());
    }

    #[test]
    fn test_priority_order_most_severe_first() {
        let events = detect_events(&period(
            "Showers likely. A tornado is possible. Hurricane conditions expected.",
        ));
        assert_eq!(
            kinds(&events),
            vec![EventKind::Tornado, EventKind::Hurricane, EventKind::Rain]
        );
        assert!(events[0].is_extreme && events[1].is_extreme && !events[2].is_extreme);
    }

    #[test]
    fn test_analyze_keeps_order() {
        let periods = vec![period("Sunny."), period("Rain likely.")];
        let analyzed = analyze_periods(periods);
        assert!(analyzed[0].events.is_empty());
        assert_eq!(kinds(&analyzed[1].events), vec![EventKind::Rain]);
    }
}
