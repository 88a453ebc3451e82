//! Forecast periods: the raw records handed in by the fetcher and the
//! normalized form the pipeline works on

use crate::{ForecastError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::WeatherEvent;

/// One period as delivered by the forecast source
///
/// Field names follow the weather service's period JSON, so a `periods`
/// array can be deserialized directly. Every field is optional and read
/// leniently: a field of the wrong type is dropped on its own while the
/// rest of the record survives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPeriod {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: Option<String>,
    /// Free forecast text
    #[serde(
        default,
        alias = "detailedForecast",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_bool")]
    pub is_daytime: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_lenient_int")]
    pub temperature: Option<i32>,
    /// Wind phrase such as "SE 5 to 10 mph" or "5 to 10 mph"
    #[serde(
        default,
        alias = "windSpeed",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub wind: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub wind_direction: Option<String>,
    /// Gust speed in mph, as a number or a phrase like "35 mph"
    #[serde(
        default,
        alias = "windGust",
        deserialize_with = "deserialize_lenient_speed"
    )]
    pub wind_gust: Option<u32>,
    /// Explicit chance of precipitation, bare or as `{ "value": n }`
    #[serde(
        default,
        alias = "probabilityOfPrecipitation",
        deserialize_with = "deserialize_percentage"
    )]
    pub precipitation_pct: Option<u8>,
}

impl RawPeriod {
    /// Create a record with just a name and forecast text
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_daytime(mut self, is_daytime: bool) -> Self {
        self.is_daytime = Some(is_daytime);
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: i32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_wind(mut self, wind: impl Into<String>) -> Self {
        self.wind = Some(wind.into());
        self
    }

    #[must_use]
    pub fn with_gust(mut self, mph: u32) -> Self {
        self.wind_gust = Some(mph);
        self
    }

    #[must_use]
    pub fn with_precipitation(mut self, pct: u8) -> Self {
        self.precipitation_pct = Some(pct.min(100));
        self
    }

    /// Parse a list of records from JSON
    ///
    /// Accepts either a bare array of periods or a full forecast document
    /// carrying them under `properties.periods`. An item that is not an
    /// object at all is replaced by an empty record.
    pub fn from_json_array(json: &str) -> Result<Vec<Self>> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| ForecastError::validation(format!("forecast periods are not JSON: {e}")))?;

        let items = match document {
            Value::Array(items) => items,
            Value::Object(mut map) => match map
                .get_mut("properties")
                .and_then(|p| p.get_mut("periods"))
                .map(Value::take)
            {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(ForecastError::validation(
                        "forecast document has no periods array",
                    ));
                }
            },
            _ => {
                return Err(ForecastError::validation(
                    "forecast periods must be a JSON array",
                ));
            }
        };

        let records: Vec<Self> = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                serde_json::from_value(item).unwrap_or_else(|e| {
                    warn!("Period record {} is malformed, using defaults: {}", idx, e);
                    Self::default()
                })
            })
            .collect();

        debug!("Parsed {} raw period records", records.len());
        Ok(records)
    }
}

fn deserialize_percentage<'de, D>(deserializer: D) -> std::result::Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_or_value_field)
        .map(|pct| pct.clamp(0.0, 100.0).round() as u8))
}

fn deserialize_lenient_int<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_or_value_field)
        .filter(|t| t.is_finite() && t.abs() < 1000.0)
        .map(|t| t.round() as i32))
}

fn deserialize_lenient_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        None | Some(Value::Null) => None,
        Some(other) => {
            debug!("Ignoring non-text field value {}", other);
            None
        }
    })
}

fn deserialize_lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_bool))
}

fn deserialize_lenient_speed<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let mph = match value.as_ref() {
        Some(Value::String(text)) => text
            .split(|c: char| !c.is_ascii_digit())
            .find(|digits| !digits.is_empty())
            .and_then(|digits| digits.parse::<f64>().ok()),
        Some(other) => number_or_value_field(other),
        None => None,
    };
    Ok(mph
        .filter(|mph| mph.is_finite() && (0.0..1000.0).contains(mph))
        .map(|mph| mph.round() as u32))
}

fn number_or_value_field(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(map) => map.get("value").and_then(Value::as_f64),
        _ => None,
    }
}

/// A normalized forecast period
///
/// Built once by the extractor and never mutated afterwards. Periods keep
/// the chronological order of the source records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub name: String,
    /// Forecast text with whitespace collapsed to single spaces
    pub raw_text: String,
    pub is_daytime: bool,
    pub temperature: Option<i32>,
    /// Daytime temperatures are highs, night temperatures are lows
    pub temp_is_high: bool,
    /// Representative speed for significance tests: the upper bound of the
    /// sustained range, raised to the gust speed when gusts are forecast
    pub wind_speed_mph: Option<u32>,
    /// Abbreviated direction ("SE", "NNW", "VAR")
    pub wind_direction: Option<String>,
    /// Speed as written, ranges joined with a dash ("5-10")
    pub wind_speed_text: Option<String>,
    /// Highest gust speed from the gust field or the text
    pub wind_gust_mph: Option<u32>,
    /// Chance of precipitation stated by the source
    pub explicit_precip_pct: Option<u8>,
}

/// A period together with the events detected in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedPeriod {
    pub period: Period,
    /// In rule-table priority order
    pub events: Vec<WeatherEvent>,
}
