//! Output side of the pipeline: formats, device profiles, rendered text
//! and the numbered message parts handed to delivery

use crate::ForecastError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three output layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// One pipe-separated token per period, single message
    #[default]
    Summary,
    /// One line per period with events and the first sentence
    Compact,
    /// The forecast text verbatim, one line per period
    Full,
}

impl FormatKind {
    /// Separator between per-period blocks in this layout
    #[must_use]
    pub fn unit_separator(&self) -> char {
        match self {
            Self::Summary => '|',
            Self::Compact | Self::Full => '\n',
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Compact => "compact",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FormatKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            other => Err(ForecastError::validation(format!(
                "unknown format '{other}', expected summary, compact or full"
            ))),
        }
    }
}

/// Named satellite messenger presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    #[default]
    Zoleo,
    #[serde(alias = "in_reach")]
    InReach,
}

impl DeviceProfile {
    /// Built-in character limit when configuration does not override it
    #[must_use]
    pub fn default_limit(&self) -> usize {
        match self {
            Self::Zoleo => 200,
            Self::InReach => 160,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zoleo => "zoleo",
            Self::InReach => "inreach",
        }
    }
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeviceProfile {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zoleo" => Ok(Self::Zoleo),
            "inreach" | "in_reach" | "in-reach" => Ok(Self::InReach),
            other => Err(ForecastError::validation(format!(
                "unknown device profile '{other}', expected zoleo or inreach"
            ))),
        }
    }
}

/// Rendered forecast text in one layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedOutput {
    pub format_kind: FormatKind,
    pub text: String,
}

impl FormattedOutput {
    #[must_use]
    pub fn new(format_kind: FormatKind, text: String) -> Self {
        Self { format_kind, text }
    }

    /// Length in characters, the unit device limits are expressed in
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// One deliverable chunk of a formatted output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePart {
    /// 1-based position
    pub index: usize,
    pub total: usize,
    /// Content without the part prefix
    pub text: String,
}

impl MessagePart {
    /// The `"(i/M) "` prefix, empty for single-part messages
    #[must_use]
    pub fn prefix(&self) -> String {
        part_prefix(self.index, self.total)
    }

    /// The string actually sent to the device
    #[must_use]
    pub fn to_message(&self) -> String {
        format!("{}{}", self.prefix(), self.text)
    }

    /// Length of the sent string in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.prefix().chars().count() + self.text.chars().count()
    }
}

impl fmt::Display for MessagePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix(), self.text)
    }
}

/// Prefix for part `index` of `total`
#[must_use]
pub fn part_prefix(index: usize, total: usize) -> String {
    if total > 1 {
        format!("({index}/{total}) ")
    } else {
        String::new()
    }
}

/// Strip part prefixes from delivered messages and join them back together
#[must_use]
pub fn reassemble<S: AsRef<str>>(messages: &[S]) -> String {
    let total = messages.len();
    messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let message = message.as_ref();
            let prefix = part_prefix(i + 1, total);
            message.strip_prefix(prefix.as_str()).unwrap_or(message)
        })
        .collect()
}
