//! Size-bounded message splitting
//!
//! A formatted text is cut into units at its layout's separator (`|` or a
//! newline); each unit keeps its trailing separator so that concatenating
//! the parts reproduces the input exactly. Units are packed greedily into
//! parts of at most `limit - reserve` characters, where the reserve covers
//! the `"(i/M) "` prefix. When the part count turns out to need a longer
//! prefix than reserved, the reserve grows and packing runs again.

use crate::models::{FormattedOutput, MessagePart, part_prefix};
use tracing::{debug, warn};

/// Upper bound on repacking rounds; the prefix length only grows with the
/// digit count of the part total, so this is never reached in practice
const MAX_PACKING_ROUNDS: usize = 16;

/// Device budget for one split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOptions {
    /// Characters per message, prefix included; 0 disables splitting
    pub limit: usize,
    /// Characters initially reserved for the part prefix
    pub prefix_overhead: usize,
}

impl SplitOptions {
    #[must_use]
    pub fn new(limit: usize, prefix_overhead: usize) -> Self {
        Self { limit, prefix_overhead }
    }
}

/// Split a formatted output into deliverable parts
///
/// Never fails: a unit that does not fit a part on its own is truncated at
/// the last sentence end, then the last word end, then the raw budget.
#[must_use]
pub fn split_message(output: &FormattedOutput, options: &SplitOptions) -> Vec<MessagePart> {
    let text = output.text.as_str();
    let limit = options.limit;

    if limit == 0 || char_len(text) <= limit {
        return vec![single_part(text.to_string())];
    }

    let units = split_units(text, output.format_kind.unit_separator());
    let mut reserve = options.prefix_overhead;

    for _ in 0..MAX_PACKING_ROUNDS {
        let budget = limit.saturating_sub(reserve);
        if budget == 0 {
            warn!(
                "Limit of {} chars leaves no room after a {} char prefix, \
                 sending one truncated message",
                limit, reserve
            );
            return vec![single_part(truncate_to_budget(text, limit))];
        }

        let packed = pack_units(&units, budget);
        if packed.len() == 1 {
            return packed.into_iter().map(single_part).collect();
        }

        let total = packed.len();
        let needed = char_len(&part_prefix(total, total));
        if needed <= reserve {
            debug!(
                "Split {} chars of {} into {} parts (limit {}, reserve {})",
                char_len(text),
                output.format_kind,
                total,
                limit,
                reserve
            );
            return numbered(packed);
        }
        debug!("{} parts need a {} char prefix, repacking", total, needed);
        reserve = needed;
    }

    let budget = limit.saturating_sub(reserve).max(1);
    numbered(pack_units(&units, budget))
}

/// Split text after each separator, keeping the separator on its unit
fn split_units(text: &str, separator: char) -> Vec<&str> {
    text.split_inclusive(separator).collect()
}

fn pack_units(units: &[&str], budget: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for unit in units {
        let unit = fit_unit(unit, budget);
        let unit_len = char_len(&unit);

        if !current.is_empty() && current_len + unit_len > budget {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(&unit);
        current_len += unit_len;
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Shorten a unit that cannot fit a part on its own, keeping its separator
fn fit_unit(unit: &str, budget: usize) -> String {
    let unit_len = char_len(unit);
    if unit_len <= budget {
        return unit.to_string();
    }

    let (body, separator) = match unit.char_indices().next_back() {
        Some((idx, c)) if c == '|' || c == '\n' => unit.split_at(idx),
        _ => (unit, ""),
    };
    let body_budget = budget.saturating_sub(char_len(separator));
    let truncated = truncate_to_budget(body, body_budget);

    warn!(
        "Unit of {} chars exceeds part budget of {}, truncated to {}",
        unit_len,
        budget,
        char_len(&truncated)
    );
    format!("{truncated}{separator}")
}

/// Cut text to at most `budget` characters
///
/// Prefers the last complete sentence (`.`, `!` or `?` followed by
/// whitespace or the end), then the last whole word, then a raw cut.
#[must_use]
pub fn truncate_to_budget(text: &str, budget: usize) -> String {
    if char_len(text) <= budget {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(budget)
        .map_or(text.len(), |(idx, _)| idx);
    let head = &text[..cut];
    let next = text[cut..].chars().next();

    if let Some(end) = sentence_ends(text).take_while(|end| *end <= cut).last() {
        return head[..end].to_string();
    }

    if next.is_some_and(char::is_whitespace) {
        return head.trim_end().to_string();
    }
    if let Some(space) = head.rfind(char::is_whitespace) {
        let words = head[..space].trim_end();
        if !words.is_empty() {
            return words.to_string();
        }
    }

    head.to_string()
}

/// Byte offsets just past each sentence end: `.`, `!` or `?` followed by
/// whitespace or the end of the text, so "0.5" and "..." mid-run do not count
pub(crate) fn sentence_ends(text: &str) -> impl Iterator<Item = usize> + '_ {
    text.char_indices()
        .filter(|(_, c)| matches!(c, '.' | '!' | '?'))
        .map(|(idx, c)| idx + c.len_utf8())
        .filter(|end| text[*end..].chars().next().is_none_or(char::is_whitespace))
}

fn single_part(text: String) -> MessagePart {
    MessagePart {
        index: 1,
        total: 1,
        text,
    }
}

fn numbered(parts: Vec<String>) -> Vec<MessagePart> {
    let total = parts.len();
    parts
        .into_iter()
        .enumerate()
        .map(|(i, text)| MessagePart {
            index: i + 1,
            total,
            text,
        })
        .collect()
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
