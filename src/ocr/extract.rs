use anyhow::Result;
use regex::Regex;

use super::engine::Detection;
use crate::tracker::config::{OrphanNamePolicy, TrackerConfig};

/// Relative "last login" timestamps such as "3h ago" or "12m ago".
const RELATIVE_TIME_PATTERN: &str = r"[hmd] ago$";

/// A player name paired with the fan count read next to it.
///
/// The count is kept as read (digits and commas), e.g. "1,234,567".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameFanPair {
    pub name: String,
    pub fans: String,
}

impl NameFanPair {
    pub fn new(name: impl Into<String>, fans: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fans: fans.into(),
        }
    }
}

/// Decides which text lines are UI chrome rather than data.
#[derive(Debug, Clone)]
pub struct IgnorePolicy {
    labels: Vec<String>,
    relative_time: Regex,
}

impl IgnorePolicy {
    pub fn new(labels: Vec<String>) -> Result<Self> {
        Ok(Self {
            labels,
            relative_time: Regex::new(RELATIVE_TIME_PATTERN)?,
        })
    }

    /// Returns true for empty lines, fixed labels and relative timestamps.
    pub fn should_ignore(&self, text: &str) -> bool {
        let line = text.trim();
        line.is_empty()
            || self.labels.iter().any(|label| label == line)
            || self.relative_time.is_match(line)
    }
}

/// How a kept text line is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Count,
    Name,
}

/// Returns true if every non-whitespace character is a digit or a comma.
///
/// There is no minimum digit count, so a lone "," qualifies.
pub fn is_fan_count(text: &str) -> bool {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .all(|c| c.is_ascii_digit() || c == ',')
}

fn classify(text: &str) -> LineKind {
    if is_fan_count(text) {
        LineKind::Count
    } else {
        LineKind::Name
    }
}

/// First whitespace-separated token of a name line.
fn first_token(text: &str) -> String {
    text.split_whitespace().next().unwrap_or_default().to_string()
}

/// Name waiting for its fan count.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Empty,
    Name(String),
}

/// Converts the detections of one capture into ordered name/fan pairs.
#[derive(Debug, Clone)]
pub struct PairExtractor {
    min_confidence: f32,
    ignore: IgnorePolicy,
    orphan_policy: OrphanNamePolicy,
}

impl PairExtractor {
    pub fn new(min_confidence: f32, ignore: IgnorePolicy, orphan_policy: OrphanNamePolicy) -> Self {
        Self {
            min_confidence,
            ignore,
            orphan_policy,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        Ok(Self::new(
            config.min_confidence,
            IgnorePolicy::new(config.ignored_labels.clone())?,
            config.orphan_name_policy,
        ))
    }

    /// Pairs each name with the first count that follows it, top to bottom.
    ///
    /// Low-confidence and ignored lines are skipped. A count with no pending
    /// name is dropped. A name followed by another name is resolved by the
    /// orphan policy; the losing name is never emitted.
    pub fn extract(&self, mut detections: Vec<Detection>) -> Vec<NameFanPair> {
        // Stable: equal heights keep recognition order
        detections.sort_by_key(|d| d.bbox.top_left().y);

        let mut pairs = Vec::new();
        let mut pending = Pending::Empty;

        for detection in &detections {
            let text = detection.text.trim();
            if detection.confidence < self.min_confidence || text.is_empty() {
                continue;
            }
            if self.ignore.should_ignore(text) {
                continue;
            }

            pending = match (pending, classify(text)) {
                (Pending::Empty, LineKind::Name) => Pending::Name(first_token(text)),
                (Pending::Empty, LineKind::Count) => Pending::Empty,
                (Pending::Name(name), LineKind::Count) => {
                    pairs.push(NameFanPair::new(name, text));
                    Pending::Empty
                }
                (Pending::Name(name), LineKind::Name) => match self.orphan_policy {
                    OrphanNamePolicy::Replace => Pending::Name(first_token(text)),
                    OrphanNamePolicy::KeepFirst => Pending::Name(name),
                },
            };
        }

        pairs
    }
}
