//! Timestamp value type and the tokenizer that finds `M:SS` / `H:MM:SS`
//! tokens inside free text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// One or two-digit leading group followed by one or two `:DD` groups.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[0-9]{1,2}(?::[0-9]{2}){1,2}\b").expect("timestamp token pattern is valid")
});

static EMPTY_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*\)|\[\s*\]|\{\s*\}").expect("bracket pattern is valid"));

static SEPARATOR_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*[-–—|]\s*(?:[-–—|]\s*)+").expect("separator run pattern is valid")
});

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

const TITLE_SEPARATORS: &[char] = &['-', '–', '—', '|', ':', ',', '~', '·', '•'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp cannot be empty")]
    Empty,

    #[error("malformed timestamp '{token}': {reason}")]
    Malformed { token: String, reason: &'static str },
}

impl TimestampError {
    fn malformed(token: &str, reason: &'static str) -> Self {
        TimestampError::Malformed {
            token: token.to_string(),
            reason,
        }
    }
}

/// A position in the source timeline, kept at millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Convert fractional seconds as reported by yt-dlp or ffprobe.
    pub fn from_secs_f64(secs: f64) -> Result<Self, TimestampError> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(TimestampError::malformed(
                &secs.to_string(),
                "seconds must be a finite, non-negative number",
            ));
        }
        let millis = (secs * 1000.0).round();
        if millis >= u64::MAX as f64 {
            return Err(TimestampError::malformed(&secs.to_string(), "value is too large"));
        }
        Ok(Self::from_millis(millis as u64))
    }

    /// Parse `M:SS`, `H:MM:SS` (optionally with a `.fraction`) or plain seconds.
    pub fn parse(value: &str) -> Result<Self, TimestampError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(TimestampError::Empty);
        }

        if !trimmed.contains(':') {
            let secs: f64 = trimmed
                .parse()
                .map_err(|_| TimestampError::malformed(trimmed, "expected seconds or M:SS"))?;
            return Self::from_secs_f64(secs);
        }

        let (clock, fraction) = match trimmed.split_once('.') {
            Some((clock, fraction)) => (clock, Some(fraction)),
            None => (trimmed, None),
        };

        let whole = parse_clock(clock)?;
        let millis = match fraction {
            None => 0,
            Some(digits) => parse_fraction_millis(trimmed, digits)?,
        };

        whole
            .0
            .checked_add(Duration::from_millis(millis))
            .map(Self)
            .ok_or_else(|| TimestampError::malformed(trimmed, "value is too large"))
    }

    pub fn as_millis(self) -> u64 {
        self.0.as_millis().min(u128::from(u64::MAX)) as u64
    }

    /// Seconds with millisecond precision, the form ffmpeg's `-ss`/`-to` accept.
    pub fn to_ffmpeg_arg(self) -> String {
        let millis = self.as_millis();
        format!("{}.{:03}", millis / 1000, millis % 1000)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.as_millis();
        let total_secs = millis / 1000;
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let secs = total_secs % 60;

        if hours > 0 {
            write!(f, "{}:{:02}:{:02}", hours, minutes, secs)?;
        } else {
            write!(f, "{}:{:02}", minutes, secs)?;
        }

        let fraction = millis % 1000;
        if fraction > 0 {
            write!(f, ".{:03}", fraction)?;
        }
        Ok(())
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse colon-separated `M:SS` or `H:MM:SS` groups.
fn parse_clock(token: &str) -> Result<Timestamp, TimestampError> {
    let groups: Vec<&str> = token.split(':').collect();
    if !(2..=3).contains(&groups.len()) {
        return Err(TimestampError::malformed(
            token,
            "expected two or three colon-separated groups",
        ));
    }

    let mut values = Vec::with_capacity(groups.len());
    for group in &groups {
        if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimestampError::malformed(token, "groups must be digits"));
        }
        let value: u64 = group
            .parse()
            .map_err(|_| TimestampError::malformed(token, "group is too large"))?;
        values.push(value);
    }

    // Every group after the leading one is a minutes or seconds field
    if values[1..].iter().any(|v| *v >= 60) {
        return Err(TimestampError::malformed(
            token,
            "minutes and seconds must be below 60",
        ));
    }

    let secs = values
        .iter()
        .try_fold(0u64, |acc, v| acc.checked_mul(60)?.checked_add(*v))
        .ok_or_else(|| TimestampError::malformed(token, "value is too large"))?;
    Ok(Timestamp::from_secs(secs))
}

fn parse_fraction_millis(token: &str, digits: &str) -> Result<u64, TimestampError> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampError::malformed(token, "invalid fractional seconds"));
    }
    let mut padded: String = digits.chars().take(3).collect();
    while padded.len() < 3 {
        padded.push('0');
    }
    padded
        .parse()
        .map_err(|_| TimestampError::malformed(token, "invalid fractional seconds"))
}

/// A timestamp found in a line of text together with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampToken {
    pub timestamp: Timestamp,
    pub span: Range<usize>,
}

/// Lazy iterator over the timestamp tokens of one line.
pub struct TimestampTokens<'a> {
    matches: regex::Matches<'static, 'a>,
}

impl Iterator for TimestampTokens<'_> {
    type Item = Result<TimestampToken, TimestampError>;

    fn next(&mut self) -> Option<Self::Item> {
        let found = self.matches.next()?;
        Some(parse_clock(found.as_str()).map(|timestamp| TimestampToken {
            timestamp,
            span: found.range(),
        }))
    }
}

/// Find every timestamp token in `line`, in order of appearance.
pub fn tokens(line: &str) -> TimestampTokens<'_> {
    TimestampTokens {
        matches: TOKEN_PATTERN.find_iter(line),
    }
}

pub fn contains_timestamp(line: &str) -> bool {
    TOKEN_PATTERN.is_match(line)
}

/// Remove every timestamp token from `line` and tidy what is left into a title.
///
/// Runs until a re-scan finds nothing, so the result never contains a token.
pub fn strip_timestamps(line: &str) -> String {
    let mut current = remove_tokens_once(line);
    while contains_timestamp(&current) {
        current = remove_tokens_once(&current);
    }
    current
}

fn remove_tokens_once(line: &str) -> String {
    let without_tokens = TOKEN_PATTERN.replace_all(line, " ");
    let without_brackets = EMPTY_BRACKETS.replace_all(&without_tokens, " ");
    let single_separators = SEPARATOR_RUN.replace_all(&without_brackets, " - ");
    let collapsed = WHITESPACE_RUN.replace_all(&single_separators, " ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || TITLE_SEPARATORS.contains(&c))
        .to_string()
}
