use serde::Serialize;

use super::timestamp::Timestamp;

/// A named range of the source audio, ready to be cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    pub title: String,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Track {
    pub fn new(title: impl Into<String>, start: Timestamp, end: Timestamp) -> Self {
        Self {
            title: title.into(),
            start,
            end,
        }
    }

    pub fn length(&self) -> Timestamp {
        Timestamp::from_millis(self.end.as_millis().saturating_sub(self.start.as_millis()))
    }
}

/// A track whose end may still be unknown while the list is being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTrack {
    pub title: String,
    pub start: Timestamp,
    pub end: Option<Timestamp>,
}

impl PendingTrack {
    pub fn new(title: impl Into<String>, start: Timestamp, end: Option<Timestamp>) -> Self {
        Self {
            title: title.into(),
            start,
            end,
        }
    }

    pub fn resolve(self, end: Timestamp) -> Track {
        Track::new(self.title, self.start, end)
    }
}

/// A chapter as supplied by the metadata source. Given times are trusted;
/// some sources omit the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub start: Timestamp,
    pub end: Option<Timestamp>,
}
