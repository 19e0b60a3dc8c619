use anyhow::Result;
use std::path::Path;

use crate::ui::prelude::{Level, emit};

use super::chapters::normalize_chapters;
use super::description::extract_tracks;
use super::error::ResolveError;
use super::timestamp::Timestamp;
use super::track::{Chapter, PendingTrack, Track};

/// Reports the total length of a local audio file.
pub trait DurationProbe {
    fn probe_duration(&self, audio: &Path) -> Result<Timestamp>;
}

/// A duration known up front, e.g. from `--duration` or source metadata.
#[derive(Debug, Clone, Copy)]
pub struct FixedDuration(pub Timestamp);

impl DurationProbe for FixedDuration {
    fn probe_duration(&self, _audio: &Path) -> Result<Timestamp> {
        Ok(self.0)
    }
}

/// Where the track boundaries come from. Chosen explicitly by the caller.
#[derive(Debug, Clone)]
pub enum TrackSource {
    Chapters(Vec<Chapter>),
    Description(String),
}

impl TrackSource {
    pub fn label(&self) -> &'static str {
        match self {
            TrackSource::Chapters(_) => "chapters",
            TrackSource::Description(_) => "description",
        }
    }
}

/// Build the final track list. Every returned track has a concrete end.
///
/// Chapter times are trusted as given; a chapter without an end takes the next
/// chapter's start. Description tracks are stitched and their start order is
/// validated. On either path an open final end is filled from `probe` over
/// `audio`, and `probe` is only consulted when that end is still open.
pub fn resolve_tracks(
    source: TrackSource,
    source_title: &str,
    audio: &Path,
    probe: &dyn DurationProbe,
) -> Result<Vec<Track>, ResolveError> {
    emit(
        Level::Debug,
        "split.resolve.source",
        &format!("Reading track boundaries for '{}' from {}", source_title, source.label()),
        None,
    );

    let tracks = match source {
        TrackSource::Chapters(chapters) => {
            close_final_boundary(normalize_chapters(chapters), source_title, audio, probe)?
        }
        TrackSource::Description(text) => {
            let pending = extract_tracks(&text, source_title)?;
            let tracks = close_final_boundary(pending, source_title, audio, probe)?;
            check_start_order(&tracks)?;
            tracks
        }
    };

    if tracks.is_empty() {
        return Err(ResolveError::NoTimestampsFound {
            source_title: source_title.to_string(),
        });
    }

    Ok(tracks)
}

fn close_final_boundary(
    pending: Vec<PendingTrack>,
    source_title: &str,
    audio: &Path,
    probe: &dyn DurationProbe,
) -> Result<Vec<Track>, ResolveError> {
    if pending.is_empty() {
        return Err(ResolveError::NoTimestampsFound {
            source_title: source_title.to_string(),
        });
    }

    let count = pending.len();
    let mut tracks = Vec::with_capacity(count);
    let mut starts = pending.iter().map(|p| p.start).skip(1).collect::<Vec<_>>().into_iter();

    for entry in pending {
        let next_start = starts.next();
        let end = match entry.end.or(next_start) {
            Some(end) => end,
            None => probe_total(entry.start, audio, probe)?,
        };
        tracks.push(entry.resolve(end));
    }

    Ok(tracks)
}

fn probe_total(
    last_start: Timestamp,
    audio: &Path,
    probe: &dyn DurationProbe,
) -> Result<Timestamp, ResolveError> {
    let total = probe
        .probe_duration(audio)
        .map_err(|err| ResolveError::UnresolvableFinalBoundary {
            audio: audio.to_path_buf(),
            reason: format!("{err:#}"),
        })?;

    if total <= last_start {
        return Err(ResolveError::UnresolvableFinalBoundary {
            audio: audio.to_path_buf(),
            reason: format!("duration {total} does not reach past the final track start {last_start}"),
        });
    }

    Ok(total)
}

fn check_start_order(tracks: &[Track]) -> Result<(), ResolveError> {
    for (index, pair) in tracks.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);
        if current.start < previous.start {
            return Err(ResolveError::OutOfOrder {
                position: index + 2,
                title: current.title.clone(),
                start: current.start,
                previous: previous.start,
            });
        }
    }
    Ok(())
}
