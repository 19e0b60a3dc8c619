use std::path::PathBuf;
use thiserror::Error;

use super::timestamp::{Timestamp, TimestampError};

/// Failures that stop the track list from being built. Nothing is cut when
/// one of these is returned.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("No track timestamps found for '{source_title}' in chapters or description")]
    NoTimestampsFound { source_title: String },

    #[error("Cannot resolve the end of the final track from {}: {reason}", .audio.display())]
    UnresolvableFinalBoundary { audio: PathBuf, reason: String },

    #[error("Malformed timestamp on description line {line}: {source}")]
    MalformedTimestamp {
        line: usize,
        #[source]
        source: TimestampError,
    },

    #[error("Track {position} '{title}' starts at {start}, before the previous track at {previous}")]
    OutOfOrder {
        position: usize,
        title: String,
        start: Timestamp,
        previous: Timestamp,
    },
}

/// Failure of a single cut. Reported per track; the batch continues.
#[derive(Error, Debug)]
pub enum CutError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: String,
        stderr: String,
    },
}
