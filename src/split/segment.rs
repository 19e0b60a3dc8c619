//! Cutting a resolved track list into one file per track.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ui::prelude::{Level, emit};

use super::error::CutError;
use super::timestamp::Timestamp;
use super::track::Track;

/// One stream-copy extraction handed to a [`Cutter`].
#[derive(Debug, Clone, Copy)]
pub struct CutRequest<'a> {
    pub source: &'a Path,
    pub start: Timestamp,
    pub end: Timestamp,
    pub destination: &'a Path,
}

/// Extracts `[start, end)` of `source` into `destination` without re-encoding.
pub trait Cutter {
    fn cut(&self, request: &CutRequest<'_>) -> Result<(), CutError>;
}

/// Output file name template with `{id}` and `{track}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    template: String,
}

impl NameTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Substitute a front-end placeholder such as `{creator}` ahead of rendering.
    pub fn fill(mut self, placeholder: &str, value: &str) -> Self {
        let key = format!("{{{placeholder}}}");
        self.template = self.template.replace(&key, &sanitize_component(value));
        self
    }

    /// Render the name for track `id`, padding the id to `width` digits.
    pub fn render(&self, id: usize, width: usize, title: &str) -> String {
        self.template
            .replace("{id}", &format!("{id:0width$}"))
            .replace("{track}", &sanitize_component(title))
    }
}

/// Keep a value inside a single path component.
fn sanitize_component(value: &str) -> String {
    value.replace('/', "_")
}

/// Digit width of the last sequential id.
pub fn id_width(count: usize) -> usize {
    count.max(1).to_string().len()
}

/// A track paired with its sequence number and rendered destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCut {
    pub id: usize,
    pub destination: PathBuf,
    pub track: Track,
}

/// Render destinations for every track, numbering from 1 in list order.
pub fn plan_segments(tracks: &[Track], template: &NameTemplate, output_dir: &Path) -> Vec<PlannedCut> {
    let width = id_width(tracks.len());
    tracks
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let id = index + 1;
            PlannedCut {
                id,
                destination: output_dir.join(template.render(id, width, &track.title)),
                track: track.clone(),
            }
        })
        .collect()
}

#[derive(Debug)]
pub struct TrackFailure {
    pub id: usize,
    pub destination: PathBuf,
    pub error: CutError,
}

#[derive(Debug, Default)]
pub struct SplitReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<TrackFailure>,
}

impl SplitReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.written.len() + self.failures.len()
    }
}

/// Run the cutter once per planned cut, strictly in order.
///
/// A failed cut is reported and its partial output removed; the remaining
/// cuts still run.
pub fn execute_plan(plan: &[PlannedCut], source: &Path, cutter: &dyn Cutter) -> SplitReport {
    let mut report = SplitReport::default();
    let total = plan.len();

    for cut in plan {
        emit(
            Level::Info,
            "split.cut.start",
            &format!(
                "[{}/{}] {} ({} - {})",
                cut.id,
                total,
                cut.destination.display(),
                cut.track.start,
                cut.track.end
            ),
            None,
        );

        let request = CutRequest {
            source,
            start: cut.track.start,
            end: cut.track.end,
            destination: &cut.destination,
        };

        match cutter.cut(&request) {
            Ok(()) => report.written.push(cut.destination.clone()),
            Err(error) => {
                remove_partial(&cut.destination);
                emit(
                    Level::Error,
                    "split.cut.failed",
                    &format!("Failed to cut {}: {}", cut.destination.display(), error),
                    None,
                );
                report.failures.push(TrackFailure {
                    id: cut.id,
                    destination: cut.destination.clone(),
                    error,
                });
            }
        }
    }

    report
}

/// Delete what a failed cut left behind, warning when that is not possible.
fn remove_partial(destination: &Path) -> bool {
    if !destination.exists() {
        return true;
    }
    match fs::remove_file(destination) {
        Ok(()) => true,
        Err(err) => {
            emit(
                Level::Warn,
                "split.cut.partial_left",
                &format!(
                    "Could not remove partial output {}: {}",
                    destination.display(),
                    err
                ),
                None,
            );
            false
        }
    }
}
