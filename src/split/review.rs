//! Interactive confirmation of the resolved tracks before anything is cut.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Editor, Input};

use crate::ui::prelude::{Level, emit, separator};

use super::track::Track;

/// Ask the user to keep or replace `default`. Returns `default` when `assume_yes`.
pub fn confirm_value(prompt: &str, default: &str, assume_yes: bool) -> Result<String> {
    if assume_yes {
        return Ok(default.to_string());
    }

    let value: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))?;

    let value = value.trim();
    if value.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(value.to_string())
    }
}

/// Print the titles and let the user fix them in `$EDITOR` if needed.
pub fn review_tracks(tracks: Vec<Track>, assume_yes: bool) -> Result<Vec<Track>> {
    print_tracks(&tracks);
    if assume_yes {
        return Ok(tracks);
    }

    let correct = Confirm::new()
        .with_prompt("Is it correct?")
        .default(true)
        .interact()
        .context("Failed to read confirmation")?;
    if correct {
        return Ok(tracks);
    }

    let titles = tracks
        .iter()
        .map(|t| t.title.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let edited = Editor::new()
        .extension(".txt")
        .edit(&titles)
        .context("Failed to open the track list in $EDITOR")?;

    match edited {
        Some(text) => {
            let tracks = apply_edited_titles(tracks, &text);
            print_tracks(&tracks);
            Ok(tracks)
        }
        None => {
            emit(
                Level::Warn,
                "split.review.unchanged",
                "Editor closed without saving; keeping the original titles",
                None,
            );
            Ok(tracks)
        }
    }
}

/// Replace titles line by line. Missing or blank lines keep the old title,
/// extra lines are ignored.
pub fn apply_edited_titles(tracks: Vec<Track>, edited: &str) -> Vec<Track> {
    let mut lines = edited.lines();
    tracks
        .into_iter()
        .map(|mut track| {
            if let Some(line) = lines.next().map(str::trim).filter(|l| !l.is_empty()) {
                track.title = line.to_string();
            }
            track
        })
        .collect()
}

fn print_tracks(tracks: &[Track]) {
    emit(Level::Info, "split.review.tracks", "Tracks:", None);
    separator();
    for track in tracks {
        emit(
            Level::Info,
            "split.review.track",
            &format!("{:>9}  {}", track.start.to_string(), track.title),
            None,
        );
    }
    separator();
}
