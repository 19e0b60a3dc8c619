//! Track extraction from free-text descriptions.
//!
//! Works in two passes: every line carrying a timestamp becomes a
//! `(title, start, maybe-end)` entry, then a stitching pass fills each
//! missing end from the following entry's start. The final entry may stay
//! open; the resolver closes it with the source duration.

use crate::ui::prelude::{Level, emit};

use super::chapters::strip_listed_ordinal;
use super::error::ResolveError;
use super::timestamp::{self, Timestamp};
use super::track::PendingTrack;

/// Extract tracks from `description` in order of appearance.
///
/// `source_title` is only used in diagnostics. An empty result means the
/// description carries no timestamps at all.
pub fn extract_tracks(
    description: &str,
    source_title: &str,
) -> Result<Vec<PendingTrack>, ResolveError> {
    let mut entries = scan_lines(description)?;
    strip_shared_numbering(&mut entries);
    strip_shared_performer(&mut entries);
    let tracks = stitch(entries);

    emit(
        Level::Debug,
        "split.description.scanned",
        &format!(
            "Found {} timestamped line(s) in the description of '{}'",
            tracks.len(),
            source_title
        ),
        None,
    );

    Ok(tracks)
}

/// First pass: classify lines and read their timestamps.
fn scan_lines(description: &str) -> Result<Vec<PendingTrack>, ResolveError> {
    let mut entries = Vec::new();

    for (index, line) in description.lines().enumerate() {
        let mut found = timestamp::tokens(line);
        let Some(first) = found.next() else {
            continue;
        };
        let to_error = |source| ResolveError::MalformedTimestamp {
            line: index + 1,
            source,
        };

        let start = first.map_err(to_error)?.timestamp;
        let end = match found.next() {
            Some(second) => Some(second.map_err(to_error)?.timestamp),
            None => None,
        };
        // Later tokens are not boundaries but must still be well formed
        for rest in found {
            rest.map_err(to_error)?;
        }

        let title = title_for(line, entries.len() + 1);
        entries.push(PendingTrack::new(title, start, end));
    }

    Ok(entries)
}

fn title_for(line: &str, position: usize) -> String {
    let title = timestamp::strip_timestamps(line);
    if title.is_empty() {
        format!("Track {position}")
    } else {
        title
    }
}

/// Drop list numbering (`01. `, `2 - `) when every entry carries it.
fn strip_shared_numbering(entries: &mut [PendingTrack]) {
    let Some(stripped) = entries
        .iter()
        .map(|entry| strip_listed_ordinal(&entry.title))
        .collect::<Option<Vec<_>>>()
    else {
        return;
    };

    for (entry, title) in entries.iter_mut().zip(stripped) {
        entry.title = title;
    }
}

/// Drop an `"Artist - "` prefix when every entry shares the same one.
fn strip_shared_performer(entries: &mut [PendingTrack]) {
    if entries.len() < 2 {
        return;
    }

    let mut shared: Option<&str> = None;
    for entry in entries.iter() {
        let Some((performer, rest)) = entry.title.split_once(" - ") else {
            return;
        };
        if rest.trim().is_empty() {
            return;
        }
        match shared {
            None => shared = Some(performer),
            Some(existing) if existing.eq_ignore_ascii_case(performer) => {}
            Some(_) => return,
        }
    }

    for entry in entries.iter_mut() {
        if let Some((_, rest)) = entry.title.split_once(" - ") {
            entry.title = rest.trim().to_string();
        }
    }
}

/// Second pass: every open end takes the next entry's start.
fn stitch(entries: Vec<PendingTrack>) -> Vec<PendingTrack> {
    let next_starts: Vec<Option<Timestamp>> = entries
        .iter()
        .skip(1)
        .map(|entry| Some(entry.start))
        .chain(std::iter::once(None))
        .collect();

    entries
        .into_iter()
        .zip(next_starts)
        .map(|(mut entry, next_start)| {
            if entry.end.is_none() {
                entry.end = next_start;
            }
            entry
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> Timestamp {
        Timestamp::parse(value).unwrap()
    }

    #[test]
    fn single_timestamp_lines_are_stitched_end_to_start() {
        let description = "Artist - Song One 0:00\nArtist - Song Two 3:21\nArtist - Song Three 7:02\n";
        let tracks = extract_tracks(description, "Mix").unwrap();

        assert_eq!(
            tracks,
            vec![
                PendingTrack::new("Song One", ts("0:00"), Some(ts("3:21"))),
                PendingTrack::new("Song Two", ts("3:21"), Some(ts("7:02"))),
                PendingTrack::new("Song Three", ts("7:02"), None),
            ]
        );
    }

    #[test]
    fn lines_without_timestamps_are_skipped() {
        let description = "Thanks for listening!\n\nTracklist:\n0:00 First\nFollow me on socials\n2:30 Second\n";
        let tracks = extract_tracks(description, "Mix").unwrap();
        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["First", "Second"]);
        assert_eq!(tracks[0].end, Some(ts("2:30")));
        assert!(tracks[1].end.is_none());
    }

    #[test]
    fn no_timestamps_yield_an_empty_list() {
        let tracks = extract_tracks("Just a description\nwith no times", "Mix").unwrap();
        assert!(tracks.is_empty());
        assert!(extract_tracks("", "Mix").unwrap().is_empty());
    }

    #[test]
    fn second_token_is_an_explicit_end() {
        let description = "0:00 - 3:00 Opening\n3:10 Middle\n5:00 - 6:00 Closing";
        let tracks = extract_tracks(description, "Mix").unwrap();
        assert_eq!(tracks[0].end, Some(ts("3:00")));
        assert_eq!(tracks[1].end, Some(ts("5:00")));
        assert_eq!(tracks[2].end, Some(ts("6:00")));
    }

    #[test]
    fn hour_long_mixes_parse_hours() {
        let description = "58:30 Late Track\n1:04:12 Later Track";
        let tracks = extract_tracks(description, "Mix").unwrap();
        assert_eq!(tracks[0].end, Some(Timestamp::from_secs(3852)));
        assert_eq!(tracks[1].start, Timestamp::from_secs(3852));
    }

    #[test]
    fn ordinal_numbers_are_removed_from_titles() {
        let description = "01. 0:00 Intro\n02. 1:00 Theme";
        let tracks = extract_tracks(description, "Mix").unwrap();
        assert_eq!(tracks[0].title, "Intro");
        assert_eq!(tracks[1].title, "Theme");
    }

    #[test]
    fn leading_numbers_in_titles_are_kept() {
        let description = "99 Luftballons 0:00\n2 Become 1 3:00\n1999 4:00";
        let tracks = extract_tracks(description, "Mix").unwrap();
        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["99 Luftballons", "2 Become 1", "1999"]);
    }

    #[test]
    fn numbering_is_kept_unless_every_line_has_it() {
        let description = "1. 0:00 Intro\n2 Become 1 3:00";
        let tracks = extract_tracks(description, "Mix").unwrap();
        assert_eq!(tracks[0].title, "1. Intro");
        assert_eq!(tracks[1].title, "2 Become 1");
    }

    #[test]
    fn bare_timestamp_lines_get_positional_titles() {
        let tracks = extract_tracks("0:00\n1:00 Named", "Mix").unwrap();
        assert_eq!(tracks[0].title, "Track 1");
        assert_eq!(tracks[1].title, "Named");
    }

    #[test]
    fn differing_performers_are_kept() {
        let description = "Alpha - One 0:00\nBeta - Two 1:00";
        let tracks = extract_tracks(description, "Mix").unwrap();
        assert_eq!(tracks[0].title, "Alpha - One");
        assert_eq!(tracks[1].title, "Beta - Two");
    }

    #[test]
    fn single_entry_keeps_its_performer() {
        let tracks = extract_tracks("Alpha - One 0:00", "Mix").unwrap();
        assert_eq!(tracks[0].title, "Alpha - One");
    }

    #[test]
    fn malformed_token_reports_its_line() {
        let err = extract_tracks("0:00 Fine\n3:75 Broken", "Mix").unwrap_err();
        assert!(matches!(err, ResolveError::MalformedTimestamp { line: 2, .. }));
    }

    #[test]
    fn dash_separated_format_is_understood() {
        let description = "Opening - 00:00\nClosing - 04:10";
        let tracks = extract_tracks(description, "Mix").unwrap();
        assert_eq!(tracks[0].title, "Opening");
        assert_eq!(tracks[0].end, Some(ts("4:10")));
        assert_eq!(tracks[1].title, "Closing");
    }
}
