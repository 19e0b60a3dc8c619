use once_cell::sync::Lazy;
use regex::Regex;

use super::track::{Chapter, PendingTrack};

/// Leading list numbering such as `3. `, `03 - ` or `12-`.
static ORDINAL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\.? ?-? ?").expect("ordinal prefix pattern is valid"));

/// Numbering that is clearly list punctuation: `3. `, `03 - `, `12-`.
static LISTED_ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(?:\.|\s*-)\s*").expect("listed ordinal pattern is valid"));

/// Remove one leading ordinal prefix, unless that would leave nothing behind.
pub fn strip_ordinal_prefix(title: &str) -> String {
    let stripped = ORDINAL_PREFIX.replace(title, "");
    if stripped.trim().is_empty() {
        return title.to_string();
    }
    stripped.into_owned()
}

/// `title` without its punctuated list number, or `None` when it has none.
///
/// Bare leading digits (`"99 Luftballons"`) are part of the title.
pub fn strip_listed_ordinal(title: &str) -> Option<String> {
    let found = LISTED_ORDINAL.find(title)?;
    let rest = title[found.end()..].trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

/// Turn metadata chapters into tracks. Order and times are kept as given;
/// a missing end is left open for the resolver.
pub fn normalize_chapters(chapters: Vec<Chapter>) -> Vec<PendingTrack> {
    chapters
        .into_iter()
        .map(|chapter| {
            PendingTrack::new(strip_ordinal_prefix(&chapter.title), chapter.start, chapter.end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::timestamp::Timestamp;

    #[test]
    fn strips_common_numbering_styles() {
        assert_eq!(strip_ordinal_prefix("03 - Intro"), "Intro");
        assert_eq!(strip_ordinal_prefix("3. Title"), "Title");
        assert_eq!(strip_ordinal_prefix("12-Outro"), "Outro");
        assert_eq!(strip_ordinal_prefix("7 Nation Army"), "Nation Army");
    }

    #[test]
    fn leaves_unnumbered_titles_alone() {
        assert_eq!(strip_ordinal_prefix("Intro"), "Intro");
        assert_eq!(strip_ordinal_prefix("Intro 2"), "Intro 2");
    }

    #[test]
    fn only_the_first_prefix_is_removed() {
        assert_eq!(strip_ordinal_prefix("1. 2. Second"), "2. Second");
    }

    #[test]
    fn never_empties_a_title() {
        assert_eq!(strip_ordinal_prefix("1984"), "1984");
        assert_eq!(strip_ordinal_prefix("2. "), "2. ");
    }

    #[test]
    fn listed_ordinals_need_punctuation() {
        assert_eq!(strip_listed_ordinal("01. Intro").as_deref(), Some("Intro"));
        assert_eq!(strip_listed_ordinal("3 - Theme").as_deref(), Some("Theme"));
        assert_eq!(strip_listed_ordinal("12-Outro").as_deref(), Some("Outro"));
        assert_eq!(strip_listed_ordinal("99 Luftballons"), None);
        assert_eq!(strip_listed_ordinal("1999"), None);
        assert_eq!(strip_listed_ordinal("4."), None);
    }

    #[test]
    fn normalize_keeps_order_and_times() {
        let chapters = vec![
            Chapter {
                title: "01. Opening".to_string(),
                start: Timestamp::from_secs(0),
                end: Some(Timestamp::from_secs(95)),
            },
            Chapter {
                title: "02 - Closing".to_string(),
                start: Timestamp::from_secs(95),
                end: None,
            },
        ];

        let tracks = normalize_chapters(chapters);
        assert_eq!(
            tracks,
            vec![
                PendingTrack::new("Opening", Timestamp::from_secs(0), Some(Timestamp::from_secs(95))),
                PendingTrack::new("Closing", Timestamp::from_secs(95), None),
            ]
        );
    }
}
