//! Source metadata and audio download through `yt-dlp`.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::common::paths;
use crate::split::resolver::TrackSource;
use crate::split::timestamp::Timestamp;
use crate::split::track::Chapter;
use crate::ui::prelude::{Level, emit};

#[derive(Debug, Clone, Deserialize)]
pub struct RawChapter {
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
}

/// The subset of yt-dlp's info JSON mixsplit reads.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub chapters: Option<Vec<RawChapter>>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl VideoInfo {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse yt-dlp metadata JSON")
    }

    /// Chapters converted to timeline values; `None` when the source has none.
    pub fn chapters(&self) -> Result<Option<Vec<Chapter>>> {
        let Some(raw) = self.chapters.as_ref().filter(|c| !c.is_empty()) else {
            return Ok(None);
        };

        let mut chapters = Vec::with_capacity(raw.len());
        for (index, chapter) in raw.iter().enumerate() {
            let Some(start_time) = chapter.start_time else {
                bail!("Chapter {} has no start time", index + 1);
            };
            let start = Timestamp::from_secs_f64(start_time)
                .with_context(|| format!("Chapter {} has an invalid start time", index + 1))?;
            let end = chapter
                .end_time
                .map(Timestamp::from_secs_f64)
                .transpose()
                .with_context(|| format!("Chapter {} has an invalid end time", index + 1))?;
            let title = chapter
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Chapter {}", index + 1));
            chapters.push(Chapter { title, start, end });
        }
        Ok(Some(chapters))
    }

    /// Pick where track boundaries come from.
    ///
    /// Chapters win when the source has any and `use_chapters` is set;
    /// otherwise the description text is used.
    pub fn track_source(&self, use_chapters: bool) -> Result<TrackSource> {
        if use_chapters {
            if let Some(chapters) = self.chapters()? {
                return Ok(TrackSource::Chapters(chapters));
            }
        }
        Ok(TrackSource::Description(
            self.description.clone().unwrap_or_default(),
        ))
    }

    pub fn total_duration(&self) -> Option<Timestamp> {
        self.duration.and_then(|d| Timestamp::from_secs_f64(d).ok())
    }

    /// Performer: explicit creator, else the part of the title before `" - "`,
    /// else the uploader.
    pub fn creator(&self) -> String {
        if let Some(creator) = self.creator.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            return creator.to_string();
        }
        if let Some((artist, _)) = self.title.split_once(" - ") {
            let artist = artist.trim();
            if !artist.is_empty() {
                return artist.to_string();
            }
        }
        self.uploader
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or("Unknown Artist")
            .to_string()
    }

    /// Album: the part of the title after `" - "`, else the whole title.
    pub fn album(&self) -> String {
        let album = match self.title.split_once(" - ") {
            Some((_, rest)) if !rest.trim().is_empty() => rest.trim(),
            _ => self.title.trim(),
        };
        if album.is_empty() {
            return "Unknown Album".to_string();
        }
        album.replace('/', "_")
    }
}

pub fn fetch_info(url: &str) -> Result<VideoInfo> {
    let output = Command::new("yt-dlp")
        .arg("--dump-single-json")
        .arg("--no-playlist")
        .arg("--skip-download")
        .arg("--no-warnings")
        .arg(url)
        .output()
        .with_context(|| format!("Failed to spawn yt-dlp for {}", url))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("yt-dlp failed to read metadata for {}: {}", url, stderr.trim());
    }

    let json = String::from_utf8(output.stdout).context("yt-dlp returned non-UTF8 metadata")?;
    VideoInfo::from_json(&json)
}

pub fn load_info_json(path: &Path) -> Result<VideoInfo> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read metadata from {}", path.display()))?;
    VideoInfo::from_json(&json).with_context(|| format!("Invalid metadata in {}", path.display()))
}

/// Cache location a download of `url` ends up at.
pub fn download_path_for(url: &str, audio_format: &str) -> Result<PathBuf> {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    Ok(paths::mixsplit_download_dir()?.join(format!("{hash}.{audio_format}")))
}

#[derive(Debug, Clone)]
pub struct DownloadOptions<'a> {
    pub audio_format: &'a str,
    pub audio_quality: &'a str,
    pub redownload: bool,
}

/// Download the best audio stream of `url`, reusing a cached copy.
pub fn download_audio(url: &str, options: &DownloadOptions<'_>) -> Result<PathBuf> {
    let destination = download_path_for(url, options.audio_format)?;
    if destination.exists() {
        if !options.redownload {
            emit(
                Level::Info,
                "split.download.cached",
                &format!("Using cached audio {}", destination.display()),
                None,
            );
            return Ok(destination);
        }
        fs::remove_file(&destination)
            .with_context(|| format!("Failed to remove cached audio {}", destination.display()))?;
    }

    let stem = destination.with_extension("");
    let template = format!("{}.%(ext)s", stem.display());

    let output = Command::new("yt-dlp")
        .arg("--no-part")
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg("-f")
        .arg("bestaudio/best")
        .arg("-x")
        .arg("--audio-format")
        .arg(options.audio_format)
        .arg("--audio-quality")
        .arg(options.audio_quality)
        .arg("-o")
        .arg(&template)
        .arg(url)
        .output()
        .with_context(|| format!("Failed to spawn yt-dlp for {}", url))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("yt-dlp failed to download {}: {}", url, stderr.trim());
    }

    if !destination.exists() {
        bail!(
            "yt-dlp reported success but {} was not created",
            destination.display()
        );
    }

    Ok(destination)
}
