use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::paths;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Output name template; `{creator}`, `{album}`, `{id}` and `{track}` are replaced
    pub template: String,
    /// Directory the rendered template is relative to
    pub output_dir: PathBuf,
    /// Audio format yt-dlp extracts to
    pub audio_format: String,
    /// Audio quality passed to yt-dlp
    pub audio_quality: String,
    /// Use chapters when the source has them
    pub prefer_chapters: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            template: Self::DEFAULT_TEMPLATE.to_string(),
            output_dir: PathBuf::from("."),
            audio_format: Self::DEFAULT_AUDIO_FORMAT.to_string(),
            audio_quality: Self::DEFAULT_AUDIO_QUALITY.to_string(),
            prefer_chapters: true,
        }
    }
}

impl SplitConfig {
    pub const DEFAULT_TEMPLATE: &'static str = "{creator}/{album}/{id}. {track}.mp3";
    pub const DEFAULT_AUDIO_FORMAT: &'static str = "mp3";
    pub const DEFAULT_AUDIO_QUALITY: &'static str = "192K";

    pub fn load() -> Result<Self> {
        Self::load_from_path(paths::config_file_path()?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            config.save_to_path(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing config at {}", path.display()))?;
        config.repair();
        Ok(config)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }

        let toml = toml::to_string_pretty(self).context("serializing config")?;
        fs::write(path, toml).with_context(|| format!("writing config to {}", path.display()))?;
        Ok(())
    }

    /// Blank values fall back to defaults
    fn repair(&mut self) {
        let defaults = Self::default();
        if self.template.trim().is_empty() {
            self.template = defaults.template;
        }
        if self.audio_format.trim().is_empty() {
            self.audio_format = defaults.audio_format;
        }
        if self.audio_quality.trim().is_empty() {
            self.audio_quality = defaults.audio_quality;
        }
        if self.output_dir.as_os_str().is_empty() {
            self.output_dir = defaults.output_dir;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = SplitConfig::load_from_path(&path).unwrap();

        assert_eq!(config, SplitConfig::default());
        assert!(path.exists());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("prefer_chapters = true"));
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "prefer_chapters = false\ntemplate = \"{id} {track}.opus\"\n").unwrap();

        let config = SplitConfig::load_from_path(&path).unwrap();

        assert!(!config.prefer_chapters);
        assert_eq!(config.template, "{id} {track}.opus");
        assert_eq!(config.audio_format, SplitConfig::DEFAULT_AUDIO_FORMAT);
    }

    #[test]
    fn blank_values_are_repaired() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "template = \"  \"\naudio_format = \"\"\n").unwrap();

        let config = SplitConfig::load_from_path(&path).unwrap();

        assert_eq!(config.template, SplitConfig::DEFAULT_TEMPLATE);
        assert_eq!(config.audio_format, SplitConfig::DEFAULT_AUDIO_FORMAT);
    }

    #[test]
    fn invalid_toml_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "prefer_chapters = maybe").unwrap();

        let err = SplitConfig::load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }
}
