use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated home, config and cache directories for one test run.
pub struct TestEnvironment {
    temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        for dir in ["home", "config", "cache", "out"] {
            fs::create_dir_all(temp_dir.path().join(dir))?;
        }
        Ok(Self { temp_dir })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn home(&self) -> PathBuf {
        self.path().join("home")
    }

    pub fn config_home(&self) -> PathBuf {
        self.path().join("config")
    }

    pub fn cache_home(&self) -> PathBuf {
        self.path().join("cache")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.path().join("out")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_home().join("mixsplit").join("config.toml")
    }

    /// Write a yt-dlp style info JSON and return its path.
    pub fn write_info_json(&self, name: &str, json: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, json)?;
        Ok(path)
    }

    /// A stand-in audio file; only its existence matters for dry runs.
    pub fn write_audio(&self, name: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, b"not really audio")?;
        Ok(path)
    }
}
