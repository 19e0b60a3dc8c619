//! External programs mixsplit shells out to.

use anyhow::{Result, bail};
use std::path::PathBuf;

/// A command-line tool that must be on `PATH` for a step to run.
#[derive(Debug, Clone, Copy)]
pub struct RequiredTool {
    pub program: &'static str,
    pub purpose: &'static str,
    pub install_hint: &'static str,
}

pub const FFMPEG: RequiredTool = RequiredTool {
    program: "ffmpeg",
    purpose: "cutting tracks",
    install_hint: "install ffmpeg from your package manager",
};

pub const FFPROBE: RequiredTool = RequiredTool {
    program: "ffprobe",
    purpose: "probing the audio duration",
    install_hint: "ffprobe ships with ffmpeg",
};

pub const YT_DLP: RequiredTool = RequiredTool {
    program: "yt-dlp",
    purpose: "fetching metadata and audio",
    install_hint: "install yt-dlp (pipx install yt-dlp)",
};

impl RequiredTool {
    pub fn locate(self) -> Result<PathBuf> {
        match which::which(self.program) {
            Ok(path) => Ok(path),
            Err(_) => bail!(
                "`{}` is required for {} but was not found in PATH; {}",
                self.program,
                self.purpose,
                self.install_hint
            ),
        }
    }
}

pub fn ensure_available(tools: &[RequiredTool]) -> Result<()> {
    for tool in tools {
        tool.locate()?;
    }
    Ok(())
}
