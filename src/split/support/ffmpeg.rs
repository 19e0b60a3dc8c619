use anyhow::{Context, Result, bail};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::common::progress::create_spinner;
use crate::split::error::CutError;
use crate::split::resolver::DurationProbe;
use crate::split::segment::{CutRequest, Cutter};
use crate::split::timestamp::Timestamp;
use crate::ui::prelude::{Level, emit};

/// Duration probe backed by `ffprobe`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ffprobe;

impl Ffprobe {
    pub const PROGRAM: &'static str = "ffprobe";

    /// Read the `format=duration` field ffprobe prints as bare seconds.
    fn parse_output(audio: &Path, stdout: &[u8]) -> Result<Timestamp> {
        let text = String::from_utf8_lossy(stdout);
        let seconds: f64 = text.trim().parse().with_context(|| {
            format!("{} printed no duration for {}: '{}'", Self::PROGRAM, audio.display(), text.trim())
        })?;
        Timestamp::from_secs_f64(seconds)
            .with_context(|| format!("{} reported an invalid duration for {}", Self::PROGRAM, audio.display()))
    }
}

impl DurationProbe for Ffprobe {
    fn probe_duration(&self, audio: &Path) -> Result<Timestamp> {
        if !audio.exists() {
            bail!("{} does not exist", audio.display());
        }

        let spinner = create_spinner(format!("Probing duration of {}", audio.display()));
        let output = Command::new(Self::PROGRAM)
            .args(["-v", "error", "-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(audio)
            .output();
        spinner.finish_and_clear();

        let output =
            output.with_context(|| format!("Failed to launch {} for {}", Self::PROGRAM, audio.display()))?;
        if !output.status.success() {
            bail!(
                "{} could not read {}: {}",
                Self::PROGRAM,
                audio.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Self::parse_output(audio, &output.stdout)
    }
}

/// Cutter that stream-copies with `ffmpeg -c copy`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegCutter;

impl FfmpegCutter {
    pub const PROGRAM: &'static str = "ffmpeg";

    pub fn args(request: &CutRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-nostdin",
            "-y",
            "-i",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(request.source.as_os_str().to_owned());
        args.push("-ss".into());
        args.push(request.start.to_ffmpeg_arg().into());
        args.push("-to".into());
        args.push(request.end.to_ffmpeg_arg().into());
        args.push("-c".into());
        args.push("copy".into());
        args.push(request.destination.as_os_str().to_owned());
        args
    }
}

impl Cutter for FfmpegCutter {
    fn cut(&self, request: &CutRequest<'_>) -> Result<(), CutError> {
        let args = Self::args(request);
        emit(
            Level::Debug,
            "split.ffmpeg.command",
            &format!(
                "{} {}",
                Self::PROGRAM,
                args.iter()
                    .map(|a| a.to_string_lossy())
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
            None,
        );

        let output = Command::new(Self::PROGRAM)
            .args(&args)
            .output()
            .map_err(|source| CutError::Spawn {
                program: Self::PROGRAM.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CutError::ExitStatus {
                program: Self::PROGRAM.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_args_stream_copy_the_requested_range() {
        let request = CutRequest {
            source: Path::new("/tmp/mix.mp3"),
            start: Timestamp::from_secs(201),
            end: Timestamp::from_secs(422),
            destination: Path::new("Artist/Album/2. Song Two.mp3"),
        };

        let args: Vec<String> = FfmpegCutter::args(&request)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            [
                "-hide_banner",
                "-loglevel",
                "error",
                "-nostdin",
                "-y",
                "-i",
                "/tmp/mix.mp3",
                "-ss",
                "201.000",
                "-to",
                "422.000",
                "-c",
                "copy",
                "Artist/Album/2. Song Two.mp3",
            ]
        );
    }

    #[test]
    fn probe_output_becomes_a_timestamp() {
        let audio = Path::new("mix.mp3");
        assert_eq!(
            Ffprobe::parse_output(audio, b"615.400000\n").unwrap(),
            Timestamp::from_millis(615_400)
        );
        assert!(Ffprobe::parse_output(audio, b"N/A\n").is_err());
        assert!(Ffprobe::parse_output(audio, b"").is_err());
    }

    #[test]
    fn probing_a_missing_file_fails_before_spawning() {
        let err = Ffprobe
            .probe_duration(Path::new("/definitely/not/here.mp3"))
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
