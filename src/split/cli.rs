use clap::{Args, Subcommand, ValueHint};
use std::path::PathBuf;

use super::timestamp::Timestamp;

#[derive(Subcommand, Debug, Clone)]
pub enum SplitCommands {
    /// Split a mix into one file per track
    Split(SplitArgs),
    /// Show the track list that would be cut, without downloading or cutting
    Tracks(TracksArgs),
    /// Show the configuration file
    Config(ConfigArgs),
}

/// Where the mix comes from and how its boundaries are found
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// URL of the mix (anything yt-dlp understands)
    pub url: String,

    /// Read metadata from a yt-dlp info JSON instead of fetching it
    #[arg(long = "info-json", value_hint = ValueHint::FilePath)]
    pub info_json: Option<PathBuf>,

    /// Use an already downloaded audio file instead of downloading
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub audio: Option<PathBuf>,

    /// Ignore chapters and read timestamps from the description
    #[arg(long)]
    pub ignore_chapters: bool,

    /// Total length of the mix (e.g. 1:02:03) instead of probing the audio
    #[arg(long, value_name = "TIMESTAMP", value_parser = parse_timestamp_arg)]
    pub duration: Option<Timestamp>,
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Directory the output template is relative to
    #[arg(short = 'o', long = "output", value_hint = ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Output file template ({creator}, {album}, {id}, {track})
    #[arg(short = 't', long)]
    pub template: Option<String>,

    /// Download the audio again even if a cached copy exists
    #[arg(long)]
    pub redownload: bool,

    /// Show the files that would be written without cutting
    #[arg(long)]
    pub dry_run: bool,

    /// Accept detected creator, album and titles without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TracksArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Only print the location of the config file
    #[arg(long)]
    pub path: bool,
}

fn parse_timestamp_arg(value: &str) -> Result<Timestamp, String> {
    Timestamp::parse(value).map_err(|err| err.to_string())
}
