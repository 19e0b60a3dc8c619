use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::paths;
use crate::common::progress::{create_spinner, finish_spinner_with_success};
use crate::common::tools::{self, RequiredTool};
use crate::ui::prelude::{Level, OutputFormat, emit, get_output_format, separator};

use super::cli::{ConfigArgs, SourceArgs, SplitArgs, SplitCommands, TracksArgs};
use super::config::SplitConfig;
use super::resolver::{DurationProbe, FixedDuration, resolve_tracks};
use super::review::{confirm_value, review_tracks};
use super::segment::{NameTemplate, PlannedCut, execute_plan, id_width, plan_segments};
use super::support::ffmpeg::{Ffprobe, FfmpegCutter};
use super::support::ytdlp::{self, DownloadOptions, VideoInfo};
use super::timestamp::Timestamp;
use super::track::Track;

pub fn handle_split_command(command: SplitCommands) -> Result<()> {
    match command {
        SplitCommands::Split(args) => handle_split(args),
        SplitCommands::Tracks(args) => handle_tracks(args),
        SplitCommands::Config(args) => handle_config(args),
    }
}

fn handle_split(args: SplitArgs) -> Result<()> {
    let config = SplitConfig::load()?;
    tools::ensure_available(&required_tools(&args))?;

    let info = load_info(&args.source)?;
    let audio = match &args.source.audio {
        Some(path) => existing_audio(path)?,
        None => download(&args, &config)?,
    };

    let use_chapters = config.prefer_chapters && !args.source.ignore_chapters;
    let source = info.track_source(use_chapters)?;
    let probe = duration_probe(&args.source, None);
    let tracks = resolve_tracks(source, &info.title, &audio, probe.as_ref())?;

    let creator = confirm_value("Creator", &info.creator(), args.yes)?;
    let album = confirm_value("Album", &info.album(), args.yes)?;
    let tracks = review_tracks(tracks, args.yes)?;

    let template = NameTemplate::new(args.template.as_deref().unwrap_or(&config.template))
        .fill("creator", &creator)
        .fill("album", &album);
    let output_dir = args.output.clone().unwrap_or_else(|| config.output_dir.clone());
    let plan = plan_segments(&tracks, &template, &output_dir);

    if args.dry_run {
        print_plan(&plan);
        return Ok(());
    }

    create_parent_dirs(&plan)?;
    let report = execute_plan(&plan, &audio, &FfmpegCutter);

    if !report.is_success() {
        let failed: Vec<_> = report
            .failures
            .iter()
            .map(|failure| {
                serde_json::json!({
                    "id": failure.id,
                    "destination": failure.destination,
                    "error": failure.error.to_string(),
                })
            })
            .collect();
        let ids: Vec<String> = report.failures.iter().map(|f| f.id.to_string()).collect();
        emit(
            Level::Warn,
            "split.failures",
            &format!("Failed tracks: {}", ids.join(", ")),
            Some(serde_json::Value::Array(failed)),
        );
        bail!(
            "{} of {} track(s) failed to cut; the other files were written",
            report.failures.len(),
            report.total()
        );
    }

    emit(
        Level::Success,
        "split.done",
        &format!("Wrote {} track(s) to {}", report.written.len(), output_dir.display()),
        None,
    );
    Ok(())
}

fn handle_tracks(args: TracksArgs) -> Result<()> {
    let config = SplitConfig::load()?;
    if args.source.info_json.is_none() {
        tools::ensure_available(&[tools::YT_DLP])?;
    }

    let info = load_info(&args.source)?;
    let audio = match &args.source.audio {
        Some(path) => path.clone(),
        None => ytdlp::download_path_for(&args.source.url, &config.audio_format)?,
    };

    let use_chapters = config.prefer_chapters && !args.source.ignore_chapters;
    let source = info.track_source(use_chapters)?;
    let source_label = source.label();
    // Without a local file the metadata duration is the best available guess
    let fallback = (!audio.exists()).then(|| info.total_duration()).flatten();
    let probe = duration_probe(&args.source, fallback);
    let tracks = resolve_tracks(source, &info.title, &audio, probe.as_ref())?;

    print_tracks(&tracks, &info.title, source_label);
    Ok(())
}

fn handle_config(args: ConfigArgs) -> Result<()> {
    let path = paths::config_file_path()?;
    if args.path {
        emit(Level::Info, "config.path", &path.display().to_string(), None);
        return Ok(());
    }

    let config = SplitConfig::load_from_path(&path)?;
    let rendered = toml::to_string_pretty(&config).context("serializing config")?;
    emit(
        Level::Info,
        "config.show",
        &format!("# {}\n{}", path.display(), rendered.trim_end()),
        serde_json::to_value(&config).ok(),
    );
    Ok(())
}

fn required_tools(args: &SplitArgs) -> Vec<RequiredTool> {
    let mut required = Vec::new();
    if args.source.info_json.is_none() || args.source.audio.is_none() {
        required.push(tools::YT_DLP);
    }
    if args.source.duration.is_none() {
        required.push(tools::FFPROBE);
    }
    if !args.dry_run {
        required.push(tools::FFMPEG);
    }
    required
}

fn load_info(source: &SourceArgs) -> Result<VideoInfo> {
    if let Some(path) = &source.info_json {
        return ytdlp::load_info_json(path);
    }

    let spinner = create_spinner(format!("Fetching metadata for {}", source.url));
    let info = ytdlp::fetch_info(&source.url);
    match &info {
        Ok(info) => finish_spinner_with_success(spinner, format!("Found '{}'", info.title)),
        Err(_) => spinner.finish_and_clear(),
    }
    info
}

fn download(args: &SplitArgs, config: &SplitConfig) -> Result<PathBuf> {
    let options = DownloadOptions {
        audio_format: &config.audio_format,
        audio_quality: &config.audio_quality,
        redownload: args.redownload,
    };

    let spinner = create_spinner(format!("Downloading audio for {}", args.source.url));
    let audio = ytdlp::download_audio(&args.source.url, &options);
    match &audio {
        Ok(path) => finish_spinner_with_success(spinner, format!("Audio ready at {}", path.display())),
        Err(_) => spinner.finish_and_clear(),
    }
    audio
}

fn existing_audio(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        bail!("Audio file does not exist: {}", path.display());
    }
    path.canonicalize()
        .with_context(|| format!("Failed to canonicalize path {}", path.display()))
}

/// `--duration` wins, then `fallback`, then ffprobe over the audio file.
fn duration_probe(source: &SourceArgs, fallback: Option<Timestamp>) -> Box<dyn DurationProbe> {
    match source.duration.or(fallback) {
        Some(duration) => Box::new(FixedDuration(duration)),
        None => Box::new(Ffprobe),
    }
}

fn create_parent_dirs(plan: &[PlannedCut]) -> Result<()> {
    let parents: BTreeSet<&Path> = plan
        .iter()
        .filter_map(|cut| cut.destination.parent())
        .filter(|parent| !parent.as_os_str().is_empty())
        .collect();

    for parent in parents {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    Ok(())
}

fn print_plan(plan: &[PlannedCut]) {
    if matches!(get_output_format(), OutputFormat::Json) {
        emit(
            Level::Info,
            "split.plan",
            &format!("Dry run: would write {} file(s)", plan.len()),
            serde_json::to_value(plan).ok(),
        );
        return;
    }

    emit(
        Level::Info,
        "split.plan",
        &format!("Dry run: would write {} file(s):", plan.len()),
        None,
    );
    for cut in plan {
        emit(
            Level::Info,
            "split.plan.entry",
            &format!(
                "  {} ({} - {})",
                cut.destination.display(),
                cut.track.start,
                cut.track.end
            ),
            None,
        );
    }
}

fn print_tracks(tracks: &[Track], source_title: &str, source_label: &str) {
    let header = format!(
        "{} track(s) in '{}' (from {})",
        tracks.len(),
        source_title,
        source_label
    );

    if matches!(get_output_format(), OutputFormat::Json) {
        emit(
            Level::Info,
            "split.tracks",
            &header,
            serde_json::to_value(tracks).ok(),
        );
        return;
    }

    emit(Level::Info, "split.tracks", &header, None);
    separator();
    let width = id_width(tracks.len());
    for (index, track) in tracks.iter().enumerate() {
        emit(
            Level::Info,
            "split.tracks.entry",
            &format!(
                "{:>width$}. {:>9} - {:<9} {:>9}  {}",
                index + 1,
                track.start.to_string(),
                track.end.to_string(),
                format!("({})", track.length()),
                track.title
            ),
            None,
        );
    }
    separator();
}
