use std::{
    error::Error,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use clap::Parser;
use colored::Colorize;
use extract_frames::{
    CancellationToken, CollisionPolicy, DEFAULT_JPEG_QUALITY, ExportJob, ExportOptions,
    ExportReport, FfmpegLogLevel, FrameSource, ProgressCallback, ProgressInfo, TimeSpec,
    VideoFile, export_frames,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "\
Examples:
  extract-frames clip.mp4
  extract-frames clip.mp4 -f 5 -s 0:50 -e 1:10
  extract-frames clip.mp4 -f 30 -s 50 -e 70 --progress --json";

/// Exit status when the export was interrupted with Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Parser)]
#[command(
    name = "extract-frames",
    version,
    about = "Extract frames from video as .jpg images",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Path to video with extension.
    #[arg(value_parser = existing_file)]
    path: PathBuf,

    /// Split every n frame(s).
    #[arg(
        short = 'f',
        long = "frames",
        value_name = "N",
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    stride: u64,

    /// Start timestamp (mm:ss), or n representing seconds from start.
    #[arg(short, long, value_name = "TIME")]
    start: Option<TimeSpec>,

    /// End timestamp (mm:ss), or n representing seconds from start.
    #[arg(short, long, value_name = "TIME")]
    end: Option<TimeSpec>,

    /// JPEG quality (1-100).
    #[arg(
        short,
        long,
        value_name = "N",
        default_value_t = DEFAULT_JPEG_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    quality: u8,

    /// Create the frames directory here instead of next to the video.
    #[arg(short = 'o', long, value_name = "DIR")]
    output_root: Option<PathBuf>,

    /// Fail if the frames directory exists instead of adding a " (n)" suffix.
    #[arg(long)]
    no_rename: bool,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,

    /// Show debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, value_name = "LEVEL", default_value = "error")]
    ffmpeg_log_level: FfmpegLogLevel,
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = Path::new(value);
    if !path.is_file() {
        return Err(format!("File not found, got {value:?}"));
    }
    std::path::absolute(path).map_err(|error| format!("cannot resolve {value:?}: {error}"))
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(total: u64) -> Result<Self, Box<dyn Error>> {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {eta} {msg}",
        )?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.handled);
        if info.skipped > 0 {
            self.bar.set_message(format!("{} skipped", info.skipped));
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn print_summary(
    job: &ExportJob,
    report: &ExportReport,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    if as_json {
        let payload = json!({
            "video": job.video_path().display().to_string(),
            "output_dir": report.output_dir.display().to_string(),
            "stride": job.stride(),
            "start_index": job.range().start_index(),
            "end_index": job.range().end_index(),
            "expected": report.expected,
            "saved": report.saved.len(),
            "skipped": report.skipped.iter().map(|skipped| json!({
                "frame": skipped.frame_number,
                "reason": skipped.reason.to_string(),
            })).collect::<Vec<_>>(),
            "interrupted": report.interrupted,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if !report.skipped.is_empty() {
        let message = format!(
            "{} frame(s) could not be decoded and were skipped",
            report.skipped.len()
        );
        eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
    }
    match status(report) {
        Status::Interrupted(message) => {
            eprintln!("{} {}", "interrupted:".yellow().bold(), message.yellow());
        }
        Status::Success(message) => {
            println!("{} {}", "success:".green().bold(), message.green());
        }
    }
    println!("Frames directory: {}", report.output_dir.display());
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Status {
    Success(String),
    Interrupted(String),
}

fn status(report: &ExportReport) -> Status {
    if report.interrupted {
        Status::Interrupted(format!(
            "stopped after {} of {} image(s)",
            report.saved.len(),
            report.expected
        ))
    } else {
        Status::Success(format!("Saved {} image(s)", report.saved.len()))
    }
}

fn run() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    extract_frames::set_ffmpeg_log_level(cli.ffmpeg_log_level);

    let mut video = VideoFile::open(&cli.path)?;

    let token = CancellationToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || handler_token.cancel())?;

    let mut options = ExportOptions::new()
        .with_cancellation(token)
        .with_jpeg_quality(cli.quality);
    if cli.no_rename {
        options = options.with_collision_policy(CollisionPolicy::Fail);
    }
    if let Some(root) = &cli.output_root {
        options = options.with_output_root(root);
    }

    let job = ExportJob::plan(&cli.path, cli.stride, cli.start, cli.end, video.info(), &options)?;

    let progress = if cli.progress {
        let progress = Arc::new(TerminalProgress::new(job.expected_image_count())?);
        options = options.with_progress(progress.clone());
        Some(progress)
    } else {
        None
    };

    let report = export_frames(&mut video, &job, &options)?;

    if let Some(progress) = progress {
        progress.bar.finish_and_clear();
    }

    print_summary(&job, &report, cli.json)?;

    if report.interrupted {
        Ok(ExitCode::from(EXIT_INTERRUPTED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(video: &Path, extra: &[&str]) -> Result<Cli, clap::Error> {
        let mut args = vec!["extract-frames".to_string(), video.display().to_string()];
        args.extend(extra.iter().map(|arg| arg.to_string()));
        Cli::try_parse_from(args)
    }

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_and_window() {
        let video = tempfile::NamedTempFile::new().expect("Failed to create temp file");

        let cli = parse(video.path(), &[]).unwrap();
        assert_eq!(cli.stride, 1);
        assert!(cli.start.is_none() && cli.end.is_none());
        assert_eq!(cli.quality, DEFAULT_JPEG_QUALITY);
        assert_eq!(cli.ffmpeg_log_level, FfmpegLogLevel::Error);

        let cli = parse(video.path(), &["-f", "5", "-s", "0:50", "-e", "1:10"]).unwrap();
        assert_eq!(cli.stride, 5);
        assert_eq!(cli.start.map(TimeSpec::seconds), Some(50.0));
        assert_eq!(cli.end.map(TimeSpec::seconds), Some(70.0));
    }

    #[test]
    fn rejects_bad_arguments() {
        let video = tempfile::NamedTempFile::new().expect("Failed to create temp file");

        assert!(parse(video.path(), &["-f", "0"]).is_err());
        assert!(parse(video.path(), &["-s", "1:2:3"]).is_err());
        assert!(parse(video.path(), &["-e", "abc"]).is_err());
        assert!(parse(video.path(), &["-q", "0"]).is_err());
        assert!(parse(Path::new("definitely/not/here.mp4"), &[]).is_err());
    }

    fn report(saved: u64, expected: u64, interrupted: bool) -> ExportReport {
        ExportReport {
            output_dir: PathBuf::from("clip_frames_split_every_1_frame_between_0_10"),
            expected,
            saved: (0..saved).collect(),
            skipped: Vec::new(),
            interrupted,
        }
    }

    #[test]
    fn interrupted_runs_are_not_reported_as_success() {
        assert_eq!(
            status(&report(3, 10, true)),
            Status::Interrupted("stopped after 3 of 10 image(s)".to_string())
        );
        assert_eq!(
            status(&report(10, 10, false)),
            Status::Success("Saved 10 image(s)".to_string())
        );
    }
}
