use std::{fs, path::Path, path::PathBuf, sync::Arc, time::Duration};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use colored::Colorize;
use framesift::{
    DecoderLogLevel, ExtractionOptions, FirstFramePolicy, ProgressCallback, ProgressInfo,
    RunTermination, SamplingPeriod, VideoFile,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framesift extract lecture.mp4 --out slides --interval 5 --threshold 0.6\n  framesift extract talk.mkv --out frames --ext png --first-frame seed-only --progress\n  framesift metadata lecture.mp4 --json\n  framesift completions zsh > _framesift";

#[derive(Debug, Parser)]
#[command(
    name = "framesift",
    version,
    about = "Keep only the visually distinct frames of a video",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow writing into a non-empty output directory.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FirstFrameArg {
    /// Write the first sampled frame.
    Retain,
    /// Only compare against the first sampled frame; do not write it.
    SeedOnly,
}

impl From<FirstFrameArg> for FirstFramePolicy {
    fn from(value: FirstFrameArg) -> Self {
        match value {
            FirstFrameArg::Retain => FirstFramePolicy::Retain,
            FirstFrameArg::SeedOnly => FirstFramePolicy::SeedOnly,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sample a video and write its distinct frames.
    #[command(
        about = "Extract distinct frames",
        after_help = "Examples:\n  framesift extract input.mp4 --out frames\n  framesift extract input.mp4 --out frames --interval 2.5 --threshold 0.8 --ext png --json"
    )]
    Extract {
        /// Input video path.
        input: PathBuf,
        /// Output directory for retained frames (created if absent).
        #[arg(long, default_value = "frames")]
        out: PathBuf,
        /// Seconds of playback between sampled frames.
        #[arg(long, default_value_t = 5.0)]
        interval: f64,
        /// Similarity below which a sampled frame is kept (0.0 to 1.0).
        #[arg(long, default_value_t = 0.6)]
        threshold: f64,
        /// Output image extension (jpg, png, bmp, tiff, webp).
        #[arg(long, default_value = "jpg")]
        ext: String,
        /// How to treat the first sampled frame.
        #[arg(long, value_enum, default_value_t = FirstFrameArg::Retain)]
        first_frame: FirstFrameArg,
        /// Print the run summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print video stream metadata.
    #[command(
        about = "Print video metadata",
        visible_alias = "probe",
        after_help = "Examples:\n  framesift metadata input.mp4\n  framesift metadata input.mp4 --json"
    )]
    Metadata {
        /// Input video path.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_interval(seconds: f64) -> Result<Duration, Box<dyn std::error::Error>> {
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        format!("--interval must be a non-negative number of seconds, got {seconds}").into()
    })
}

fn directory_has_entries(path: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(false);
    }
    Ok(fs::read_dir(path)?.next().is_some())
}

fn init_logging(global: &GlobalOptions) {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(global);

    if let Some(level) = &global.log_level {
        let parsed: DecoderLogLevel = level.parse()?;
        framesift::set_decoder_log_level(parsed);
    }

    Ok(())
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(expected_candidates: Option<u64>) -> Result<Self, Box<dyn std::error::Error>> {
        let bar = match expected_candidates {
            Some(total) => ProgressBar::new(total),
            None => ProgressBar::new_spinner(),
        };
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.sampled);
        self.bar.set_message(format!("{} kept", info.retained));
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Extract {
            input,
            out,
            interval,
            threshold,
            ext,
            first_frame,
            json,
        } => {
            if directory_has_entries(&out)? {
                if !cli.global.overwrite {
                    return Err(format!(
                        "output directory is not empty: {} (use --overwrite)",
                        out.display()
                    )
                    .into());
                }
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("writing into existing directory {}", out.display()).yellow()
                );
            }

            let mut options = ExtractionOptions::new()
                .with_interval(parse_interval(interval)?)
                .with_threshold(threshold)
                .with_output_directory(&out)
                .with_image_extension(&ext)
                .with_first_frame(first_frame.into());
            options.validate()?;

            let video = VideoFile::open(&input)?;

            let progress = if cli.global.progress {
                let metadata = video.metadata();
                let period = SamplingPeriod::new(metadata.frames_per_second, options.interval())?;
                let progress = Arc::new(TerminalProgress::new(
                    metadata.expected_candidates(period.frames()),
                )?);
                options = options.with_progress(progress.clone());
                Some(progress)
            } else {
                None
            };

            let summary = video.extract_distinct_frames(&options)?;

            if let Some(progress) = progress {
                progress.bar.finish_with_message(format!("{} kept", summary.retained));
            }

            if json {
                let payload = json!({
                    "input": input.display().to_string(),
                    "output_directory": out.display().to_string(),
                    "decoded_frames": summary.decoded_ticks,
                    "sampled": summary.sampled,
                    "retained": summary.retained,
                    "artifacts": summary
                        .artifacts
                        .iter()
                        .map(|path| path.display().to_string())
                        .collect::<Vec<_>>(),
                    "complete": summary.is_complete(),
                    "decode_error": match &summary.termination {
                        RunTermination::DecodeError(reason) => Some(reason.clone()),
                        RunTermination::EndOfStream => None,
                    },
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                if let RunTermination::DecodeError(reason) = &summary.termination {
                    eprintln!(
                        "{} {}",
                        "warning:".yellow().bold(),
                        format!(
                            "decoding stopped after {} frame(s): {reason}",
                            summary.decoded_ticks
                        )
                        .yellow()
                    );
                }
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "Kept {} of {} sampled frame(s) in {}",
                        summary.retained,
                        summary.sampled,
                        out.display()
                    )
                    .green()
                );
            }
        }
        Commands::Metadata { input, json } => {
            let video = VideoFile::open(&input)?;
            let metadata = video.metadata();
            if json {
                let payload = json!({
                    "width": metadata.width,
                    "height": metadata.height,
                    "fps": metadata.frames_per_second,
                    "frame_count": metadata.frame_count,
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "codec": metadata.codec,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "Video: {}x{} @ {:.2} fps [{}]",
                    metadata.width, metadata.height, metadata.frames_per_second, metadata.codec,
                );
                println!("Frames: {}", metadata.frame_count);
                println!("Duration: {:?}", metadata.duration);
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framesift", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, FirstFrameArg, directory_has_entries, parse_interval};
    use clap::Parser;
    use framesift::FirstFramePolicy;

    #[test]
    fn parse_interval_accepts_fractions() {
        let interval = parse_interval(2.5).unwrap();
        assert_eq!(interval.as_millis(), 2500);
    }

    #[test]
    fn parse_interval_rejects_negative() {
        assert!(parse_interval(-1.0).is_err());
        assert!(parse_interval(f64::NAN).is_err());
    }

    #[test]
    fn first_frame_arg_maps_to_policy() {
        assert_eq!(
            FirstFramePolicy::from(FirstFrameArg::Retain),
            FirstFramePolicy::Retain
        );
        assert_eq!(
            FirstFramePolicy::from(FirstFrameArg::SeedOnly),
            FirstFramePolicy::SeedOnly
        );
    }

    #[test]
    fn extract_defaults_match_library_defaults() {
        let cli = Cli::try_parse_from(["framesift", "extract", "input.mp4"]).unwrap();
        match cli.command {
            Commands::Extract {
                interval,
                threshold,
                ext,
                first_frame,
                ..
            } => {
                assert_eq!(interval, framesift::DEFAULT_INTERVAL.as_secs_f64());
                assert_eq!(threshold, framesift::DEFAULT_THRESHOLD);
                assert_eq!(ext, "jpg");
                assert_eq!(first_frame, FirstFrameArg::Retain);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn directory_has_entries_detects_content() {
        let directory = tempfile::tempdir().unwrap();
        assert!(!directory_has_entries(directory.path()).unwrap());
        assert!(!directory_has_entries(&directory.path().join("missing")).unwrap());

        std::fs::write(directory.path().join("frame_0.jpg"), b"x").unwrap();
        assert!(directory_has_entries(directory.path()).unwrap());
    }
}
