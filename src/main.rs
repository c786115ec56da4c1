mod config;
mod ffmpeg;
mod highlight;
mod keywords;
mod llm;
mod output;
mod transcribe;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::Language;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use crate::config::{AppConfig, KeywordEngine, RunConfig, WhisperConfig};
use crate::highlight::ClipWindow;
use crate::output::{ClipRecord, HighlightManifest};
use crate::transcribe::whisper::Whisper;

#[derive(Parser)]
#[command(name = "hilite")]
#[command(about = "Video highlight extraction tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe a video and cut its top-scoring highlight clips
    Run {
        /// Input video file
        input: PathBuf,

        /// Configuration profile or file path
        #[arg(short, long)]
        profile: Option<String>,

        /// Input language (default: auto)
        #[arg(short, long, default_value = "auto")]
        lang: Language,

        /// Directory the clips are written to
        #[arg(short, long, default_value = "highlight_clips")]
        out_dir: PathBuf,
    },

    /// Select highlights from a saved transcript without re-transcribing
    Select {
        /// Transcript JSON produced by the 'run' command
        transcript: PathBuf,

        /// Source video to cut clips from; omit to only write the manifest
        #[arg(short, long)]
        video: Option<PathBuf>,

        /// Configuration profile or file path
        #[arg(short, long)]
        profile: Option<String>,

        /// Comma-separated keyphrases, bypassing keyword extraction
        #[arg(short, long)]
        keywords: Option<String>,

        /// Directory the clips are written to
        #[arg(short, long, default_value = "highlight_clips")]
        out_dir: PathBuf,
    },
}

fn resolve_profile_path(profile: &str) -> anyhow::Result<PathBuf> {
    if profile.starts_with("~/") {
        let home = dirs::home_dir().context("Could not find home directory")?;
        return Ok(home.join(&profile[2..]));
    }

    let path = PathBuf::from(profile);
    if path.is_absolute() || profile.starts_with("./") || profile.starts_with("../") {
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home
        .join(".hilite/profiles")
        .join(format!("{}.yaml", profile)))
}

fn load_profile(profile: Option<&str>) -> anyhow::Result<RunConfig> {
    match profile {
        Some(p) => {
            let conf_path = resolve_profile_path(p)?;
            config::load_run_config(&conf_path).context("Failed to load run config")
        }
        None => Ok(RunConfig::default()),
    }
}

async fn resolve_keyphrases(
    segments: &[transcribe::TranscriptSegment],
    engine: &KeywordEngine,
    app_config: Option<&AppConfig>,
) -> anyhow::Result<Vec<String>> {
    let full_text = transcribe::full_text(segments);
    let keyphrases = keywords::extract_keyphrases(&full_text, engine, app_config).await?;

    let phrases: Vec<String> = keyphrases
        .iter()
        .map(|k| k.phrase.to_lowercase())
        .collect();
    println!("Top keyphrases: {}", phrases.join(", "));

    Ok(phrases)
}

/// Cuts every accepted window, skipping individual ffmpeg failures so one bad
/// cut never aborts the remaining candidates.
fn cut_clips(
    input: &Path,
    windows: &[ClipWindow],
    out_dir: &Path,
) -> anyhow::Result<Vec<ClipRecord>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;

    let pb = ProgressBar::new(windows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut records = Vec::new();
    for window in windows {
        let output_file = out_dir.join(format!("highlight_{}.mp4", records.len() + 1));
        match ffmpeg::cut_clip(input, window.start, window.duration(), &output_file) {
            Ok(()) => records.push(ClipRecord {
                file: Some(output_file.to_string_lossy().into_owned()),
                start: window.start,
                end: window.end,
                normalized_score: window.normalized_score,
            }),
            Err(e) => eprintln!(
                "Failed to cut clip at {}: {}",
                output::format_timestamp(window.start),
                e
            ),
        }
        pb.inc(1);
    }
    pb.finish_with_message("Clip encoding complete");

    Ok(records)
}

fn report_clips(records: &[ClipRecord]) {
    for (i, record) in records.iter().enumerate() {
        let span = format!(
            "{} - {}",
            output::format_timestamp(record.start),
            output::format_timestamp(record.end)
        );
        match &record.file {
            Some(file) => println!(
                "Clip {} [{}] virality {}/100 -> {}",
                i + 1,
                span,
                record.normalized_score,
                file
            ),
            None => println!(
                "Clip {} [{}] virality {}/100",
                i + 1,
                span,
                record.normalized_score
            ),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            profile,
            lang,
            out_dir,
        } => {
            let app_config = config::load_app_config().context("Failed to load app config")?;
            let run_config = load_profile(profile.as_deref())?;

            let input_path = input.canonicalize().context("Failed to find input file")?;
            let file_stem = input_path.file_stem().unwrap().to_string_lossy();
            let parent_dir = input_path.parent().unwrap();

            // 1. Transcribe
            println!("Transcribing...");

            let mut pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% ({eta})",
                    )
                    .unwrap()
                    .progress_chars("#>-"),
            );

            let whisper_conf = run_config.whisper.clone().unwrap_or(WhisperConfig::default());

            let mut whisper = Whisper::new(&app_config.transcription, lang)
                .context("Failed to create Whisper instance")?;
            let segments = whisper
                .transcribe(&input_path, &whisper_conf, &mut pb)
                .context("Failed to transcribe")?;

            pb.finish_with_message("Transcription complete");

            let transcript_path = parent_dir.join(format!("{}.transcript.json", file_stem));
            output::save_transcript_json(&transcript_path, &segments)?;
            println!("Saved transcript to {:?}", transcript_path);

            // 2. Extract keyphrases
            println!("Extracting keyphrases...");
            let engine = run_config.keywords.clone().unwrap_or_default();
            let phrases = resolve_keyphrases(&segments, &engine, Some(&app_config)).await?;

            // 3. Select and cut highlights
            let highlight_conf = run_config.highlight.clone().unwrap_or_default();
            let windows = highlight::select_highlights(&segments, &phrases, &highlight_conf)?;

            let records = cut_clips(&input_path, &windows, &out_dir)?;
            if records.is_empty() {
                println!("No suitable highlights found.");
                return Ok(());
            }

            let manifest = HighlightManifest::new(records);
            let manifest_path = out_dir.join("highlights.json");
            output::save_manifest(&manifest_path, &manifest)?;
            println!("Saved manifest to {:?}", manifest_path);

            report_clips(&manifest.clips);
        }
        Commands::Select {
            transcript,
            video,
            profile,
            keywords,
            out_dir,
        } => {
            println!("Selecting highlights from transcript: {:?}", transcript);

            let run_config = load_profile(profile.as_deref())?;

            let transcript_content = std::fs::read_to_string(&transcript)
                .context("Failed to read transcript file")?;
            let segments: Vec<transcribe::TranscriptSegment> =
                serde_json::from_str(&transcript_content)?;

            if segments.is_empty() {
                anyhow::bail!("Transcript is empty");
            }

            // Keyphrases: explicit override first, engine otherwise.
            let phrases = match keywords {
                Some(list) => {
                    let phrases: Vec<String> = list
                        .split(',')
                        .map(|s| s.trim().to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect();
                    println!("Using keyphrases: {}", phrases.join(", "));
                    phrases
                }
                None => {
                    let engine = run_config.keywords.clone().unwrap_or_default();
                    // The frequency engine works without an app config.
                    let app_config = config::load_app_config().ok();
                    resolve_keyphrases(&segments, &engine, app_config.as_ref()).await?
                }
            };

            let highlight_conf = run_config.highlight.clone().unwrap_or_default();
            let windows = highlight::select_highlights(&segments, &phrases, &highlight_conf)?;

            if windows.is_empty() {
                println!("No suitable highlights found.");
                return Ok(());
            }

            let (records, manifest_path) = match video {
                Some(video) => {
                    let video_path =
                        video.canonicalize().context("Failed to find video file")?;
                    let records = cut_clips(&video_path, &windows, &out_dir)?;
                    if records.is_empty() {
                        println!("No suitable highlights found.");
                        return Ok(());
                    }
                    (records, out_dir.join("highlights.json"))
                }
                None => {
                    let records: Vec<ClipRecord> = windows
                        .iter()
                        .map(|w| ClipRecord {
                            file: None,
                            start: w.start,
                            end: w.end,
                            normalized_score: w.normalized_score,
                        })
                        .collect();

                    let raw_stem = transcript
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("output");
                    let file_stem = if raw_stem.ends_with(".transcript") {
                        raw_stem.trim_end_matches(".transcript")
                    } else {
                        raw_stem
                    };
                    let parent = transcript.parent().unwrap_or_else(|| Path::new("."));
                    (records, parent.join(format!("{}.highlights.json", file_stem)))
                }
            };

            let manifest = HighlightManifest::new(records);
            output::save_manifest(&manifest_path, &manifest)?;
            println!("Saved manifest to {:?}", manifest_path);

            report_clips(&manifest.clips);
        }
    }

    Ok(())
}
