use anyhow::{Result, bail};
use serde::Serialize;

use crate::config::HighlightConfig;
use crate::transcribe::TranscriptSegment;

// Keeps zero-length segments from dividing by zero.
const DURATION_EPSILON: f64 = 1e-6;

// Keyword presence dominates; speech rate only breaks ties between
// segments with similar keyword counts.
const DENSITY_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone, Serialize)]
pub struct ScoredSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    pub keyword_hits: usize,
    pub speech_density: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipWindow {
    pub start: f64,
    pub end: f64,
    pub normalized_score: u32,
}

impl ClipWindow {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Scores every segment against the keyphrase set and returns them sorted by
/// score, best first. Equal scores keep their chronological order.
///
/// Keyphrases are expected lowercase; matching is plain substring counting, so
/// overlapping phrases ("machine", "machine learning") each count on their own.
pub fn rank_segments(
    segments: &[TranscriptSegment],
    keyphrases: &[String],
) -> Result<Vec<ScoredSegment>> {
    let mut scored = Vec::with_capacity(segments.len());

    for segment in segments {
        if segment.end < segment.start {
            bail!(
                "invalid segment: end {:.3}s precedes start {:.3}s ({:?})",
                segment.end,
                segment.start,
                segment.text
            );
        }

        let text = segment.text.to_lowercase();
        let keyword_hits: usize = keyphrases
            .iter()
            .filter(|kw| !kw.is_empty())
            .map(|kw| text.matches(kw.as_str()).count())
            .sum();
        let word_count = text.split_whitespace().count();
        let speech_density = word_count as f64 / (segment.end - segment.start + DURATION_EPSILON);
        let score = keyword_hits as f64 + DENSITY_WEIGHT * speech_density;

        scored.push(ScoredSegment {
            start: segment.start,
            end: segment.end,
            text: segment.text.clone(),
            keyword_hits,
            speech_density,
            score,
        });
    }

    // sort_by is stable, so chronological order survives ties.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(scored)
}

/// Turns the ranked segments into at most `num_clips` clip windows.
///
/// An empty result means no suitable highlights; it is a valid outcome, not an
/// error.
pub fn select_highlights(
    segments: &[TranscriptSegment],
    keyphrases: &[String],
    conf: &HighlightConfig,
) -> Result<Vec<ClipWindow>> {
    let ranked = rank_segments(segments, keyphrases)?;
    Ok(pick_windows(&ranked, conf))
}

fn pick_windows(ranked: &[ScoredSegment], conf: &HighlightConfig) -> Vec<ClipWindow> {
    // Scores normalize against the best segment overall, whether or not it
    // yields an accepted window.
    let top_score = ranked.first().map(|s| s.score).unwrap_or(0.0);

    let mut windows = Vec::new();
    for segment in ranked {
        if windows.len() >= conf.num_clips {
            break;
        }

        let start = segment.start;
        let end = (start + conf.clip_duration).min(segment.end);
        if end - start < conf.min_clip_length {
            continue;
        }

        windows.push(ClipWindow {
            start,
            end,
            normalized_score: normalize_score(segment.score, top_score),
        });
    }

    windows
}

// A transcript where nothing scores leaves top_score at zero; everything then
// normalizes to zero instead of dividing by it.
fn normalize_score(score: f64, top_score: f64) -> u32 {
    if top_score <= 0.0 {
        return 0;
    }
    (score / top_score * 100.0).min(100.0).round() as u32
}
