use crate::transcribe::TranscriptSegment;
use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

pub fn save_transcript_json(path: &Path, segments: &[TranscriptSegment]) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, segments)?;
    Ok(())
}

/// One cut (or selected-only) highlight as it appears in the manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ClipRecord {
    /// Path of the encoded clip; absent when only selection ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub start: f64,
    pub end: f64,
    pub normalized_score: u32,
}

#[derive(Debug, Serialize)]
pub struct HighlightManifest {
    pub generated_at: String,
    pub clips: Vec<ClipRecord>,
}

impl HighlightManifest {
    pub fn new(clips: Vec<ClipRecord>) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            clips,
        }
    }
}

pub fn save_manifest(path: &Path, manifest: &HighlightManifest) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, manifest)?;
    Ok(())
}

pub fn format_timestamp(seconds: f64) -> String {
    let ms = (seconds * 1000.0).round() as i64;
    let hours = ms / 3600000;
    let minutes = (ms % 3600000) / 60000;
    let secs = (ms % 60000) / 1000;
    let millis = ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_format_as_srt_style() {
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_timestamp(5.25), "00:00:05,250");
        assert_eq!(format_timestamp(65.0), "00:01:05,000");
        assert_eq!(format_timestamp(3661.5), "01:01:01,500");
    }

    #[test]
    fn manifest_omits_file_when_not_cut() {
        let manifest = HighlightManifest::new(vec![ClipRecord {
            file: None,
            start: 5.0,
            end: 65.0,
            normalized_score: 100,
        }]);

        let json = serde_json::to_string(&manifest).unwrap();
        assert!(!json.contains("\"file\""));
        assert!(json.contains("\"normalized_score\":100"));
        assert!(json.contains("generated_at"));
    }

    #[test]
    fn manifest_keeps_clip_order() {
        let manifest = HighlightManifest::new(vec![
            ClipRecord {
                file: Some("highlight_1.mp4".to_string()),
                start: 5.0,
                end: 65.0,
                normalized_score: 100,
            },
            ClipRecord {
                file: Some("highlight_2.mp4".to_string()),
                start: 120.0,
                end: 150.0,
                normalized_score: 40,
            },
        ]);

        let json = serde_json::to_string(&manifest).unwrap();
        let first = json.find("highlight_1.mp4").unwrap();
        let second = json.find("highlight_2.mp4").unwrap();
        assert!(first < second);
    }
}
