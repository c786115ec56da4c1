pub mod whisper;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TranscriptSegment {
    pub start: f64, // seconds
    pub end: f64,   // seconds
    pub text: String,
}

/// Joins all segment texts into the transcript's full text, for keyphrase
/// extraction.
pub fn full_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_text_joins_trimmed_segments() {
        let segments = vec![
            TranscriptSegment {
                start: 0.0,
                end: 1.0,
                text: " hello".to_string(),
            },
            TranscriptSegment {
                start: 1.0,
                end: 2.0,
                text: " world ".to_string(),
            },
        ];
        assert_eq!(full_text(&segments), "hello world");
    }
}
