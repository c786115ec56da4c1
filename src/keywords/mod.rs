pub mod llm;

use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, KeywordEngine};

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyphrase {
    pub phrase: String,
    pub relevance: f32,
}

/// Extracts ranked keyphrases from the transcript text with the configured
/// engine. A failed LLM round trip logs the error and falls back to the
/// offline frequency ranking instead of aborting the run.
pub async fn extract_keyphrases(
    text: &str,
    engine: &KeywordEngine,
    app_config: Option<&AppConfig>,
) -> Result<Vec<Keyphrase>> {
    match engine {
        KeywordEngine::Frequency { top_n } => {
            Ok(frequency_keyphrases(text, top_n.unwrap_or(DEFAULT_TOP_N)))
        }
        KeywordEngine::Llm { model, top_n } => {
            let top_n = top_n.unwrap_or(DEFAULT_TOP_N);
            let app_config = app_config
                .context("LLM keyword engine requires an app config with LLM providers")?;

            match llm::extract_keyphrases(text, model, top_n, app_config).await {
                Ok(phrases) if !phrases.is_empty() => Ok(phrases),
                Ok(_) => {
                    eprintln!("LLM returned no keyphrases, falling back to frequency ranking");
                    Ok(frequency_keyphrases(text, top_n))
                }
                Err(e) => {
                    eprintln!(
                        "Keyphrase extraction via LLM failed: {}. Falling back to frequency ranking.",
                        e
                    );
                    Ok(frequency_keyphrases(text, top_n))
                }
            }
        }
    }
}

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"[a-z0-9][a-z0-9']*").unwrap())
}

/// Offline keyphrase ranking: counts stopword-free unigrams and bigrams in the
/// lowercased text and keeps the `top_n` most frequent. Ties resolve by first
/// occurrence, then alphabetically, so the ranking is deterministic.
pub fn frequency_keyphrases(text: &str, top_n: usize) -> Vec<Keyphrase> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = word_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .collect();

    // phrase -> (count, first occurrence)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut bump = |phrase: String, position: usize| {
        let entry = counts.entry(phrase).or_insert((0, position));
        entry.0 += 1;
    };

    let usable = |w: &str| w.len() > 1 && !is_stopword(w);
    for (i, &word) in words.iter().enumerate() {
        if usable(word) {
            bump(word.to_string(), i);
        }
        if let Some(&next) = words.get(i + 1) {
            if usable(word) && usable(next) {
                bump(format!("{} {}", word, next), i);
            }
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(phrase, (count, first))| (phrase, count, first))
        .collect();
    // Count, then first occurrence, then the phrase itself: a total order, so
    // identical input always ranks identically.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)).then_with(|| a.0.cmp(&b.0)));

    let max_count = ranked.first().map(|r| r.1).unwrap_or(0);
    ranked
        .into_iter()
        .take(top_n)
        .map(|(phrase, count, _)| Keyphrase {
            phrase,
            relevance: count as f32 / max_count as f32,
        })
        .collect()
}

fn is_stopword(word: &str) -> bool {
    const STOPWORDS: &[&str] = &[
        "a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as",
        "at", "be", "because", "been", "before", "being", "but", "by", "can", "could", "did",
        "do", "does", "doing", "don't", "down", "for", "from", "had", "has", "have", "having",
        "he", "her", "here", "hers", "him", "his", "how", "i", "i'm", "if", "in", "into", "is",
        "it", "it's", "its", "just", "like", "me", "more", "most", "my", "no", "not", "now",
        "of", "off", "on", "once", "only", "or", "other", "our", "out", "over", "own", "re",
        "so", "some", "such", "than", "that", "that's", "the", "their", "them", "then",
        "there", "these", "they", "this", "those", "through", "to", "too", "under", "up",
        "us", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
        "why", "will", "with", "would", "you", "your", "you're",
    ];

    STOPWORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TALK: &str = "Machine learning is changing video editing. Machine learning models \
        transcribe speech, and editors cut the video around what the models find. \
        Speech is the signal; the signal follows the speech.";

    #[test]
    fn frequent_phrases_rank_first() {
        let phrases = frequency_keyphrases(TALK, 10);
        assert!(!phrases.is_empty());

        // "speech" appears three times, "machine learning" twice.
        let top: Vec<&str> = phrases.iter().map(|k| k.phrase.as_str()).collect();
        assert_eq!(top[0], "speech");
        assert!(top.contains(&"machine learning"));
        assert!(top.contains(&"video"));
    }

    #[test]
    fn stopwords_never_surface() {
        let phrases = frequency_keyphrases(TALK, 50);
        for keyphrase in &phrases {
            for word in keyphrase.phrase.split(' ') {
                assert!(!is_stopword(word), "stopword leaked: {}", keyphrase.phrase);
            }
        }
    }

    #[test]
    fn top_n_limits_the_output() {
        let phrases = frequency_keyphrases(TALK, 3);
        assert_eq!(phrases.len(), 3);
    }

    #[test]
    fn relevance_is_normalized_to_the_best_phrase() {
        let phrases = frequency_keyphrases(TALK, 10);
        assert_eq!(phrases[0].relevance, 1.0);
        for keyphrase in &phrases {
            assert!(keyphrase.relevance > 0.0 && keyphrase.relevance <= 1.0);
        }
    }

    #[test]
    fn ranking_is_deterministic() {
        let first = frequency_keyphrases(TALK, 10);
        let second = frequency_keyphrases(TALK, 10);

        let a: Vec<&str> = first.iter().map(|k| k.phrase.as_str()).collect();
        let b: Vec<&str> = second.iter().map(|k| k.phrase.as_str()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_text_yields_no_phrases() {
        assert!(frequency_keyphrases("", 10).is_empty());
    }

    #[test]
    fn bigrams_skip_stopword_boundaries() {
        let phrases = frequency_keyphrases("the cat sat on the mat", 20);
        let all: Vec<&str> = phrases.iter().map(|k| k.phrase.as_str()).collect();

        assert!(all.contains(&"cat"));
        assert!(all.contains(&"cat sat"));
        assert!(!all.iter().any(|p| p.starts_with("the ") || p.ends_with(" the")));
    }
}
