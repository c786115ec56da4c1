use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Language {
    Auto,
    English,
    Korean,
    Japanese,
    Chinese,
    Spanish,
    French,
    German,
    Portuguese,
    Russian,
    Italian,
    Dutch,
    Arabic,
    Hindi,
    Turkish,
    Vietnamese,
    Polish,
    Indonesian,
    Thai,
    Ukrainian,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Auto => "auto",
            Language::English => "en",
            Language::Korean => "ko",
            Language::Japanese => "ja",
            Language::Chinese => "zh",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Portuguese => "pt",
            Language::Russian => "ru",
            Language::Italian => "it",
            Language::Dutch => "nl",
            Language::Arabic => "ar",
            Language::Hindi => "hi",
            Language::Turkish => "tr",
            Language::Vietnamese => "vi",
            Language::Polish => "pl",
            Language::Indonesian => "id",
            Language::Thai => "th",
            Language::Ukrainian => "uk",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Language {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Language::from(s.as_str()))
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        match s {
            "auto" => Language::Auto,
            "en" => Language::English,
            "ko" => Language::Korean,
            "ja" => Language::Japanese,
            "zh" => Language::Chinese,
            "es" => Language::Spanish,
            "fr" => Language::French,
            "de" => Language::German,
            "pt" => Language::Portuguese,
            "ru" => Language::Russian,
            "it" => Language::Italian,
            "nl" => Language::Dutch,
            "ar" => Language::Arabic,
            "hi" => Language::Hindi,
            "tr" => Language::Turkish,
            "vi" => Language::Vietnamese,
            "pl" => Language::Polish,
            "id" => Language::Indonesian,
            "th" => Language::Thai,
            "uk" => Language::Ukrainian,
            _ => Language::Auto,
        }
    }
}

impl std::str::FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Language::from(s))
    }
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranscriptionConfig {
    pub models: HashMap<Language, String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LlmConfig {
    #[serde(default)]
    pub providers: Vec<LlmProviderConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub enum ApiType {
    OpenAI,
    Ollama,
    Claude,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub enum JsonModeType {
    #[default]
    JsonObject,
    None,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmProviderConfig {
    pub id: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_type: ApiType,
    #[serde(default)]
    pub json_mode_type: JsonModeType,
}

#[derive(Debug, Deserialize, Default)]
pub struct RunConfig {
    pub whisper: Option<WhisperConfig>,
    pub keywords: Option<KeywordEngine>,
    pub highlight: Option<HighlightConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WhisperConfig {
    pub beam_size: Option<u32>,
    pub patience: Option<f32>,
    pub temperature: Option<f32>,
    pub initial_prompt: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum KeywordEngine {
    /// Offline n-gram frequency ranking over the transcript text.
    Frequency { top_n: Option<usize> },
    /// Keyphrase extraction through an LLM provider.
    Llm {
        model: String, // {provider_id}/{model}
        top_n: Option<usize>,
    },
}

impl Default for KeywordEngine {
    fn default() -> Self {
        KeywordEngine::Frequency { top_n: None }
    }
}

/// Selector parameters. An explicit struct handed to the selector so tests can
/// vary them; never process-wide state.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HighlightConfig {
    /// Maximum clip length in seconds.
    pub clip_duration: f64,
    /// How many clips to cut at most.
    pub num_clips: usize,
    /// Windows shorter than this are discarded.
    pub min_clip_length: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            clip_duration: 60.0,
            num_clips: 3,
            min_clip_length: 10.0,
        }
    }
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    let config_path = home.join(".hilite/config.yaml");

    if !config_path.exists() {
        anyhow::bail!("Config file not found at {:?}", config_path);
    }

    let content = std::fs::read_to_string(config_path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

pub fn load_run_config(path: &PathBuf) -> anyhow::Result<RunConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: RunConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_defaults_match_documented_values() {
        let conf = HighlightConfig::default();
        assert_eq!(conf.clip_duration, 60.0);
        assert_eq!(conf.num_clips, 3);
        assert_eq!(conf.min_clip_length, 10.0);
    }

    #[test]
    fn profile_yaml_overrides_selector_fields() {
        let yaml = r#"
whisper:
  beam_size: 3
keywords:
  type: Llm
  model: local/qwen3
  top_n: 5
highlight:
  clip_duration: 30.0
  num_clips: 2
"#;
        let conf: RunConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(conf.whisper.unwrap().beam_size, Some(3));
        match conf.keywords.unwrap() {
            KeywordEngine::Llm { model, top_n } => {
                assert_eq!(model, "local/qwen3");
                assert_eq!(top_n, Some(5));
            }
            other => panic!("unexpected engine: {:?}", other),
        }
        let highlight = conf.highlight.unwrap();
        assert_eq!(highlight.clip_duration, 30.0);
        assert_eq!(highlight.num_clips, 2);
        // Unset fields keep their defaults.
        assert_eq!(highlight.min_clip_length, 10.0);
    }

    #[test]
    fn language_round_trips_through_str() {
        assert_eq!(Language::from("ko"), Language::Korean);
        assert_eq!(Language::Korean.as_str(), "ko");
        assert_eq!(Language::from("unknown"), Language::Auto);
    }
}
