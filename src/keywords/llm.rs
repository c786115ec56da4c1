use anyhow::{Context, Result};

use super::Keyphrase;
use crate::config::AppConfig;
use crate::llm::{LlmClient, Message};

pub async fn extract_keyphrases(
    text: &str,
    llm_str: &str, // "provider_id/model"
    top_n: usize,
    app_config: &AppConfig,
) -> Result<Vec<Keyphrase>> {
    let (provider_id, model_name) = llm_str.split_once('/').unwrap_or((llm_str, "default"));

    let provider_config = app_config
        .llm
        .providers
        .iter()
        .find(|p| p.id == provider_id)
        .ok_or_else(|| anyhow::anyhow!("Provider {} not found", provider_id))?;

    let client = LlmClient::new(provider_config.clone());

    let system_prompt = format!(
        "You extract representative keyphrases from video transcripts. \
        Pick the {} phrases (one or two lowercase words each) that best capture what the video is about, \
        and rate each phrase's relevance between 0.0 and 1.0, most relevant first. \
        Output ONLY the JSON response: [{{ \"phrase\": \"...\", \"relevance\": 0.9 }}, ...]",
        top_n
    );

    let messages = vec![
        Message {
            role: "system".to_string(),
            content: system_prompt,
        },
        Message {
            role: "user".to_string(),
            content: format!("Transcript:\n{}", text),
        },
    ];

    let response_text = client.chat_completion(model_name, messages, true).await?;

    // Strip markdown code fences if the LLM adds them.
    let clean_response = response_text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let mut phrases: Vec<Keyphrase> = serde_json::from_str(clean_response)
        .with_context(|| format!("Failed to parse keyphrase JSON: {}", response_text))?;

    phrases.truncate(top_n);
    for keyphrase in &mut phrases {
        keyphrase.phrase = keyphrase.phrase.trim().to_lowercase();
    }
    phrases.retain(|k| !k.phrase.is_empty());

    Ok(phrases)
}
