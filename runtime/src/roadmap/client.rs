//! OpenAI-compatible chat completions client for roadmap generation.

use super::{build_prompt, Roadmap, UserProfile, SYSTEM_PROMPT};
use crate::config::LlmConfig;
use crate::error::RoadmapError;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for the roadmap model.
#[derive(Clone)]
pub struct RoadmapClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl RoadmapClient {
    pub fn new(config: LlmConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.as_str().trim_end_matches('/')
        )
    }

    /// Ask the model for a roadmap tailored to `profile`.
    pub async fn generate(&self, profile: &UserProfile) -> Result<Roadmap, RoadmapError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(RoadmapError::MissingApiKey)?;

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(profile) },
            ],
        });

        debug!(model = %self.config.model, country = %profile.target_country, "requesting roadmap");

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "model endpoint rejected roadmap request");
            return Err(RoadmapError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = resp.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(RoadmapError::EmptyResponse)?;

        parse_roadmap(&content)
    }
}

/// Parse the model's answer, tolerating a surrounding Markdown code fence.
pub fn parse_roadmap(content: &str) -> Result<Roadmap, RoadmapError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(unfenced.trim()).map_err(|e| {
        warn!(error = %e, "model output is not a roadmap object");
        RoadmapError::ModelOutput {
            raw: content.to_string(),
        }
    })
}
