use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::formulas::{backfill_prompt, formula_prompt, SYSTEM_PROMPT};
use super::ports::{EvaluationError, FormulaEvaluator, IndustryBackfill};
use crate::config::EvaluatorConfig;
use crate::scoring::{MetricMap, SubfactorScores};

const EXCERPT_LIMIT: usize = 200;

/// Chat-completions client backing both evaluation ports.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: EvaluatorConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl LlmClient {
    pub fn new(config: EvaluatorConfig) -> Result<Self, EvaluationError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    async fn complete(&self, prompt: &str) -> Result<String, EvaluationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(EvaluationError::NotConfigured("ESG_LLM_API_KEY is not set"))?;

        let request = ChatRequest {
            model: &self.config.model_name,
            temperature: 0.0,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        debug!(%url, model = %self.config.model_name, "sending evaluator request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "evaluator request rejected");
            return Err(EvaluationError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        let reply: ChatResponse = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(EvaluationError::EmptyResponse)
    }

    async fn request_scores(&self, prompt: &str) -> Result<SubfactorScores, EvaluationError> {
        let content = self.complete(prompt).await?;
        let payload = parse_json_payload(&content)?;
        Ok(SubfactorScores::from_json("evaluator response", &payload)?)
    }
}

impl FormulaEvaluator for LlmClient {
    async fn evaluate(&self, metrics: &MetricMap) -> Result<SubfactorScores, EvaluationError> {
        self.request_scores(&formula_prompt(metrics)).await
    }
}

impl IndustryBackfill for LlmClient {
    async fn backfill(&self, scores: &SubfactorScores) -> Result<SubfactorScores, EvaluationError> {
        self.request_scores(&backfill_prompt(scores)).await
    }
}

/// Removes a surrounding Markdown code fence (with or without a language tag).
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Language tag, if any, runs up to the first non-alphanumeric character.
    let tag_len = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    let body = rest[tag_len..].trim();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parses model output as JSON. Unstructured text is an error, never a result.
pub fn parse_json_payload(content: &str) -> Result<Value, EvaluationError> {
    let stripped = strip_code_fences(content);
    serde_json::from_str(stripped).map_err(|_| EvaluationError::MalformedResponse {
        excerpt: excerpt(stripped),
    })
}

fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let mut out: String = chars.by_ref().take(EXCERPT_LIMIT).collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}
