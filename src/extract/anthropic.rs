//! Anthropic Messages API extractor

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ExtractError, ExtractResult, ExtractedRequest, ExtractionContext, RequestExtractor};
use crate::build_info::BuildInfo;
use crate::config::ExtractorConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 256;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Extractor backed by a hosted Claude model
pub struct AnthropicExtractor {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl AnthropicExtractor {
    pub fn new(config: &ExtractorConfig) -> ExtractResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ExtractError::NotConfigured("ANTHROPIC_API_KEY is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(BuildInfo::current().user_agent())
            .build()
            .map_err(|e| ExtractError::Unavailable(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: config.endpoint.clone(),
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl RequestExtractor for AnthropicExtractor {
    async fn extract(
        &self,
        text: &str,
        context: &ExtractionContext<'_>,
    ) -> ExtractResult<ExtractedRequest> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system: system_prompt(context),
            messages: vec![Message { role: "user", content: text }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractError::Timeout(self.timeout.as_secs())
                } else {
                    ExtractError::Unavailable(e.to_string())
                }
            })?;

        check_status(response.status())?;

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ExtractError::MalformedResponse(e.to_string()))?;

        read_reply(&reply)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

fn system_prompt(context: &ExtractionContext<'_>) -> String {
    format!(
        "You extract laboratory unit-conversion requests.\n\
         Known analytes: {}.\n\
         Supported units: {}.\n\
         Reply with only a JSON object with the keys \"analyte\", \"value\", \
         \"unit_from\" and \"unit_to\". Use an analyte name exactly as listed and a \
         unit symbol exactly as listed. Use null for anything the request does not \
         state. Do not guess.",
        context.analytes.join(", "),
        context.units.join(", ")
    )
}

/// Any non-2xx answer means the service cannot be used right now
fn check_status(status: reqwest::StatusCode) -> ExtractResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ExtractError::Unavailable(format!("HTTP {}", status)))
    }
}

/// Pull the request fields out of the first text block of a reply
fn read_reply(reply: &MessagesResponse) -> ExtractResult<ExtractedRequest> {
    let text = reply
        .content
        .iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text.as_deref())
        .ok_or_else(|| ExtractError::MalformedResponse("no text block in reply".to_string()))?;

    tracing::debug!("Extractor reply: {}", text);
    parse_reply(text)
}

/// Parse the outermost `{...}` span of a model reply
fn parse_reply(text: &str) -> ExtractResult<ExtractedRequest> {
    let span = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(ExtractError::MalformedResponse(
                "reply contains no JSON object".to_string(),
            ))
        }
    };

    let payload: Value = serde_json::from_str(span)
        .map_err(|e| ExtractError::MalformedResponse(e.to_string()))?;
    ExtractedRequest::from_json(&payload)
}
