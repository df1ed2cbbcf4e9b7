// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage input types handed to the ledger after each model API response.

use serde::{Deserialize, Serialize};

use crate::error::CostLogError;

/// Token usage reported by one model API response.
///
/// `model` is the model the caller asked for; `response_model_tag` is the
/// model that actually served the request and is the key used for pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Requested model identifier.
    pub model: String,
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u64,
    /// Prompt plus completion tokens.
    pub total_tokens: u64,
    /// Response text for textual models, `None` for embeddings and similar.
    pub response_text: Option<String>,
    /// Model that served the request (may differ from `model`).
    pub response_model_tag: String,
}

impl UsageRecord {
    /// Create a record served by the same model that was requested.
    pub fn new(model: impl Into<String>, prompt_tokens: u64, total_tokens: u64) -> Self {
        let model = model.into();
        Self {
            response_model_tag: model.clone(),
            model,
            prompt_tokens,
            total_tokens,
            response_text: None,
        }
    }

    /// Attach the response text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.response_text = Some(text.into());
        self
    }

    /// Set the model tag reported by the server.
    pub fn served_by(mut self, tag: impl Into<String>) -> Self {
        self.response_model_tag = tag.into();
        self
    }

    /// Completion tokens, or `InvalidUsageData` when `total_tokens < prompt_tokens`.
    pub fn completion_tokens(&self) -> Result<u64, CostLogError> {
        self.total_tokens
            .checked_sub(self.prompt_tokens)
            .ok_or_else(|| {
                CostLogError::InvalidUsageData(format!(
                    "total_tokens ({}) is less than prompt_tokens ({})",
                    self.total_tokens, self.prompt_tokens
                ))
            })
    }

    /// Build a record from an OpenAI-style response body.
    ///
    /// Accepts chat completions (`choices[0].message.content`), legacy
    /// completions (`choices[0].text`) and embeddings (no choices). The
    /// `model` field of the body becomes the served-model tag; it falls back
    /// to `requested_model` when absent.
    pub fn from_chat_completion(requested_model: &str, body: &str) -> Result<Self, CostLogError> {
        let response: ApiResponse = serde_json::from_str(body).map_err(|e| {
            CostLogError::InvalidUsageData(format!("unparseable response body: {e}"))
        })?;
        let usage = response.usage.ok_or_else(|| {
            CostLogError::InvalidUsageData("response body has no `usage` object".to_string())
        })?;

        let response_text = response.choices.into_iter().next().and_then(|choice| {
            choice
                .message
                .and_then(|message| message.content)
                .or(choice.text)
        });

        Ok(Self {
            model: requested_model.to_string(),
            prompt_tokens: usage.prompt_tokens,
            total_tokens: usage.total_tokens,
            response_text,
            response_model_tag: response
                .model
                .unwrap_or_else(|| requested_model.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: Option<String>,
    usage: Option<ApiUsage>,
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u64,
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: Option<ApiMessage>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: Option<String>,
}
