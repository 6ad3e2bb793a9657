//! Gemini `generateContent` backend.

use crate::llm::{
    Backend, Conversation, Message, ModelError, ModelRequest, ModelResponse, Part, ProviderReply,
    Role, ToolCall, ToolSpec, Usage,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    system_instruction: ApiContent,
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTools<'a>>,
    generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiTools<'a> {
    function_declarations: Vec<ApiFunctionDeclaration<'a>>,
}

#[derive(Debug, Serialize)]
struct ApiFunctionDeclaration<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ApiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

/// One part of a content block; exactly one payload field is set.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<ApiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<ApiFunctionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    response: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Translation
// ─────────────────────────────────────────────────────────────────────────────

fn role_to_api(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

fn part_to_api(part: &Part) -> ApiPart {
    match part {
        Part::Text(text) => ApiPart {
            text: Some(text.clone()),
            ..Default::default()
        },
        Part::ToolCall(call) => ApiPart {
            function_call: Some(ApiFunctionCall {
                id: call.id.clone(),
                name: call.name.clone(),
                args: call.args.clone(),
            }),
            thought_signature: call.signature.clone(),
            ..Default::default()
        },
        Part::ToolResult(result) => ApiPart {
            function_response: Some(ApiFunctionResponse {
                id: result.call_id.clone(),
                name: result.name.clone(),
                response: result.output.clone(),
            }),
            ..Default::default()
        },
    }
}

fn message_to_api(message: &Message) -> ApiContent {
    ApiContent {
        role: Some(role_to_api(message.role).to_string()),
        parts: message.parts.iter().map(part_to_api).collect(),
    }
}

fn to_wire<'a>(
    conversation: &Conversation,
    tools: &'a [ToolSpec],
    generation: ApiGenerationConfig,
) -> ApiRequest<'a> {
    let declarations: Vec<ApiFunctionDeclaration<'a>> = tools
        .iter()
        .map(|t| ApiFunctionDeclaration {
            name: &t.name,
            description: &t.description,
            parameters: &t.parameters,
        })
        .collect();

    ApiRequest {
        system_instruction: ApiContent {
            role: None,
            parts: vec![ApiPart {
                text: Some(conversation.system.clone()),
                ..Default::default()
            }],
        },
        contents: conversation.messages.iter().map(message_to_api).collect(),
        tools: if declarations.is_empty() {
            Vec::new()
        } else {
            vec![ApiTools {
                function_declarations: declarations,
            }]
        },
        generation_config: generation,
    }
}

fn reply_from_wire(response: ApiResponse) -> Result<ModelResponse, ModelError> {
    let usage = response
        .usage_metadata
        .map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
        .unwrap_or_default();

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::InvalidResponse("no candidates".to_string()))?;
    let content = candidate.content.ok_or_else(|| {
        ModelError::InvalidResponse(format!(
            "candidate has no content (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))
    })?;

    let mut calls = Vec::new();
    let mut text = String::new();
    for part in content.parts {
        if let Some(call) = part.function_call {
            calls.push(ToolCall {
                id: call.id,
                name: call.name,
                args: call.args,
                signature: part.thought_signature,
            });
        } else if let Some(t) = part.text {
            if part.thought != Some(true) {
                text.push_str(&t);
            }
        }
    }

    let reply = if calls.is_empty() {
        ProviderReply::Final(text)
    } else {
        ProviderReply::ToolRequest(calls)
    };
    Ok(ModelResponse { reply, usage })
}

/// `STATUS: message (REASON)` from an error body, or the raw body.
fn error_text(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) else {
        return body.to_string();
    };
    let reasons: Vec<&str> = parsed
        .error
        .details
        .iter()
        .filter_map(|d| d.get("reason").and_then(Value::as_str))
        .collect();
    let mut text = format!("{}: {}", parsed.error.status, parsed.error.message);
    if !reasons.is_empty() {
        text.push_str(&format!(" ({})", reasons.join(", ")));
    }
    text
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating a Gemini backend.
#[derive(Debug, Clone)]
pub struct GeminiBackendBuilder {
    api_key: String,
    base_url: String,
    max_output_tokens: u32,
    temperature: f32,
}

impl GeminiBackendBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GEMINI_API_URL.to_string(),
            max_output_tokens: 1024,
            temperature: 0.7,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn build(self) -> GeminiBackend {
        GeminiBackend {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }
}

/// Gemini REST backend. The model is chosen per request.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_output_tokens: u32,
    temperature: f32,
}

impl GeminiBackend {
    pub fn builder(api_key: impl Into<String>) -> GeminiBackendBuilder {
        GeminiBackendBuilder::new(api_key)
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }
}

impl std::fmt::Display for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gemini({})", self.base_url)
    }
}

impl Backend for GeminiBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let body = to_wire(
            request.conversation,
            request.tools,
            ApiGenerationConfig {
                max_output_tokens: self.max_output_tokens,
                temperature: self.temperature,
            },
        );

        let response = self
            .client
            .post(self.endpoint(request.model))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::from_status(
                request.model,
                status.as_u16(),
                error_text(&body),
            ));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
        reply_from_wire(api_response)
    }
}
