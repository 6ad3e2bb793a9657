//! The tool-use loop with model failover.
//!
//! One [`Orchestrator::respond`] call is an *exchange*. An exchange makes up
//! to one *attempt* per roster candidate; each attempt sends the
//! conversation, runs any requested tools, and sends their results back
//! until the model answers or the round limit is hit. Quota and
//! availability failures move the shared roster cursor and restart the
//! exchange on the next candidate. When no candidate can answer, the
//! fallback responder does.

use crate::adapter;
use crate::error::{Error, Result};
use crate::fallback;
use crate::llm::{Backend, Message, ModelError, ModelRequest, ProviderReply, ToolResult, Usage};
use crate::roster::ModelRoster;
use crate::tools::ToolRegistry;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use storage::{Context, ToolInvocation, Turn};
use tokio::time::Instant;
use uuid::Uuid;

/// Sends per attempt before the loop gives up.
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// Wall-clock budget for a whole exchange, failovers included.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(60);

/// The answer to one user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub message: String,
    /// Every tool executed for the successful attempt, in order.
    pub tool_calls: Vec<ToolInvocation>,
    /// Candidate identifier, or `"fallback"`.
    pub model_used: String,
    pub usage: Usage,
}

/// Drives the model through tool calls and failover.
///
/// `backend` is `None` when no credential is configured; every exchange then
/// goes straight to the fallback responder.
pub struct Orchestrator<B> {
    backend: Option<B>,
    roster: Arc<ModelRoster>,
    tools: Arc<ToolRegistry>,
    max_rounds: u32,
    exchange_timeout: Duration,
}

impl<B: Backend> Orchestrator<B> {
    pub fn new(backend: Option<B>, roster: Arc<ModelRoster>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            backend,
            roster,
            tools,
            max_rounds: DEFAULT_MAX_ROUNDS,
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
        }
    }

    /// At least one round is always allowed.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = timeout;
        self
    }

    pub fn roster(&self) -> &ModelRoster {
        &self.roster
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Whether a model backend is configured.
    pub fn is_live(&self) -> bool {
        self.backend.is_some()
    }

    /// Answer `user_message` given the prior `history` and known `context`.
    pub async fn respond(
        &self,
        user_message: &str,
        history: &[Turn],
        context: &Context,
    ) -> Result<Reply> {
        let Some(backend) = &self.backend else {
            tracing::debug!("no model credential configured; using fallback responder");
            return Ok(fallback::respond(&self.tools, user_message));
        };

        let exchange = Uuid::new_v4().to_string();
        let deadline = Instant::now() + self.exchange_timeout;

        for attempt in 1..=self.roster.len() {
            let cursor = self.roster.cursor();
            let candidate = &self.roster.candidates()[cursor];
            tracing::info!(
                model = %candidate.identifier,
                tier = %candidate.tier,
                daily_limit = %candidate.daily_limit,
                attempt,
                "using model"
            );

            let error = match self
                .attempt(backend, &candidate.identifier, user_message, history, context, &exchange, deadline)
                .await
            {
                Ok(reply) => return Ok(reply),
                Err(Error::Model(error)) => error,
                Err(other) => return Err(other),
            };

            if let ModelError::InvalidCredential(message) = &error {
                tracing::error!(%message, "model credential rejected; check the configured API key");
                return Ok(fallback::respond(&self.tools, user_message));
            }
            if !error.is_failover() {
                return Err(error.into());
            }

            tracing::warn!(model = %candidate.identifier, %error, "model failed");
            if !self.roster.advance_from(cursor) {
                break;
            }
        }

        tracing::error!("all models exhausted; using fallback responder");
        Ok(fallback::respond(&self.tools, user_message))
    }

    /// One candidate's try at the exchange, starting from a clean conversation.
    #[allow(clippy::too_many_arguments)]
    async fn attempt(
        &self,
        backend: &B,
        model: &str,
        user_message: &str,
        history: &[Turn],
        context: &Context,
        exchange: &str,
        deadline: Instant,
    ) -> Result<Reply> {
        let mut conversation = adapter::build_request(history, context, user_message);
        let mut tool_calls = Vec::new();
        let mut usage = Usage::default();

        for round in 1..=self.max_rounds {
            let request = ModelRequest {
                model,
                conversation: &conversation,
                tools: self.tools.specs(),
            };
            let response = tokio::time::timeout_at(deadline, backend.call(request))
                .await
                .map_err(|_| Error::DeadlineExceeded(self.exchange_timeout))??;
            usage += response.usage;

            let calls = match response.reply {
                ProviderReply::Final(message) => {
                    return Ok(Reply {
                        message,
                        tool_calls,
                        model_used: model.to_string(),
                        usage,
                    });
                }
                ProviderReply::ToolRequest(calls) => calls,
            };

            tracing::debug!(model, round, count = calls.len(), "model requested tools");
            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                let output = self.tools.execute_keyed(&call.name, &call.args, exchange);
                tool_calls.push(ToolInvocation {
                    tool: call.name.clone(),
                    args: call.args.clone(),
                    result: Value::Object(output.clone()),
                });
                results.push(ToolResult {
                    call_id: call.id.clone(),
                    name: call.name.clone(),
                    output,
                });
            }
            conversation.push(Message::tool_calls(&calls));
            conversation.push(Message::tool_results(results));
        }

        tracing::warn!(model, rounds = self.max_rounds, "round limit reached");
        Err(Error::ProtocolBoundExceeded {
            rounds: self.max_rounds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Conversation, ModelResponse, Part, ToolCall};
    use catalog::Catalog;
    use serde_json::json;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use storage::ShortlistStore;

    type Scripted = std::result::Result<ModelResponse, ModelError>;

    /// Replays canned responses per model and records every request.
    #[derive(Default)]
    struct FakeBackend {
        scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
        requests: Mutex<Vec<(String, Conversation)>>,
    }

    impl FakeBackend {
        fn script(self, model: &str, responses: Vec<Scripted>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(model.to_string(), responses.into());
            self
        }

        fn requests(&self) -> Vec<(String, Conversation)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Backend for FakeBackend {
        async fn call(&self, request: ModelRequest<'_>) -> std::result::Result<ModelResponse, ModelError> {
            self.requests
                .lock()
                .unwrap()
                .push((request.model.to_string(), request.conversation.clone()));
            self.scripts
                .lock()
                .unwrap()
                .get_mut(request.model)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Ok(text("(unscripted)")))
        }
    }

    fn text(message: &str) -> ModelResponse {
        ModelResponse {
            reply: ProviderReply::Final(message.to_string()),
            usage: Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
        }
    }

    fn tools(calls: Vec<ToolCall>) -> ModelResponse {
        ModelResponse {
            reply: ProviderReply::ToolRequest(calls),
            usage: Usage {
                prompt_tokens: 20,
                completion_tokens: 2,
                total_tokens: 22,
            },
        }
    }

    fn quota(model: &str) -> Scripted {
        Err(ModelError::from_status(model, 429, "RESOURCE_EXHAUSTED: quota"))
    }

    fn orchestrator(backend: Option<FakeBackend>) -> Orchestrator<FakeBackend> {
        Orchestrator::new(
            backend,
            Arc::new(ModelRoster::default_gemini()),
            Arc::new(ToolRegistry::concierge(
                Arc::new(Catalog::builtin().unwrap()),
                Arc::new(ShortlistStore::new()),
            )),
        )
    }

    fn backend(orchestrator: &Orchestrator<FakeBackend>) -> &FakeBackend {
        orchestrator.backend.as_ref().unwrap()
    }

    #[tokio::test]
    async fn plain_answer() {
        let o = orchestrator(Some(
            FakeBackend::default().script("gemini-2.5-pro", vec![Ok(text("Namaste!"))]),
        ));
        let reply = o.respond("hi", &[], &Context::default()).await.unwrap();
        assert_eq!(reply.message, "Namaste!");
        assert_eq!(reply.model_used, "gemini-2.5-pro");
        assert!(reply.tool_calls.is_empty());
        assert_eq!(reply.usage.total_tokens, 15);
    }

    #[tokio::test]
    async fn tool_round_trip() {
        let search = ToolCall::new(
            "search_catalog",
            json!({"query": "kundan", "filters": {"budget_max": 300000}}),
        );
        let o = orchestrator(Some(FakeBackend::default().script(
            "gemini-2.5-pro",
            vec![Ok(tools(vec![search])), Ok(text("Here are kundan sets."))],
        )));

        let reply = o
            .respond("kundan under 3 lakh", &[], &Context::default())
            .await
            .unwrap();
        assert_eq!(reply.message, "Here are kundan sets.");
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(reply.tool_calls[0].tool, "search_catalog");
        assert_eq!(reply.tool_calls[0].args["query"], "kundan");
        assert!(reply.tool_calls[0].result["total_count"].as_u64().unwrap() > 0);
        assert_eq!(reply.usage.total_tokens, 37);

        let requests = backend(&o).requests();
        assert_eq!(requests.len(), 2);
        let follow_up = &requests[1].1.messages;
        assert_eq!(follow_up.len(), 3);
        assert!(matches!(follow_up[1].parts[0], Part::ToolCall(_)));
        let Part::ToolResult(result) = &follow_up[2].parts[0] else {
            panic!("expected tool result");
        };
        assert_eq!(result.name, "search_catalog");
    }

    #[tokio::test]
    async fn calls_run_in_provider_order_and_results_batch() {
        let o = orchestrator(Some(FakeBackend::default().script(
            "gemini-2.5-pro",
            vec![
                Ok(tools(vec![
                    ToolCall::new("get_item_details", json!({"item_id": "J002"})),
                    ToolCall::new("get_delivery_date", json!({"item_id": "J002", "pincode": "400001"})),
                ])),
                Ok(text("done")),
            ],
        )));
        let reply = o.respond("J002 to Mumbai?", &[], &Context::default()).await.unwrap();
        let names: Vec<_> = reply.tool_calls.iter().map(|c| c.tool.as_str()).collect();
        assert_eq!(names, ["get_item_details", "get_delivery_date"]);

        let requests = backend(&o).requests();
        assert_eq!(requests[1].1.messages[2].parts.len(), 2);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_the_model() {
        let o = orchestrator(Some(FakeBackend::default().script(
            "gemini-2.5-pro",
            vec![
                Ok(tools(vec![ToolCall::new("book_flight", json!({"to": "Goa"}))])),
                Ok(text("I can't book flights.")),
            ],
        )));
        let reply = o.respond("fly me to Goa", &[], &Context::default()).await.unwrap();
        assert_eq!(reply.tool_calls[0].result["error"], true);
        assert_eq!(reply.tool_calls[0].result["message"], "Unknown tool: book_flight");
        assert_eq!(reply.message, "I can't book flights.");
    }

    #[tokio::test]
    async fn failover_restarts_the_exchange() {
        let contact = ToolCall::new(
            "send_contact_vendor",
            json!({"vendor_id": "V001", "message": "Is the bridal set available?"}),
        );
        let o = orchestrator(Some(
            FakeBackend::default()
                .script(
                    "gemini-2.5-pro",
                    vec![Ok(tools(vec![contact.clone()])), quota("gemini-2.5-pro")],
                )
                .script(
                    "gemini-2.0-flash",
                    vec![Ok(tools(vec![contact])), Ok(text("Sent!"))],
                ),
        ));

        let reply = o.respond("contact them", &[], &Context::default()).await.unwrap();
        assert_eq!(reply.model_used, "gemini-2.0-flash");
        assert_eq!(reply.message, "Sent!");
        // Only the successful attempt's calls are reported.
        assert_eq!(reply.tool_calls.len(), 1);
        assert_eq!(o.roster().cursor(), 1);

        // The retry starts from the user message, not the failed attempt's rounds.
        let requests = backend(&o).requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[2].0, "gemini-2.0-flash");
        assert_eq!(requests[2].1.messages.len(), 1);
    }

    #[tokio::test]
    async fn replayed_vendor_contact_keeps_its_confirmation() {
        let contact = ToolCall::new(
            "send_contact_vendor",
            json!({"vendor_id": "V004", "message": "Need 400 boxes by March"}),
        );
        let o = orchestrator(Some(
            FakeBackend::default()
                .script(
                    "gemini-2.5-pro",
                    vec![Ok(tools(vec![contact.clone()])), quota("gemini-2.5-pro")],
                )
                .script(
                    "gemini-2.0-flash",
                    vec![Ok(tools(vec![contact])), Ok(text("Sent!"))],
                ),
        ));
        o.respond("contact Patra", &[], &Context::default()).await.unwrap();

        let requests = backend(&o).requests();
        let confirmation = |i: usize| match &requests[i].1.messages[2].parts[0] {
            Part::ToolResult(r) => r.output["confirmation_id"].clone(),
            _ => panic!("expected tool result"),
        };
        assert_eq!(confirmation(1), confirmation(3));
    }

    #[tokio::test]
    async fn exhausted_roster_falls_back() {
        let mut fake = FakeBackend::default();
        let ids: Vec<String> = ModelRoster::default_gemini()
            .candidates()
            .iter()
            .map(|c| c.identifier.clone())
            .collect();
        for id in &ids {
            fake = fake.script(
                id,
                vec![Err(ModelError::from_status(id, 404, "model not found"))],
            );
        }
        let o = orchestrator(Some(fake));

        let reply = o.respond("show me jewelry", &[], &Context::default()).await.unwrap();
        assert_eq!(reply.model_used, "fallback");
        assert_eq!(reply.tool_calls[0].tool, "search_catalog");
        assert_eq!(backend(&o).requests().len(), ids.len());
        assert_eq!(o.roster().cursor(), ids.len() - 1);
    }

    #[tokio::test]
    async fn invalid_credential_falls_back_without_advancing() {
        let o = orchestrator(Some(FakeBackend::default().script(
            "gemini-2.5-pro",
            vec![Err(ModelError::from_status(
                "gemini-2.5-pro",
                400,
                "INVALID_ARGUMENT: API key not valid (API_KEY_INVALID)",
            ))],
        )));
        let reply = o.respond("hello", &[], &Context::default()).await.unwrap();
        assert_eq!(reply.model_used, "fallback");
        assert!(reply.message.starts_with("Namaste!"));
        assert_eq!(o.roster().cursor(), 0);
    }

    #[tokio::test]
    async fn other_errors_are_fatal() {
        let o = orchestrator(Some(FakeBackend::default().script(
            "gemini-2.5-pro",
            vec![Err(ModelError::Network("connection reset".into()))],
        )));
        let err = o.respond("hello", &[], &Context::default()).await.unwrap_err();
        assert!(matches!(err, Error::Model(ModelError::Network(_))));
        assert_eq!(o.roster().cursor(), 0);

        let o = orchestrator(Some(FakeBackend::default().script(
            "gemini-2.5-pro",
            vec![Err(ModelError::from_status("gemini-2.5-pro", 500, "INTERNAL: oops"))],
        )));
        let err = o.respond("hello", &[], &Context::default()).await.unwrap_err();
        assert!(matches!(err, Error::Model(ModelError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn round_limit_is_exact() {
        let again = || -> Scripted {
            Ok(tools(vec![ToolCall::new("generate_moodboard", json!({"prompt": "pastel"}))]))
        };
        let o = orchestrator(Some(FakeBackend::default().script(
            "gemini-2.5-pro",
            vec![again(), again(), again(), Ok(text("never reached"))],
        )))
        .with_max_rounds(3);

        let err = o.respond("moodboard", &[], &Context::default()).await.unwrap_err();
        assert!(matches!(err, Error::ProtocolBoundExceeded { rounds: 3 }));
        assert_eq!(backend(&o).requests().len(), 3);
    }

    #[tokio::test]
    async fn no_backend_uses_fallback() {
        let o = orchestrator(None);
        assert!(!o.is_live());
        let reply = o.respond("need invitation cards", &[], &Context::default()).await.unwrap();
        assert_eq!(reply.model_used, "fallback");
        assert_eq!(reply.tool_calls[0].args["filters"]["category"], "invites");
    }

    #[tokio::test]
    async fn fallback_and_live_replies_share_a_shape() {
        let live = orchestrator(Some(
            FakeBackend::default().script("gemini-2.5-pro", vec![Ok(text("hi"))]),
        ))
        .respond("hi", &[], &Context::default())
        .await
        .unwrap();
        let canned = orchestrator(None)
            .respond("hi", &[], &Context::default())
            .await
            .unwrap();

        let keys = |reply: &Reply| {
            let value = serde_json::to_value(reply).unwrap();
            let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        };
        assert_eq!(keys(&live), keys(&canned));
        assert_eq!(keys(&live), ["message", "model_used", "tool_calls", "usage"]);
    }

    #[tokio::test]
    async fn history_and_context_reach_the_model() {
        let o = orchestrator(Some(
            FakeBackend::default().script("gemini-2.5-pro", vec![Ok(text("ok"))]),
        ));
        let history = vec![Turn::user("need jewelry"), Turn::assistant("Budget?", vec![])];
        let context = Context {
            city: Some("Jaipur".into()),
            ..Default::default()
        };
        o.respond("3 lakh", &history, &context).await.unwrap();

        let (_, conversation) = &backend(&o).requests()[0];
        assert_eq!(conversation.messages.len(), 3);
        assert!(conversation.system.contains(r#""city":"Jaipur""#));
    }

    struct SlowBackend;

    impl Backend for SlowBackend {
        async fn call(&self, _request: ModelRequest<'_>) -> std::result::Result<ModelResponse, ModelError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(text("too late"))
        }
    }

    #[tokio::test]
    async fn slow_exchange_hits_the_deadline() {
        let o = Orchestrator::new(
            Some(SlowBackend),
            Arc::new(ModelRoster::default_gemini()),
            Arc::new(ToolRegistry::new(Vec::new())),
        )
        .with_exchange_timeout(Duration::from_millis(20));
        let err = o.respond("hi", &[], &Context::default()).await.unwrap_err();
        assert!(matches!(err, Error::DeadlineExceeded(_)));
    }
}
