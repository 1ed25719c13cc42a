//! Run Adapter Loop use case
//!
//! Bridges a function-calling [`ReasoningModel`] and a connected tool host:
//!
//! ```text
//! user utterance
//!      │
//!      ▼
//! ┌──────────┐  tool-call intents  ┌────────────┐  tools/call  ┌──────┐
//! │  model   │────────────────────▶│ this loop  │─────────────▶│ host │
//! │          │◀────────────────────│            │◀─────────────│      │
//! └──────────┘  ToolResult turns   └────────────┘    result    └──────┘
//!      │
//!      ▼ (no intents)
//! final answer
//! ```
//!
//! Each round sends the whole conversation plus the translated function
//! declarations. Intents are resolved one at a time, in the order the model
//! emitted them, and every result (including transport failures) is appended
//! before the model is asked again, so the conversation never leaves this
//! loop with an unanswered tool call.

use crate::config::AdapterParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::AdapterProgressNotifier;
use crate::ports::reasoning_model::{GenerationParams, ModelError, ReasoningModel};
use crate::ports::tool_client::ToolClientPort;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use toolwire_domain::{Conversation, ModelResponse, ToolCallRequest, ToolCallResult, Turn};
use tracing::{debug, info, warn};

/// Failure text recorded for a tool call abandoned by cancellation
const CANCELLED_CALL_MESSAGE: &str = "tool call cancelled";

/// Errors that end an utterance without an answer
#[derive(Error, Debug)]
pub enum RunAdapterError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Empty utterance")]
    EmptyUtterance,

    #[error("Operation cancelled")]
    Cancelled,
}

/// How the utterance ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterOutcome {
    /// The model produced a response without tool-call intents.
    Completed,
    /// The round limit was reached while the model still wanted tools.
    ToolCallLimitExceeded,
}

/// One resolved tool call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallRecord {
    pub call: ToolCallRequest,
    pub result: ToolCallResult,
}

/// Output of one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct RunAdapterOutput {
    /// Text shown to the user.
    pub answer: String,
    pub outcome: AdapterOutcome,
    /// Every tool call made while producing the answer, in order.
    pub tool_calls: Vec<ToolCallRecord>,
}

impl RunAdapterOutput {
    pub fn is_completed(&self) -> bool {
        self.outcome == AdapterOutcome::Completed
    }
}

/// Use case driving the model ⇄ tool host loop for one utterance at a time
pub struct RunAdapterLoopUseCase<C: ToolClientPort + ?Sized, M: ReasoningModel + ?Sized> {
    client: Arc<C>,
    model: Arc<M>,
    params: AdapterParams,
    conversation_logger: Arc<dyn ConversationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl<C: ToolClientPort + ?Sized, M: ReasoningModel + ?Sized> RunAdapterLoopUseCase<C, M> {
    pub fn new(client: Arc<C>, model: Arc<M>, params: AdapterParams) -> Self {
        Self {
            client,
            model,
            params,
            conversation_logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Set a cancellation token for interrupting a pending model request or tool call
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn params(&self) -> &AdapterParams {
        &self.params
    }

    /// Handle one user utterance, appending every turn to `conversation`.
    pub async fn execute(
        &self,
        conversation: &mut Conversation,
        utterance: &str,
        progress: &dyn AdapterProgressNotifier,
    ) -> Result<RunAdapterOutput, RunAdapterError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(RunAdapterError::EmptyUtterance);
        }

        conversation.push(Turn::user(utterance));
        self.conversation_logger.log(ConversationEvent::new(
            "user_message",
            serde_json::json!({ "text": utterance }),
        ));

        let tools = self.client.tools();
        let declarations = self.model.dialect().declare_all(&tools);
        let generation = GenerationParams {
            temperature: self.params.temperature,
        };
        let max_rounds = self.params.max_tool_rounds;

        info!(
            model = self.model.name(),
            tools = tools.len(),
            "Starting adapter loop"
        );

        let mut rounds = 0;
        let mut records = Vec::new();

        loop {
            progress.on_model_request(rounds);
            let response = self.generate(conversation, &declarations, generation).await?;

            let calls = response.tool_calls();
            let text = response.text_content();

            if calls.is_empty() {
                conversation.push(Turn::assistant(text.clone()));
                self.conversation_logger.log(ConversationEvent::new(
                    "assistant_message",
                    serde_json::json!({ "text": text, "rounds": rounds }),
                ));
                return Ok(RunAdapterOutput {
                    answer: text,
                    outcome: AdapterOutcome::Completed,
                    tool_calls: records,
                });
            }

            if rounds >= max_rounds {
                warn!("Adapter loop exceeded max_tool_rounds ({})", max_rounds);
                let answer = format!("tool-call limit exceeded ({} rounds)", max_rounds);
                conversation.push(Turn::assistant(answer.clone()));
                self.conversation_logger.log(ConversationEvent::new(
                    "tool_call_limit",
                    serde_json::json!({
                        "max_tool_rounds": max_rounds,
                        "dropped_calls": calls.len(),
                    }),
                ));
                progress.on_limit_exceeded(max_rounds);
                return Ok(RunAdapterOutput {
                    answer,
                    outcome: AdapterOutcome::ToolCallLimitExceeded,
                    tool_calls: records,
                });
            }
            rounds += 1;

            if !text.is_empty() {
                conversation.push(Turn::assistant(text));
            }

            for call in calls {
                let result = self.resolve(&call, progress).await;
                conversation.push(Turn::tool_call(call.clone()));
                conversation.push(Turn::tool_result(&call.tool_name, result.clone()));
                records.push(ToolCallRecord { call, result });

                // remaining intents are dropped unasked, so nothing is left unresolved
                if self.is_cancelled() {
                    return Err(RunAdapterError::Cancelled);
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation_token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    async fn generate(
        &self,
        conversation: &Conversation,
        declarations: &[serde_json::Value],
        params: GenerationParams,
    ) -> Result<ModelResponse, RunAdapterError> {
        let request = self.model.generate(conversation, declarations, params);
        let response = match &self.cancellation_token {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(RunAdapterError::Cancelled),
                    response = request => response,
                }
            }
            None => request.await,
        };
        response.map_err(|e| {
            warn!(model = self.model.name(), error = %e, "Model request failed");
            RunAdapterError::Model(e)
        })
    }

    /// Call one tool, narrating client-side failures (and cancellation) as
    /// failure results.
    async fn resolve(
        &self,
        call: &ToolCallRequest,
        progress: &dyn AdapterProgressNotifier,
    ) -> ToolCallResult {
        progress.on_tool_call(call);
        self.conversation_logger.log(ConversationEvent::new(
            "tool_call",
            serde_json::json!({
                "tool": call.tool_name,
                "arguments": call.arguments,
            }),
        ));

        let request = self.client.call_tool(call);
        let outcome = match &self.cancellation_token {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    outcome = request => Some(outcome),
                }
            }
            None => Some(request.await),
        };

        let result = match outcome {
            None => {
                info!(tool = %call.tool_name, "Tool call cancelled");
                ToolCallResult::failure(CANCELLED_CALL_MESSAGE)
            }
            Some(Ok(result)) => result,
            Some(Err(e)) => {
                warn!(tool = %call.tool_name, error = %e, "Tool call failed at the client");
                ToolCallResult::failure(e.to_string())
            }
        };

        debug!(
            tool = %call.tool_name,
            success = result.is_success(),
            "Tool call resolved"
        );
        progress.on_tool_result(&call.tool_name, &result);
        self.conversation_logger.log(ConversationEvent::new(
            "tool_result",
            serde_json::json!({
                "tool": call.tool_name,
                "result": result,
            }),
        ));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoAdapterProgress;
    use crate::ports::reasoning_model::{FunctionDialect, JsonSchemaDialect};
    use crate::ports::tool_client::ToolClientError;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use toolwire_domain::{ParamType, ToolDescriptor, ToolParameter, TurnContent};

    /// Model that replays a fixed script of responses
    struct ScriptedModel {
        responses: Mutex<VecDeque<Result<ModelResponse, ModelError>>>,
        seen_functions: Mutex<Vec<usize>>,
    }

    impl ScriptedModel {
        fn new(responses: Vec<Result<ModelResponse, ModelError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen_functions: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ReasoningModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        fn dialect(&self) -> &dyn FunctionDialect {
            &JsonSchemaDialect
        }

        async fn generate(
            &self,
            _conversation: &Conversation,
            functions: &[Value],
            _params: GenerationParams,
        ) -> Result<ModelResponse, ModelError> {
            self.seen_functions.lock().unwrap().push(functions.len());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ModelResponse::from_text("done")))
        }
    }

    /// Model that asks for a tool on every request
    struct StubbornModel;

    #[async_trait]
    impl ReasoningModel for StubbornModel {
        fn name(&self) -> &str {
            "stubborn"
        }

        fn dialect(&self) -> &dyn FunctionDialect {
            &JsonSchemaDialect
        }

        async fn generate(
            &self,
            _conversation: &Conversation,
            _functions: &[Value],
            _params: GenerationParams,
        ) -> Result<ModelResponse, ModelError> {
            Ok(ModelResponse::tool_call("echo", args(json!({"text": "again"}))))
        }
    }

    /// Tool client backed by a closure, recording every call
    struct MockClient {
        calls: Mutex<Vec<String>>,
        fail_with: Option<ToolClientError>,
    }

    impl MockClient {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_with: None,
            }
        }

        fn failing(err: ToolClientError) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_with: Some(err),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ToolClientPort for MockClient {
        fn tools(&self) -> Vec<ToolDescriptor> {
            vec![
                ToolDescriptor::new("echo", "Echo text back")
                    .with_parameter(ToolParameter::new("text", ParamType::String, true)),
                ToolDescriptor::new("sum", "Add two integers")
                    .with_parameter(ToolParameter::new("a", ParamType::Integer, true))
                    .with_parameter(ToolParameter::new("b", ParamType::Integer, true)),
            ]
        }

        async fn call_tool(
            &self,
            request: &ToolCallRequest,
        ) -> Result<ToolCallResult, ToolClientError> {
            self.calls.lock().unwrap().push(request.tool_name.clone());
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            match request.tool_name.as_str() {
                "echo" => Ok(ToolCallResult::success(request.arguments["text"].clone())),
                "sum" => {
                    let a = request.get_i64("a").unwrap_or_default();
                    let b = request.get_i64("b").unwrap_or_default();
                    Ok(ToolCallResult::success(json!(a + b)))
                }
                other => Ok(ToolCallResult::unknown_tool(other)),
            }
        }
    }

    /// Tool client whose calls only finish after a long delay
    struct SlowClient {
        delay: std::time::Duration,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ToolClientPort for SlowClient {
        fn tools(&self) -> Vec<ToolDescriptor> {
            vec![ToolDescriptor::new("echo", "Echo text back")]
        }

        async fn call_tool(
            &self,
            request: &ToolCallRequest,
        ) -> Result<ToolCallResult, ToolClientError> {
            self.calls.lock().unwrap().push(request.tool_name.clone());
            tokio::time::sleep(self.delay).await;
            Ok(ToolCallResult::success("late"))
        }
    }

    /// Progress notifier that records the callbacks it receives
    #[derive(Default)]
    struct TrackingProgress {
        events: Mutex<Vec<String>>,
    }

    impl AdapterProgressNotifier for TrackingProgress {
        fn on_model_request(&self, round: usize) {
            self.events.lock().unwrap().push(format!("model:{round}"));
        }

        fn on_tool_call(&self, call: &ToolCallRequest) {
            self.events
                .lock()
                .unwrap()
                .push(format!("call:{}", call.tool_name));
        }

        fn on_tool_result(&self, tool_name: &str, result: &ToolCallResult) {
            self.events
                .lock()
                .unwrap()
                .push(format!("result:{tool_name}:{}", result.is_success()));
        }
    }

    fn args(value: Value) -> toolwire_domain::Arguments {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_plain_answer_without_tools() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(ModelResponse::from_text(
            "Hello there",
        ))]));
        let client = Arc::new(MockClient::new());
        let use_case = RunAdapterLoopUseCase::new(client.clone(), model.clone(), Default::default());

        let mut conversation = Conversation::new();
        let output = use_case
            .execute(&mut conversation, "hi", &NoAdapterProgress)
            .await
            .unwrap();

        assert_eq!(output.answer, "Hello there");
        assert!(output.is_completed());
        assert!(output.tool_calls.is_empty());
        assert!(client.calls().is_empty());
        assert_eq!(conversation.len(), 2);
        assert_eq!(*model.seen_functions.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_single_tool_round() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(ModelResponse::tool_call("sum", args(json!({"a": 2, "b": 3})))),
            Ok(ModelResponse::from_text("The sum is 5.")),
        ]));
        let client = Arc::new(MockClient::new());
        let progress = TrackingProgress::default();
        let use_case = RunAdapterLoopUseCase::new(client.clone(), model, Default::default());

        let mut conversation = Conversation::new();
        let output = use_case
            .execute(&mut conversation, "what is 2 + 3?", &progress)
            .await
            .unwrap();

        assert_eq!(output.answer, "The sum is 5.");
        assert_eq!(output.tool_calls.len(), 1);
        assert_eq!(output.tool_calls[0].result, ToolCallResult::success(json!(5)));
        assert!(conversation.is_resolved());
        assert_eq!(
            *progress.events.lock().unwrap(),
            vec!["model:0", "call:sum", "result:sum:true", "model:1"]
        );
    }

    #[tokio::test]
    async fn test_multiple_intents_resolved_in_order() {
        let mut response = ModelResponse::tool_call("echo", args(json!({"text": "a"})));
        response.content.extend(
            ModelResponse::tool_call("sum", args(json!({"a": 1, "b": 1}))).content,
        );
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(response),
            Ok(ModelResponse::from_text("ok")),
        ]));
        let client = Arc::new(MockClient::new());
        let use_case = RunAdapterLoopUseCase::new(client.clone(), model, Default::default());

        let mut conversation = Conversation::new();
        let output = use_case
            .execute(&mut conversation, "do both", &NoAdapterProgress)
            .await
            .unwrap();

        assert_eq!(client.calls(), vec!["echo", "sum"]);
        assert_eq!(output.tool_calls.len(), 2);

        // call / result pairs alternate in the transcript
        let kinds: Vec<_> = conversation
            .turns()
            .iter()
            .map(|t| match &t.content {
                TurnContent::Text { .. } => "text",
                TurnContent::ToolCall { .. } => "call",
                TurnContent::ToolResult { .. } => "result",
            })
            .collect();
        assert_eq!(kinds, vec!["text", "call", "result", "call", "result", "text"]);
    }

    #[tokio::test]
    async fn test_transport_failure_is_narrated() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(ModelResponse::tool_call("echo", args(json!({"text": "x"})))),
            Ok(ModelResponse::from_text("The tool host is unavailable.")),
        ]));
        let client = Arc::new(MockClient::failing(ToolClientError::ConnectionLost(
            "broken pipe".to_string(),
        )));
        let use_case = RunAdapterLoopUseCase::new(client, model, Default::default());

        let mut conversation = Conversation::new();
        let output = use_case
            .execute(&mut conversation, "echo x", &NoAdapterProgress)
            .await
            .unwrap();

        assert!(output.is_completed());
        let result = &output.tool_calls[0].result;
        assert!(!result.is_success());
        assert!(
            result
                .failure_message()
                .unwrap()
                .contains("connection to tool host lost")
        );
        assert!(conversation.is_resolved());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_narrated() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(ModelResponse::tool_call("nope", Default::default())),
            Ok(ModelResponse::from_text("That tool does not exist.")),
        ]));
        let client = Arc::new(MockClient::new());
        let use_case = RunAdapterLoopUseCase::new(client, model, Default::default());

        let mut conversation = Conversation::new();
        let output = use_case
            .execute(&mut conversation, "use nope", &NoAdapterProgress)
            .await
            .unwrap();

        assert_eq!(
            output.tool_calls[0].result.failure_message(),
            Some("unknown tool: nope")
        );
    }

    #[tokio::test]
    async fn test_limit_exceeded_terminates() {
        let client = Arc::new(MockClient::new());
        let params = AdapterParams::default().with_max_tool_rounds(3);
        let use_case = RunAdapterLoopUseCase::new(client.clone(), Arc::new(StubbornModel), params);

        let mut conversation = Conversation::new();
        let output = use_case
            .execute(&mut conversation, "loop forever", &NoAdapterProgress)
            .await
            .unwrap();

        assert_eq!(output.outcome, AdapterOutcome::ToolCallLimitExceeded);
        assert_eq!(output.answer, "tool-call limit exceeded (3 rounds)");
        assert_eq!(client.calls().len(), 3);
        assert!(conversation.is_resolved());
        assert_eq!(
            conversation.last().and_then(|t| t.text()),
            Some("tool-call limit exceeded (3 rounds)")
        );
    }

    #[tokio::test]
    async fn test_model_error_is_returned() {
        let model = Arc::new(ScriptedModel::new(vec![
            Ok(ModelResponse::tool_call("echo", args(json!({"text": "x"})))),
            Err(ModelError::RequestFailed("503".to_string())),
        ]));
        let client = Arc::new(MockClient::new());
        let use_case = RunAdapterLoopUseCase::new(client, model, Default::default());

        let mut conversation = Conversation::new();
        let err = use_case
            .execute(&mut conversation, "echo x", &NoAdapterProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, RunAdapterError::Model(ModelError::RequestFailed(_))));
        assert!(conversation.is_resolved());
    }

    #[tokio::test]
    async fn test_empty_utterance_rejected() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let client = Arc::new(MockClient::new());
        let use_case = RunAdapterLoopUseCase::new(client, model, Default::default());

        let mut conversation = Conversation::new();
        let err = use_case
            .execute(&mut conversation, "   ", &NoAdapterProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, RunAdapterError::EmptyUtterance));
        assert!(conversation.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_model_request() {
        let token = CancellationToken::new();
        token.cancel();
        let use_case = RunAdapterLoopUseCase::new(
            Arc::new(MockClient::new()),
            Arc::new(StubbornModel),
            Default::default(),
        )
        .with_cancellation(token);

        let mut conversation = Conversation::new();
        let err = use_case
            .execute(&mut conversation, "hi", &NoAdapterProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, RunAdapterError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_tool_call() {
        let mut response = ModelResponse::tool_call("echo", args(json!({"text": "a"})));
        response.content.extend(
            ModelResponse::tool_call("echo", args(json!({"text": "b"}))).content,
        );
        let model = Arc::new(ScriptedModel::new(vec![Ok(response)]));
        let client = Arc::new(SlowClient {
            delay: std::time::Duration::from_secs(30),
            calls: Mutex::new(Vec::new()),
        });
        let token = CancellationToken::new();
        let use_case = RunAdapterLoopUseCase::new(client.clone(), model, Default::default())
            .with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            token.cancel();
        });

        let started = std::time::Instant::now();
        let mut conversation = Conversation::new();
        let err = use_case
            .execute(&mut conversation, "echo twice", &NoAdapterProgress)
            .await
            .unwrap_err();
        canceller.await.unwrap();

        assert!(matches!(err, RunAdapterError::Cancelled));
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(*client.calls.lock().unwrap(), vec!["echo"]);
        assert!(conversation.is_resolved());
        assert_eq!(
            conversation.last().map(|t| &t.content),
            Some(&TurnContent::ToolResult {
                tool_name: "echo".to_string(),
                result: ToolCallResult::failure("tool call cancelled"),
            })
        );
    }
}
