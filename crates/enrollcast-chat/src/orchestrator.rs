//! Chat orchestrator: owns the conversation and drives the backend.
//!
//! Sends each message to the forecasting API, runs a forecast when the
//! backend recognises one, and answers locally through the intent parser
//! whenever the backend cannot be used.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;

use enrollcast_client::{
    ChatReply, ChatRequest, ClientResult, ConfigUpdate, ForecastApi, ForecastRequest,
    ForecastResponse, ForecastSettings,
};
use enrollcast_core::config::ChatConfig;
use enrollcast_core::{
    ForecastConfig, ForecastMethod, ForecastResult, ForecastSummary, Message, MessageMetadata,
    DEFAULT_ACCURACY,
};

use crate::error::ChatError;
use crate::history::ConversationHistory;
use crate::parser::IntentParser;
use crate::response::{CLEARED_GREETING, WELCOME_GREETING};

/// Sets the loading flag for its lifetime.
///
/// Dropping the guard clears the flag, so loading ends on success, failure,
/// or when the send future is dropped.
struct LoadingGuard(Arc<AtomicBool>);

impl LoadingGuard {
    fn engage(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Result of a successful backend round trip.
struct Exchange {
    reply: ChatReply,
    forecast: Option<ForecastResponse>,
}

/// Central chat orchestrator.
///
/// Sends take `&mut self`, so one orchestrator never has two requests in
/// flight.
pub struct ChatOrchestrator {
    api: Arc<dyn ForecastApi>,
    parser: IntentParser,
    history: ConversationHistory,
    messages: Vec<Message>,
    loading: Arc<AtomicBool>,
    forecast_results: Option<Vec<ForecastResult>>,
    forecast_summary: Option<ForecastSummary>,
    config: ForecastConfig,
    max_message_length: usize,
}

impl ChatOrchestrator {
    /// Create an orchestrator seeded with the welcome greeting.
    pub fn new(api: Arc<dyn ForecastApi>, config: ForecastConfig, chat: ChatConfig) -> Self {
        Self {
            api,
            parser: IntentParser::new(),
            history: ConversationHistory::new(chat.history_limit),
            messages: vec![Message::assistant(WELCOME_GREETING)],
            loading: Arc::new(AtomicBool::new(false)),
            forecast_results: None,
            forecast_summary: None,
            config,
            max_message_length: chat.max_message_length,
        }
    }

    /// Handle an incoming user message.
    ///
    /// Appends the user message, then the assistant reply, and returns a copy
    /// of the reply. Backend failures never surface here: they are logged and
    /// answered by the offline parser instead.
    pub async fn send_message(&mut self, text: &str) -> Result<Message, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }

        self.messages.push(Message::user(text));
        let _loading = LoadingGuard::engage(Arc::clone(&self.loading));

        let reply = match self.exchange(text).await {
            Ok(Exchange { reply, forecast }) => {
                if let Some(forecast) = forecast {
                    self.store_forecast(forecast);
                }
                let metadata = reply.parsed_command.map(|mut cmd| {
                    cmd.raw_message = text.to_string();
                    MessageMetadata {
                        parsed_command: Some(cmd),
                    }
                });
                Message::assistant(reply.message).with_metadata(metadata)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Forecast API unavailable, answering locally");
                let fallback = self.parser.classify(text, self.config.effective_term());
                tracing::debug!(intent = fallback.intent.name(), "Fallback reply composed");
                let metadata = fallback.metadata();
                if fallback.show_forecast {
                    self.forecast_results = fallback.results;
                    self.forecast_summary = fallback.summary;
                }
                Message::assistant(fallback.message).with_metadata(metadata)
            }
        };

        self.messages.push(reply.clone());
        Ok(reply)
    }

    /// Archive the current conversation and start over with a greeting.
    pub fn clear_messages(&mut self) {
        if let Some(summary) = self.history.archive(&self.messages) {
            tracing::debug!(title = %summary.title, "Conversation archived");
        }
        self.messages = vec![Message::assistant(CLEARED_GREETING)];
        self.forecast_results = None;
        self.forecast_summary = None;
    }

    /// Replace the forecast config after validating it.
    ///
    /// An invalid config is rejected and the previous one kept.
    pub fn update_config(&mut self, config: ForecastConfig) -> Result<(), ChatError> {
        config.validate()?;
        tracing::info!(
            capacity = config.capacity,
            progression_rate = config.progression_rate,
            buffer_percent = config.buffer_percent,
            term = %config.term,
            "Forecast config updated"
        );
        self.config = config;
        Ok(())
    }

    /// Push the current forecast config to the backend.
    pub async fn sync_config(&self) -> Result<bool, ChatError> {
        let accepted = self
            .api
            .update_server_config(&ConfigUpdate::from(&self.config))
            .await?;
        Ok(accepted)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Shared loading flag.
    ///
    /// `send_message` holds `&mut self` until it finishes, so a front end
    /// that wants to show a busy state while a send is in flight keeps this
    /// handle and reads it instead of calling [`is_loading`](Self::is_loading).
    pub fn loading_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.loading)
    }

    pub fn forecast_results(&self) -> Option<&[ForecastResult]> {
        self.forecast_results.as_deref()
    }

    pub fn forecast_summary(&self) -> Option<&ForecastSummary> {
        self.forecast_summary.as_ref()
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// The backend this orchestrator talks to.
    pub fn api(&self) -> &Arc<dyn ForecastApi> {
        &self.api
    }

    // -- Private helpers --

    /// Chat call, followed by a forecast run when the backend asks for one.
    async fn exchange(&self, text: &str) -> ClientResult<Exchange> {
        let reply = self.api.chat(&ChatRequest::new(text)).await?;

        if !reply.is_forecast() {
            return Ok(Exchange {
                reply,
                forecast: None,
            });
        }

        let term = reply
            .parsed_command
            .as_ref()
            .and_then(|cmd| cmd.term())
            .unwrap_or_else(|| self.config.effective_term())
            .to_string();
        tracing::info!(term = %term, "Running forecast");

        let request = ForecastRequest {
            term,
            method: ForecastMethod::Sequence,
            config: Some(ForecastSettings::from(&self.config)),
        };
        let forecast = self.api.run_forecast(&request).await?;
        Ok(Exchange {
            reply,
            forecast: Some(forecast),
        })
    }

    fn store_forecast(&mut self, forecast: ForecastResponse) {
        let mut summary = forecast.summary;
        summary.last_updated = Some(Utc::now());
        summary.accuracy = Some(DEFAULT_ACCURACY);
        self.forecast_results = Some(forecast.results);
        self.forecast_summary = Some(summary);
    }
}

// =============================================================================
// Tests
// =============================================================================
