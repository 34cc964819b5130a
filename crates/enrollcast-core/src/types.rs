use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{EnrollcastError, Result};

/// Term used when neither the message nor the config names one.
pub const DEFAULT_TERM: &str = "Spring 2026";

/// Accuracy figure shown alongside forecast summaries.
pub const DEFAULT_ACCURACY: u32 = 94;

// =============================================================================
// Enums
// =============================================================================

/// Author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Forecasting method requested from the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMethod {
    /// Course-sequence progression (the backend default).
    #[default]
    Sequence,
    /// Prophet time-series model.
    Prophet,
    /// Seat-demand projection.
    Demand,
}

// =============================================================================
// Chat messages
// =============================================================================

/// Structured interpretation of a user utterance.
///
/// Field names match the backend's JSON (`raw_message` is snake_case there).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub intent: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    pub confidence: f32,
    #[serde(default)]
    pub raw_message: String,
}

impl ParsedCommand {
    /// The `term` parameter, if present and non-empty.
    pub fn term(&self) -> Option<&str> {
        self.parameters
            .get("term")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
    }
}

/// Extra data attached to an assistant reply.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_command: Option<ParsedCommand>,
}

/// A single chat message. Immutable once appended to a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadata>,
}

impl Message {
    /// Create a message stamped with a fresh id and the current time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Attach metadata, consuming and returning the message.
    pub fn with_metadata(mut self, metadata: Option<MessageMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// The parsed command attached to this message, if any.
    pub fn parsed_command(&self) -> Option<&ParsedCommand> {
        self.metadata.as_ref()?.parsed_command.as_ref()
    }
}

// =============================================================================
// Forecasting
// =============================================================================

/// Parameters governing a forecast run.
///
/// Serialized in the backend's camelCase; snake_case aliases are accepted so
/// TOML config files can use either spelling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForecastConfig {
    /// Seats per section.
    pub capacity: u32,
    /// Fraction of students progressing to the next course (0.0 to 1.0).
    #[serde(alias = "progression_rate")]
    pub progression_rate: f64,
    /// Extra seats to plan for, as a percentage.
    #[serde(alias = "buffer_percent")]
    pub buffer_percent: u32,
    #[serde(alias = "quarters_to_forecast")]
    pub quarters_to_forecast: u32,
    /// Default academic term, e.g. "Spring 2026".
    pub term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campus: Option<String>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            progression_rate: 0.95,
            buffer_percent: 10,
            quarters_to_forecast: 2,
            term: DEFAULT_TERM.to_string(),
            campus: None,
        }
    }
}

impl ForecastConfig {
    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(invalid("capacity", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.progression_rate) {
            return Err(invalid("progressionRate", "must be between 0 and 1"));
        }
        if self.buffer_percent > 100 {
            return Err(invalid("bufferPercent", "must be between 0 and 100"));
        }
        if self.quarters_to_forecast == 0 {
            return Err(invalid("quartersToForecast", "must be at least 1"));
        }
        if self.term.trim().is_empty() {
            return Err(invalid("term", "must not be empty"));
        }
        Ok(())
    }

    /// The configured term, or [`DEFAULT_TERM`] when blank.
    pub fn effective_term(&self) -> &str {
        if self.term.trim().is_empty() {
            DEFAULT_TERM
        } else {
            &self.term
        }
    }
}

fn invalid(field: &str, reason: &str) -> EnrollcastError {
    EnrollcastError::InvalidForecastConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Projected enrollment for one course at one campus.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub course: String,
    pub campus: String,
    pub projected_seats: f64,
    pub sections: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
}

/// Aggregate figures for a forecast run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub total_students: f64,
    pub total_sections: u32,
    pub courses_forecasted: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<u32>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

// =============================================================================
// History
// =============================================================================

/// An archived conversation as listed in the history view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
}
