//! Request and response bodies of the forecast API.

use enrollcast_core::{
    ForecastConfig, ForecastMethod, ForecastResult, ForecastSummary, ParsedCommand,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `POST /api/chat` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
        }
    }
}

/// `POST /api/chat` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub parsed_command: Option<ParsedCommand>,
}

impl ChatReply {
    /// Whether the backend classified the message as a forecast request.
    pub fn is_forecast(&self) -> bool {
        self.parsed_command
            .as_ref()
            .is_some_and(|cmd| cmd.intent == "forecast")
    }
}

/// The subset of [`ForecastConfig`] sent with a forecast run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSettings {
    pub capacity: u32,
    pub progression_rate: f64,
    pub buffer_percent: u32,
}

impl From<&ForecastConfig> for ForecastSettings {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            capacity: config.capacity,
            progression_rate: config.progression_rate,
            buffer_percent: config.buffer_percent,
        }
    }
}

/// `POST /api/forecast` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub term: String,
    #[serde(default)]
    pub method: ForecastMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ForecastSettings>,
}

/// `POST /api/forecast` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub results: Vec<ForecastResult>,
    pub summary: ForecastSummary,
}

/// An uploaded enrollment data file known to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFile {
    pub name: String,
    pub term: String,
    pub records: u64,
    pub uploaded_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DataFilesResponse {
    pub files: Vec<DataFile>,
}

/// `GET /api/config` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub capacity: u32,
    pub progression_rate: f64,
    pub buffer_percent: f64,
    pub quarters_to_forecast: u32,
}

/// `PUT /api/config` body. Unset fields are left unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progression_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_percent: Option<u32>,
}

impl From<&ForecastConfig> for ConfigUpdate {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            capacity: Some(config.capacity),
            progression_rate: Some(config.progression_rate),
            buffer_percent: Some(config.buffer_percent),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UpdateResponse {
    pub success: bool,
}

/// `GET /api/health` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}
