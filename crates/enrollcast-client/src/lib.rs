//! HTTP client for the enrollment-forecasting backend.
//!
//! [`ForecastApi`] is the seam the chat orchestrator talks through;
//! [`HttpForecastApi`] implements it over JSON/HTTP with `reqwest`.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ForecastApi, HttpForecastApi};
pub use error::{ClientError, ClientResult};
pub use types::{
    ChatReply, ChatRequest, ConfigUpdate, DataFile, ForecastRequest, ForecastResponse,
    ForecastSettings, HealthStatus, ServerConfig,
};
