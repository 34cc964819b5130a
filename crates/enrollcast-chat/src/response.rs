//! Canned replies for offline operation.
//!
//! Composes the assistant's answer for each [`Intent`] without a backend,
//! including fixed demonstration forecast data.

use chrono::Utc;
use serde_json::{Map, Value};

use enrollcast_core::{
    ForecastConfig, ForecastResult, ForecastSummary, MessageMetadata, ParsedCommand,
    DEFAULT_ACCURACY,
};

use crate::parser::Intent;

/// Confidence reported for locally recognised forecast requests.
pub const FALLBACK_CONFIDENCE: f32 = 0.95;

/// Greeting shown when a session starts.
pub const WELCOME_GREETING: &str = "Hi! I'm your FOUN Forecasting Assistant. I can help you predict enrollment trends, analyze historical data, and generate comprehensive forecast reports. Ask me anything about forecasting!";

/// Greeting shown after the conversation is cleared.
pub const CLEARED_GREETING: &str =
    "Chat cleared. How can I help you with your enrollment forecasting today?";

const HELP_TEXT: &str = "I can help you with:\n\n\
• **Forecast enrollments** - \"Forecast Spring 2026\" or \"Show me Fall projections\"\n\
• **Compare methods** - \"Compare Prophet vs sequence-based\"\n\
• **Adjust settings** - \"Set capacity to 25 students\"\n\
• **Upload data** - \"Upload enrollment data\"\n\
• **View trends** - \"Show FOUN 110 trends\"\n\n\
What would you like to do?";

const CLARIFY_TEXT: &str = "I understand you're asking about forecasting. Could you be more specific? Try:\n\n\
• \"Forecast Spring 2026 enrollments\"\n\
• \"Compare forecasting methods\"\n\
• \"Show current settings\"\n\
• \"Help\"";

// =============================================================================
// FallbackReply
// =============================================================================

/// Everything the orchestrator needs to answer a message locally.
#[derive(Debug, Clone)]
pub struct FallbackReply {
    /// Reply text.
    pub message: String,
    pub intent: Intent,
    pub parameters: Map<String, Value>,
    /// Whether the results view should be replaced with `results`/`summary`.
    pub show_forecast: bool,
    pub results: Option<Vec<ForecastResult>>,
    pub summary: Option<ForecastSummary>,
    /// Set for forecast replies only.
    pub parsed_command: Option<ParsedCommand>,
}

impl FallbackReply {
    /// Metadata to attach to the assistant message.
    pub fn metadata(&self) -> Option<MessageMetadata> {
        self.parsed_command.as_ref().map(|cmd| MessageMetadata {
            parsed_command: Some(cmd.clone()),
        })
    }
}

/// Compose the offline reply for a classified message.
pub fn fallback_reply(raw: &str, intent: Intent, parameters: Map<String, Value>) -> FallbackReply {
    let message = match &intent {
        Intent::Forecast { term } => forecast_text(term),
        Intent::Help => HELP_TEXT.to_string(),
        Intent::Settings => settings_text(&ForecastConfig::default()),
        Intent::Unknown => CLARIFY_TEXT.to_string(),
    };

    if !intent.is_forecast() {
        return FallbackReply {
            message,
            intent,
            parameters,
            show_forecast: false,
            results: None,
            summary: None,
            parsed_command: None,
        };
    }

    let parsed_command = ParsedCommand {
        intent: intent.name().to_string(),
        parameters: parameters.clone(),
        confidence: FALLBACK_CONFIDENCE,
        raw_message: raw.to_string(),
    };
    FallbackReply {
        message,
        intent,
        parameters,
        show_forecast: true,
        results: Some(demo_results()),
        summary: Some(demo_summary()),
        parsed_command: Some(parsed_command),
    }
}

fn forecast_text(term: &str) -> String {
    format!(
        "Here is the forecast for {} enrollments based on current models and historical data trends. \
         The projections suggest a moderate growth trajectory, particularly in online programs.",
        term
    )
}

/// Describe forecast settings the way the settings panel lists them.
pub fn settings_text(config: &ForecastConfig) -> String {
    format!(
        "Current forecast settings:\n\n\
         • **Capacity**: {} students/section\n\
         • **Progression Rate**: {}%\n\
         • **Buffer**: {}%\n\
         • **Method**: Sequence-based\n\n\
         You can adjust these by saying things like \"Set capacity to 25\" or \"Change buffer to 15%\".",
        config.capacity,
        (config.progression_rate * 100.0).round() as u32,
        config.buffer_percent,
    )
}

// =============================================================================
// Demonstration data
// =============================================================================

fn demo_row(
    course: &str,
    campus: &str,
    seats: f64,
    sections: u32,
    change: f64,
    pct: f64,
) -> ForecastResult {
    ForecastResult {
        course: course.to_string(),
        campus: campus.to_string(),
        projected_seats: seats,
        sections,
        change: Some(change),
        change_percent: Some(pct),
    }
}

/// Fixed forecast rows shown when the backend is unreachable.
pub fn demo_results() -> Vec<ForecastResult> {
    vec![
        demo_row("FOUN 110", "Savannah", 380.0, 19, 5.0, 3.0),
        demo_row("FOUN 110", "SCADnow", 120.0, 6, 15.0, 10.0),
        demo_row("FOUN 112", "Savannah", 260.0, 13, 3.0, 2.0),
        demo_row("FOUN 113", "Savannah", 340.0, 17, 8.0, 5.0),
        demo_row("FOUN 250", "Savannah", 200.0, 10, -2.0, -1.0),
        demo_row("FOUN 251", "Savannah", 180.0, 9, 4.0, 3.0),
    ]
}

/// Summary accompanying [`demo_results`].
pub fn demo_summary() -> ForecastSummary {
    ForecastSummary {
        total_students: 1480.0,
        total_sections: 74,
        courses_forecasted: 15,
        accuracy: Some(DEFAULT_ACCURACY),
        method: "Sequence-based".to_string(),
        last_updated: Some(Utc::now()),
    }
}

// =============================================================================
// Tests
// =============================================================================
