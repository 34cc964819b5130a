//! Offline intent parser.
//!
//! Classifies free-text input into a fixed set of intents and extracts the
//! academic term, course and campus. Used when the backend cannot be reached.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::response::{self, FallbackReply};

// =============================================================================
// Compiled patterns (compiled once, reused across calls)
// =============================================================================

// Four-digit years are tried first so "2026" is not read as "20".
static TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(spring|summer|fall|winter)\s*(\d{4}|\d{2})").expect("Invalid term regex")
});

static COURSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"foun\s*(\d{3})").expect("Invalid course regex"));

const FORECAST_KEYWORDS: &[&str] = &["forecast"];
const HELP_KEYWORDS: &[&str] = &["help", "what can you do"];
const SETTINGS_KEYWORDS: &[&str] = &["setting", "config"];

// =============================================================================
// Intent
// =============================================================================

/// The classified purpose of a user utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Run a forecast for the given term.
    Forecast { term: String },
    /// List what the assistant can do.
    Help,
    /// Show the forecast settings.
    Settings,
    /// Nothing recognised; ask the user to be more specific.
    Unknown,
}

impl Intent {
    /// Wire name of the intent, as the backend reports it.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Forecast { .. } => "forecast",
            Intent::Help => "help",
            Intent::Settings => "settings",
            Intent::Unknown => "unknown",
        }
    }

    pub fn is_forecast(&self) -> bool {
        matches!(self, Intent::Forecast { .. })
    }
}

// =============================================================================
// IntentParser
// =============================================================================

/// Rule-based intent parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentParser;

impl IntentParser {
    pub fn new() -> Self {
        Self
    }

    // -----------------------------------------------------------------
    // Intent classification
    // -----------------------------------------------------------------

    /// Classify the intent of a raw message.
    ///
    /// Rules are checked in order: a term expression or "forecast" wins over
    /// help, which wins over settings. Anything else is `Unknown`.
    pub fn classify_intent(&self, raw: &str, default_term: &str) -> Intent {
        let lower = raw.to_lowercase();
        let term = self.extract_term(&lower);

        if term.is_some() || contains_any(&lower, FORECAST_KEYWORDS) {
            return Intent::Forecast {
                term: term.unwrap_or_else(|| default_term.to_string()),
            };
        }
        if contains_any(&lower, HELP_KEYWORDS) {
            return Intent::Help;
        }
        if contains_any(&lower, SETTINGS_KEYWORDS) {
            return Intent::Settings;
        }
        Intent::Unknown
    }

    // -----------------------------------------------------------------
    // Parameter extraction
    // -----------------------------------------------------------------

    /// Extract an academic term such as "Fall 2026".
    ///
    /// Two-digit years are expanded by prefixing "20".
    pub fn extract_term(&self, raw: &str) -> Option<String> {
        let lower = raw.to_lowercase();
        let caps = TERM_RE.captures(&lower)?;
        let season = capitalize(caps.get(1)?.as_str());
        let year = caps.get(2)?.as_str();
        let year = if year.len() == 2 {
            format!("20{}", year)
        } else {
            year.to_string()
        };
        Some(format!("{} {}", season, year))
    }

    /// Extract a FOUN course code such as "FOUN 110".
    pub fn extract_course(&self, raw: &str) -> Option<String> {
        let lower = raw.to_lowercase();
        COURSE_RE
            .captures(&lower)
            .and_then(|caps| caps.get(1))
            .map(|m| format!("FOUN {}", m.as_str()))
    }

    /// Extract a campus name. Online mentions map to SCADnow.
    pub fn extract_campus(&self, raw: &str) -> Option<String> {
        let lower = raw.to_lowercase();
        if lower.contains("scadnow") || lower.contains("online") {
            Some("SCADnow".to_string())
        } else if lower.contains("savannah") {
            Some("Savannah".to_string())
        } else {
            None
        }
    }

    /// Build the parameter map for a classified intent.
    pub fn parameters(&self, raw: &str, intent: &Intent) -> Map<String, Value> {
        let mut params = Map::new();
        if let Intent::Forecast { term } = intent {
            params.insert("term".to_string(), Value::String(term.clone()));
            if let Some(course) = self.extract_course(raw) {
                params.insert("course".to_string(), Value::String(course));
            }
            if let Some(campus) = self.extract_campus(raw) {
                params.insert("campus".to_string(), Value::String(campus));
            }
        }
        params
    }

    // -----------------------------------------------------------------
    // Full classification
    // -----------------------------------------------------------------

    /// Classify a message and compose the best-effort offline reply.
    pub fn classify(&self, raw: &str, default_term: &str) -> FallbackReply {
        let intent = self.classify_intent(raw, default_term);
        let parameters = self.parameters(raw, &intent);
        response::fallback_reply(raw, intent, parameters)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Tests
// =============================================================================
