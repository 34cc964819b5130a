//! Text rendering for the terminal front end.
//!
//! Chat messages, the forecast results table, summary metrics, the settings
//! panel, conversation history, and CSV export.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};

use enrollcast_chat::ConversationHistory;
use enrollcast_core::{
    ForecastConfig, ForecastResult, ForecastSummary, Message, Role, DEFAULT_ACCURACY,
};

const CSV_HEADER: &str = "course,campus,projected_seats,sections,change,change_percent";

/// Render a chat message with a speaker prefix. Markdown emphasis is dropped.
pub fn render_message(message: &Message) -> String {
    let speaker = match message.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    };
    format!("{}: {}", speaker, message.content.replace("**", ""))
}

/// Render forecast rows as an aligned table.
pub fn render_table(results: &[ForecastResult]) -> String {
    let course_w = column_width("Course", results.iter().map(|r| r.course.as_str()));
    let campus_w = column_width("Campus", results.iter().map(|r| r.campus.as_str()));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<course_w$}  {:<campus_w$}  {:>6}  {:>8}  {:>12}",
        "Course", "Campus", "Seats", "Sections", "Change"
    );
    let _ = writeln!(
        out,
        "{}",
        "-".repeat(course_w + campus_w + 6 + 8 + 12 + 8)
    );
    for row in results {
        let _ = writeln!(
            out,
            "{:<course_w$}  {:<campus_w$}  {:>6.0}  {:>8}  {:>12}",
            row.course,
            row.campus,
            row.projected_seats,
            row.sections,
            format_change(row.change, row.change_percent)
        );
    }
    out
}

/// One-line summary metrics.
pub fn render_metrics(summary: &ForecastSummary) -> String {
    format!(
        "Total Students: {} | Sections: {} | Courses: {} | Accuracy: {}% | Method: {}",
        group_thousands(summary.total_students.round().max(0.0) as u64),
        summary.total_sections,
        summary.courses_forecasted,
        summary.accuracy.unwrap_or(DEFAULT_ACCURACY),
        summary.method
    )
}

/// The settings panel.
pub fn render_config(config: &ForecastConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Term:                 {}", config.term);
    let _ = writeln!(out, "Capacity:             {} students", config.capacity);
    let _ = writeln!(
        out,
        "Progression rate:     {}%",
        (config.progression_rate * 100.0).round() as u32
    );
    let _ = writeln!(out, "Buffer:               {}%", config.buffer_percent);
    let _ = writeln!(out, "Quarters to forecast: {}", config.quarters_to_forecast);
    if let Some(ref campus) = config.campus {
        let _ = writeln!(out, "Campus:               {}", campus);
    }
    out
}

/// Archived conversations grouped by day.
pub fn render_history(history: &ConversationHistory, now: DateTime<Utc>) -> String {
    if history.is_empty() {
        return "No previous conversations.\n".to_string();
    }
    let mut out = String::new();
    for (group, entries) in history.grouped(now) {
        let _ = writeln!(out, "{}", group.label());
        for entry in entries {
            let _ = writeln!(out, "  • {} ({} messages)", entry.title, entry.message_count);
        }
    }
    out
}

/// Keep only rows for `campus`, compared case-insensitively. `None` keeps all.
pub fn filter_by_campus(results: &[ForecastResult], campus: Option<&str>) -> Vec<ForecastResult> {
    match campus {
        Some(campus) => results
            .iter()
            .filter(|r| r.campus.eq_ignore_ascii_case(campus))
            .cloned()
            .collect(),
        None => results.to_vec(),
    }
}

/// Serialize forecast rows as CSV.
pub fn to_csv(results: &[ForecastResult]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for row in results {
        let fields = [
            csv_field(&row.course),
            csv_field(&row.campus),
            row.projected_seats.to_string(),
            row.sections.to_string(),
            row.change.map(|c| c.to_string()).unwrap_or_default(),
            row.change_percent.map(|c| c.to_string()).unwrap_or_default(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

/// Write forecast rows to a CSV file.
pub fn write_csv(path: &Path, results: &[ForecastResult]) -> std::io::Result<()> {
    std::fs::write(path, to_csv(results))
}

// -- Helpers --

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}

fn format_change(change: Option<f64>, percent: Option<f64>) -> String {
    match (change, percent) {
        (Some(c), Some(p)) => format!("{:+} ({:+}%)", c, p),
        (Some(c), None) => format!("{:+}", c),
        _ => "-".to_string(),
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
