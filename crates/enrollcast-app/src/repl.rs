//! Line-oriented REPL over the chat orchestrator.
//!
//! Plain lines go to the assistant; lines starting with `/` are local
//! commands (history, results, settings, export, backend queries).

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use enrollcast_chat::ChatOrchestrator;
use enrollcast_core::{ForecastConfig, ForecastResult};

use crate::render;

/// How long a send may run before the busy notice is printed.
const BUSY_NOTICE_AFTER: Duration = Duration::from_millis(300);

const BUSY_NOTICE: &str = "Assistant is thinking...";

const COMMAND_HELP: &str = "Commands:
  /help                  Show this list
  /clear                 Start a new chat
  /history               List previous conversations
  /results               Show the current forecast results
  /config                Show the forecast settings
  /set <field> <value>   Change a setting (capacity, progression_rate, buffer_percent,
                         quarters_to_forecast, term, campus)
  /export <path>         Write the current results as CSV
  /files                 List data files on the backend
  /server-config         Show the backend's forecast settings
  /push-config           Send the local settings to the backend
  /health                Check the backend
  /quit                  Exit
Anything else is sent to the assistant.";

// =============================================================================
// Commands
// =============================================================================

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Free text for the assistant.
    Say(String),
    Help,
    Clear,
    History,
    Results,
    Config,
    Set { field: String, value: String },
    Export(PathBuf),
    Files,
    ServerConfig,
    PushConfig,
    Health,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0} (type /help for a list)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Unknown setting: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Some(Command::Say(line.to_string())));
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "help" => Command::Help,
            "clear" | "new" => Command::Clear,
            "history" => Command::History,
            "results" => Command::Results,
            "config" | "settings" => Command::Config,
            "set" => {
                let (field, value) = args
                    .split_once(char::is_whitespace)
                    .ok_or(CommandError::Usage("/set <field> <value>"))?;
                Command::Set {
                    field: field.to_lowercase(),
                    value: value.trim().to_string(),
                }
            }
            "export" => {
                if args.is_empty() {
                    return Err(CommandError::Usage("/export <path>"));
                }
                Command::Export(PathBuf::from(args))
            }
            "files" => Command::Files,
            "server-config" => Command::ServerConfig,
            "push-config" => Command::PushConfig,
            "health" => Command::Health,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(format!("/{}", other))),
        };
        Ok(Some(command))
    }
}

/// Return a copy of `config` with one field changed.
///
/// Rates and percentages accept a trailing `%`. Range checks are left to
/// [`ForecastConfig::validate`].
pub fn apply_setting(
    config: &ForecastConfig,
    field: &str,
    value: &str,
) -> Result<ForecastConfig, CommandError> {
    let invalid = || CommandError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    };
    let mut updated = config.clone();

    match field {
        "capacity" => updated.capacity = value.parse().map_err(|_| invalid())?,
        "progression_rate" | "progression" => {
            updated.progression_rate = match value.strip_suffix('%') {
                Some(pct) => pct.trim().parse::<f64>().map_err(|_| invalid())? / 100.0,
                None => value.parse().map_err(|_| invalid())?,
            };
        }
        "buffer_percent" | "buffer" => {
            updated.buffer_percent = value
                .trim_end_matches('%')
                .trim()
                .parse()
                .map_err(|_| invalid())?;
        }
        "quarters_to_forecast" | "quarters" => {
            updated.quarters_to_forecast = value.parse().map_err(|_| invalid())?;
        }
        "term" => updated.term = value.to_string(),
        "campus" => {
            updated.campus = match value.to_lowercase().as_str() {
                "none" | "all" | "" => None,
                _ => Some(value.to_string()),
            };
        }
        other => return Err(CommandError::UnknownField(other.to_string())),
    }
    Ok(updated)
}

// =============================================================================
// Repl
// =============================================================================

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive session writing to `out`.
pub struct Repl<W: Write> {
    orchestrator: ChatOrchestrator,
    out: W,
}

impl<W: Write> Repl<W> {
    pub fn new(orchestrator: ChatOrchestrator, out: W) -> Self {
        Self { orchestrator, out }
    }

    pub fn orchestrator(&self) -> &ChatOrchestrator {
        &self.orchestrator
    }

    /// Read lines from `input` until EOF or `/quit`.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> std::io::Result<()> {
        if let Some(greeting) = self.orchestrator.messages().last() {
            writeln!(self.out, "{}", render::render_message(greeting))?;
        }
        writeln!(self.out, "Type /help for commands.")?;

        let mut lines = input.lines();
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(self.out)?;
                break;
            };

            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    writeln!(self.out, "{}", e)?;
                    continue;
                }
            };
            if self.execute(command).await? == Flow::Quit {
                break;
            }
        }
        debug!("REPL finished");
        Ok(())
    }

    /// Execute a single command.
    pub async fn execute(&mut self, command: Command) -> std::io::Result<Flow> {
        match command {
            Command::Say(text) => self.say(&text).await?,
            Command::Help => writeln!(self.out, "{}", COMMAND_HELP)?,
            Command::Clear => {
                self.orchestrator.clear_messages();
                if let Some(greeting) = self.orchestrator.messages().last() {
                    writeln!(self.out, "{}", render::render_message(greeting))?;
                }
            }
            Command::History => write!(
                self.out,
                "{}",
                render::render_history(self.orchestrator.history(), Utc::now())
            )?,
            Command::Results => self.print_results()?,
            Command::Config => write!(
                self.out,
                "{}",
                render::render_config(self.orchestrator.config())
            )?,
            Command::Set { field, value } => self.set(&field, &value)?,
            Command::Export(path) => self.export(path)?,
            Command::Files => self.files().await?,
            Command::ServerConfig => self.server_config().await?,
            Command::PushConfig => self.push_config().await?,
            Command::Health => self.health().await?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    // -- Command handlers --

    async fn say(&mut self, text: &str) -> std::io::Result<()> {
        let loading = self.orchestrator.loading_handle();
        let result = {
            let send = self.orchestrator.send_message(text);
            tokio::pin!(send);

            tokio::select! {
                result = &mut send => result,
                _ = tokio::time::sleep(BUSY_NOTICE_AFTER) => {
                    if loading.load(Ordering::SeqCst) {
                        writeln!(self.out, "{}", BUSY_NOTICE)?;
                        self.out.flush()?;
                    }
                    send.await
                }
            }
        };

        match result {
            Ok(reply) => {
                writeln!(self.out, "{}", render::render_message(&reply))?;
                let is_forecast = reply
                    .parsed_command()
                    .is_some_and(|cmd| cmd.intent == "forecast");
                if is_forecast {
                    self.print_results()?;
                }
            }
            Err(e) => writeln!(self.out, "Error: {}", e)?,
        }
        Ok(())
    }

    /// Results narrowed to the configured campus, if any.
    fn visible_results(&self) -> Option<Vec<ForecastResult>> {
        let results = self.orchestrator.forecast_results()?;
        Some(render::filter_by_campus(
            results,
            self.orchestrator.config().campus.as_deref(),
        ))
    }

    fn print_results(&mut self) -> std::io::Result<()> {
        let Some(rows) = self.visible_results() else {
            return writeln!(self.out, "No forecast results yet.");
        };
        writeln!(self.out)?;
        if let Some(ref campus) = self.orchestrator.config().campus {
            if rows.is_empty() {
                return writeln!(self.out, "No forecast results for campus {}.", campus);
            }
            writeln!(self.out, "Campus: {}", campus)?;
        }
        write!(self.out, "{}", render::render_table(&rows))?;
        if let Some(summary) = self.orchestrator.forecast_summary() {
            writeln!(self.out, "{}", render::render_metrics(summary))?;
        }
        Ok(())
    }

    fn set(&mut self, field: &str, value: &str) -> std::io::Result<()> {
        let updated = match apply_setting(self.orchestrator.config(), field, value) {
            Ok(config) => config,
            Err(e) => return writeln!(self.out, "{}", e),
        };
        match self.orchestrator.update_config(updated) {
            Ok(()) => writeln!(self.out, "Updated {}.", field),
            Err(e) => writeln!(self.out, "Error: {}", e),
        }
    }

    fn export(&mut self, path: PathBuf) -> std::io::Result<()> {
        let Some(rows) = self.visible_results() else {
            return writeln!(self.out, "No forecast results to export.");
        };
        match render::write_csv(&path, &rows) {
            Ok(()) => {
                debug!(path = %path.display(), rows = rows.len(), "Exported forecast");
                writeln!(self.out, "Exported {} rows to {}", rows.len(), path.display())
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "CSV export failed");
                writeln!(self.out, "Export failed: {}", e)
            }
        }
    }

    async fn files(&mut self) -> std::io::Result<()> {
        match self.orchestrator.api().data_files().await {
            Ok(files) if files.is_empty() => writeln!(self.out, "No data files uploaded."),
            Ok(files) => {
                for file in files {
                    writeln!(
                        self.out,
                        "{}  ({}, {} records, uploaded {})",
                        file.name, file.term, file.records, file.uploaded_at
                    )?;
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to list data files");
                writeln!(self.out, "Could not load data files: {}", e)
            }
        }
    }

    async fn server_config(&mut self) -> std::io::Result<()> {
        match self.orchestrator.api().server_config().await {
            Ok(config) => {
                writeln!(self.out, "Capacity:             {}", config.capacity)?;
                writeln!(
                    self.out,
                    "Progression rate:     {}%",
                    (config.progression_rate * 100.0).round()
                )?;
                writeln!(self.out, "Buffer:               {}%", config.buffer_percent)?;
                writeln!(
                    self.out,
                    "Quarters to forecast: {}",
                    config.quarters_to_forecast
                )
            }
            Err(e) => {
                warn!(error = %e, "Failed to load server config");
                writeln!(self.out, "Could not load server config: {}", e)
            }
        }
    }

    async fn push_config(&mut self) -> std::io::Result<()> {
        match self.orchestrator.sync_config().await {
            Ok(true) => writeln!(self.out, "Server config updated."),
            Ok(false) => writeln!(self.out, "Server rejected the config update."),
            Err(e) => {
                warn!(error = %e, "Failed to push config");
                writeln!(self.out, "Could not update server config: {}", e)
            }
        }
    }

    async fn health(&mut self) -> std::io::Result<()> {
        match self.orchestrator.api().health().await {
            Ok(status) => writeln!(self.out, "Backend status: {}", status.status),
            Err(e) => writeln!(self.out, "Backend unreachable: {}", e),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
