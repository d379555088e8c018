// crates/actionset-toolset/src/events.rs
// ============================================================================
// Module: Toolset Events
// Description: Structured events and JSON-lines sinks for toolset activity.
// Purpose: Report installs, skipped checks, and contract violations.
// Dependencies: actionset-core, actionset-config, serde, serde_json
// ============================================================================

//! ## Overview
//! Events are small serializable records written as JSON lines. Sinks filter
//! by a minimum [`EventLevel`] and never fail the calling operation: a sink
//! that cannot write drops the event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use actionset_config::LogLevel;
use actionset_config::LogSinkKind;
use actionset_config::LoggingConfig;
use actionset_core::ActionId;
use actionset_core::AppId;
use serde::Serialize;

use crate::error::ToolsetError;

// ============================================================================
// SECTION: Event Names
// ============================================================================

/// A missing package was installed.
pub const PACKAGE_INSTALLED: &str = "package_installed";
/// Connected account verification was skipped on request.
pub const ACCOUNT_CHECK_SKIPPED: &str = "account_check_skipped";
/// A post-processor returned something other than an object.
pub const PROCESSOR_CONTRACT_VIOLATION: &str = "processor_contract_violation";
/// Construction-time processors were supplied.
pub const PROCESSORS_DEPRECATED: &str = "processors_deprecated";
/// An action was dispatched.
pub const ACTION_EXECUTED: &str = "action_executed";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Severity of a toolset event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    /// Routine activity.
    Info,
    /// Degraded or deprecated behaviour.
    Warning,
}

impl From<LogLevel> for EventLevel {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Info => Self::Info,
            LogLevel::Warning => Self::Warning,
        }
    }
}

/// Toolset event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolsetEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Severity.
    pub level: EventLevel,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Human-readable message.
    pub message: String,
    /// Action involved, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionId>,
    /// App involved, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<AppId>,
    /// Package involved, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl ToolsetEvent {
    /// Creates an informational event.
    #[must_use]
    pub fn info(event: &'static str, message: impl Into<String>) -> Self {
        Self::with_level(event, EventLevel::Info, message.into())
    }

    /// Creates a warning event.
    #[must_use]
    pub fn warning(event: &'static str, message: impl Into<String>) -> Self {
        Self::with_level(event, EventLevel::Warning, message.into())
    }

    /// Attaches an action.
    #[must_use]
    pub fn with_action(mut self, action: &ActionId) -> Self {
        self.action = Some(action.clone());
        self
    }

    /// Attaches an app.
    #[must_use]
    pub fn with_app(mut self, app: &AppId) -> Self {
        self.app = Some(app.clone());
        self
    }

    /// Attaches a package name.
    #[must_use]
    pub fn with_package(mut self, package: &str) -> Self {
        self.package = Some(package.to_string());
        self
    }

    /// Builds an event stamped with the current time.
    fn with_level(event: &'static str, level: EventLevel, message: String) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |elapsed| elapsed.as_millis());
        Self {
            event,
            level,
            timestamp_ms,
            message,
            action: None,
            app: None,
            package: None,
        }
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for toolset events.
pub trait ToolsetEventSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &ToolsetEvent);
}

/// Sink that writes JSON lines to stderr.
pub struct StderrEventSink {
    /// Minimum recorded level.
    min_level: EventLevel,
}

impl StderrEventSink {
    /// Creates a stderr sink recording events at or above `min_level`.
    #[must_use]
    pub const fn new(min_level: EventLevel) -> Self {
        Self {
            min_level,
        }
    }
}

impl ToolsetEventSink for StderrEventSink {
    fn record(&self, event: &ToolsetEvent) {
        if event.level < self.min_level {
            return;
        }
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
    /// Minimum recorded level.
    min_level: EventLevel,
}

impl FileEventSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path, min_level: EventLevel) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            min_level,
        })
    }
}

impl ToolsetEventSink for FileEventSink {
    fn record(&self, event: &ToolsetEvent) {
        if event.level < self.min_level {
            return;
        }
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that discards every event.
pub struct NoopEventSink;

impl ToolsetEventSink for NoopEventSink {
    fn record(&self, _event: &ToolsetEvent) {}
}

/// Sink that keeps events in memory for later inspection.
#[derive(Default)]
pub struct MemoryEventSink {
    /// Captured events in arrival order.
    events: Mutex<Vec<ToolsetEvent>>,
}

impl MemoryEventSink {
    /// Creates an empty memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every captured event.
    #[must_use]
    pub fn events(&self) -> Vec<ToolsetEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns captured events with the given name.
    #[must_use]
    pub fn named(&self, event: &str) -> Vec<ToolsetEvent> {
        self.events().into_iter().filter(|captured| captured.event == event).collect()
    }

    /// Drops every captured event.
    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl ToolsetEventSink for MemoryEventSink {
    fn record(&self, event: &ToolsetEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
    }
}

/// Builds the sink selected by logging configuration.
///
/// # Errors
///
/// Returns [`ToolsetError::Config`] when the file sink cannot be opened.
pub fn sink_from_config(
    config: &LoggingConfig,
) -> Result<Arc<dyn ToolsetEventSink>, ToolsetError> {
    let level = EventLevel::from(config.level);
    match config.sink {
        LogSinkKind::Stderr => Ok(Arc::new(StderrEventSink::new(level))),
        LogSinkKind::None => Ok(Arc::new(NoopEventSink)),
        LogSinkKind::File => {
            let path = config
                .path
                .as_deref()
                .ok_or_else(|| ToolsetError::Config("logging.path is required".to_string()))?;
            let sink = FileEventSink::new(Path::new(path), level)
                .map_err(|err| ToolsetError::Config(format!("cannot open log file: {err}")))?;
            Ok(Arc::new(sink))
        }
    }
}
