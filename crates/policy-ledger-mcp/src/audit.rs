// crates/policy-ledger-mcp/src/audit.rs
// ============================================================================
// Module: Server Diagnostics
// Description: Structured diagnostic events for resource server requests.
// Purpose: Keep operational output off the protocol stream.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every JSON-RPC request handled by the server produces one
//! [`ServerDiagnostic`]. Diagnostics go to a [`DiagnosticSink`] and never to
//! stdout, which carries protocol JSON only. Sink failures are swallowed; the
//! decision log, not this stream, is the record of access.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Labels
// ============================================================================

/// JSON-RPC method classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcMethod {
    /// `initialize`.
    Initialize,
    /// `ping`.
    Ping,
    /// `resources/list`.
    #[serde(rename = "resources/list")]
    ResourcesList,
    /// `resources/templates/list`.
    #[serde(rename = "resources/templates/list")]
    ResourcesTemplatesList,
    /// `resources/read`.
    #[serde(rename = "resources/read")]
    ResourcesRead,
    /// Notification (no response).
    Notification,
    /// Unparseable or malformed request.
    Invalid,
    /// Unsupported method.
    Other,
}

impl RpcMethod {
    /// Classifies a method name.
    #[must_use]
    pub fn classify(method: &str) -> Self {
        match method {
            "initialize" => Self::Initialize,
            "ping" => Self::Ping,
            "resources/list" => Self::ResourcesList,
            "resources/templates/list" => Self::ResourcesTemplatesList,
            "resources/read" => Self::ResourcesRead,
            name if name.starts_with("notifications/") => Self::Notification,
            _ => Self::Other,
        }
    }

    /// Returns a stable label for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Ping => "ping",
            Self::ResourcesList => "resources/list",
            Self::ResourcesTemplatesList => "resources/templates/list",
            Self::ResourcesRead => "resources/read",
            Self::Notification => "notification",
            Self::Invalid => "invalid",
            Self::Other => "other",
        }
    }
}

/// Request outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcOutcome {
    /// The request produced a result.
    Ok,
    /// The request produced a JSON-RPC error.
    Error,
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Diagnostic event for one handled request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerDiagnostic {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Gate request identifier for resource reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Method classification.
    pub method: RpcMethod,
    /// Request outcome.
    pub outcome: RpcOutcome,
    /// JSON-RPC error code when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    /// Gate decision for resource reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    /// Gate reason code for resource reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
}

impl ServerDiagnostic {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(method: RpcMethod, outcome: RpcOutcome) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "resource_server_request",
            timestamp_ms,
            request_id: None,
            method,
            outcome,
            error_code: None,
            decision: None,
            reason_code: None,
        }
    }

    /// Attaches a JSON-RPC error code.
    #[must_use]
    pub fn with_error_code(mut self, code: i64) -> Self {
        self.error_code = Some(code);
        self
    }

    /// Attaches the gate decision for a resource read.
    #[must_use]
    pub fn with_decision(
        mut self,
        request_id: impl Into<String>,
        decision: impl Into<String>,
        reason_code: impl Into<String>,
    ) -> Self {
        self.request_id = Some(request_id.into());
        self.decision = Some(decision.into());
        self.reason_code = Some(reason_code.into());
        self
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for server diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Records a diagnostic event.
    fn record(&self, event: &ServerDiagnostic);
}

/// Sink that writes JSON lines to stderr.
pub struct StderrDiagnosticSink;

impl DiagnosticSink for StderrDiagnosticSink {
    fn record(&self, event: &ServerDiagnostic) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileDiagnosticSink {
    /// Append-mode file handle.
    file: Mutex<fs::File>,
}

impl FileDiagnosticSink {
    /// Opens the diagnostics file in append mode, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl DiagnosticSink for FileDiagnosticSink {
    fn record(&self, event: &ServerDiagnostic) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that drops every event.
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn record(&self, _event: &ServerDiagnostic) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
