// crates/policy-ledger-mcp/src/server.rs
// ============================================================================
// Module: Resource Server
// Description: Line-delimited JSON-RPC resource server over the policy gate.
// Purpose: Serve gated filesystem resources and log every access decision.
// Dependencies: policy-ledger-core, policy-ledger-config, serde, tokio
// ============================================================================

//! ## Overview
//! [`ResourceServer`] maps resource URIs onto the [`ResourceGate`] and
//! writes one decision record per gated read before the body is returned.
//! [`PolicyServer`] wraps it in a JSON-RPC 2.0 loop: one request per line,
//! handled fully before the next is read, with only protocol JSON on the
//! writer. Gate denials are ordinary resource bodies. A decision log failure
//! fails the request with -32070 so nothing is served unlogged.
//! Security posture: every request line is untrusted and length-bounded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::BufRead;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use policy_ledger_config::DiagnosticsMode;
use policy_ledger_config::PolicyLedgerConfig;
use policy_ledger_config::ServerConfig;
use policy_ledger_core::AccessRequest;
use policy_ledger_core::DecisionLogError;
use policy_ledger_core::DecisionLogger;
use policy_ledger_core::DecisionRecord;
use policy_ledger_core::JsonlDecisionSink;
use policy_ledger_core::LedgerMirror;
use policy_ledger_core::LedgerWriter;
use policy_ledger_core::PolicySnapshot;
use policy_ledger_core::ReplayTarget;
use policy_ledger_core::RequestId;
use policy_ledger_core::ResourceGate;
use policy_ledger_core::ResourceKind;
use policy_ledger_core::ResourceUri;
use policy_ledger_core::TargetError;
use policy_ledger_core::replay::ObservedOutcome;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::audit::DiagnosticSink;
use crate::audit::FileDiagnosticSink;
use crate::audit::NoopDiagnosticSink;
use crate::audit::RpcMethod;
use crate::audit::RpcOutcome;
use crate::audit::ServerDiagnostic;
use crate::audit::StderrDiagnosticSink;
use crate::resources::DecisionLogInfo;
use crate::resources::ResourceContent;
use crate::resources::ResourceMetadata;
use crate::resources::ResourceTemplate;
use crate::resources::gated_content;
use crate::resources::index_content;
use crate::resources::policy_content;
use crate::resources::resource_templates;
use crate::resources::static_resources;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// MCP protocol revision offered when the client does not request one.
pub const PROTOCOL_VERSION: &str = "2025-06-18";
/// Server name reported by `initialize`.
pub const SERVER_NAME: &str = "policy-ledger";
/// Default request line cap.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Unparseable JSON.
pub const PARSE_ERROR: i64 = -32700;
/// Well-formed JSON that is not a JSON-RPC 2.0 request.
pub const INVALID_REQUEST: i64 = -32600;
/// Unsupported method.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Malformed params or unknown resource URI.
pub const INVALID_PARAMS: i64 = -32602;
/// Decision log write failure.
pub const DECISION_LOG_FAILED: i64 = -32070;
/// Internal failure.
pub const INTERNAL_ERROR: i64 = -32603;

/// Response written when a response itself cannot be serialized.
const SERIALIZATION_FALLBACK: &[u8] =
    br#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"serialization failed"}}"#;

// ============================================================================
// SECTION: Resource Server
// ============================================================================

/// Result of one resource read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResult {
    /// Rendered content.
    pub content: ResourceContent,
    /// Decision record written for gated reads.
    pub record: Option<DecisionRecord>,
}

/// Resource read failures surfaced as JSON-RPC errors.
#[derive(Debug, Error)]
pub enum ReadError {
    /// URI is not a served resource.
    #[error("unknown resource uri: {0}")]
    UnknownUri(String),
    /// The decision record could not be written.
    #[error(transparent)]
    DecisionLog(DecisionLogError),
    /// The body could not be rendered.
    #[error("resource serialization failed: {0}")]
    Serialization(String),
}

impl ReadError {
    /// Returns the JSON-RPC error code.
    #[must_use]
    pub const fn rpc_code(&self) -> i64 {
        match self {
            Self::UnknownUri(_) => INVALID_PARAMS,
            Self::DecisionLog(_) => DECISION_LOG_FAILED,
            Self::Serialization(_) => INTERNAL_ERROR,
        }
    }
}

/// Gated resource reader with decision logging.
pub struct ResourceServer {
    /// Allowlist gate.
    gate: ResourceGate,
    /// Decision logger.
    logger: DecisionLogger,
    /// Decision log settings advertised by the policy resource.
    decision_log: DecisionLogInfo,
}

impl ResourceServer {
    /// Creates a server over a gate and logger.
    #[must_use]
    pub fn new(
        gate: ResourceGate,
        logger: DecisionLogger,
        decision_log_path: impl Into<String>,
    ) -> Self {
        let decision_log = DecisionLogInfo::new(logger.enabled(), decision_log_path);
        Self {
            gate,
            logger,
            decision_log,
        }
    }

    /// Builds the gate and decision logger from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the sandbox, decision log, or mirror
    /// ledger cannot be opened.
    pub fn from_config(config: &PolicyLedgerConfig) -> Result<Self, ServerError> {
        let policy = config.policy_snapshot().map_err(|err| ServerError::Config(err.to_string()))?;
        let gate = ResourceGate::open(
            policy,
            Path::new(&config.policy.sandbox_root),
            config.gate_limits(),
        )
        .map_err(|err| ServerError::Init(err.to_string()))?;
        let logger = build_decision_logger(config)?;
        Ok(Self::new(gate, logger, config.decision_log.path.clone()))
    }

    /// Returns the pinned policy.
    #[must_use]
    pub const fn policy(&self) -> &PolicySnapshot {
        self.gate.policy()
    }

    /// Reads one resource by URI.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] for unknown URIs, decision log failures, and
    /// rendering failures. Gate denials are successful reads.
    pub fn read(&self, uri: &str) -> Result<ReadResult, ReadError> {
        let parsed =
            ResourceUri::parse(uri).ok_or_else(|| ReadError::UnknownUri(uri.to_string()))?;
        let content = match parsed {
            ResourceUri::Policy => policy_content(self.gate.policy(), &self.decision_log),
            ResourceUri::Index => index_content(self.gate.policy()),
            ResourceUri::Dir(raw) => return self.read_gated(uri, ResourceKind::Dir, &raw),
            ResourceUri::File(raw) => return self.read_gated(uri, ResourceKind::File, &raw),
        };
        Ok(ReadResult {
            content: content.map_err(serialization)?,
            record: None,
        })
    }

    /// Runs the gate, logs the decision, then renders the body.
    fn read_gated(&self, uri: &str, kind: ResourceKind, raw: &str) -> Result<ReadResult, ReadError> {
        let request = AccessRequest {
            request_id: RequestId::generate(),
            uri: uri.to_string(),
            resource_kind: kind,
            path_param_raw: raw.to_string(),
        };
        let outcome = self.gate.resolve(kind, raw);
        let record = self.logger.record(&request, &outcome).map_err(ReadError::DecisionLog)?;
        let content = gated_content(&outcome, &record).map_err(serialization)?;
        Ok(ReadResult {
            content,
            record: Some(record),
        })
    }
}

impl ReplayTarget for ResourceServer {
    fn live_policy(&self) -> &PolicySnapshot {
        self.gate.policy()
    }

    fn observe(&self, uri: &str) -> Result<ObservedOutcome, TargetError> {
        let gated = ResourceUri::parse(uri).is_some_and(|parsed| parsed.gated().is_some());
        if !gated {
            return Err(TargetError::InvalidUri(uri.to_string()));
        }
        let result = self.read(uri).map_err(|err| TargetError::Failed(err.to_string()))?;
        result
            .record
            .as_ref()
            .map(ObservedOutcome::from)
            .ok_or_else(|| TargetError::Failed(format!("no decision recorded for {uri}")))
    }
}

/// Maps a rendering failure.
fn serialization(err: serde_json::Error) -> ReadError {
    ReadError::Serialization(err.to_string())
}

/// Builds the decision logger, with a ledger mirror when configured.
fn build_decision_logger(config: &PolicyLedgerConfig) -> Result<DecisionLogger, ServerError> {
    if !config.decision_log.enabled {
        return Ok(DecisionLogger::disabled());
    }
    let sink = JsonlDecisionSink::open(Path::new(&config.decision_log.path), config.decision_log.fsync)
        .map_err(|err| ServerError::Init(format!("decision log: {err}")))?;
    let logger = DecisionLogger::new(Arc::new(sink));
    if !config.decision_log.mirror_to_ledger {
        return Ok(logger);
    }
    let options = config.ledger_options().map_err(|err| ServerError::Config(err.to_string()))?;
    let ledger = LedgerWriter::open(Path::new(&config.ledger.path), options)
        .map_err(|err| ServerError::Init(format!("ledger: {err}")))?;
    let actors =
        config.build_actor_resolver().map_err(|err| ServerError::Config(err.to_string()))?;
    let mirror = LedgerMirror::new(Arc::new(ledger), Arc::new(actors), config.session_id());
    Ok(logger.with_mirror(mirror))
}

// ============================================================================
// SECTION: Policy Server
// ============================================================================

/// JSON-RPC server over a [`ResourceServer`].
pub struct PolicyServer {
    /// Resource reader.
    resources: ResourceServer,
    /// Diagnostic destination.
    diagnostics: Arc<dyn DiagnosticSink>,
    /// Request line cap.
    max_line_bytes: usize,
}

impl PolicyServer {
    /// Creates a server with diagnostics disabled.
    #[must_use]
    pub fn new(resources: ResourceServer) -> Self {
        Self {
            resources,
            diagnostics: Arc::new(NoopDiagnosticSink),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }

    /// Builds a server from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the configuration is invalid or a
    /// component cannot be initialized.
    pub fn from_config(config: &PolicyLedgerConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let resources = ResourceServer::from_config(config)?;
        let diagnostics = build_diagnostic_sink(&config.server)?;
        Ok(Self::new(resources)
            .with_diagnostics(diagnostics)
            .with_max_line_bytes(config.server.max_line_bytes))
    }

    /// Replaces the diagnostic sink.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Sets the request line cap.
    #[must_use]
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// Returns the resource reader.
    #[must_use]
    pub const fn resources(&self) -> &ResourceServer {
        &self.resources
    }

    /// Serves requests over stdin/stdout on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when stdio fails or the task aborts.
    pub async fn serve(self) -> Result<(), ServerError> {
        tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            self.serve_lines(stdin.lock(), stdout.lock())
        })
        .await
        .map_err(|err| ServerError::Transport(format!("server task failed: {err}")))?
    }

    /// Serves one JSON-RPC request per line until EOF.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when reading or writing fails.
    pub fn serve_lines<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        mut writer: W,
    ) -> Result<(), ServerError> {
        loop {
            let line = read_bounded_line(&mut reader, self.max_line_bytes)
                .map_err(|err| ServerError::Transport(format!("read failed: {err}")))?;
            let response = match line {
                None => return Ok(()),
                Some(BoundedLine::TooLong) => Some(self.reject(
                    RpcMethod::Invalid,
                    Value::Null,
                    INVALID_REQUEST,
                    "request line exceeds server.max_line_bytes",
                )),
                Some(BoundedLine::Line(bytes)) => {
                    if bytes.trim_ascii().is_empty() {
                        continue;
                    }
                    self.handle_line(&bytes)
                }
            };
            if let Some(response) = response {
                write_response(&mut writer, &response)?;
            }
        }
    }

    /// Handles one request line. Returns `None` for notifications.
    fn handle_line(&self, line: &[u8]) -> Option<JsonRpcResponse> {
        let Ok(value) = serde_json::from_slice::<Value>(line) else {
            return Some(self.reject(RpcMethod::Invalid, Value::Null, PARSE_ERROR, "parse error"));
        };
        let request = match value {
            Value::Object(_) => serde_json::from_value::<JsonRpcRequest>(value).ok(),
            _ => None,
        };
        let Some(request) = request else {
            return Some(self.reject(
                RpcMethod::Invalid,
                Value::Null,
                INVALID_REQUEST,
                "invalid json-rpc request",
            ));
        };
        let id = request.id.clone().unwrap_or(Value::Null);
        if request.jsonrpc.as_ref().and_then(Value::as_str) != Some("2.0") {
            return Some(self.reject(RpcMethod::Invalid, id, INVALID_REQUEST, "invalid json-rpc version"));
        }
        let Some(name) = request.method.as_ref().and_then(Value::as_str) else {
            return Some(self.reject(RpcMethod::Invalid, id, INVALID_REQUEST, "missing method"));
        };
        let method = RpcMethod::classify(name);
        let Some(id) = request.id else {
            self.diagnostics.record(&ServerDiagnostic::new(RpcMethod::Notification, RpcOutcome::Ok));
            return None;
        };
        let dispatch = self.dispatch(method, request.params);
        Some(self.respond(method, id, dispatch))
    }

    /// Runs a method.
    fn dispatch(&self, method: RpcMethod, params: Option<Value>) -> Dispatch {
        match method {
            RpcMethod::Initialize => Dispatch::plain(initialize_result(params.as_ref())),
            RpcMethod::Ping => Dispatch::plain(Ok(Value::Object(serde_json::Map::new()))),
            RpcMethod::ResourcesList => Dispatch::plain(to_result(&ResourceListResult {
                resources: static_resources(),
            })),
            RpcMethod::ResourcesTemplatesList => Dispatch::plain(to_result(&TemplateListResult {
                resource_templates: resource_templates(),
            })),
            RpcMethod::ResourcesRead => self.read_resource(params),
            RpcMethod::Notification | RpcMethod::Invalid | RpcMethod::Other => {
                Dispatch::plain(Err(RpcFailure::new(METHOD_NOT_FOUND, "method not found")))
            }
        }
    }

    /// Handles `resources/read`.
    fn read_resource(&self, params: Option<Value>) -> Dispatch {
        let Some(params) =
            params.and_then(|params| serde_json::from_value::<ReadParams>(params).ok())
        else {
            return Dispatch::plain(Err(RpcFailure::new(
                INVALID_PARAMS,
                "invalid resources/read params",
            )));
        };
        match self.resources.read(&params.uri) {
            Ok(read) => Dispatch {
                result: to_result(&ReadResourceResult {
                    contents: vec![read.content],
                }),
                record: read.record,
            },
            Err(err) => Dispatch::plain(Err(RpcFailure::new(err.rpc_code(), err.to_string()))),
        }
    }

    /// Builds the response and records its diagnostic.
    fn respond(&self, method: RpcMethod, id: Value, dispatch: Dispatch) -> JsonRpcResponse {
        match dispatch.result {
            Ok(result) => {
                let mut event = ServerDiagnostic::new(method, RpcOutcome::Ok);
                if let Some(record) = &dispatch.record {
                    event = event.with_decision(
                        record.request_id.as_str(),
                        record.decision.as_str(),
                        record.reason.code.as_str(),
                    );
                }
                self.diagnostics.record(&event);
                JsonRpcResponse::result(id, result)
            }
            Err(failure) => self.reject(method, id, failure.code, failure.message),
        }
    }

    /// Builds an error response and records its diagnostic.
    fn reject(
        &self,
        method: RpcMethod,
        id: Value,
        code: i64,
        message: impl Into<String>,
    ) -> JsonRpcResponse {
        self.diagnostics
            .record(&ServerDiagnostic::new(method, RpcOutcome::Error).with_error_code(code));
        JsonRpcResponse::error(id, code, message)
    }
}

/// Builds the configured diagnostic sink.
fn build_diagnostic_sink(server: &ServerConfig) -> Result<Arc<dyn DiagnosticSink>, ServerError> {
    match server.diagnostics {
        DiagnosticsMode::Stderr => Ok(Arc::new(StderrDiagnosticSink)),
        DiagnosticsMode::None => Ok(Arc::new(NoopDiagnosticSink)),
        DiagnosticsMode::File => {
            let path = server.diagnostics_path.as_deref().ok_or_else(|| {
                ServerError::Config("server.diagnostics_path is required".to_string())
            })?;
            let sink = FileDiagnosticSink::new(Path::new(path))
                .map_err(|err| ServerError::Init(format!("diagnostics: {err}")))?;
            Ok(Arc::new(sink))
        }
    }
}

// ============================================================================
// SECTION: JSON-RPC Types
// ============================================================================

/// Incoming JSON-RPC request; fields are checked after parsing.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// Protocol version.
    #[serde(default)]
    jsonrpc: Option<Value>,
    /// Request identifier; absent for notifications, `Some(Null)` for null.
    #[serde(default, deserialize_with = "present")]
    id: Option<Value>,
    /// Method name.
    #[serde(default)]
    method: Option<Value>,
    /// Parameters.
    #[serde(default)]
    params: Option<Value>,
}

/// Keeps an explicit `null` distinct from an absent field.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// Protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Successful response.
    const fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Error response.
    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable message.
    message: String,
}

/// Method failure before it becomes a response.
struct RpcFailure {
    /// Error code.
    code: i64,
    /// Human-readable message.
    message: String,
}

impl RpcFailure {
    /// Creates a failure.
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Method result plus the decision record it produced, if any.
struct Dispatch {
    /// Result payload or failure.
    result: Result<Value, RpcFailure>,
    /// Decision record for gated reads.
    record: Option<DecisionRecord>,
}

impl Dispatch {
    /// Result without a decision record.
    const fn plain(result: Result<Value, RpcFailure>) -> Self {
        Self {
            result,
            record: None,
        }
    }
}

/// `resources/read` params.
#[derive(Debug, Deserialize)]
struct ReadParams {
    /// Requested URI.
    uri: String,
}

/// `resources/list` result.
#[derive(Debug, Serialize)]
struct ResourceListResult {
    /// Static resources.
    resources: Vec<ResourceMetadata>,
}

/// `resources/templates/list` result.
#[derive(Debug, Serialize)]
struct TemplateListResult {
    /// Resource templates.
    #[serde(rename = "resourceTemplates")]
    resource_templates: Vec<ResourceTemplate>,
}

/// `resources/read` result.
#[derive(Debug, Serialize)]
struct ReadResourceResult {
    /// Exactly one content item.
    contents: Vec<ResourceContent>,
}

/// `initialize` result.
#[derive(Debug, Serialize)]
struct InitializeResult {
    /// Negotiated protocol revision.
    #[serde(rename = "protocolVersion")]
    protocol_version: String,
    /// Server identity.
    #[serde(rename = "serverInfo")]
    server_info: ServerInfo,
    /// Advertised capabilities.
    capabilities: ServerCapabilities,
}

/// Server identity.
#[derive(Debug, Serialize)]
struct ServerInfo {
    /// Server name.
    name: &'static str,
    /// Crate version.
    version: &'static str,
}

/// Advertised capabilities.
#[derive(Debug, Serialize)]
struct ServerCapabilities {
    /// Resource capability.
    resources: ResourceCapability,
}

/// Resource capability flags.
#[derive(Debug, Serialize)]
struct ResourceCapability {
    /// Subscriptions are not offered.
    subscribe: bool,
    /// List change notifications are not offered.
    #[serde(rename = "listChanged")]
    list_changed: bool,
}

/// Builds the `initialize` result, echoing the client's protocol revision.
fn initialize_result(params: Option<&Value>) -> Result<Value, RpcFailure> {
    let protocol_version = params
        .and_then(|params| params.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(PROTOCOL_VERSION)
        .to_string();
    to_result(&InitializeResult {
        protocol_version,
        server_info: ServerInfo {
            name: SERVER_NAME,
            version: env!("CARGO_PKG_VERSION"),
        },
        capabilities: ServerCapabilities {
            resources: ResourceCapability {
                subscribe: false,
                list_changed: false,
            },
        },
    })
}

/// Serializes a method result.
fn to_result<T: Serialize>(value: &T) -> Result<Value, RpcFailure> {
    serde_json::to_value(value)
        .map_err(|_| RpcFailure::new(INTERNAL_ERROR, "serialization failed"))
}

// ============================================================================
// SECTION: Line Framing
// ============================================================================

/// One framed request line.
#[derive(Debug, PartialEq, Eq)]
enum BoundedLine {
    /// Line bytes without the terminator.
    Line(Vec<u8>),
    /// The line exceeded the cap and was discarded.
    TooLong,
}

/// Reads one `\n`-terminated line, discarding it if it exceeds `max_bytes`.
///
/// Returns `None` at EOF. A final unterminated line is still returned.
fn read_bounded_line(
    reader: &mut impl BufRead,
    max_bytes: usize,
) -> io::Result<Option<BoundedLine>> {
    let mut line = Vec::new();
    let mut overflow = false;
    let mut saw_bytes = false;
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if available.is_empty() {
            if !saw_bytes {
                return Ok(None);
            }
            break;
        }
        saw_bytes = true;
        let newline = available.iter().position(|byte| *byte == b'\n');
        let chunk = newline.map_or(available, |index| &available[.. index]);
        let consumed = chunk.len() + usize::from(newline.is_some());
        if !overflow {
            if line.len() + chunk.len() > max_bytes {
                overflow = true;
                line.clear();
            } else {
                line.extend_from_slice(chunk);
            }
        }
        reader.consume(consumed);
        if newline.is_some() {
            break;
        }
    }
    if overflow {
        return Ok(Some(BoundedLine::TooLong));
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(Some(BoundedLine::Line(line)))
}

/// Writes one response line and flushes.
fn write_response(writer: &mut impl Write, response: &JsonRpcResponse) -> Result<(), ServerError> {
    let payload = serde_json::to_vec(response).unwrap_or_else(|_| SERIALIZATION_FALLBACK.to_vec());
    writer
        .write_all(&payload)
        .and_then(|()| writer.write_all(b"\n"))
        .and_then(|()| writer.flush())
        .map_err(|err| ServerError::Transport(format!("write failed: {err}")))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Resource server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
