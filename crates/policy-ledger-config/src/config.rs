// crates/policy-ledger-config/src/config.rs
// ============================================================================
// Module: Policy Ledger Configuration
// Description: Configuration loading and validation for Policy Ledger.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: policy-ledger-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits,
//! then overlaid with a small set of environment overrides. A missing default
//! file means built-in defaults; a file named explicitly (flag or
//! `POLICY_LEDGER_CONFIG`) must exist. Invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use policy_ledger_core::Actor;
use policy_ledger_core::ActorContext;
use policy_ledger_core::ActorKind;
use policy_ledger_core::ChainMode;
use policy_ledger_core::GateLimits;
use policy_ledger_core::LedgerOptions;
use policy_ledger_core::PayloadRegistry;
use policy_ledger_core::PolicySnapshot;
use policy_ledger_core::SessionId;
use policy_ledger_core::StaticActorResolver;
use policy_ledger_core::actor::UNKNOWN_IDENTITY;
use policy_ledger_core::policy::DEFAULT_ALLOWED_ROOT;
use policy_ledger_core::runtime::gate::DEFAULT_MAX_DIR_ENTRIES;
use policy_ledger_core::runtime::gate::DEFAULT_MAX_FILE_BYTES;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "policy-ledger.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "POLICY_LEDGER_CONFIG";
/// Environment variable overriding `policy.allowed_roots` (comma list).
pub const ROOTS_ENV_VAR: &str = "POLICY_LEDGER_ROOTS";
/// Environment variable overriding `decision_log.path`.
pub const DECISION_LOG_ENV_VAR: &str = "POLICY_LEDGER_DECISION_LOG";
/// Environment variable toggling `decision_log.enabled`.
pub const DECISION_LOG_ENABLED_ENV_VAR: &str = "POLICY_LEDGER_DECISION_LOG_ENABLED";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of allowed roots.
pub(crate) const MAX_ALLOWED_ROOTS: usize = 256;
/// Maximum number of actor bindings.
pub(crate) const MAX_ACTOR_BINDINGS: usize = 64;
/// Maximum number of extra event types.
pub(crate) const MAX_EVENT_TYPES: usize = 128;
/// Upper bound for `policy.max_file_bytes`.
pub(crate) const MAX_FILE_BYTES_LIMIT: u64 = 64 * 1024 * 1024;
/// Upper bound for `policy.max_dir_entries`.
pub(crate) const MAX_DIR_ENTRIES_LIMIT: usize = 10_000;
/// Default maximum request line size for the stdio server.
pub(crate) const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;
/// Lower bound for `server.max_line_bytes`.
pub(crate) const MIN_MAX_LINE_BYTES: usize = 1024;
/// Upper bound for `server.max_line_bytes`.
pub(crate) const MAX_MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Policy Ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyLedgerConfig {
    /// Allowlist and sandbox configuration.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Decision log configuration.
    #[serde(default)]
    pub decision_log: DecisionLogConfig,
    /// Event ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Lifecycle configuration.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// Resource server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Actor bindings, overriding the built-in defaults per context.
    #[serde(default)]
    pub actors: Vec<ActorConfig>,
    /// Resolved source file, when one was read.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl PolicyLedgerConfig {
    /// Loads configuration using the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| env::var(key).ok())
    }

    /// Loads configuration with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (resolved, explicit) = resolve_path(path, &lookup)?;
        validate_path(&resolved)?;
        let mut config = if !explicit && !resolved.exists() {
            Self::default()
        } else {
            let mut config = Self::from_file(&resolved)?;
            config.source_path = Some(resolved);
            config
        };
        config.apply_env_overrides(&lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parses a config file without environment overrides or validation.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses TOML content without validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown fields.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment overrides.
    ///
    /// Empty or unset variables leave the configured value in place.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ROOTS_ENV_VAR) {
            let roots: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|root| !root.is_empty())
                .map(str::to_string)
                .collect();
            if !roots.is_empty() {
                self.policy.allowed_roots = roots;
            }
        }
        if let Some(path) = lookup(DECISION_LOG_ENV_VAR) {
            let path = path.trim();
            if !path.is_empty() {
                self.decision_log.path = path.to_string();
            }
        }
        if let Some(flag) = lookup(DECISION_LOG_ENABLED_ENV_VAR) {
            let flag = flag.trim().to_ascii_lowercase();
            if !flag.is_empty() {
                self.decision_log.enabled = !matches!(flag.as_str(), "0" | "false" | "no" | "off");
            }
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        self.decision_log.validate()?;
        self.ledger.validate()?;
        self.lifecycle.validate()?;
        self.server.validate()?;
        validate_actors(&self.actors)?;
        if self.decision_log.enabled
            && Path::new(self.decision_log.path.trim()) == Path::new(self.ledger.path.trim())
        {
            return Err(ConfigError::Invalid(
                "decision_log.path must differ from ledger.path".to_string(),
            ));
        }
        if self.decision_log.mirror_to_ledger && !self.decision_log.enabled {
            return Err(ConfigError::Invalid(
                "decision_log.mirror_to_ledger requires decision_log.enabled=true".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the pinned policy snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the roots are malformed.
    pub fn policy_snapshot(&self) -> Result<PolicySnapshot, ConfigError> {
        PolicySnapshot::new(&self.policy.allowed_roots)
            .map_err(|err| ConfigError::Invalid(format!("policy.allowed_roots: {err}")))
    }

    /// Returns the gate limits.
    #[must_use]
    pub const fn gate_limits(&self) -> GateLimits {
        GateLimits {
            max_file_bytes: self.policy.max_file_bytes,
            max_dir_entries: self.policy.max_dir_entries,
        }
    }

    /// Builds the payload registry with configured opaque event types.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an event type is malformed.
    pub fn payload_registry(&self) -> Result<PayloadRegistry, ConfigError> {
        let mut registry = PayloadRegistry::builtin();
        for event_type in &self.ledger.event_types {
            registry
                .register_opaque(event_type.trim())
                .map_err(|err| ConfigError::Invalid(format!("ledger.event_types: {err}")))?;
        }
        Ok(registry)
    }

    /// Returns ledger writer options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an event type is malformed.
    pub fn ledger_options(&self) -> Result<LedgerOptions, ConfigError> {
        Ok(LedgerOptions {
            chain: self.ledger.chain,
            fsync: self.ledger.fsync,
            registry: self.payload_registry()?,
        })
    }

    /// Returns the lifecycle session identifier.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        SessionId::new(self.lifecycle.session_id.trim())
    }

    /// Builds the actor resolver: built-in defaults, then configured bindings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an actor is not a concrete identity.
    pub fn build_actor_resolver(&self) -> Result<StaticActorResolver, ConfigError> {
        let mut resolver = StaticActorResolver::new();
        for (context, actor) in default_actor_bindings() {
            resolver
                .bind(context, actor)
                .map_err(|err| ConfigError::Invalid(format!("default actor: {err}")))?;
        }
        for binding in &self.actors {
            resolver
                .bind(ActorContext::new(binding.context.trim()), binding.to_actor())
                .map_err(|err| ConfigError::Invalid(format!("actors.{}: {err}", binding.context)))?;
        }
        Ok(resolver)
    }
}

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Allowlist and sandbox configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Repo-relative roots that may be exposed.
    #[serde(default = "default_allowed_roots")]
    pub allowed_roots: Vec<String>,
    /// Directory all paths are resolved against.
    #[serde(default = "default_sandbox_root")]
    pub sandbox_root: String,
    /// Largest readable file in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Most children returned per listing.
    #[serde(default = "default_max_dir_entries")]
    pub max_dir_entries: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_roots: default_allowed_roots(),
            sandbox_root: default_sandbox_root(),
            max_file_bytes: default_max_file_bytes(),
            max_dir_entries: default_max_dir_entries(),
        }
    }
}

impl PolicyConfig {
    /// Validates policy configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_roots.len() > MAX_ALLOWED_ROOTS {
            return Err(ConfigError::Invalid("policy.allowed_roots has too many entries".to_string()));
        }
        PolicySnapshot::new(&self.allowed_roots)
            .map_err(|err| ConfigError::Invalid(format!("policy.allowed_roots: {err}")))?;
        validate_path_string("policy.sandbox_root", &self.sandbox_root)?;
        if self.max_file_bytes == 0 || self.max_file_bytes > MAX_FILE_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "policy.max_file_bytes must be between 1 and {MAX_FILE_BYTES_LIMIT}"
            )));
        }
        if self.max_dir_entries == 0 || self.max_dir_entries > MAX_DIR_ENTRIES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "policy.max_dir_entries must be between 1 and {MAX_DIR_ENTRIES_LIMIT}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Decision Log
// ============================================================================

/// Decision log configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionLogConfig {
    /// Persist decision records.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// JSONL output path.
    #[serde(default = "default_decision_log_path")]
    pub path: String,
    /// Sync after every record.
    #[serde(default)]
    pub fsync: bool,
    /// Also append records to the event ledger.
    #[serde(default)]
    pub mirror_to_ledger: bool,
}

impl Default for DecisionLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_decision_log_path(),
            fsync: false,
            mirror_to_ledger: false,
        }
    }
}

impl DecisionLogConfig {
    /// Validates decision log configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled {
            validate_path_string("decision_log.path", &self.path)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// Event ledger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// JSONL ledger path.
    #[serde(default = "default_ledger_path")]
    pub path: String,
    /// Chaining mode.
    #[serde(default)]
    pub chain: ChainMode,
    /// Sync after every envelope.
    #[serde(default)]
    pub fsync: bool,
    /// Extra event types accepted with opaque payloads.
    #[serde(default)]
    pub event_types: Vec<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
            chain: ChainMode::default(),
            fsync: false,
            event_types: Vec::new(),
        }
    }
}

impl LedgerConfig {
    /// Validates ledger configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("ledger.path", &self.path)?;
        if self.event_types.len() > MAX_EVENT_TYPES {
            return Err(ConfigError::Invalid("ledger.event_types has too many entries".to_string()));
        }
        let mut registry = PayloadRegistry::builtin();
        for event_type in &self.event_types {
            registry
                .register_opaque(event_type.trim())
                .map_err(|err| ConfigError::Invalid(format!("ledger.event_types: {err}")))?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Lifecycle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LifecycleConfig {
    /// System identity file.
    #[serde(default = "default_identity_path")]
    pub identity_path: String,
    /// Session identifier for lifecycle and mirrored envelopes.
    #[serde(default = "default_session_id")]
    pub session_id: String,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            identity_path: default_identity_path(),
            session_id: default_session_id(),
        }
    }
}

impl LifecycleConfig {
    /// Validates lifecycle configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("lifecycle.identity_path", &self.identity_path)?;
        let session = self.session_id.trim();
        if session.is_empty() || session == UNKNOWN_IDENTITY {
            return Err(ConfigError::Invalid(
                "lifecycle.session_id must be set and not 'unknown'".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Destination for server diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticsMode {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `server.diagnostics_path`.
    File,
    /// Diagnostics disabled.
    None,
}

/// Resource server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Maximum request line size in bytes.
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
    /// Diagnostics destination.
    #[serde(default)]
    pub diagnostics: DiagnosticsMode,
    /// Diagnostics file for [`DiagnosticsMode::File`].
    #[serde(default)]
    pub diagnostics_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: default_max_line_bytes(),
            diagnostics: DiagnosticsMode::default(),
            diagnostics_path: None,
        }
    }
}

impl ServerConfig {
    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_MAX_LINE_BYTES ..= MAX_MAX_LINE_BYTES).contains(&self.max_line_bytes) {
            return Err(ConfigError::Invalid(format!(
                "server.max_line_bytes must be between {MIN_MAX_LINE_BYTES} and {MAX_MAX_LINE_BYTES}"
            )));
        }
        match (self.diagnostics, &self.diagnostics_path) {
            (DiagnosticsMode::File, None) => Err(ConfigError::Invalid(
                "server.diagnostics=file requires server.diagnostics_path".to_string(),
            )),
            (DiagnosticsMode::File, Some(path)) => {
                validate_path_string("server.diagnostics_path", path)
            }
            _ => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Actors
// ============================================================================

/// Actor bound to a context.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ActorConfig {
    /// Context label (`lifecycle`, `resource_server`, `cli`, or custom).
    pub context: String,
    /// Actor category.
    pub kind: ActorKind,
    /// Stable actor identifier.
    pub id: String,
    /// Agent identifier.
    #[serde(default)]
    pub agent_id: Option<String>,
    /// Persona identifier.
    #[serde(default)]
    pub persona_id: Option<String>,
    /// Source label.
    #[serde(default)]
    pub source: Option<String>,
    /// Display name.
    #[serde(default)]
    pub display: Option<String>,
}

impl ActorConfig {
    /// Converts the binding into an actor.
    #[must_use]
    pub fn to_actor(&self) -> Actor {
        let mut actor = Actor::new(self.kind, self.id.trim());
        actor.agent_id.clone_from(&self.agent_id);
        actor.persona_id.clone_from(&self.persona_id);
        actor.source.clone_from(&self.source);
        actor.display.clone_from(&self.display);
        actor
    }
}

/// Validates actor bindings.
fn validate_actors(actors: &[ActorConfig]) -> Result<(), ConfigError> {
    if actors.len() > MAX_ACTOR_BINDINGS {
        return Err(ConfigError::Invalid("actors has too many entries".to_string()));
    }
    let mut contexts = BTreeSet::new();
    for binding in actors {
        let context = binding.context.trim();
        if context.is_empty() {
            return Err(ConfigError::Invalid("actors.context must be non-empty".to_string()));
        }
        if !contexts.insert(context) {
            return Err(ConfigError::Invalid(format!("actors.context '{context}' is duplicated")));
        }
        binding
            .to_actor()
            .validate()
            .map_err(|err| ConfigError::Invalid(format!("actors.{context}: {err}")))?;
    }
    Ok(())
}

/// Built-in actor bindings.
fn default_actor_bindings() -> [(ActorContext, Actor); 3] {
    [
        (
            ActorContext::lifecycle(),
            Actor::new(ActorKind::System, "policy-ledger-lifecycle").with_source("policy-ledger"),
        ),
        (
            ActorContext::resource_server(),
            Actor::new(ActorKind::Runtime, "policy-ledger-resource-server")
                .with_source("policy-ledger"),
        ),
        (
            ActorContext::cli(),
            Actor::new(ActorKind::Runtime, "policy-ledger-cli").with_source("policy-ledger"),
        ),
    ]
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag is true when it was named explicitly.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<(PathBuf, bool), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR).filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default allowlist.
fn default_allowed_roots() -> Vec<String> {
    vec![DEFAULT_ALLOWED_ROOT.to_string()]
}

/// Default sandbox root.
fn default_sandbox_root() -> String {
    ".".to_string()
}

/// Default file size cap.
const fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}

/// Default listing cap.
const fn default_max_dir_entries() -> usize {
    DEFAULT_MAX_DIR_ENTRIES
}

/// Serde helper for `true` defaults.
const fn default_true() -> bool {
    true
}

/// Default decision log path.
fn default_decision_log_path() -> String {
    "runtime_data/policy_decisions.jsonl".to_string()
}

/// Default ledger path.
fn default_ledger_path() -> String {
    "runtime_data/events.jsonl".to_string()
}

/// Default system identity path.
fn default_identity_path() -> String {
    "runtime_data/system_identity.json".to_string()
}

/// Default lifecycle session.
fn default_session_id() -> String {
    "policy-ledger".to_string()
}

/// Default maximum request line.
const fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}
