// crates/policy-ledger-core/src/core/actor.rs
// ============================================================================
// Module: Policy Ledger Actors
// Description: Accountable actor records attached to every envelope.
// Purpose: Model who is responsible for an action, failing closed on gaps.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Each envelope carries exactly one [`Actor`]. Actors are resolved from an
//! execution context (see [`crate::interfaces::ActorResolver`]) and are never
//! inferred from payload content. The literal id `unknown` is rejected so a
//! placeholder can never stand in for a real identity.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::error_code::ErrorCode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder identity that is never accepted.
pub const UNKNOWN_IDENTITY: &str = "unknown";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Category of accountable actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// The runtime itself (servers, gates).
    Runtime,
    /// An automated agent.
    Agent,
    /// A human operator.
    Human,
    /// An institution acting through a delegate.
    Institution,
    /// The system lifecycle (boot/shutdown).
    System,
}

/// Accountable identity attributed to an action.
///
/// # Invariants
/// - `id` is non-empty and never `unknown`.
/// - `id` is stable across replays of the same logical actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Actor category.
    pub kind: ActorKind,
    /// Stable actor identifier.
    pub id: String,
    /// Agent identifier when the actor wraps an agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// Persona identifier when the actor wraps a persona.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    /// Free-form source label (host, component).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Human-readable display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Actor {
    /// Creates an actor with only the required fields.
    #[must_use]
    pub fn new(kind: ActorKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            agent_id: None,
            persona_id: None,
            source: None,
            display: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Sets the source label.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Validates the actor identity.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Invalid`] when the id is empty or a placeholder.
    pub fn validate(&self) -> Result<(), ActorError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(ActorError::Invalid("actor.id must be non-empty".to_string()));
        }
        if id == UNKNOWN_IDENTITY {
            return Err(ActorError::Invalid("actor.id must not be 'unknown'".to_string()));
        }
        Ok(())
    }
}

/// Execution context used to look up the responsible actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorContext(String);

impl ActorContext {
    /// Context used by lifecycle boot/shutdown events.
    pub const LIFECYCLE: &'static str = "lifecycle";
    /// Context used by the resource server when mirroring decisions.
    pub const RESOURCE_SERVER: &'static str = "resource_server";
    /// Context used by operator CLI commands.
    pub const CLI: &'static str = "cli";

    /// Creates a context label.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the lifecycle context.
    #[must_use]
    pub fn lifecycle() -> Self {
        Self::new(Self::LIFECYCLE)
    }

    /// Returns the resource server context.
    #[must_use]
    pub fn resource_server() -> Self {
        Self::new(Self::RESOURCE_SERVER)
    }

    /// Returns the operator CLI context.
    #[must_use]
    pub fn cli() -> Self {
        Self::new(Self::CLI)
    }

    /// Returns the context label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Actor resolution and validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActorError {
    /// No actor is configured for the context.
    #[error("no actor configured for context '{0}'")]
    Missing(String),
    /// Actor record is present but not a concrete identity.
    #[error("invalid actor: {0}")]
    Invalid(String),
}

impl ActorError {
    /// Returns the stable reason code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::MissingActor
    }
}
