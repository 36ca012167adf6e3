// crates/policy-ledger-core/src/runtime/actors.rs
// ============================================================================
// Module: Static Actor Resolver
// Description: Context-to-actor bindings loaded from configuration.
// Purpose: Attribute every recorded action to a concrete, configured identity.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`StaticActorResolver`] holds a fixed map from execution context to actor.
//! Actors are validated when bound, and lookups for unbound contexts fail
//! closed with `MISSING_ACTOR`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::actor::Actor;
use crate::core::actor::ActorContext;
use crate::core::actor::ActorError;
use crate::interfaces::ActorResolver;

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Actor resolver backed by a static binding table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticActorResolver {
    /// Bound actors keyed by context.
    bindings: BTreeMap<ActorContext, Actor>,
}

impl StaticActorResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds an actor to a context, replacing any previous binding.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Invalid`] when the actor is not a concrete identity.
    pub fn bind(&mut self, context: ActorContext, actor: Actor) -> Result<(), ActorError> {
        actor.validate()?;
        self.bindings.insert(context, actor);
        Ok(())
    }

    /// Builder form of [`Self::bind`].
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Invalid`] when the actor is not a concrete identity.
    pub fn with(mut self, context: ActorContext, actor: Actor) -> Result<Self, ActorError> {
        self.bind(context, actor)?;
        Ok(self)
    }

    /// Returns the bound contexts.
    pub fn contexts(&self) -> impl Iterator<Item = &ActorContext> {
        self.bindings.keys()
    }
}

impl ActorResolver for StaticActorResolver {
    fn resolve(&self, context: &ActorContext) -> Result<Actor, ActorError> {
        self.bindings
            .get(context)
            .cloned()
            .ok_or_else(|| ActorError::Missing(context.to_string()))
    }
}
