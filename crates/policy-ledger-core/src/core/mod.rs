// crates/policy-ledger-core/src/core/mod.rs
// ============================================================================
// Module: Policy Ledger Core Types
// Description: Envelope, policy, decision, lifecycle, and replay data model.
// Purpose: Group the pure, deterministic building blocks of the ledger.
// Dependencies: serde, serde_json, serde_jcs, sha2, time, percent-encoding
// ============================================================================

//! ## Overview
//! Everything in this module is pure: no filesystem access, no clocks beyond
//! explicit timestamp constructors, and no global state. Runtime behavior
//! lives in [`crate::runtime`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod actor;
pub mod decision;
pub mod envelope;
pub mod error_code;
pub mod hashing;
pub mod identifiers;
pub mod lifecycle;
pub mod policy;
pub mod replay;
pub mod time;
pub mod uri;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use actor::Actor;
pub use actor::ActorContext;
pub use actor::ActorError;
pub use actor::ActorKind;
pub use decision::AccessRequest;
pub use decision::Decision;
pub use decision::DecisionReason;
pub use decision::DecisionRecord;
pub use decision::PolicyRef;
pub use decision::ResourceKind;
pub use envelope::CodecError;
pub use envelope::EnvelopeDraft;
pub use envelope::EventEnvelope;
pub use envelope::EventPayload;
pub use envelope::PayloadRegistry;
pub use error_code::ErrorCode;
pub use hashing::HashError;
pub use hashing::canonical_hash;
pub use identifiers::ProcessId;
pub use identifiers::RequestId;
pub use identifiers::RunId;
pub use identifiers::SessionId;
pub use identifiers::SpanId;
pub use identifiers::SystemId;
pub use identifiers::TraceId;
pub use lifecycle::BootClassification;
pub use lifecycle::BootMode;
pub use lifecycle::BootPayload;
pub use lifecycle::ShutdownPayload;
pub use lifecycle::SystemIdentity;
pub use lifecycle::classify_boot;
pub use policy::GateDenial;
pub use policy::PolicyError;
pub use policy::PolicySnapshot;
pub use replay::Baseline;
pub use replay::BaselineCheck;
pub use replay::DedupeMode;
pub use replay::PlanFilters;
pub use replay::ReplayPlan;
pub use replay::ReplayReport;
pub use replay::ReplayStatus;
pub use replay::ReplayStep;
pub use self::time::EventTimestamp;
pub use uri::ResourceUri;
