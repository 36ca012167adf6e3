// crates/policy-ledger-mcp/src/resources.rs
// ============================================================================
// Module: Resource Catalog
// Description: Static resource listings and resource body builders.
// Purpose: Render policy, index, directory, and file resources as MCP content.
// Dependencies: policy-ledger-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Bodies are plain data built from a gate outcome and the decision record
//! that was written for it. Directory and deny bodies are pretty-printed
//! JSON; allowed file reads return the file text with invalid UTF-8
//! replaced. A deny body always has `ok: false` and an `error.code`, which
//! is how replay classifies it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use policy_ledger_core::DecisionRecord;
use policy_ledger_core::EventTimestamp;
use policy_ledger_core::GateDenial;
use policy_ledger_core::GateOutcome;
use policy_ledger_core::PolicySnapshot;
use policy_ledger_core::ResolvedAccess;
use policy_ledger_core::ResourceKind;
use policy_ledger_core::decision::DECISION_SCHEMA;
use policy_ledger_core::runtime::gate::DirEntryInfo;
use policy_ledger_core::uri::DIR_URI_TEMPLATE;
use policy_ledger_core::uri::FILE_URI_TEMPLATE;
use policy_ledger_core::uri::INDEX_URI;
use policy_ledger_core::uri::POLICY_URI;
use policy_ledger_core::uri::encode_path_segment;
use policy_ledger_core::uri::resource_uri;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Policy resource schema.
pub const POLICY_SCHEMA: &str = "mcp-policy/v1";
/// Index resource schema.
pub const INDEX_SCHEMA: &str = "mcpfs-index/v1";
/// Directory resource schema.
pub const DIR_SCHEMA: &str = "mcpfs-dir/v1";
/// MIME type for JSON bodies.
pub const JSON_MIME_TYPE: &str = "application/json";
/// MIME type for file reads.
pub const TEXT_MIME_TYPE: &str = "text/plain";
/// Example path used in the encoding contract.
const CONTRACT_EXAMPLE_PATH: &str = "projects/mcp/05-policy-log/main.py";

// ============================================================================
// SECTION: Listing Types
// ============================================================================

/// Resource metadata returned from `resources/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceMetadata {
    /// Stable resource URI.
    pub uri: &'static str,
    /// Short name.
    pub name: &'static str,
    /// Description of the resource.
    pub description: &'static str,
    /// MIME type of the body.
    #[serde(rename = "mimeType")]
    pub mime_type: &'static str,
}

/// Behavioral hints attached to resource templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceAnnotations {
    /// Reads never modify the sandbox.
    #[serde(rename = "readOnlyHint")]
    pub read_only_hint: bool,
    /// Repeated reads are not idempotent: each one appends a decision record.
    #[serde(rename = "idempotentHint")]
    pub idempotent_hint: bool,
}

/// URI template returned from `resources/templates/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceTemplate {
    /// RFC 6570 template.
    #[serde(rename = "uriTemplate")]
    pub uri_template: &'static str,
    /// Short name.
    pub name: &'static str,
    /// Description of the template.
    pub description: &'static str,
    /// MIME type of the body.
    #[serde(rename = "mimeType")]
    pub mime_type: &'static str,
    /// Behavioral hints.
    pub annotations: ResourceAnnotations,
}

/// Resource content returned from `resources/read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceContent {
    /// URI matching the requested resource.
    pub uri: String,
    /// MIME type for the payload.
    #[serde(rename = "mimeType")]
    pub mime_type: &'static str,
    /// Body text.
    pub text: String,
}

/// Returns the static resources.
#[must_use]
pub fn static_resources() -> Vec<ResourceMetadata> {
    vec![
        ResourceMetadata {
            uri: POLICY_URI,
            name: "policy",
            description: "Current resource policy and path encoding contract.",
            mime_type: JSON_MIME_TYPE,
        },
        ResourceMetadata {
            uri: INDEX_URI,
            name: "index",
            description: "Allowed roots as browsable directories.",
            mime_type: JSON_MIME_TYPE,
        },
    ]
}

/// Returns the gated resource templates.
#[must_use]
pub fn resource_templates() -> Vec<ResourceTemplate> {
    let annotations = ResourceAnnotations {
        read_only_hint: true,
        idempotent_hint: false,
    };
    vec![
        ResourceTemplate {
            uri_template: DIR_URI_TEMPLATE,
            name: "dir",
            description: "List a directory under the allowed roots. {path} is one URL-encoded \
                          segment. Every read is logged.",
            mime_type: JSON_MIME_TYPE,
            annotations,
        },
        ResourceTemplate {
            uri_template: FILE_URI_TEMPLATE,
            name: "file",
            description: "Read a text file under the allowed roots. {path} is one URL-encoded \
                          segment. Every read is logged.",
            mime_type: TEXT_MIME_TYPE,
            annotations,
        },
    ]
}

// ============================================================================
// SECTION: Policy and Index Bodies
// ============================================================================

/// Decision log settings advertised by the policy resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionLogInfo {
    /// Whether records are persisted.
    pub enabled: bool,
    /// Decision log path.
    pub path: String,
    /// Record schema.
    pub schema: &'static str,
}

impl DecisionLogInfo {
    /// Creates the advertised settings.
    #[must_use]
    pub fn new(enabled: bool, path: impl Into<String>) -> Self {
        Self {
            enabled,
            path: path.into(),
            schema: DECISION_SCHEMA,
        }
    }
}

/// How clients must encode `{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct EncodedPathContract {
    /// Template placeholder.
    template: &'static str,
    /// Encoding rule.
    encoding: &'static str,
    /// Example repo-relative path.
    example_rel: &'static str,
    /// The example encoded.
    example_encoded: String,
}

/// Body of `mcpfs://repo/policy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct PolicyBody<'a> {
    /// Schema tag.
    schema: &'static str,
    /// Render time.
    generated_at: EventTimestamp,
    /// Allowed roots.
    allowed_roots: &'a [String],
    /// Roots hash.
    roots_hash: &'a str,
    /// Encoding contract.
    encoded_path_contract: EncodedPathContract,
    /// Decision log settings.
    decision_log: &'a DecisionLogInfo,
}

/// Index entry for one allowed root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct IndexEntry {
    /// Root path.
    name: String,
    /// Always `dir`.
    #[serde(rename = "type")]
    kind: ResourceKind,
    /// Directory URI.
    uri: String,
}

/// Body of `mcpfs://repo/index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct IndexBody {
    /// Schema tag.
    schema: &'static str,
    /// Render time.
    generated_at: EventTimestamp,
    /// One entry per allowed root.
    entries: Vec<IndexEntry>,
}

/// Renders the policy resource.
///
/// # Errors
///
/// Returns [`serde_json::Error`] when serialization fails.
pub fn policy_content(
    policy: &PolicySnapshot,
    decision_log: &DecisionLogInfo,
) -> Result<ResourceContent, serde_json::Error> {
    let body = PolicyBody {
        schema: POLICY_SCHEMA,
        generated_at: EventTimestamp::now(),
        allowed_roots: policy.allowed_roots(),
        roots_hash: policy.roots_hash(),
        encoded_path_contract: EncodedPathContract {
            template: "{path}",
            encoding: "URL-encode the full relative path into one segment (encode '/' as %2F).",
            example_rel: CONTRACT_EXAMPLE_PATH,
            example_encoded: encode_path_segment(CONTRACT_EXAMPLE_PATH),
        },
        decision_log,
    };
    json_content(POLICY_URI, &body)
}

/// Renders the index resource.
///
/// # Errors
///
/// Returns [`serde_json::Error`] when serialization fails.
pub fn index_content(policy: &PolicySnapshot) -> Result<ResourceContent, serde_json::Error> {
    let entries = policy
        .allowed_roots()
        .iter()
        .map(|root| IndexEntry {
            name: root.clone(),
            kind: ResourceKind::Dir,
            uri: resource_uri(ResourceKind::Dir, root),
        })
        .collect();
    let body = IndexBody {
        schema: INDEX_SCHEMA,
        generated_at: EventTimestamp::now(),
        entries,
    };
    json_content(INDEX_URI, &body)
}

// ============================================================================
// SECTION: Gated Bodies
// ============================================================================

/// Error detail of a deny body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct DenyDetail<'a> {
    /// Reason code.
    code: &'static str,
    /// Human-readable message.
    message: &'a str,
    /// Path as requested.
    path: &'a str,
    /// File size for `TOO_LARGE`.
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes: Option<u64>,
}

/// Body returned for any denied gated read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct DenyBody<'a> {
    /// Schema tag (directory reads only).
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'static str>,
    /// Always false.
    ok: bool,
    /// Denial detail.
    error: DenyDetail<'a>,
    /// Render time.
    generated_at: &'a EventTimestamp,
    /// Request identifier.
    request_id: &'a str,
}

/// Body returned for an allowed directory read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct DirBody<'a> {
    /// Schema tag.
    schema: &'static str,
    /// Always true.
    ok: bool,
    /// Normalized path.
    path: &'a str,
    /// Render time.
    generated_at: &'a EventTimestamp,
    /// Request identifier.
    request_id: &'a str,
    /// Listed children.
    children: &'a [DirEntryInfo],
}

/// Renders a gated read from its outcome and the record logged for it.
///
/// # Errors
///
/// Returns [`serde_json::Error`] when serialization fails.
pub fn gated_content(
    outcome: &GateOutcome,
    record: &DecisionRecord,
) -> Result<ResourceContent, serde_json::Error> {
    let uri = record.uri.clone();
    let generated_at = &record.ts;
    let request_id = record.request_id.as_str();
    match &outcome.result {
        Ok(ResolvedAccess::File {
            bytes, ..
        }) => Ok(ResourceContent {
            uri,
            mime_type: TEXT_MIME_TYPE,
            text: String::from_utf8_lossy(bytes).into_owned(),
        }),
        Ok(ResolvedAccess::Directory {
            path,
            children,
        }) => {
            let body = DirBody {
                schema: DIR_SCHEMA,
                ok: true,
                path,
                generated_at,
                request_id,
                children,
            };
            json_content(uri, &body)
        }
        Err(denial) => {
            let body = deny_body(outcome, denial, generated_at, request_id);
            let mime_type = match outcome.kind {
                ResourceKind::Dir => JSON_MIME_TYPE,
                ResourceKind::File => TEXT_MIME_TYPE,
            };
            Ok(ResourceContent {
                uri,
                mime_type,
                text: serde_json::to_string_pretty(&body)?,
            })
        }
    }
}

/// Builds the deny body for a gate denial.
fn deny_body<'a>(
    outcome: &'a GateOutcome,
    denial: &'a GateDenial,
    generated_at: &'a EventTimestamp,
    request_id: &'a str,
) -> DenyBody<'a> {
    let schema = match outcome.kind {
        ResourceKind::Dir => Some(DIR_SCHEMA),
        ResourceKind::File => None,
    };
    DenyBody {
        schema,
        ok: false,
        error: DenyDetail {
            code: denial.code.as_str(),
            message: &denial.message,
            path: outcome.display_path(),
            bytes: denial.bytes,
        },
        generated_at,
        request_id,
    }
}

/// Serializes a body as pretty JSON content.
fn json_content<T: Serialize>(
    uri: impl Into<String>,
    body: &T,
) -> Result<ResourceContent, serde_json::Error> {
    Ok(ResourceContent {
        uri: uri.into(),
        mime_type: JSON_MIME_TYPE,
        text: serde_json::to_string_pretty(body)?,
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use policy_ledger_core::PolicySnapshot;
    use serde_json::Value;

    use super::DecisionLogInfo;
    use super::index_content;
    use super::policy_content;
    use super::resource_templates;
    use super::static_resources;

    #[test]
    fn policy_body_advertises_contract_and_log() {
        let policy = PolicySnapshot::new(["projects/mcp", "docs"]).unwrap();
        let info = DecisionLogInfo::new(true, "runtime_data/policy_decisions.jsonl");
        let content = policy_content(&policy, &info).unwrap();
        assert_eq!(content.uri, "mcpfs://repo/policy");
        assert_eq!(content.mime_type, "application/json");
        let body: Value = serde_json::from_str(&content.text).unwrap();
        assert_eq!(body["schema"], "mcp-policy/v1");
        assert_eq!(body["roots_hash"], policy.roots_hash());
        assert_eq!(
            body["encoded_path_contract"]["example_encoded"],
            "projects%2Fmcp%2F05-policy-log%2Fmain.py"
        );
        assert_eq!(body["decision_log"]["schema"], "mcp-policy-decision/v1");
        assert_eq!(body["decision_log"]["enabled"], true);
    }

    #[test]
    fn index_lists_roots_as_directories() {
        let policy = PolicySnapshot::new(["projects/mcp", "docs"]).unwrap();
        let body: Value = serde_json::from_str(&index_content(&policy).unwrap().text).unwrap();
        assert_eq!(body["schema"], "mcpfs-index/v1");
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["name"], "projects/mcp");
        assert_eq!(entries[0]["type"], "dir");
        assert_eq!(entries[0]["uri"], "mcpfs://repo/dir/projects%2Fmcp");
    }

    #[test]
    fn listings_carry_hints() {
        assert_eq!(static_resources().len(), 2);
        let templates = serde_json::to_value(resource_templates()).unwrap();
        assert_eq!(templates[0]["uriTemplate"], "mcpfs://repo/dir/{path}");
        assert_eq!(templates[1]["mimeType"], "text/plain");
        assert_eq!(templates[1]["annotations"]["readOnlyHint"], true);
        assert_eq!(templates[1]["annotations"]["idempotentHint"], false);
    }
}
