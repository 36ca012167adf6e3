// crates/policy-ledger-core/src/core/uri.rs
// ============================================================================
// Module: Resource Addressing
// Description: The `mcpfs://repo/...` URI scheme and single-segment path encoding.
// Purpose: Parse resource URIs and encode/decode path parameters.
// Dependencies: percent-encoding
// ============================================================================

//! ## Overview
//! Resources live under a fixed authority. Directory and file forms carry the
//! repo-relative path as exactly one percent-encoded segment (`/` becomes
//! `%2F`) because template matching does not support multi-segment captures.
//! Parsing keeps the raw segment untouched; decoding happens in the gate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::percent_decode_str;
use percent_encoding::utf8_percent_encode;

use crate::core::decision::ResourceKind;
use crate::core::policy::GateDenial;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Scheme and authority prefix shared by all resources.
pub const RESOURCE_PREFIX: &str = "mcpfs://repo/";
/// Static policy introspection resource.
pub const POLICY_URI: &str = "mcpfs://repo/policy";
/// Static allowed-roots index resource.
pub const INDEX_URI: &str = "mcpfs://repo/index";
/// Directory listing template.
pub const DIR_URI_TEMPLATE: &str = "mcpfs://repo/dir/{path}";
/// File read template.
pub const FILE_URI_TEMPLATE: &str = "mcpfs://repo/file/{path}";
/// Directory listing prefix.
const DIR_PREFIX: &str = "dir/";
/// File read prefix.
const FILE_PREFIX: &str = "file/";

/// Characters left unencoded in a path segment (RFC 3986 unreserved).
const SEGMENT_ENCODE_SET: &AsciiSet =
    &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

// ============================================================================
// SECTION: Resource URIs
// ============================================================================

/// Parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    /// `mcpfs://repo/policy`.
    Policy,
    /// `mcpfs://repo/index`.
    Index,
    /// `mcpfs://repo/dir/{raw}`.
    Dir(String),
    /// `mcpfs://repo/file/{raw}`.
    File(String),
}

impl ResourceUri {
    /// Parses a resource URI, keeping the path segment encoded.
    ///
    /// Returns `None` for foreign schemes, unknown forms, and segments that
    /// contain a literal `/`.
    #[must_use]
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix(RESOURCE_PREFIX)?;
        match rest {
            "policy" => return Some(Self::Policy),
            "index" => return Some(Self::Index),
            _ => {}
        }
        if let Some(raw) = rest.strip_prefix(DIR_PREFIX) {
            return single_segment(raw).map(Self::Dir);
        }
        if let Some(raw) = rest.strip_prefix(FILE_PREFIX) {
            return single_segment(raw).map(Self::File);
        }
        None
    }

    /// Returns the gated resource kind and raw segment, if any.
    #[must_use]
    pub fn gated(&self) -> Option<(ResourceKind, &str)> {
        match self {
            Self::Dir(raw) => Some((ResourceKind::Dir, raw)),
            Self::File(raw) => Some((ResourceKind::File, raw)),
            Self::Policy | Self::Index => None,
        }
    }
}

/// Accepts a raw segment only when it has no literal separator.
fn single_segment(raw: &str) -> Option<String> {
    if raw.contains('/') {
        return None;
    }
    Some(raw.to_string())
}

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Percent-encodes a repo-relative path into a single segment.
#[must_use]
pub fn encode_path_segment(path: &str) -> String {
    utf8_percent_encode(path, SEGMENT_ENCODE_SET).to_string()
}

/// Decodes a raw segment into UTF-8 text.
///
/// # Errors
///
/// Returns a `BAD_PATH` denial when the decoded bytes are not UTF-8.
pub fn decode_path_segment(raw: &str) -> Result<String, GateDenial> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| GateDenial::bad_path("path is not valid utf-8 after decoding"))
}

/// Decodes a raw segment, replacing invalid UTF-8 for logging.
#[must_use]
pub fn decode_path_segment_lossy(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Builds the URI for a resource of `kind` at a repo-relative path.
#[must_use]
pub fn resource_uri(kind: ResourceKind, path: &str) -> String {
    format!("{RESOURCE_PREFIX}{}{}", kind_prefix(kind), encode_path_segment(path))
}

/// Builds the URI for a raw, already-encoded segment.
#[must_use]
pub fn raw_resource_uri(kind: ResourceKind, raw: &str) -> String {
    format!("{RESOURCE_PREFIX}{}{raw}", kind_prefix(kind))
}

/// Returns the path prefix for a resource kind.
const fn kind_prefix(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Dir => DIR_PREFIX,
        ResourceKind::File => FILE_PREFIX,
    }
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

    use super::ResourceUri;
    use super::decode_path_segment;
    use super::encode_path_segment;
    use super::resource_uri;
    use crate::core::decision::ResourceKind;

    #[test]
    fn encodes_separators_into_one_segment() {
        assert_eq!(encode_path_segment("projects/mcp/a b.md"), "projects%2Fmcp%2Fa%20b.md");
        assert_eq!(
            resource_uri(ResourceKind::Dir, "projects/mcp"),
            "mcpfs://repo/dir/projects%2Fmcp"
        );
    }

    #[test]
    fn parse_keeps_segment_encoded() {
        assert_eq!(
            ResourceUri::parse("mcpfs://repo/file/projects%2Fmcp%2Freadme.md"),
            Some(ResourceUri::File("projects%2Fmcp%2Freadme.md".to_string()))
        );
        assert_eq!(ResourceUri::parse("mcpfs://repo/policy"), Some(ResourceUri::Policy));
        assert_eq!(ResourceUri::parse("mcpfs://repo/file/projects/mcp"), None);
        assert_eq!(ResourceUri::parse("file:///etc/passwd"), None);
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        assert_eq!(decode_path_segment("a%2Fb").unwrap(), "a/b");
        assert!(decode_path_segment("%FF%FE").is_err());
    }
}
