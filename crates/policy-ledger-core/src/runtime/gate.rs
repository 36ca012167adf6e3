// crates/policy-ledger-core/src/runtime/gate.rs
// ============================================================================
// Module: Resource Policy Gate
// Description: Allowlist enforcement plus capability-sandboxed filesystem access.
// Purpose: Decide and perform every file read and directory listing.
// Dependencies: cap-std, crate::core::{policy, uri}
// ============================================================================

//! ## Overview
//! [`ResourceGate::resolve`] runs the full decision pipeline for one request:
//! percent-decode the segment, normalize and match it against the allowlist
//! (the pure part, [`PolicySnapshot::decide`]), then resolve it through a
//! `cap-std` [`Dir`] capability opened on the sandbox root. All lookups go
//! through the capability, so symlinks that lead outside the root fail
//! instead of being followed.
//!
//! Every call yields a [`GateOutcome`]; denials are values, never errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::ErrorKind;
use std::io::Read;
use std::path::Path;

use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::decision::PolicyRef;
use crate::core::decision::ResourceKind;
use crate::core::error_code::ErrorCode;
use crate::core::policy::GateDenial;
use crate::core::policy::PolicySnapshot;
use crate::core::uri::decode_path_segment;
use crate::core::uri::decode_path_segment_lossy;
use crate::core::uri::resource_uri;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default file size cap in bytes.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 512_000;
/// Default directory listing cap.
pub const DEFAULT_MAX_DIR_ENTRIES: usize = 200;
/// Directory names never listed.
pub const SKIPPED_DIR_NAMES: &[&str] = &[".git", ".venv", "__pycache__"];

// ============================================================================
// SECTION: Types
// ============================================================================

/// Gate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateLimits {
    /// Largest readable file.
    pub max_file_bytes: u64,
    /// Most children returned per listing.
    pub max_dir_entries: usize,
}

impl Default for GateLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_dir_entries: DEFAULT_MAX_DIR_ENTRIES,
        }
    }
}

/// Child entry in a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntryInfo {
    /// Entry name.
    pub name: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    /// Resource URI of the entry.
    pub uri: String,
}

/// Successful gate result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAccess {
    /// Directory listing.
    Directory {
        /// Normalized path.
        path: String,
        /// Sorted, filtered, capped children.
        children: Vec<DirEntryInfo>,
    },
    /// File contents.
    File {
        /// Normalized path.
        path: String,
        /// File bytes.
        bytes: Vec<u8>,
    },
}

/// Outcome of one gate invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    /// Requested kind.
    pub kind: ResourceKind,
    /// Decoded path segment (lossy when decoding failed).
    pub path_decoded: String,
    /// Normalized path when normalization succeeded.
    pub path: Option<String>,
    /// Policy in effect.
    pub policy: PolicyRef,
    /// Access result or denial.
    pub result: Result<ResolvedAccess, GateDenial>,
}

impl GateOutcome {
    /// Returns the denial, if any.
    #[must_use]
    pub fn denial(&self) -> Option<&GateDenial> {
        self.result.as_ref().err()
    }

    /// Returns the path to report back to the caller.
    #[must_use]
    pub fn display_path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.path_decoded)
    }
}

/// Errors opening the gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// Sandbox root cannot be opened.
    #[error("cannot open sandbox root {path}: {message}")]
    SandboxRoot {
        /// Configured root.
        path: String,
        /// Underlying error.
        message: String,
    },
}

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Allowlist gate over a sandboxed directory.
#[derive(Debug)]
pub struct ResourceGate {
    /// Pinned policy.
    policy: PolicySnapshot,
    /// Capability on the sandbox root.
    root: Dir,
    /// Limits.
    limits: GateLimits,
}

impl ResourceGate {
    /// Opens a gate over `sandbox_root`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::SandboxRoot`] when the root is not an accessible directory.
    pub fn open(
        policy: PolicySnapshot,
        sandbox_root: &Path,
        limits: GateLimits,
    ) -> Result<Self, GateError> {
        let root = Dir::open_ambient_dir(sandbox_root, ambient_authority()).map_err(|err| {
            GateError::SandboxRoot {
                path: sandbox_root.display().to_string(),
                message: err.to_string(),
            }
        })?;
        Ok(Self {
            policy,
            root,
            limits,
        })
    }

    /// Returns the pinned policy.
    #[must_use]
    pub const fn policy(&self) -> &PolicySnapshot {
        &self.policy
    }

    /// Returns the limits.
    #[must_use]
    pub const fn limits(&self) -> GateLimits {
        self.limits
    }

    /// Decides and performs one access for a raw (encoded) path segment.
    #[must_use]
    pub fn resolve(&self, kind: ResourceKind, raw: &str) -> GateOutcome {
        let policy = self.policy.to_ref();
        let path_decoded = match decode_path_segment(raw) {
            Ok(decoded) => decoded,
            Err(denial) => {
                return GateOutcome {
                    kind,
                    path_decoded: decode_path_segment_lossy(raw),
                    path: None,
                    policy,
                    result: Err(denial),
                };
            }
        };
        let path = match self.policy.decide(&path_decoded) {
            Ok(path) => path,
            Err(denial) => {
                return GateOutcome {
                    kind,
                    path_decoded,
                    path: None,
                    policy,
                    result: Err(denial),
                };
            }
        };
        let result = match kind {
            ResourceKind::Dir => self.list_dir(&path),
            ResourceKind::File => self.read_file(&path),
        };
        GateOutcome {
            kind,
            path_decoded,
            path: Some(path),
            policy,
            result,
        }
    }

    /// Lists an allowed directory.
    fn list_dir(&self, path: &str) -> Result<ResolvedAccess, GateDenial> {
        let metadata = self
            .root
            .metadata(path)
            .map_err(|err| io_denial(&err, "directory not found"))?;
        if !metadata.is_dir() {
            return Err(GateDenial::new(ErrorCode::NotADir, "path is not a directory"));
        }
        let entries = self.root.read_dir(path).map_err(|err| io_denial(&err, "directory not found"))?;
        let mut names: Vec<String> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| io_denial(&err, "directory not found"))?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !SKIPPED_DIR_NAMES.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names.sort();
        let mut children = Vec::new();
        for name in names {
            if children.len() >= self.limits.max_dir_entries {
                break;
            }
            let child = format!("{path}/{name}");
            if !self.policy.is_allowed(&child) {
                continue;
            }
            let Ok(child_meta) = self.root.metadata(&child) else {
                continue;
            };
            let kind = if child_meta.is_dir() {
                ResourceKind::Dir
            } else if child_meta.is_file() {
                ResourceKind::File
            } else {
                continue;
            };
            children.push(DirEntryInfo {
                uri: resource_uri(kind, &child),
                name,
                kind,
            });
        }
        Ok(ResolvedAccess::Directory {
            path: path.to_string(),
            children,
        })
    }

    /// Reads an allowed file up to the size cap.
    fn read_file(&self, path: &str) -> Result<ResolvedAccess, GateDenial> {
        let metadata = self.root.metadata(path).map_err(|err| io_denial(&err, "file not found"))?;
        if !metadata.is_file() {
            return Err(GateDenial::new(ErrorCode::NotFound, "file not found"));
        }
        let max = self.limits.max_file_bytes;
        if metadata.len() > max {
            return Err(too_large(metadata.len()));
        }
        let file = self.root.open(path).map_err(|err| io_denial(&err, "file not found"))?;
        let mut bytes = Vec::new();
        file.take(max.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|err| io_denial(&err, "file not found"))?;
        let read = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if read > max {
            return Err(too_large(read));
        }
        Ok(ResolvedAccess::File {
            path: path.to_string(),
            bytes,
        })
    }
}

/// Builds a `TOO_LARGE` denial.
fn too_large(bytes: u64) -> GateDenial {
    GateDenial {
        code: ErrorCode::TooLarge,
        message: "file exceeds size cap".to_string(),
        bytes: Some(bytes),
    }
}

/// Maps filesystem errors onto denials.
///
/// The capability layer reports escapes (`..` through symlinks, absolute
/// link targets) as `PermissionDenied`.
fn io_denial(err: &io::Error, not_found: &str) -> GateDenial {
    match err.kind() {
        ErrorKind::NotFound => GateDenial::new(ErrorCode::NotFound, not_found),
        ErrorKind::PermissionDenied => GateDenial::bad_path("path escapes sandbox"),
        _ => GateDenial::new(ErrorCode::IoError, err.to_string()),
    }
}
