// crates/policy-ledger-core/tests/gate.rs
// ============================================================================
// Module: Resource Gate Tests
// Description: Pure path decisions and sandboxed filesystem resolution.
// ============================================================================
//! ## Overview
//! The pure decision must reject traversal and absolute markers for any
//! input and always give the same answer. Filesystem resolution must stay
//! inside the sandbox root and enforce kind and size checks.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;
use std::path::Path;

use policy_ledger_core::ErrorCode;
use policy_ledger_core::GateLimits;
use policy_ledger_core::PolicySnapshot;
use policy_ledger_core::ResolvedAccess;
use policy_ledger_core::ResourceGate;
use policy_ledger_core::ResourceKind;
use policy_ledger_core::uri::encode_path_segment;
use proptest::prelude::*;

fn snapshot() -> PolicySnapshot {
    PolicySnapshot::new(["projects/mcp"]).expect("snapshot")
}

fn sandbox() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("projects/mcp/05-policy-log")).expect("mkdir");
    fs::create_dir_all(root.join("projects/mcp/.git")).expect("mkdir git");
    fs::create_dir_all(root.join("projects/other")).expect("mkdir other");
    fs::write(root.join(".gitignore"), "target\n").expect("gitignore");
    fs::write(root.join("projects/mcp/readme.md"), "# mcp\n").expect("readme");
    fs::write(root.join("projects/mcp/b.txt"), "b").expect("b");
    fs::write(root.join("projects/mcp/05-policy-log/main.py"), "print()\n").expect("main");
    dir
}

fn gate(root: &Path, limits: GateLimits) -> ResourceGate {
    ResourceGate::open(snapshot(), root, limits).expect("gate")
}

fn denial_code(gate: &ResourceGate, kind: ResourceKind, path: &str) -> ErrorCode {
    let outcome = gate.resolve(kind, &encode_path_segment(path));
    outcome.denial().map(|denial| denial.code).expect("denied")
}

// ============================================================================
// SECTION: Pure Decisions
// ============================================================================

#[test]
fn roots_hash_matches_compact_json_array() {
    assert_eq!(
        snapshot().roots_hash(),
        "ce44c3597ecc98e124af8ca9ce6e8406d6cf10afd079695e3e1b9ed0d89c16d9"
    );
}

#[test]
fn snapshot_normalizes_and_dedupes_roots() {
    let policy = PolicySnapshot::new(["./projects/mcp/", "docs", "projects/mcp", " "]).expect("policy");
    assert_eq!(policy.allowed_roots(), ["projects/mcp".to_string(), "docs".to_string()]);
    assert!(PolicySnapshot::new(["../etc"]).is_err());
    assert!(PolicySnapshot::new(["/abs"]).is_err());
    assert!(PolicySnapshot::new(Vec::<String>::new()).is_err());
}

#[test]
fn decide_matches_roots_on_segment_boundaries() {
    let policy = snapshot();
    assert_eq!(policy.decide("projects/mcp/readme.md").expect("allow"), "projects/mcp/readme.md");
    assert_eq!(policy.decide("./projects//mcp/./x").expect("allow"), "projects/mcp/x");
    assert_eq!(policy.decide("projects\\mcp\\x").expect("allow"), "projects/mcp/x");
    assert_eq!(policy.decide(".gitignore").unwrap_err().code, ErrorCode::Forbidden);
    assert_eq!(policy.decide("projects/mcpx").unwrap_err().code, ErrorCode::Forbidden);
    assert_eq!(policy.decide("").unwrap_err().code, ErrorCode::Forbidden);
    assert_eq!(policy.decide("/etc/passwd").unwrap_err().code, ErrorCode::BadPath);
    assert_eq!(policy.decide("C:/Windows").unwrap_err().code, ErrorCode::BadPath);
    assert_eq!(policy.decide("projects/mcp/../../x").unwrap_err().code, ErrorCode::BadPath);
}

proptest! {
    #[test]
    fn traversal_segments_are_always_bad_path(
        prefix in prop::collection::vec("[a-z]{1,6}", 0..4),
        suffix in prop::collection::vec("[a-z]{1,6}", 0..4),
    ) {
        let mut segments = prefix;
        segments.push("..".to_string());
        segments.extend(suffix);
        let denial = snapshot().decide(&segments.join("/")).unwrap_err();
        prop_assert_eq!(denial.code, ErrorCode::BadPath);
    }

    #[test]
    fn absolute_markers_are_always_bad_path(rest in "[a-z/]{0,16}", drive in "[A-Za-z]") {
        prop_assert_eq!(snapshot().decide(&format!("/{rest}")).unwrap_err().code, ErrorCode::BadPath);
        prop_assert_eq!(snapshot().decide(&format!("\\{rest}")).unwrap_err().code, ErrorCode::BadPath);
        prop_assert_eq!(snapshot().decide(&format!("{drive}:{rest}")).unwrap_err().code, ErrorCode::BadPath);
    }

    #[test]
    fn decide_is_deterministic(path in "[a-z./\\\\]{0,24}") {
        let policy = snapshot();
        prop_assert_eq!(policy.decide(&path), policy.decide(&path));
    }
}

// ============================================================================
// SECTION: Filesystem Resolution
// ============================================================================

#[test]
fn allowed_file_is_read_and_forbidden_file_is_not() {
    let dir = sandbox();
    let gate = gate(dir.path(), GateLimits::default());
    let outcome = gate.resolve(ResourceKind::File, "projects%2Fmcp%2Freadme.md");
    assert_eq!(outcome.path_decoded, "projects/mcp/readme.md");
    match outcome.result {
        Ok(ResolvedAccess::File {
            bytes, ..
        }) => assert_eq!(bytes, b"# mcp\n"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(denial_code(&gate, ResourceKind::File, ".gitignore"), ErrorCode::Forbidden);
}

#[test]
fn kind_checks_report_stable_codes() {
    let dir = sandbox();
    let gate = gate(dir.path(), GateLimits::default());
    assert_eq!(denial_code(&gate, ResourceKind::File, "projects/mcp/nope.md"), ErrorCode::NotFound);
    assert_eq!(denial_code(&gate, ResourceKind::File, "projects/mcp/05-policy-log"), ErrorCode::NotFound);
    assert_eq!(denial_code(&gate, ResourceKind::Dir, "projects/mcp/nope"), ErrorCode::NotFound);
    assert_eq!(denial_code(&gate, ResourceKind::Dir, "projects/mcp/readme.md"), ErrorCode::NotADir);
    let invalid = gate.resolve(ResourceKind::File, "%FF%FE");
    assert_eq!(invalid.denial().expect("denied").code, ErrorCode::BadPath);
}

#[test]
fn oversized_files_are_too_large_with_size() {
    let dir = sandbox();
    fs::write(dir.path().join("projects/mcp/big.bin"), vec![b'x'; 64]).expect("big");
    let gate = gate(dir.path(), GateLimits {
        max_file_bytes: 16,
        max_dir_entries: 200,
    });
    let outcome = gate.resolve(ResourceKind::File, &encode_path_segment("projects/mcp/big.bin"));
    let denial = outcome.denial().expect("denied");
    assert_eq!(denial.code, ErrorCode::TooLarge);
    assert_eq!(denial.bytes, Some(64));
}

#[test]
fn directory_listing_is_sorted_filtered_and_capped() {
    let dir = sandbox();
    let gate = gate(dir.path(), GateLimits::default());
    let outcome = gate.resolve(ResourceKind::Dir, "projects%2Fmcp");
    let Ok(ResolvedAccess::Directory {
        path,
        children,
    }) = outcome.result
    else {
        panic!("expected listing");
    };
    assert_eq!(path, "projects/mcp");
    let names: Vec<&str> = children.iter().map(|child| child.name.as_str()).collect();
    assert_eq!(names, ["05-policy-log", "b.txt", "readme.md"]);
    assert_eq!(children[0].kind, ResourceKind::Dir);
    assert_eq!(children[0].uri, "mcpfs://repo/dir/projects%2Fmcp%2F05-policy-log");
    assert_eq!(children[2].uri, "mcpfs://repo/file/projects%2Fmcp%2Freadme.md");

    let capped = ResourceGate::open(snapshot(), dir.path(), GateLimits {
        max_file_bytes: 512_000,
        max_dir_entries: 2,
    })
    .expect("gate");
    let Ok(ResolvedAccess::Directory {
        children, ..
    }) = capped.resolve(ResourceKind::Dir, "projects%2Fmcp").result
    else {
        panic!("expected listing");
    };
    assert_eq!(children.len(), 2);
}

#[cfg(unix)]
#[test]
fn symlinks_cannot_escape_the_sandbox() {
    let outer = tempfile::tempdir().expect("outer");
    fs::create_dir_all(outer.path().join("outside")).expect("outside");
    fs::write(outer.path().join("outside/secret.txt"), "secret").expect("secret");
    let root = outer.path().join("sandbox");
    fs::create_dir_all(root.join("projects/mcp")).expect("mkdir");
    std::os::unix::fs::symlink(outer.path().join("outside"), root.join("projects/mcp/link"))
        .expect("symlink");

    let gate = gate(&root, GateLimits::default());
    assert_eq!(denial_code(&gate, ResourceKind::File, "projects/mcp/link/secret.txt"), ErrorCode::BadPath);
    let Ok(ResolvedAccess::Directory {
        children, ..
    }) = gate.resolve(ResourceKind::Dir, "projects%2Fmcp").result
    else {
        panic!("expected listing");
    };
    assert!(children.is_empty());
}
