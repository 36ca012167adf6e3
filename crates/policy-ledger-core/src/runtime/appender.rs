// crates/policy-ledger-core/src/runtime/appender.rs
// ============================================================================
// Module: JSONL Appender
// Description: Single-write, lock-serialized line appends.
// Purpose: Provide the atomic append primitive shared by the ledger and decision log.
// Dependencies: std::fs
// ============================================================================

//! ## Overview
//! Every line is written with one `write_all` of `line + "\n"` on a file
//! opened create+append. Writers in the same process serialize on a
//! `Mutex<File>`; writers in other processes serialize on an exclusive OS
//! file lock held for the duration of the write. [`JsonlAppender::append_with`]
//! builds the line inside that critical section for writers whose next line
//! depends on what is already in the file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::interfaces::LedgerError;

// ============================================================================
// SECTION: Appender
// ============================================================================

/// Append-only JSONL writer.
///
/// # Invariants
/// - Never seeks; the file is only ever extended.
/// - A line is either fully written or the call fails.
#[derive(Debug)]
pub struct JsonlAppender {
    /// Target path.
    path: PathBuf,
    /// Open handle in append mode.
    file: Mutex<File>,
    /// Calls `sync_data` after each line when set.
    fsync: bool,
}

impl JsonlAppender {
    /// Opens (or creates) a JSONL file for appending.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] when the file cannot be opened.
    pub fn open(path: &Path, fsync: bool) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| {
                LedgerError::Io(format!("create {}: {err}", parent.display()))
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| LedgerError::Io(format!("open {}: {err}", path.display())))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            fsync,
        })
    }

    /// Returns the target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line. The line must not contain a newline.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Write`] when locking, writing, or syncing fails.
    pub fn append_line(&self, line: &[u8]) -> Result<(), LedgerError> {
        self.append_with(|| Ok((line.to_vec(), ())))
    }

    /// Builds and appends one line while both locks are held.
    ///
    /// `build` runs after the OS lock is taken, so it observes every line
    /// other writers have completed and no other writer can append until the
    /// built line is written.
    ///
    /// # Errors
    ///
    /// Returns the error from `build`, or [`LedgerError::Write`] when the
    /// line has an embedded newline or locking, writing, or syncing fails.
    pub fn append_with<T, F>(&self, build: F) -> Result<T, LedgerError>
    where
        F: FnOnce() -> Result<(Vec<u8>, T), LedgerError>,
    {
        let guard = self
            .file
            .lock()
            .map_err(|_| LedgerError::Write("appender mutex poisoned".to_string()))?;
        let file: &File = &guard;
        file.lock().map_err(|err| LedgerError::Write(format!("file lock: {err}")))?;
        let written = build().and_then(|(line, value)| {
            if line.contains(&b'\n') {
                return Err(LedgerError::Write("line contains an embedded newline".to_string()));
            }
            let mut buffer = line;
            buffer.push(b'\n');
            write_locked(file, &buffer, self.fsync)?;
            Ok(value)
        });
        let unlocked = file.unlock().map_err(|err| LedgerError::Write(format!("file unlock: {err}")));
        let value = written?;
        unlocked?;
        Ok(value)
    }
}

/// Writes the buffer while the OS lock is held.
fn write_locked(mut file: &File, buffer: &[u8], fsync: bool) -> Result<(), LedgerError> {
    file.write_all(buffer).map_err(|err| LedgerError::Write(err.to_string()))?;
    file.flush().map_err(|err| LedgerError::Write(err.to_string()))?;
    if fsync {
        file.sync_data().map_err(|err| LedgerError::Write(format!("sync: {err}")))?;
    }
    Ok(())
}
