// crates/policy-ledger-core/src/runtime/ledger.rs
// ============================================================================
// Module: Ledger Writer
// Description: Append-only JSONL event ledger with optional hash chaining.
// Purpose: Durably record validated envelopes and read them back as snapshots.
// Dependencies: crate::{core, interfaces}, std::fs
// ============================================================================

//! ## Overview
//! [`LedgerWriter`] validates each envelope through the codec, applies the
//! configured [`ChainStrategy`], and appends one canonical JSON line through
//! a [`JsonlAppender`]. Chain heads are tracked per session. Before each
//! append the writer reads any lines other writers completed since its last
//! scan, while holding the file lock, so several writers can share a ledger
//! without breaking the chain.
//!
//! Readers take a length snapshot first and read only up to it, so a line
//! being appended concurrently is seen as a partial tail and ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use std::sync::Mutex;

use crate::core::envelope::CodecError;
use crate::core::envelope::EnvelopeDraft;
use crate::core::envelope::EventEnvelope;
use crate::core::envelope::PayloadRegistry;
use crate::core::envelope::canonical_line;
use crate::core::envelope::decode;
use crate::core::envelope::encode;
use crate::core::envelope::validate;
use crate::core::identifiers::SessionId;
use crate::interfaces::ChainMode;
use crate::interfaces::ChainStrategy;
use crate::interfaces::LedgerError;
use crate::runtime::appender::JsonlAppender;
use crate::runtime::chain::chain_strategy;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Ledger writer options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerOptions {
    /// Chaining mode.
    pub chain: ChainMode,
    /// Sync after every line.
    pub fsync: bool,
    /// Accepted event types.
    pub registry: PayloadRegistry,
}

// ============================================================================
// SECTION: Snapshots
// ============================================================================

/// One complete line read from a JSONL file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 1-based line number.
    pub number: usize,
    /// Line bytes without the newline.
    pub bytes: Vec<u8>,
}

/// Complete lines of a JSONL file up to a length snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineSnapshot {
    /// Non-blank complete lines.
    pub lines: Vec<RawLine>,
    /// Bytes after the last newline (an in-flight or torn write).
    pub partial_tail_bytes: u64,
}

/// Decoded ledger contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LedgerSnapshot {
    /// Envelopes in ledger order.
    pub envelopes: Vec<EventEnvelope>,
    /// Bytes ignored after the last complete line.
    pub partial_tail_bytes: u64,
}

/// Reads the complete lines of a JSONL file.
///
/// A missing file reads as empty. Blank lines are skipped but still counted
/// for line numbering.
///
/// # Errors
///
/// Returns [`LedgerError::Io`] when the file exists but cannot be read.
pub fn read_line_snapshot(path: &Path) -> Result<LineSnapshot, LedgerError> {
    let bytes = read_from(path, 0)?;
    let complete_len = complete_len(&bytes);
    let partial_tail_bytes = u64::try_from(bytes.len() - complete_len).unwrap_or(u64::MAX);
    let lines = complete_lines(&bytes[.. complete_len])
        .map(|(index, line)| RawLine {
            number: index + 1,
            bytes: line.to_vec(),
        })
        .collect();
    Ok(LineSnapshot {
        lines,
        partial_tail_bytes,
    })
}

/// Reads from `offset` up to the file length observed at open.
fn read_from(path: &Path, offset: u64) -> Result<Vec<u8>, LedgerError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(LedgerError::Io(format!("open {}: {err}", path.display()))),
    };
    let len = file
        .metadata()
        .map_err(|err| LedgerError::Io(format!("stat {}: {err}", path.display())))?
        .len();
    if len <= offset {
        return Ok(Vec::new());
    }
    file.seek(SeekFrom::Start(offset))
        .map_err(|err| LedgerError::Io(format!("seek {}: {err}", path.display())))?;
    let mut bytes = Vec::new();
    file.take(len - offset)
        .read_to_end(&mut bytes)
        .map_err(|err| LedgerError::Io(format!("read {}: {err}", path.display())))?;
    Ok(bytes)
}

/// Length of the prefix that ends with the last newline.
fn complete_len(bytes: &[u8]) -> usize {
    bytes.iter().rposition(|byte| *byte == b'\n').map_or(0, |pos| pos + 1)
}

/// Non-blank lines of a newline-terminated buffer with their 0-based index.
fn complete_lines(bytes: &[u8]) -> impl Iterator<Item = (usize, &[u8])> {
    bytes
        .split(|byte| *byte == b'\n')
        .enumerate()
        .filter(|(_, line)| !line.iter().all(u8::is_ascii_whitespace))
}

/// Reads and decodes every complete envelope in a ledger.
///
/// # Errors
///
/// Returns [`LedgerError::Corrupt`] for the first complete line that does
/// not decode, or [`LedgerError::Io`] when reading fails.
pub fn read_ledger(path: &Path, registry: &PayloadRegistry) -> Result<LedgerSnapshot, LedgerError> {
    let snapshot = read_line_snapshot(path)?;
    let mut envelopes = Vec::with_capacity(snapshot.lines.len());
    for line in &snapshot.lines {
        let envelope = decode(&line.bytes, registry).map_err(|err| LedgerError::Corrupt {
            line: line.number,
            message: err.to_string(),
        })?;
        envelopes.push(envelope);
    }
    Ok(LedgerSnapshot {
        envelopes,
        partial_tail_bytes: snapshot.partial_tail_bytes,
    })
}

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Chain heads and how much of the file they account for.
#[derive(Debug, Default)]
struct ChainState {
    /// Last envelope hash per session.
    heads: BTreeMap<SessionId, String>,
    /// Bytes of complete lines already scanned.
    scanned: u64,
    /// Lines already scanned, for error numbering.
    lines: usize,
}

impl ChainState {
    /// Folds in complete lines appended since the last scan.
    fn absorb(&mut self, path: &Path, registry: &PayloadRegistry) -> Result<(), LedgerError> {
        let bytes = read_from(path, self.scanned)?;
        let complete = &bytes[.. complete_len(&bytes)];
        for (index, line) in complete_lines(complete) {
            let envelope = decode(line, registry).map_err(|err| LedgerError::Corrupt {
                line: self.lines + index + 1,
                message: err.to_string(),
            })?;
            if let Some(hash) = envelope.envelope_hash {
                self.heads.insert(envelope.session_id, hash);
            }
        }
        self.lines += complete.iter().filter(|byte| **byte == b'\n').count();
        self.scanned += u64::try_from(complete.len()).unwrap_or(u64::MAX);
        Ok(())
    }
}

/// Append-only envelope ledger.
pub struct LedgerWriter {
    /// Line appender.
    appender: JsonlAppender,
    /// Chain strategy.
    chain: Box<dyn ChainStrategy>,
    /// Accepted event types.
    registry: PayloadRegistry,
    /// Per-session chain heads.
    state: Mutex<ChainState>,
}

impl LedgerWriter {
    /// Opens a ledger, creating it when missing, and seeds chain heads.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the file cannot be opened or an existing
    /// line does not decode.
    pub fn open(path: &Path, options: LedgerOptions) -> Result<Self, LedgerError> {
        let appender = JsonlAppender::open(path, options.fsync)?;
        let mut state = ChainState::default();
        state.absorb(path, &options.registry)?;
        Ok(Self {
            appender,
            chain: chain_strategy(options.chain),
            registry: options.registry,
            state: Mutex::new(state),
        })
    }

    /// Returns the ledger path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.appender.path()
    }

    /// Returns the chaining mode.
    #[must_use]
    pub fn chain_mode(&self) -> ChainMode {
        self.chain.mode()
    }

    /// Returns the payload registry.
    #[must_use]
    pub const fn registry(&self) -> &PayloadRegistry {
        &self.registry
    }

    /// Returns the current chain head of a session.
    #[must_use]
    pub fn head(&self, session_id: &SessionId) -> Option<String> {
        self.state.lock().ok().and_then(|state| state.heads.get(session_id).cloned())
    }

    /// Validates, chains, and appends an envelope.
    ///
    /// Returns the envelope exactly as written.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Codec`] for invalid envelopes or preset chain
    /// fields, and [`LedgerError::Write`] when the append fails.
    pub fn append(&self, mut envelope: EventEnvelope) -> Result<EventEnvelope, LedgerError> {
        if envelope.prev_envelope_hash.is_some() || envelope.envelope_hash.is_some() {
            return Err(LedgerError::Codec(CodecError::SchemaInvalid(
                "chain fields are assigned by the ledger".to_string(),
            )));
        }
        validate(&envelope, &self.registry)?;
        let mut guard = self
            .state
            .lock()
            .map_err(|_| LedgerError::Write("chain head mutex poisoned".to_string()))?;
        let state = &mut *guard;
        let envelope = self.appender.append_with(|| {
            state.absorb(self.appender.path(), &self.registry)?;
            let head = state.heads.get(&envelope.session_id).map(String::as_str);
            self.chain.seal(&mut envelope, head)?;
            let line = canonical_line(&envelope)?;
            Ok((line, envelope))
        })?;
        if let Some(hash) = &envelope.envelope_hash {
            state.heads.insert(envelope.session_id.clone(), hash.clone());
        }
        Ok(envelope)
    }

    /// Encodes a draft and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when encoding or appending fails.
    pub fn emit(&self, draft: EnvelopeDraft) -> Result<EventEnvelope, LedgerError> {
        let envelope = encode(draft, &self.registry)?;
        self.append(envelope)
    }

    /// Reads the current ledger contents.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when reading or decoding fails.
    pub fn read(&self) -> Result<LedgerSnapshot, LedgerError> {
        read_ledger(self.path(), &self.registry)
    }
}
