// crates/policy-ledger-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Keep every user-facing CLI string in one localizable catalog.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! The Policy Ledger CLI routes all output through the [`t!`](crate::t)
//! macro. Catalogs are static tables keyed by dotted message ids with
//! `{name}` placeholders.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Every locale carries the same keys and placeholders as English.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Parses a locale value, ignoring case and any region tag.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        let lang = normalized.split(['-', '_']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "ca" => Some(Self::Ca),
            _ => None,
        }
    }
}

/// Supported locales in presentation order.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Ca];

/// A formatted argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces.
    pub key: &'static str,
    /// Preformatted value.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`].
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "policy-ledger {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.json_failed", "Failed to render JSON output: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config is valid."),
    ("serve.init_failed", "Failed to start the resource server: {error}"),
    ("serve.failed", "Resource server stopped with an error: {error}"),
    ("plan.build.failed", "Failed to compile a plan from {path}: {error}"),
    ("plan.build.write_failed", "Failed to write plan {path}: {error}"),
    ("plan.build.skipped", "Skipped line {line}: {reason}"),
    (
        "plan.build.ok",
        "Plan written to {path}: {steps} steps from {rows} rows ({skipped} skipped, {filtered} \
         filtered out).",
    ),
    ("plan.replay.load_failed", "Failed to load plan {path}: {error}"),
    ("plan.replay.target_failed", "Failed to open the replay target: {error}"),
    ("plan.replay.failed", "Replay aborted: {error}"),
    ("plan.replay.write_failed", "Failed to write report {path}: {error}"),
    (
        "plan.replay.summary",
        "Replay {status}: {total} steps, {allow} allowed, {deny} denied, {mismatch} mismatched.",
    ),
    ("plan.replay.mismatch", "  step {index} {uri}: expected {expected}, observed {observed}"),
    ("plan.replay.report_written", "Report written to {path}."),
    ("artifact.kind.report", "replay report"),
    ("artifact.kind.baseline", "baseline"),
    ("artifact.read_failed", "Failed to read {kind} {path}: {error}"),
    ("baseline.snapshot.ok", "Baseline written to {path}: {steps} resources pinned."),
    ("baseline.snapshot.write_failed", "Failed to write baseline {path}: {error}"),
    ("baseline.check.unchanged", "No change against the baseline."),
    ("baseline.check.changed", "Baseline changed ({attribution}): {count} differences."),
    ("baseline.check.change", "  {kind} {uri}"),
    ("ledger.verify.failed", "Failed to read ledger {path}: {error}"),
    (
        "ledger.verify.ok",
        "Ledger {path} is intact: {envelopes} envelopes in {lines} lines (chain {chain}).",
    ),
    ("ledger.verify.issues", "Ledger {path} has {count} integrity issues."),
    ("ledger.verify.issue", "  line {line}: {code} {message}"),
    ("ledger.verify.partial_tail", "  {bytes} trailing bytes after the last complete line"),
    ("ledger.verify.incomplete", "  run {run_id} has no shutdown"),
    ("lifecycle.open_failed", "Failed to open the ledger: {error}"),
    ("lifecycle.identity_failed", "Failed to load the system identity: {error}"),
    ("lifecycle.boot.failed", "Boot failed: {error}"),
    ("lifecycle.boot.incomplete", "Warning: {notice}"),
    ("lifecycle.shutdown.failed", "Shutdown failed: {error}"),
    ("lifecycle.shutdown.ok", "Run {run_id} shut down ({reason})."),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Catalan catalog.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "policy-ledger {version}"),
    ("output.stream.stdout", "sortida estàndard"),
    ("output.stream.stderr", "sortida d'error"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("output.json_failed", "No s'ha pogut generar la sortida JSON: {error}"),
    ("config.load_failed", "No s'ha pogut carregar la configuració: {error}"),
    ("config.validate.ok", "La configuració és vàlida."),
    ("serve.init_failed", "No s'ha pogut iniciar el servidor de recursos: {error}"),
    ("serve.failed", "El servidor de recursos s'ha aturat amb un error: {error}"),
    ("plan.build.failed", "No s'ha pogut compilar un pla a partir de {path}: {error}"),
    ("plan.build.write_failed", "No s'ha pogut escriure el pla {path}: {error}"),
    ("plan.build.skipped", "Línia {line} omesa: {reason}"),
    (
        "plan.build.ok",
        "Pla escrit a {path}: {steps} passos de {rows} files ({skipped} omeses, {filtered} \
         filtrades).",
    ),
    ("plan.replay.load_failed", "No s'ha pogut carregar el pla {path}: {error}"),
    ("plan.replay.target_failed", "No s'ha pogut obrir l'objectiu de la repetició: {error}"),
    ("plan.replay.failed", "Repetició interrompuda: {error}"),
    ("plan.replay.write_failed", "No s'ha pogut escriure l'informe {path}: {error}"),
    (
        "plan.replay.summary",
        "Repetició {status}: {total} passos, {allow} permesos, {deny} denegats, {mismatch} \
         discrepàncies.",
    ),
    ("plan.replay.mismatch", "  pas {index} {uri}: s'esperava {expected}, s'ha observat {observed}"),
    ("plan.replay.report_written", "Informe escrit a {path}."),
    ("artifact.kind.report", "informe de repetició"),
    ("artifact.kind.baseline", "línia base"),
    ("artifact.read_failed", "No s'ha pogut llegir {kind} {path}: {error}"),
    ("baseline.snapshot.ok", "Línia base escrita a {path}: {steps} recursos fixats."),
    ("baseline.snapshot.write_failed", "No s'ha pogut escriure la línia base {path}: {error}"),
    ("baseline.check.unchanged", "Cap canvi respecte de la línia base."),
    ("baseline.check.changed", "La línia base ha canviat ({attribution}): {count} diferències."),
    ("baseline.check.change", "  {kind} {uri}"),
    ("ledger.verify.failed", "No s'ha pogut llegir el registre {path}: {error}"),
    (
        "ledger.verify.ok",
        "El registre {path} és íntegre: {envelopes} sobres en {lines} línies (cadena {chain}).",
    ),
    ("ledger.verify.issues", "El registre {path} té {count} problemes d'integritat."),
    ("ledger.verify.issue", "  línia {line}: {code} {message}"),
    ("ledger.verify.partial_tail", "  {bytes} bytes finals després de l'última línia completa"),
    ("ledger.verify.incomplete", "  l'execució {run_id} no té aturada"),
    ("lifecycle.open_failed", "No s'ha pogut obrir el registre: {error}"),
    ("lifecycle.identity_failed", "No s'ha pogut carregar la identitat del sistema: {error}"),
    ("lifecycle.boot.failed", "L'arrencada ha fallat: {error}"),
    ("lifecycle.boot.incomplete", "Avís: {notice}"),
    ("lifecycle.shutdown.failed", "L'aturada ha fallat: {error}"),
    ("lifecycle.shutdown.ok", "Execució {run_id} aturada ({reason})."),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
];

/// Returns the raw catalog entries for a locale.
pub(crate) const fn catalog_entries_for(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => CATALOG_EN,
        Locale::Ca => CATALOG_CA,
    }
}

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    let cell = match locale {
        Locale::En => &CATALOG_EN_MAP,
        Locale::Ca => &CATALOG_CA_MAP,
    };
    cell.get_or_init(|| catalog_entries_for(locale).iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog_for(current_locale())
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
