use std::fmt;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// A monetary value as an exact count of minor units (centavos).
///
/// All matching arithmetic happens on the integer count; floats never
/// enter the engine. Serializes as its display form (`"1234.56"`) so
/// JSON and CSV output stay readable without losing precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    /// Absolute difference in minor units.
    pub fn abs_diff(self, other: Money) -> i64 {
        (self.0 - other.0).abs()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single expected payment row, as extracted from the user's sheet.
#[derive(Debug, Clone, Serialize)]
pub struct ExpectedEntry {
    pub amount: Money,
    /// Opaque source position, e.g. `"row 7"`.
    pub locator: String,
    /// Free-text description; only consulted for duplicate tie-break.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A single ground-truth row (bank statement line).
#[derive(Debug, Clone, Serialize)]
pub struct ObservedEntry {
    pub amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One side's loaded entries plus what the loader discarded.
#[derive(Debug)]
pub struct LoadedSource<T> {
    pub entries: Vec<T>,
    /// Cells that failed both plain and pt-BR locale parsing.
    pub dropped: usize,
    /// Zero or negative amounts; never matchable line items.
    pub skipped_nonpositive: usize,
}

impl<T> Default for LoadedSource<T> {
    fn default() -> Self {
        LoadedSource {
            entries: Vec::new(),
            dropped: 0,
            skipped_nonpositive: 0,
        }
    }
}

/// Both sides, ready for matching.
pub struct ReconInput {
    pub expected: LoadedSource<ExpectedEntry>,
    pub observed: LoadedSource<ObservedEntry>,
}

// ---------------------------------------------------------------------------
// Matching output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MatchedPair {
    pub expected: ExpectedEntry,
    pub observed: ObservedEntry,
    pub delta_cents: i64,
}

/// Entry-level partition. Every input entry lands in exactly one field.
#[derive(Debug, Default)]
pub struct MatchOutput {
    pub matched: Vec<MatchedPair>,
    pub missing_from_observed: Vec<ExpectedEntry>,
    pub extra_in_observed: Vec<ObservedEntry>,
}

/// Value-level partition for the counting strategy. No provenance.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ValueMatchOutput {
    pub matched: Vec<Money>,
    pub missing_from_observed: Vec<Money>,
    pub extra_in_observed: Vec<Money>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub total_expected: usize,
    pub total_observed: usize,
    pub matched: usize,
    pub missing_from_observed: usize,
    pub extra_in_observed: usize,
    pub dropped_expected: usize,
    pub dropped_observed: usize,
    pub skipped_expected: usize,
    pub skipped_observed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub strategy: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub matched: Vec<MatchedPair>,
    pub missing_from_observed: Vec<ExpectedEntry>,
    pub extra_in_observed: Vec<ObservedEntry>,
}
