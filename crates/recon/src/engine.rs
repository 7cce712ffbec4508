use crate::config::{MatchStrategy, ReconConfig, SourceConfig};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::matcher::{match_by_row, match_by_value_entries};
use crate::model::{
    ExpectedEntry, LoadedSource, Money, ObservedEntry, ReconInput, ReconMeta, ReconResult,
};
use crate::normalize::parse_money;

/// Which side of the reconciliation a CSV feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Expected,
    Observed,
}

impl Side {
    pub fn name(self) -> &'static str {
        match self {
            Self::Expected => "expected",
            Self::Observed => "observed",
        }
    }
}

/// Run reconciliation per config. Returns the three partitions + summary.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    config.validate()?;

    let output = match config.strategy {
        MatchStrategy::ByRow => match_by_row(
            &input.expected.entries,
            &input.observed.entries,
            config.tolerance.amount_cents,
        ),
        MatchStrategy::ByValue => {
            match_by_value_entries(&input.expected.entries, &input.observed.entries)
        }
    };

    let summary = compute_summary(&output, input);

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            strategy: config.strategy.to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        matched: output.matched,
        missing_from_observed: output.missing_from_observed,
        extra_in_observed: output.extra_in_observed,
    })
}

/// Load the expected side from CSV text, applying the column mapping
/// and optional row filter. Locators record the 1-based source line.
pub fn load_expected(
    csv_data: &str,
    source: &SourceConfig,
    delimiter: u8,
) -> Result<LoadedSource<ExpectedEntry>, ReconError> {
    load_rows(csv_data, source, Side::Expected, delimiter, |amount, line, label| {
        ExpectedEntry { amount, locator: format!("row {line}"), label }
    })
}

/// Load the observed (ground truth) side from CSV text.
pub fn load_observed(
    csv_data: &str,
    source: &SourceConfig,
    delimiter: u8,
) -> Result<LoadedSource<ObservedEntry>, ReconError> {
    load_rows(csv_data, source, Side::Observed, delimiter, |amount, _line, label| {
        ObservedEntry { amount, label }
    })
}

/// Shared row scan: header-mapped columns, filter, amount normalization.
///
/// Unparsable amount cells are counted and dropped, never fatal; zero
/// and negative amounts are counted and skipped (not matchable line
/// items). A missing mapped column is a hard error.
fn load_rows<T>(
    csv_data: &str,
    source: &SourceConfig,
    side: Side,
    delimiter: u8,
    make: impl Fn(Money, usize, Option<String>) -> T,
) -> Result<LoadedSource<T>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, ReconError> {
        headers.iter().position(|h| h == name).ok_or_else(|| ReconError::MissingColumn {
            side: side.name().into(),
            column: name.into(),
        })
    };

    let amount_idx = idx(&source.columns.amount)?;
    let label_idx = match source.columns.label {
        Some(ref col) => Some(idx(col)?),
        None => None,
    };
    let filter_idx = match source.filter {
        Some(ref filter) => Some(idx(&filter.column)?),
        None => None,
    };

    let mut out = LoadedSource::default();

    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ReconError::Io(e.to_string()))?;

        if let (Some(ref filter), Some(fi)) = (&source.filter, filter_idx) {
            let val = record.get(fi).unwrap_or("");
            if !filter.values.iter().any(|v| v == val.trim()) {
                continue;
            }
        }

        let raw = record.get(amount_idx).unwrap_or("");
        let Some(amount) = parse_money(raw) else {
            out.dropped += 1;
            continue;
        };
        if amount.cents() <= 0 {
            out.skipped_nonpositive += 1;
            continue;
        }

        let label = label_idx
            .and_then(|li| record.get(li))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        // Header occupies line 1; data rows start at 2
        out.entries.push(make(amount, row_idx + 2, label));
    }

    Ok(out)
}
