//! CSV export of the three result partitions.
//!
//! Column order is serde struct field order and is part of the output
//! contract: downstream spreadsheets re-import these files.

use std::path::Path;

use serde::Serialize;

use concilia_recon::ReconResult;

#[derive(Debug, Serialize)]
struct MatchedRow<'a> {
    expected_locator: &'a str,
    expected_label: &'a str,
    expected_amount: String,
    observed_label: &'a str,
    observed_amount: String,
    delta_cents: i64,
}

#[derive(Debug, Serialize)]
struct MissingRow<'a> {
    locator: &'a str,
    label: &'a str,
    amount: String,
}

#[derive(Debug, Serialize)]
struct ExtraRow<'a> {
    label: &'a str,
    amount: String,
}

/// Write `matched.csv`, `missing.csv` and `extra.csv` under `dir`.
///
/// Rows keep the engine's output order, so repeated runs over the same
/// inputs produce byte-identical files.
pub fn write_partitions(result: &ReconResult, dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("cannot create {}: {e}", dir.display()))?;

    write_rows(
        &dir.join("matched.csv"),
        result.matched.iter().map(|p| MatchedRow {
            expected_locator: &p.expected.locator,
            expected_label: p.expected.label.as_deref().unwrap_or(""),
            expected_amount: p.expected.amount.to_string(),
            observed_label: p.observed.label.as_deref().unwrap_or(""),
            observed_amount: p.observed.amount.to_string(),
            delta_cents: p.delta_cents,
        }),
    )?;

    write_rows(
        &dir.join("missing.csv"),
        result.missing_from_observed.iter().map(|e| MissingRow {
            locator: &e.locator,
            label: e.label.as_deref().unwrap_or(""),
            amount: e.amount.to_string(),
        }),
    )?;

    write_rows(
        &dir.join("extra.csv"),
        result.extra_in_observed.iter().map(|o| ExtraRow {
            label: o.label.as_deref().unwrap_or(""),
            amount: o.amount.to_string(),
        }),
    )?;

    Ok(())
}

fn write_rows<R: Serialize>(
    path: &Path,
    rows: impl Iterator<Item = R>,
) -> Result<(), String> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    for row in rows {
        writer.serialize(row).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())
}
