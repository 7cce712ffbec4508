//! `concilia-io` — file boundary for the reconciliation engine.
//!
//! Reads source CSVs with encoding fallback and delimiter sniffing,
//! writes the three result partitions back out as CSV.

pub mod csv;
pub mod export;
