// concilia CLI - reconcile an expected-payments sheet against a bank statement

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use concilia_recon::config::SourceConfig;
use concilia_recon::model::ReconSummary;
use concilia_recon::{ReconConfig, ReconInput};
use exit_codes::{
    EXIT_RECON_INVALID_CONFIG, EXIT_RECON_MISMATCH, EXIT_RECON_RUNTIME, EXIT_SUCCESS,
};

#[derive(Parser)]
#[command(name = "concilia")]
#[command(about = "Reconcile an expected-payments sheet against a bank statement CSV")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  concilia run recon.toml
  concilia run recon.toml --json
  concilia run recon.toml --output result.json
  concilia run recon.toml --export-dir out/")]
    Run {
        /// Path to the .recon.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary only
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write matched.csv / missing.csv / extra.csv to this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  concilia validate recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn invalid_config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RECON_INVALID_CONFIG, message: msg.into(), hint: None }
    }

    fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_RECON_RUNTIME, message: msg.into(), hint: None }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, json, output, export_dir } => {
            cmd_run(config, json, output, export_dir)
        }
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("concilia: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}

fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    export_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::runtime(format!("cannot read config: {e}")))?;
    let config =
        ReconConfig::from_toml(&config_str).map_err(|e| CliError::invalid_config(e.to_string()))?;

    // Resolve data files relative to the config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let expected_text = read_source(base_dir, &config.expected)?;
    let expected = concilia_recon::load_expected(
        &expected_text,
        &config.expected,
        delimiter_for(&config.expected, &expected_text),
    )
    .map_err(|e| CliError::runtime(e.to_string()))?;

    let observed_text = read_source(base_dir, &config.observed)?;
    let observed = concilia_recon::load_observed(
        &observed_text,
        &config.observed,
        delimiter_for(&config.observed, &observed_text),
    )
    .map_err(|e| CliError::runtime(e.to_string()))?;

    let input = ReconInput { expected, observed };
    let result =
        concilia_recon::run(&config, &input).map_err(|e| CliError::runtime(e.to_string()))?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::runtime(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    if let Some(ref dir) = export_dir {
        concilia_io::export::write_partitions(&result, dir).map_err(CliError::runtime)?;
        eprintln!("wrote partitions to {}", dir.display());
    }

    // Human summary to stderr
    eprintln!("{}", summary_line(&result.summary));

    if result.summary.missing_from_observed > 0 || result.summary.extra_in_observed > 0 {
        return Err(CliError {
            code: EXIT_RECON_MISMATCH,
            message: "unreconciled entries found".into(),
            hint: None,
        });
    }

    Ok(())
}

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config_str = std::fs::read_to_string(&config_path)
        .map_err(|e| CliError::runtime(format!("cannot read config: {e}")))?;

    match ReconConfig::from_toml(&config_str) {
        Ok(config) => {
            eprintln!(
                "valid: '{}' ({} strategy, tolerance {} cents)",
                config.name, config.strategy, config.tolerance.amount_cents,
            );
            Ok(())
        }
        Err(e) => Err(CliError::invalid_config(e.to_string())),
    }
}

fn read_source(base_dir: &Path, source: &SourceConfig) -> Result<String, CliError> {
    let path = base_dir.join(&source.file);
    concilia_io::csv::read_file_as_utf8(&path).map_err(CliError::runtime)
}

/// Configured delimiter wins; otherwise sniff from content.
fn delimiter_for(source: &SourceConfig, content: &str) -> u8 {
    match source.delimiter {
        Some(c) => c as u8,
        None => concilia_io::csv::sniff_delimiter(content),
    }
}

fn summary_line(s: &ReconSummary) -> String {
    let mut line = format!(
        "{} expected vs {} observed — {} matched, {} missing, {} extra",
        s.total_expected, s.total_observed, s.matched, s.missing_from_observed, s.extra_in_observed,
    );
    let dropped = s.dropped_expected + s.dropped_observed;
    if dropped > 0 {
        line.push_str(&format!(", {dropped} unparsable cell(s) dropped"));
    }
    let skipped = s.skipped_expected + s.skipped_observed;
    if skipped > 0 {
        line.push_str(&format!(", {skipped} non-positive row(s) skipped"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const CONFIG: &str = r#"
name = "Pix March"

[expected]
file = "planilha.csv"

[expected.columns]
amount = "Valor"
label  = "Descrição"

[observed]
file = "extrato.csv"

[observed.columns]
amount = "Valor"
label  = "Histórico"
"#;

    fn write_fixtures(dir: &Path, extrato: &str) -> PathBuf {
        let config_path = dir.join("recon.toml");
        fs::write(&config_path, CONFIG).unwrap();
        fs::write(
            dir.join("planilha.csv"),
            "Descrição;Valor\naluguel;1.250,00\nconsulta;180,00\n",
        )
        .unwrap();
        fs::write(dir.join("extrato.csv"), extrato).unwrap();
        config_path
    }

    #[test]
    fn run_fully_reconciled_exits_clean() {
        let dir = tempdir().unwrap();
        let config = write_fixtures(
            dir.path(),
            "Histórico;Valor\npix aluguel;1250,00\npix consulta;180,00\n",
        );
        let out = dir.path().join("result.json");
        cmd_run(config, false, Some(out.clone()), None).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(json["summary"]["matched"], 2);
        assert_eq!(json["summary"]["missing_from_observed"], 0);
    }

    #[test]
    fn run_mismatch_maps_to_exit_code() {
        let dir = tempdir().unwrap();
        let config = write_fixtures(dir.path(), "Histórico;Valor\npix aluguel;1250,00\n");
        let err = cmd_run(config, false, None, None).unwrap_err();
        assert_eq!(err.code, EXIT_RECON_MISMATCH);
    }

    #[test]
    fn run_exports_partitions() {
        let dir = tempdir().unwrap();
        let config = write_fixtures(dir.path(), "Histórico;Valor\npix aluguel;1250,00\n");
        let export = dir.path().join("out");
        let _ = cmd_run(config, false, None, Some(export.clone()));

        assert!(export.join("matched.csv").exists());
        assert!(export.join("missing.csv").exists());
        assert!(export.join("extra.csv").exists());
        let missing = fs::read_to_string(export.join("missing.csv")).unwrap();
        assert!(missing.contains("consulta,180.00"));
    }

    #[test]
    fn validate_rejects_bad_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("bad.toml");
        fs::write(&config_path, "name = \"x\"\n").unwrap();
        let err = cmd_validate(config_path).unwrap_err();
        assert_eq!(err.code, EXIT_RECON_INVALID_CONFIG);
    }

    #[test]
    fn summary_line_mentions_drops_only_when_present() {
        let mut s = ReconSummary {
            total_expected: 2,
            total_observed: 2,
            matched: 2,
            missing_from_observed: 0,
            extra_in_observed: 0,
            dropped_expected: 0,
            dropped_observed: 0,
            skipped_expected: 0,
            skipped_observed: 0,
        };
        assert_eq!(summary_line(&s), "2 expected vs 2 observed — 2 matched, 0 missing, 0 extra");

        s.dropped_observed = 1;
        assert!(summary_line(&s).contains("1 unparsable cell(s) dropped"));
    }
}
