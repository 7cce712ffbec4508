use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    #[serde(default)]
    pub strategy: MatchStrategy,
    pub expected: SourceConfig,
    pub observed: SourceConfig,
    #[serde(default)]
    pub tolerance: ToleranceConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Row-preserving tolerance match with label tie-break.
    ByRow,
    /// Exact value + multiplicity counting.
    ByValue,
}

impl Default for MatchStrategy {
    fn default() -> Self {
        Self::ByRow
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByRow => write!(f, "by_row"),
            Self::ByValue => write!(f, "by_value"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub file: String,
    /// Field delimiter override; sniffed from content when absent.
    #[serde(default)]
    pub delimiter: Option<char>,
    pub columns: ColumnMapping,
    #[serde(default)]
    pub filter: Option<RowFilter>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub amount: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Keep only rows whose `column` holds one of `values`. Bank exports
/// mix debits, fees and the transfers under reconciliation.
#[derive(Debug, Clone, Deserialize)]
pub struct RowFilter {
    pub column: String,
    pub values: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tolerance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ToleranceConfig {
    #[serde(default)]
    pub amount_cents: i64,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self { amount_cents: 0 }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.name.trim().is_empty() {
            return Err(ReconError::ConfigValidation("name must not be empty".into()));
        }

        if self.tolerance.amount_cents < 0 {
            return Err(ReconError::ConfigValidation(format!(
                "tolerance.amount_cents must not be negative, got {}",
                self.tolerance.amount_cents
            )));
        }

        // The counting strategy is exact; a tolerance there would be
        // silently ignored, so reject the combination outright.
        if self.strategy == MatchStrategy::ByValue && self.tolerance.amount_cents != 0 {
            return Err(ReconError::ConfigValidation(
                "tolerance.amount_cents has no effect with strategy \"by_value\"".into(),
            ));
        }

        for (side, source) in [("expected", &self.expected), ("observed", &self.observed)] {
            if source.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{side}: file must not be empty"
                )));
            }
            if source.columns.amount.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "{side}: columns.amount must not be empty"
                )));
            }
            if let Some(ref filter) = source.filter {
                if filter.values.is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "{side}: filter.values must not be empty"
                    )));
                }
            }
            if let Some(delim) = source.delimiter {
                // CSV readers take a single byte
                if !delim.is_ascii() {
                    return Err(ReconError::ConfigValidation(format!(
                        "{side}: delimiter must be an ASCII character, got {delim:?}"
                    )));
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
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

[observed.filter]
column = "Tipo"
values = ["PIX RECEBIDO"]

[tolerance]
amount_cents = 2
"#;

    #[test]
    fn parse_valid() {
        let config = ReconConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Pix March");
        assert_eq!(config.strategy, MatchStrategy::ByRow);
        assert_eq!(config.tolerance.amount_cents, 2);
        assert_eq!(config.expected.columns.amount, "Valor");
        let filter = config.observed.filter.as_ref().unwrap();
        assert_eq!(filter.column, "Tipo");
        assert_eq!(filter.values, vec!["PIX RECEBIDO"]);
    }

    #[test]
    fn defaults() {
        let input = r#"
name = "Minimal"

[expected]
file = "a.csv"
[expected.columns]
amount = "Valor"

[observed]
file = "b.csv"
[observed.columns]
amount = "Valor"
"#;
        let config = ReconConfig::from_toml(input).unwrap();
        assert_eq!(config.strategy, MatchStrategy::ByRow);
        assert_eq!(config.tolerance.amount_cents, 0);
        assert!(config.expected.columns.label.is_none());
        assert!(config.expected.filter.is_none());
        assert!(config.expected.delimiter.is_none());
    }

    #[test]
    fn parse_by_value_strategy() {
        let input = VALID
            .replace("name = \"Pix March\"", "name = \"Counts\"\nstrategy = \"by_value\"")
            .replace("amount_cents = 2", "amount_cents = 0");
        let config = ReconConfig::from_toml(&input).unwrap();
        assert_eq!(config.strategy, MatchStrategy::ByValue);
    }

    #[test]
    fn reject_by_value_with_tolerance() {
        let input =
            VALID.replace("name = \"Pix March\"", "name = \"Counts\"\nstrategy = \"by_value\"");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("by_value"));
    }

    #[test]
    fn reject_unknown_strategy() {
        let input = VALID.replace("name = \"Pix March\"", "name = \"X\"\nstrategy = \"by_magic\"");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("config parse error"));
    }

    #[test]
    fn reject_empty_name() {
        let input = VALID.replace("name = \"Pix March\"", "name = \"  \"");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn reject_negative_tolerance() {
        let input = VALID.replace("amount_cents = 2", "amount_cents = -1");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn reject_non_ascii_delimiter() {
        let input = VALID.replace("file = \"planilha.csv\"", "file = \"planilha.csv\"\ndelimiter = \"§\"");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("ASCII"));
    }

    #[test]
    fn parse_delimiter_override() {
        let input = VALID.replace("file = \"planilha.csv\"", "file = \"planilha.csv\"\ndelimiter = \"\\t\"");
        let config = ReconConfig::from_toml(&input).unwrap();
        assert_eq!(config.expected.delimiter, Some('\t'));
    }

    #[test]
    fn reject_empty_filter_values() {
        let input = VALID.replace("values = [\"PIX RECEBIDO\"]", "values = []");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("filter.values"));
    }
}
