// CSV reading: encoding fallback + delimiter sniffing

use std::io::Read;
use std::path::Path;

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
///
/// Brazilian bank exports are frequently Latin-1; Windows-1252 is a
/// superset that decodes both.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| format!("cannot open {}: {e}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (number of lines with same field count as line 1) * field_count
        // Higher field count breaks ties — more columns = more likely real delimiter
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Data;Histórico;Valor\n02/03;pix recebido;1.250,00\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Data,Histórico,Valor\n02/03,pix recebido,\"1.250,00\"\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Data\tHistórico\tValor\n02/03\tpix\t1250,00\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        // Semicolon-delimited, but pt-BR decimals put a comma in every amount
        let content = "Data;Valor\n02/03;1.250,00\n03/03;430,10\n04/03;75,00\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_empty_defaults_to_comma() {
        assert_eq!(sniff_delimiter(""), b',');
    }

    #[test]
    fn test_read_utf8_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("utf8.csv");
        fs::write(&path, "Descrição;Valor\ncondomínio;430,10\n").unwrap();

        let content = read_file_as_utf8(&path).unwrap();
        assert!(content.contains("Descrição"));
        assert!(content.contains("condomínio"));
    }

    #[test]
    fn test_read_latin1_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        // "Descrição;Valor" in Latin-1: ç = 0xE7, ã = 0xE3
        let bytes = b"Descri\xE7\xE3o;Valor\ncondom\xEDnio;430,10\n";
        fs::write(&path, bytes).unwrap();

        let content = read_file_as_utf8(&path).unwrap();
        assert!(content.contains("Descrição"));
        assert!(content.contains("condomínio"));
    }

    #[test]
    fn test_read_missing_file_errors() {
        let dir = tempdir().unwrap();
        let err = read_file_as_utf8(&dir.path().join("nope.csv")).unwrap_err();
        assert!(err.contains("nope.csv"));
    }
}
