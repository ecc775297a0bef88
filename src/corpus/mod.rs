// src/corpus/mod.rs — Training corpus loading (ASAP tab-separated format)

use std::path::Path;

use tracing::{debug, warn};

use crate::infra::errors::ScoreError;

pub const ESSAY_COL: &str = "essay";
pub const SET_COL: &str = "essay_set";
pub const SCORE_COL: &str = "domain1_score";

/// One usable corpus row: the essay text, its prompt family, and the
/// resolved grader score in the set's native range.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    pub essay: String,
    pub essay_set: u8,
    pub score: f64,
}

/// The reference corpus ships as Latin-1, which UTF-8 readers reject.
/// Every byte maps directly onto the same code point.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

pub fn load_corpus(path: &Path) -> Result<Vec<TrainingRecord>, ScoreError> {
    let bytes = std::fs::read(path).map_err(|e| ScoreError::TrainingData {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let text = decode_latin1(&bytes);
    parse_corpus(&text).map_err(|message| ScoreError::TrainingData {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse the tab-separated corpus. The header row locates the required
/// columns; unusable data rows are skipped with a warning, not fatal.
pub fn parse_corpus(text: &str) -> Result<Vec<TrainingRecord>, String> {
    let mut lines = text.lines();
    let header = lines.next().ok_or_else(|| "corpus is empty".to_string())?;
    let columns: Vec<&str> = header.split('\t').map(str::trim).collect();

    let locate = |name: &str| {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| format!("missing required column '{name}'"))
    };
    let essay_col = locate(ESSAY_COL)?;
    let set_col = locate(SET_COL)?;
    let score_col = locate(SCORE_COL)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        match parse_row(&fields, essay_col, set_col, score_col) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} malformed or empty corpus rows");
    }
    debug!("Parsed {} corpus records", records.len());
    Ok(records)
}

fn parse_row(
    fields: &[&str],
    essay_col: usize,
    set_col: usize,
    score_col: usize,
) -> Option<TrainingRecord> {
    let essay = strip_quotes(fields.get(essay_col)?.trim());
    if essay.is_empty() {
        return None;
    }
    let essay_set: u8 = fields.get(set_col)?.trim().parse().ok()?;
    let score: f64 = fields.get(score_col)?.trim().parse().ok()?;
    if !score.is_finite() {
        return None;
    }
    Some(TrainingRecord {
        essay: essay.to_string(),
        essay_set,
        score,
    })
}

/// Essay fields in the reference corpus are wrapped in double quotes.
fn strip_quotes(field: &str) -> &str {
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "essay_id\tessay_set\tessay\trater1_domain1\trater2_domain1\tdomain1_score";

    #[test]
    fn test_parse_reference_layout() {
        let text = format!(
            "{HEADER}\n\
             1\t1\t\"Dear local newspaper, computers are great.\"\t4\t4\t8\n\
             2\t2\tLibraries should keep all books available.\t3\t3\t3\n"
        );
        let records = parse_corpus(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            TrainingRecord {
                essay: "Dear local newspaper, computers are great.".to_string(),
                essay_set: 1,
                score: 8.0,
            }
        );
        assert_eq!(records[1].essay_set, 2);
        assert_eq!(records[1].score, 3.0);
    }

    #[test]
    fn test_parse_locates_columns_by_name() {
        let text = "domain1_score\tessay\tessay_set\n7\tSome essay text here.\t1\n";
        let records = parse_corpus(text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, 7.0);
        assert_eq!(records[0].essay_set, 1);
    }

    #[test]
    fn test_parse_missing_column_is_fatal() {
        let err = parse_corpus("essay_id\tessay\tessay_set\n1\ttext\t1\n").unwrap_err();
        assert!(err.contains("domain1_score"), "err: {err}");
        let err = parse_corpus("").unwrap_err();
        assert!(err.contains("empty"));
    }

    #[test]
    fn test_parse_skips_unusable_rows() {
        let text = format!(
            "{HEADER}\n\
             1\t1\tGood essay text.\t4\t4\t8\n\
             2\tone\tBad set id.\t4\t4\t8\n\
             3\t1\tMissing score.\t4\t4\t\n\
             4\t1\t\t4\t4\t8\n\
             5\t1\tshort row\n\
             6\t2\tAnother good one.\t2\t2\t4\n"
        );
        let records = parse_corpus(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].essay, "Good essay text.");
        assert_eq!(records[1].essay, "Another good one.");
    }

    #[test]
    fn test_decode_latin1_maps_high_bytes() {
        let bytes = b"caf\xe9 r\xe9sum\xe9";
        assert_eq!(decode_latin1(bytes), "café résumé");
        assert_eq!(decode_latin1(b"plain ascii"), "plain ascii");
    }

    #[test]
    fn test_load_corpus_reports_path_on_failure() {
        let err = load_corpus(Path::new("/nonexistent/training.tsv")).unwrap_err();
        match err {
            ScoreError::TrainingData { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/training.tsv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_strip_quotes_only_when_paired() {
        assert_eq!(strip_quotes("\"quoted\""), "quoted");
        assert_eq!(strip_quotes("\"unterminated"), "\"unterminated");
        assert_eq!(strip_quotes("plain"), "plain");
        assert_eq!(strip_quotes("\"\""), "");
    }
}
