//! In-memory patent corpus loaded once at startup

use crate::errors::{MemoryError, MemoryResult};
use domain::{CorpusStore, PatentRecord, RowId};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Immutable corpus addressed by row id (position in the source file).
///
/// Row ids are assigned on load and must match the rows the vector index
/// was built from.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    records: Vec<PatentRecord>,
}

impl InMemoryCorpus {
    pub fn from_records(records: impl IntoIterator<Item = PatentRecord>) -> Self {
        let records = records
            .into_iter()
            .enumerate()
            .map(|(row, record)| record.with_row_id(row))
            .collect();
        Self { records }
    }

    /// Load a corpus file.
    ///
    /// Accepts either a JSON array of records or JSON lines (one record per
    /// line, blank lines skipped).
    pub fn load<P: AsRef<Path>>(path: P) -> MemoryResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| MemoryError::io(path, e))?;

        let records = if content.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<PatentRecord>>(&content).map_err(|source| {
                MemoryError::CorpusFormat {
                    path: path.to_path_buf(),
                    line: source.line(),
                    source,
                }
            })?
        } else {
            parse_json_lines(path, &content)?
        };

        info!("Loaded {} patent records from {}", records.len(), path.display());
        Ok(Self::from_records(records))
    }

    pub fn records(&self) -> &[PatentRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatentRecord> {
        self.records.iter()
    }
}

fn parse_json_lines(path: &Path, content: &str) -> MemoryResult<Vec<PatentRecord>> {
    let mut records = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|source| MemoryError::CorpusFormat {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }

    debug!("Parsed {} JSON lines", records.len());
    Ok(records)
}

impl CorpusStore for InMemoryCorpus {
    fn get(&self, row_id: RowId) -> Option<PatentRecord> {
        self.records.get(row_id).cloned()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_row_ids_follow_file_order() {
        let corpus = InMemoryCorpus::from_records(vec![
            PatentRecord::new("a", "x", "US1", "2001"),
            PatentRecord::new("b", "y", "US2", "2002"),
        ]);

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get(1).and_then(|r| r.row_id), Some(1));
        assert_eq!(corpus.get(1).unwrap().title(), Some("b"));
        assert!(corpus.get(2).is_none());
        assert!(!corpus.contains(2));
    }

    #[test]
    fn test_load_json_lines_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"title": "Kettle", "abstract": "Boils"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"title": "Lamp", "publication_number": "US9"}}"#).unwrap();

        let corpus = InMemoryCorpus::load(file.path()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get(1).unwrap().publication_number(), Some("US9"));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"title": "ok"}}"#).unwrap();
        writeln!(file, "not json").unwrap();

        match InMemoryCorpus::load(file.path()) {
            Err(MemoryError::CorpusFormat { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
