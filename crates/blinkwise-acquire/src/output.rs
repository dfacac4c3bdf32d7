use blinkwise_model::HighlightRecord;
use std::fs;
use std::path::Path;

use crate::ExtractError;

pub const DEFAULT_CSV_PATH: &str = "blinkist_highlights.csv";

const CSV_HEADER: &str = "Highlight,Title";

/// Render highlights as CSV, oldest first.
///
/// `records` is expected most recent first. Fields are wrapped in double
/// quotes but quotes inside them are not escaped. There is no newline after
/// the last record.
pub fn render_csv(records: &[HighlightRecord]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    let lines: Vec<String> = records
        .iter()
        .rev()
        .map(|r| format!("\"{}\",\"{}\"", r.text, r.source_title))
        .collect();
    csv.push_str(&lines.join("\n"));
    csv
}

/// Write highlights to a CSV file at `path`, replacing any existing file.
pub fn write_csv(path: &Path, records: &[HighlightRecord]) -> Result<(), ExtractError> {
    let csv = render_csv(records);
    fs::write(path, &csv)?;
    tracing::info!(path = %path.display(), highlights = records.len(), "Wrote highlights CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Split on the quoted separator, the way a spreadsheet import without
    /// escaping support would.
    fn naive_read(csv: &str) -> Vec<(String, String)> {
        csv.lines()
            .skip(1)
            .map(|line| {
                let inner = line.trim_start_matches('"').trim_end_matches('"');
                let (text, title) = inner.split_once("\",\"").unwrap();
                (text.to_string(), title.to_string())
            })
            .collect()
    }

    fn synthetic(n: usize) -> Vec<HighlightRecord> {
        (0..n)
            .map(|i| HighlightRecord::new(format!("Book {i}"), format!("Ch {i}"), format!("Passage {i}, with a comma")))
            .collect()
    }

    #[test]
    fn test_render_oldest_first_without_trailing_newline() {
        let records = vec![
            HighlightRecord::new("Atomic Habits", "1", "newest"),
            HighlightRecord::new("Deep Work", "2", "oldest"),
        ];
        assert_eq!(
            render_csv(&records),
            "Highlight,Title\n\"oldest\",\"Deep Work\"\n\"newest\",\"Atomic Habits\""
        );
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_csv(&[]), "Highlight,Title\n");
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CSV_PATH);
        let records = synthetic(25);

        write_csv(&path, &records).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Highlight,Title\n"));
        assert!(!contents.ends_with('\n'));

        let read = naive_read(&contents);
        assert_eq!(read.len(), 25);
        for (row, record) in read.iter().zip(records.iter().rev()) {
            assert_eq!(row.0, record.text);
            assert_eq!(row.1, record.source_title);
        }
    }
}
