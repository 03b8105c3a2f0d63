use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use advisor_core::props::{keys, PropertyStore};
use advisor_core::types::UsageMetadata;
use chrono::Utc;
use tracing::{debug, warn};

const HEADER: &str =
    "Timestamp,Standards Count,Country,Prompt Tokens,Output Tokens,Total Tokens,Finish Reason";

/// Best-effort append-only usage log. One row per analysis call, written
/// to the CSV file named by the `usage_log_path` property. Must never
/// break the primary request: every failure is contained here.
pub struct UsageLog {
    props: Arc<dyn PropertyStore>,
}

impl UsageLog {
    pub fn new(props: Arc<dyn PropertyStore>) -> Self {
        Self { props }
    }

    /// Records one analysis call. Infallible from the caller's
    /// perspective; failures are logged and swallowed.
    pub fn record(
        &self,
        item_count: usize,
        country: &str,
        usage: &UsageMetadata,
        finish_reason: &str,
    ) {
        if let Err(e) = self.try_record(item_count, country, usage, finish_reason) {
            warn!(error = %e, "Failed to record API usage");
        }
    }

    fn try_record(
        &self,
        item_count: usize,
        country: &str,
        usage: &UsageMetadata,
        finish_reason: &str,
    ) -> anyhow::Result<()> {
        let path = match self.props.get(keys::USAGE_LOG_PATH)? {
            Some(path) if !path.is_empty() => path,
            _ => {
                debug!("No usage log destination configured; skipping");
                return Ok(());
            }
        };

        let finish_reason = if finish_reason.is_empty() {
            "N/A"
        } else {
            finish_reason
        };

        let row = format!(
            "{},{},{},{},{},{},{}",
            Utc::now().to_rfc3339(),
            item_count,
            csv_field(country),
            usage.prompt_token_count,
            usage.candidates_token_count,
            usage.total_token_count,
            csv_field(finish_reason)
        );

        append_row(Path::new(&path), &row)?;
        debug!(path, "API usage recorded");
        Ok(())
    }
}

/// Appends one row, writing the header first when the file is empty or
/// does not exist yet.
fn append_row(path: &Path, row: &str) -> anyhow::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if file.metadata()?.len() == 0 {
        writeln!(file, "{}", HEADER)?;
    }
    writeln!(file, "{}", row)?;
    Ok(())
}

/// Minimal CSV quoting: fields with separators or quotes get wrapped, with
/// inner quotes doubled.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_core::props::MemoryPropertyStore;
    use std::fs;

    fn log_with_path(path: &str) -> UsageLog {
        let props = MemoryPropertyStore::new();
        props.set(keys::USAGE_LOG_PATH, path).unwrap();
        UsageLog::new(Arc::new(props))
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.csv");
        let log = log_with_path(path.to_str().unwrap());

        let usage = UsageMetadata {
            prompt_token_count: 100,
            candidates_token_count: 40,
            total_token_count: 140,
        };
        log.record(2, "Россия", &usage, "STOP");
        log.record(1, "Казахстан", &usage, "STOP");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].contains(",2,Россия,100,40,140,STOP"));
        assert!(lines[2].contains(",1,Казахстан,"));
    }

    #[test]
    fn test_no_destination_is_a_noop() {
        let log = UsageLog::new(Arc::new(MemoryPropertyStore::new()));
        log.record(1, "Россия", &UsageMetadata::default(), "STOP");
        // Nothing to assert beyond "did not panic": no file path exists.
    }

    #[test]
    fn test_unwritable_destination_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for append; record must still return.
        let log = log_with_path(dir.path().to_str().unwrap());
        log.record(1, "Россия", &UsageMetadata::default(), "STOP");
    }

    #[test]
    fn test_empty_finish_reason_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.csv");
        let log = log_with_path(path.to_str().unwrap());

        log.record(1, "Россия", &UsageMetadata::default(), "");

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.lines().nth(1).unwrap().ends_with(",N/A"));
    }

    #[test]
    fn test_country_with_comma_is_quoted() {
        assert_eq!(csv_field("Корея, Южная"), "\"Корея, Южная\"");
        assert_eq!(csv_field("Россия"), "Россия");
    }
}
