use crate::error::EvidenceError;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const CSV_HEADER: &str = "Timestamp,Message,Location";

/// Append-only record of confirmed incidents.
pub trait EventJournal: Send {
    fn log_event(
        &mut self,
        at: DateTime<Utc>,
        message: &str,
        location: &str,
    ) -> Result<(), EvidenceError>;
    fn flush(&mut self) -> Result<(), EvidenceError>;
}

/// One CSV row per event; the header is written when the file is first
/// created. The file is opened per append so a crash between events never
/// loses completed rows.
pub struct CsvJournal {
    path: PathBuf,
}

impl CsvJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EventJournal for CsvJournal {
    fn log_event(
        &mut self,
        at: DateTime<Utc>,
        message: &str,
        location: &str,
    ) -> Result<(), EvidenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let new_file = !self.path.exists();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if new_file {
            writeln!(file, "{CSV_HEADER}")?;
        }
        writeln!(
            file,
            "{},{},{}",
            at.format("%Y-%m-%d %H:%M:%S"),
            escape_field(message),
            escape_field(location)
        )?;
        tracing::info!("Event recorded in {}.", self.path.display());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EvidenceError> {
        // Each append opens, writes and closes the file.
        Ok(())
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalRow {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub location: String,
}

/// In-memory journal for tests; clones share the same entry list.
#[derive(Clone, Default)]
pub struct InMemoryJournal {
    rows: Arc<Mutex<Vec<JournalRow>>>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<JournalRow> {
        self.rows.lock().expect("journal lock poisoned").clone()
    }
}

impl EventJournal for InMemoryJournal {
    fn log_event(
        &mut self,
        at: DateTime<Utc>,
        message: &str,
        location: &str,
    ) -> Result<(), EvidenceError> {
        self.rows.lock().expect("journal lock poisoned").push(JournalRow {
            timestamp: at,
            message: message.to_string(),
            location: location.to_string(),
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<(), EvidenceError> {
        Ok(())
    }
}
