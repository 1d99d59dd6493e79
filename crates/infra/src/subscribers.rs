//! Alert subscriber list (`city,email` CSV with a header row).

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub city: String,
    pub email: String,
}

impl Subscriber {
    pub fn new(city: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            email: email.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubscriberError {
    #[error("failed to read subscriber list {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("subscriber list read interrupted: {0}")]
    Interrupted(#[source] csv::Error),
}

/// Rows that parsed, plus how many were skipped as malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriberBatch {
    pub subscribers: Vec<Subscriber>,
    pub skipped: usize,
}

/// Where the dispatcher gets its recipients. Read on every run.
///
/// Malformed rows are skipped; only an unreadable source is an error.
pub trait SubscriberSource: Send + Sync + 'static {
    fn load(&self) -> Result<SubscriberBatch, SubscriberError>;
}

/// CSV file on disk, re-read on every [`SubscriberSource::load`].
#[derive(Debug, Clone)]
pub struct CsvSubscriberList {
    path: PathBuf,
}

impl CsvSubscriberList {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubscriberSource for CsvSubscriberList {
    fn load(&self) -> Result<SubscriberBatch, SubscriberError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|source| SubscriberError::Read {
                path: self.path.clone(),
                source,
            })?;
        collect(reader)
    }
}

/// Parse subscribers from any CSV reader.
pub fn read_subscribers<R: io::Read>(input: R) -> Result<SubscriberBatch, SubscriberError> {
    collect(csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input))
}

fn collect<R: io::Read>(mut reader: csv::Reader<R>) -> Result<SubscriberBatch, SubscriberError> {
    let mut batch = SubscriberBatch::default();
    for row in reader.deserialize::<Subscriber>() {
        match row {
            Ok(subscriber) => batch.subscribers.push(subscriber),
            Err(e) if e.is_io_error() => return Err(SubscriberError::Interrupted(e)),
            Err(e) => {
                let line = e.position().map(|p| p.line());
                warn!(line = ?line, error = %e, "skipping malformed subscriber row");
                batch.skipped += 1;
            }
        }
    }
    Ok(batch)
}

/// Fixed in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticSubscribers(pub Vec<Subscriber>);

impl SubscriberSource for StaticSubscribers {
    fn load(&self) -> Result<SubscriberBatch, SubscriberError> {
        Ok(SubscriberBatch {
            subscribers: self.0.clone(),
            skipped: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_in_order_without_dedup() {
        let csv = "city,email\nmumbai,a@example.com\ndelhi, b@example.com \nmumbai,a@example.com\n";
        let batch = read_subscribers(csv.as_bytes()).unwrap();

        assert_eq!(
            batch.subscribers,
            vec![
                Subscriber::new("mumbai", "a@example.com"),
                Subscriber::new("delhi", "b@example.com"),
                Subscriber::new("mumbai", "a@example.com"),
            ]
        );
        assert_eq!(batch.skipped, 0);
    }

    #[test]
    fn header_order_does_not_matter() {
        let batch = read_subscribers("email,city\nc@example.com,delhi\n".as_bytes()).unwrap();
        assert_eq!(batch.subscribers, vec![Subscriber::new("delhi", "c@example.com")]);
    }

    #[test]
    fn short_rows_are_skipped_and_counted() {
        let csv = "city,email\ndelhi,a@example.com\nmumbai\nmumbai,c@example.com\n";
        let batch = read_subscribers(csv.as_bytes()).unwrap();

        assert_eq!(
            batch.subscribers,
            vec![
                Subscriber::new("delhi", "a@example.com"),
                Subscriber::new("mumbai", "c@example.com"),
            ]
        );
        assert_eq!(batch.skipped, 1);
    }

    #[test]
    fn missing_column_skips_every_row() {
        let batch = read_subscribers("city\ndelhi\nmumbai\n".as_bytes()).unwrap();
        assert!(batch.subscribers.is_empty());
        assert_eq!(batch.skipped, 2);
    }

    #[test]
    fn missing_file_reports_path() {
        let list = CsvSubscriberList::new("/definitely/not/here.csv");
        let err = list.load().unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }

    #[test]
    fn file_is_reread_on_every_load() {
        let path = std::env::temp_dir().join(format!("smartair-subs-{}.csv", std::process::id()));
        std::fs::write(&path, "city,email\ndelhi,a@example.com\n").unwrap();

        let list = CsvSubscriberList::new(&path);
        assert_eq!(list.load().unwrap().subscribers.len(), 1);

        std::fs::write(&path, "city,email\ndelhi,a@example.com\nmumbai,b@example.com\n").unwrap();
        assert_eq!(list.load().unwrap().subscribers.len(), 2);

        let _ = std::fs::remove_file(&path);
    }
}
