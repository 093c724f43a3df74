// crates/gateway-services/src/reference.rs
// ============================================================================
// Module: Reference Data Store
// Description: Read-only lookup lists backed by a local SQLite database.
// Purpose: Serve rank and unit-name reference lists for search front-ends.
// Dependencies: rusqlite, thiserror
// ============================================================================

//! ## Overview
//! Two small reference lists live next to the gateway in a local `SQLite`
//! file: military ranks and unit names. The store opens a fresh read-only
//! connection per call, which keeps the handle lifecycle trivial and lets
//! the database file be replaced underneath a running process.
//! Invariants:
//! - Returned lists are trimmed, deduplicated case-insensitively, and
//!   ordered case-insensitively.
//! - The database is never written to; connections are opened read-only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while reading reference data.
#[derive(Debug, Error)]
pub enum ReferenceDataError {
    /// The database file could not be opened.
    #[error("reference database unavailable: {0}")]
    Open(String),
    /// A query against the reference tables failed.
    #[error("reference query failed: {0}")]
    Query(String),
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Read access to the gateway's local reference lists.
pub trait ReferenceData: Send + Sync {
    /// Lists known military rank names.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceDataError`] when the database cannot be read.
    fn rank_reference_list(&self) -> Result<Vec<String>, ReferenceDataError>;

    /// Lists known military unit names.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceDataError`] when the database cannot be read.
    fn unit_name_reference_list(&self) -> Result<Vec<String>, ReferenceDataError>;
}

// ============================================================================
// SECTION: SQLite Store
// ============================================================================

/// [`ReferenceData`] implementation over a local `SQLite` file.
#[derive(Debug, Clone)]
pub struct SqliteReferenceData {
    /// Path of the reference database file.
    db_path: PathBuf,
}

impl SqliteReferenceData {
    /// Creates a store reading from the given database file.
    #[must_use]
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Opens a fresh read-only connection.
    fn open(&self) -> Result<Connection, ReferenceDataError> {
        Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|err| ReferenceDataError::Open(err.to_string()))
    }

    /// Runs a single-column query and normalizes the values.
    fn single_column(&self, sql: &str) -> Result<Vec<String>, ReferenceDataError> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|err| ReferenceDataError::Query(err.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                let value: Option<String> = row.get(0)?;
                Ok(value)
            })
            .map_err(|err| ReferenceDataError::Query(err.to_string()))?;
        let mut values = Vec::new();
        for row in rows {
            let value = row.map_err(|err| ReferenceDataError::Query(err.to_string()))?;
            if let Some(raw) = value {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    values.push(trimmed.to_string());
                }
            }
        }
        Ok(normalize_list(values))
    }
}

impl ReferenceData for SqliteReferenceData {
    fn rank_reference_list(&self) -> Result<Vec<String>, ReferenceDataError> {
        self.single_column("SELECT HORKOS_STOPIEN_NAZWA FROM HORKOS_STOPIEN")
    }

    fn unit_name_reference_list(&self) -> Result<Vec<String>, ReferenceDataError> {
        self.single_column("SELECT HORKOS_NAZWA FROM HORKOS_JW")
    }
}

/// Deduplicates case-insensitively and orders case-insensitively.
///
/// The first spelling of each value wins; later case variants are dropped.
fn normalize_list(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut unique: Vec<String> = values
        .into_iter()
        .filter(|value| seen.insert(value.to_lowercase()))
        .collect();
    unique.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
    unique
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use rusqlite::Connection;
    use tempfile::TempDir;

    use super::ReferenceData;
    use super::ReferenceDataError;
    use super::SqliteReferenceData;

    /// Creates a reference database with messy seed rows.
    fn seeded_store(dir: &TempDir) -> SqliteReferenceData {
        let path = dir.path().join("reference.db");
        let conn = Connection::open(&path).expect("create reference db");
        conn.execute_batch(
            "CREATE TABLE HORKOS_STOPIEN (HORKOS_STOPIEN_NAZWA TEXT);
             CREATE TABLE HORKOS_JW (HORKOS_NAZWA TEXT);
             INSERT INTO HORKOS_STOPIEN VALUES
                 (' kapitan '), ('Porucznik'), ('PORUCZNIK'), (''), (NULL), ('Major');
             INSERT INTO HORKOS_JW VALUES
                 ('1 Brygada Pancerna'), (' 1 brygada pancerna'), ('Batalion Dowodzenia');",
        )
        .expect("seed reference db");
        SqliteReferenceData::new(&path)
    }

    #[test]
    fn ranks_are_trimmed_deduplicated_and_ordered() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let ranks = store.rank_reference_list().unwrap();
        assert_eq!(ranks, vec!["kapitan", "Major", "Porucznik"]);
    }

    #[test]
    fn unit_names_deduplicate_across_case_and_whitespace() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let units = store.unit_name_reference_list().unwrap();
        assert_eq!(units, vec!["1 Brygada Pancerna", "Batalion Dowodzenia"]);
    }

    #[test]
    fn missing_database_reports_open_error() {
        let dir = TempDir::new().unwrap();
        let store = SqliteReferenceData::new(dir.path().join("absent.db"));
        let error = store.rank_reference_list().unwrap_err();
        assert!(matches!(error, ReferenceDataError::Open(_)));
    }
}
