//! Table sinks and report output.
//!
//! The sink is where assembled tables are handed off and where the validator
//! reads them back. [`CsvDirSink`] stores one CSV file per table;
//! [`MemorySink`] keeps them in memory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::assembler::{CanonicalTables, Table};

/// Error type for sink operations
#[derive(Debug)]
pub enum SinkError {
    IoError(std::io::Error),
    CsvError(csv::Error),
    JsonError(serde_json::Error),
    MissingTable(String),
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::IoError(err)
    }
}

impl From<csv::Error> for SinkError {
    fn from(err: csv::Error) -> Self {
        SinkError::CsvError(err)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::JsonError(err)
    }
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::IoError(e) => write!(f, "IO error: {}", e),
            SinkError::CsvError(e) => write!(f, "CSV error: {}", e),
            SinkError::JsonError(e) => write!(f, "JSON error: {}", e),
            SinkError::MissingTable(name) => write!(f, "Table not found in sink: {}", name),
        }
    }
}

impl std::error::Error for SinkError {}

/// Destination for canonical tables, readable back by the validator.
pub trait TableSink {
    /// Store `table`, replacing any previous table of the same name.
    fn write_table(&mut self, table: &Table) -> Result<(), SinkError>;

    /// Read the table called `name`, laid out in `columns` order.
    ///
    /// Columns the stored table lacks read as empty cells.
    fn read_table(&self, name: &str, columns: &[&str]) -> Result<Table, SinkError>;

    /// Store all four canonical tables.
    fn write_tables(&mut self, tables: &CanonicalTables) -> Result<(), SinkError> {
        for table in tables.iter() {
            self.write_table(table)?;
        }
        Ok(())
    }
}

/// File name a table is stored under.
pub fn table_file_name(table: &str) -> String {
    match table {
        "recipes" => "recipe.csv".to_string(),
        other => format!("{}.csv", other),
    }
}

/// One CSV file per table in a directory.
#[derive(Debug, Clone)]
pub struct CsvDirSink {
    dir: PathBuf,
}

impl CsvDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(table_file_name(table))
    }
}

impl TableSink for CsvDirSink {
    fn write_table(&mut self, table: &Table) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.table_path(&table.name);

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        info!("Wrote {} rows to {}", table.len(), path.display());
        Ok(())
    }

    fn read_table(&self, name: &str, columns: &[&str]) -> Result<Table, SinkError> {
        let path = self.table_path(name);
        if !path.exists() {
            return Err(SinkError::MissingTable(path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(&path)?;
        let headers: HashMap<String, usize> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, header)| (header.trim().to_string(), i))
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row = columns
                .iter()
                .map(|column| {
                    headers
                        .get(*column)
                        .and_then(|&i| record.get(i))
                        .unwrap_or("")
                        .to_string()
                })
                .collect();
            rows.push(row);
        }

        debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(Table {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }
}

/// In-memory sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: HashMap<String, Table>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableSink for MemorySink {
    fn write_table(&mut self, table: &Table) -> Result<(), SinkError> {
        self.tables.insert(table.name.clone(), table.clone());
        Ok(())
    }

    fn read_table(&self, name: &str, columns: &[&str]) -> Result<Table, SinkError> {
        let stored = self
            .tables
            .get(name)
            .ok_or_else(|| SinkError::MissingTable(name.to_string()))?;

        let rows = stored
            .records()
            .into_iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(*column).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(Table {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }
}

/// Write `value` as pretty-printed JSON, creating parent directories.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<(), SinkError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
