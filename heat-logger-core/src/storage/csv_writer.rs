use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::models::error::WriteError;
use crate::models::record::{Record, CSV_HEADER};

/// Append-only CSV writer with a per-row durability guarantee.
///
/// ## File Format
///
/// ```text
/// System_Timestamp_UTC,Temperature_C,...,GPS_Fix_Type   ← only if the file was empty at open
/// 2025-06-22 14:03:05 UTC,23.46,41.00,...,3D
/// ...
/// ```
///
/// Each row is encoded in memory, written with a single `write_all` and then
/// forced to the storage device with `sync_all` before `append` returns, so a
/// crash right after a successful append never loses that row. A failed
/// append truncates the file back to its length before the write, so a torn
/// or unsynced row never stays behind.
pub struct CsvRecordWriter {
    file_path: PathBuf,
    file: Option<File>,
    rows_written: u64,
    wrote_header: bool,
}

impl CsvRecordWriter {
    /// Open (or create) `file_path` for appending.
    ///
    /// Writes the header iff the file is empty at open time.
    pub fn open(file_path: PathBuf) -> Result<Self, WriteError> {
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| WriteError::Io(format!("failed to create directory: {}", e)))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .map_err(|e| WriteError::Io(format!("failed to open {}: {}", file_path.display(), e)))?;

        let is_empty = file
            .metadata()
            .map_err(|e| WriteError::Io(format!("failed to stat file: {}", e)))?
            .len()
            == 0;

        let mut writer = Self {
            file_path,
            file: Some(file),
            rows_written: 0,
            wrote_header: false,
        };

        if is_empty {
            let header = encode_row(&CSV_HEADER)?;
            writer.write_durably(&header)?;
            writer.wrote_header = true;
            log::info!("CSV header written to {}", writer.file_path.display());
        }

        Ok(writer)
    }

    /// Append one record as one row, synced to storage before returning.
    ///
    /// A failed append is not retried; the caller drops the record.
    pub fn append(&mut self, record: &Record) -> Result<(), WriteError> {
        let row = encode_row(&record.to_row())?;
        self.write_durably(&row)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush, sync and release the file. Returns the SHA-256 hex digest of
    /// the finished file.
    pub fn close(&mut self) -> Result<String, WriteError> {
        let mut file = self.file.take().ok_or(WriteError::Closed)?;
        file.flush().map_err(|e| WriteError::Io(e.to_string()))?;
        file.sync_all().map_err(|e| WriteError::Sync(e.to_string()))?;
        drop(file);

        sha256_file(&self.file_path)
    }

    /// Rows appended through this writer (header excluded).
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Whether `open` found the file empty and wrote the header.
    pub fn wrote_header(&self) -> bool {
        self.wrote_header
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn write_durably(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
        let file = self.file.as_mut().ok_or(WriteError::Closed)?;
        append_or_roll_back(file, bytes)
    }
}

/// What `append_or_roll_back` needs from the data file.
trait RowSink: Write {
    fn committed_len(&self) -> io::Result<u64>;
    fn sync(&mut self) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl RowSink for File {
    fn committed_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.sync_all()
    }
}

/// Write, flush and sync `bytes`; on any failure cut the sink back to its
/// previous length so only whole rows remain.
fn append_or_roll_back<S: RowSink>(sink: &mut S, bytes: &[u8]) -> Result<(), WriteError> {
    let len = sink
        .committed_len()
        .map_err(|e| WriteError::Io(format!("failed to stat file: {}", e)))?;

    let result = sink
        .write_all(bytes)
        .and_then(|_| sink.flush())
        .map_err(|e| WriteError::Io(e.to_string()))
        .and_then(|_| sink.sync().map_err(|e| WriteError::Sync(e.to_string())));

    if result.is_err() {
        if let Err(e) = sink.truncate(len) {
            log::error!("Failed to roll back partial row to {} bytes: {}", len, e);
        }
    }
    result
}

/// Data file name for a run started at `started_at`: `{prefix}_YYYYMMDD_HHMMSS.csv`.
pub fn data_file_name(prefix: &str, started_at: DateTime<Utc>) -> String {
    format!("{}_{}.csv", prefix, started_at.format("%Y%m%d_%H%M%S"))
}

fn encode_row<T: AsRef<[u8]>>(fields: &[T]) -> Result<Vec<u8>, WriteError> {
    let mut encoder = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    encoder
        .write_record(fields)
        .map_err(|e| WriteError::Serialize(e.to_string()))?;
    encoder
        .into_inner()
        .map_err(|e| WriteError::Serialize(e.to_string()))
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, WriteError> {
    let data = fs::read(path)
        .map_err(|e| WriteError::Io(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
