use std::path::PathBuf;
use std::time::Duration;

/// Configuration for an acquisition loop.
///
/// Loaded once before the loop starts and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfiguration {
    /// Target wall-clock time between successive cycles (default: 5 s).
    pub interval: Duration,

    /// How long the logging-activity indicator stays lit per cycle (default: 1 s).
    /// Counts against `interval`, it does not extend it.
    pub flash_dwell: Duration,

    /// Directory where CSV data files are written.
    pub output_directory: PathBuf,

    /// Data file name prefix; the file is `{prefix}_{YYYYMMDD_HHMMSS}.csv`.
    pub file_prefix: String,
}

impl LoggerConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.interval.is_zero() {
            return Err("sampling interval must be positive".into());
        }
        if self.flash_dwell > self.interval {
            return Err(format!(
                "flash dwell ({:?}) exceeds sampling interval ({:?})",
                self.flash_dwell, self.interval
            ));
        }
        if self.file_prefix.is_empty() {
            return Err("file prefix must not be empty".into());
        }
        if self
            .file_prefix
            .contains(|c: char| c == '/' || c == '\\' || c.is_control())
        {
            return Err(format!("invalid file prefix: {:?}", self.file_prefix));
        }
        Ok(())
    }
}

impl Default for LoggerConfiguration {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            flash_dwell: Duration::from_secs(1),
            output_directory: PathBuf::from("data"),
            file_prefix: "sensor_data".into(),
        }
    }
}
