use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use env_logger::{Builder, Env, Target};

use crate::config::CliError;

/// Duplicates every write to two sinks. The first sink's errors win.
pub struct Tee<A, B> {
    primary: A,
    secondary: B,
}

impl<A: Write, B: Write> Tee<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        // stderr going away must not stop the file log
        let _ = self.secondary.write_all(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        let _ = self.secondary.flush();
        Ok(())
    }
}

pub fn operational_log_name(started_at: DateTime<Local>) -> String {
    format!(
        "datalogger_operational_{}.log",
        started_at.format("%Y%m%d_%H%M%S")
    )
}

/// Install the global logger, writing to `log_dir/datalogger_operational_*.log`
/// and stderr. Returns the log file path.
pub fn init(
    log_dir: &Path,
    started_at: DateTime<Local>,
    level: Option<&str>,
) -> Result<PathBuf, CliError> {
    fs::create_dir_all(log_dir)
        .map_err(|e| CliError::Logging(format!("{}: {}", log_dir.display(), e)))?;
    let path = log_dir.join(operational_log_name(started_at));
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| CliError::Logging(format!("{}: {}", path.display(), e)))?;

    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee::new(file, io::stderr()))))
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    Ok(path)
}
