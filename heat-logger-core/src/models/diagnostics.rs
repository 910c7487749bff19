use serde::{Deserialize, Serialize};

/// Per-run counters for the acquisition loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerDiagnostics {
    pub cycles_completed: u64,
    pub rows_written: u64,
    pub write_failures: u64,
    pub transducer_read_errors: u64,
    pub fix_query_errors: u64,
    pub cycles_without_fix: u64,
}
