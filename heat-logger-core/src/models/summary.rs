use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diagnostics::LoggerDiagnostics;
use super::readings::TransducerVariant;

/// Summary of one logging run, written as a JSON sidecar at shutdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub data_file: String,
    pub transducer_variant: Option<TransducerVariant>,
    pub started_at: DateTime<Utc>,
    pub stopped_at: DateTime<Utc>,
    /// `interrupted` or the fatal init error message.
    pub stop_reason: String,
    pub diagnostics: LoggerDiagnostics,
    /// SHA-256 of the finished data file, if it could be computed.
    pub checksum: Option<String>,
}

impl SessionSummary {
    pub fn new(
        data_file: &str,
        transducer_variant: Option<TransducerVariant>,
        started_at: DateTime<Utc>,
        stopped_at: DateTime<Utc>,
        stop_reason: String,
        diagnostics: LoggerDiagnostics,
        checksum: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            data_file: data_file.to_string(),
            transducer_variant,
            started_at,
            stopped_at,
            stop_reason,
            diagnostics,
            checksum,
        }
    }
}
