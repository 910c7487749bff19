//! # heat-logger-core
//!
//! Platform-agnostic acquisition-and-logging core.
//!
//! Samples a temperature/humidity transducer and a location-fix service on a
//! fixed cadence, assembles one fixed-schema record per cycle, appends it to a
//! durable CSV file and drives three status indicators. Platform backends
//! (Linux I2C, gpsd, sysfs GPIO) implement the collaborator traits and plug
//! into the generic `AcquisitionLoop`.
//!
//! ## Architecture
//!
//! ```text
//! heat-logger-core (this crate)
//! ├── traits/       ← TransducerProber, TransducerDevice, FixService, IndicatorDriver, Clock, AcquisitionDelegate
//! ├── models/       ← InitError, readings, Record, LoggerConfiguration, AcquisitionState, diagnostics
//! ├── processing/   ← record assembly, fix time normalization
//! ├── session/      ← TransducerSession, FixSourceSession, StatusIndicators, AcquisitionLoop
//! └── storage/      ← CsvRecordWriter, session summary sidecar
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience.
pub use models::config::LoggerConfiguration;
pub use models::diagnostics::LoggerDiagnostics;
pub use models::error::{
    FixServiceError, IndicatorError, InitError, ProbeError, SensorFault, WriteError,
};
pub use models::readings::{
    FixFields, FixPacket, FixReading, Measurement, TransducerReading, TransducerVariant,
};
pub use models::record::Record;
pub use models::state::{AcquisitionState, StopReason};
pub use models::summary::SessionSummary;
pub use processing::record_assembler::assemble;
pub use session::acquisition::AcquisitionLoop;
pub use session::fix_source::FixSourceSession;
pub use session::indicators::StatusIndicators;
pub use session::stop_signal::StopSignal;
pub use session::transducer::TransducerSession;
pub use storage::csv_writer::CsvRecordWriter;
pub use traits::clock::{Clock, SystemClock};
pub use traits::delegate::AcquisitionDelegate;
pub use traits::fix_service::FixService;
pub use traits::indicator::{IndicatorDriver, IndicatorLine};
pub use traits::transducer::{TransducerDevice, TransducerProber};
