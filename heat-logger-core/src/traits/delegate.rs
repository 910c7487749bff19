use crate::models::diagnostics::LoggerDiagnostics;
use crate::models::error::WriteError;
use crate::models::record::Record;
use crate::models::state::AcquisitionState;

/// Event delegate for acquisition loop notifications.
///
/// All methods are called synchronously from the loop's thread; keep them short,
/// time spent here counts against the cycle.
pub trait AcquisitionDelegate: Send + Sync {
    /// Called when the loop state changes.
    fn on_state_changed(&self, state: &AcquisitionState);

    /// Called after each cycle's append attempt.
    fn on_record(&self, record: &Record, outcome: Result<(), &WriteError>);

    /// Called once when the loop reaches `Stopped`.
    fn on_stopped(&self, diagnostics: &LoggerDiagnostics);
}
