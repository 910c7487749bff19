use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::models::config::LoggerConfiguration;
use crate::models::diagnostics::LoggerDiagnostics;
use crate::models::error::{InitError, WriteError};
use crate::models::readings::{FixReading, TransducerReading, TransducerVariant};
use crate::models::record::Record;
use crate::models::state::{AcquisitionState, StopReason};
use crate::models::summary::SessionSummary;
use crate::processing::record_assembler::assemble;
use crate::session::fix_source::FixSourceSession;
use crate::session::indicators::StatusIndicators;
use crate::session::stop_signal::StopSignal;
use crate::session::transducer::TransducerSession;
use crate::storage::csv_writer::{data_file_name, CsvRecordWriter};
use crate::storage::summary;
use crate::traits::clock::Clock;
use crate::traits::delegate::AcquisitionDelegate;
use crate::traits::fix_service::FixService;
use crate::traits::indicator::{IndicatorDriver, IndicatorLine};
use crate::traits::transducer::TransducerProber;

/// Fixed-cadence acquisition-and-logging loop.
///
/// Generic over the transducer prober, fix service, indicator driver and
/// clock. Owns every session handle and the output file exclusively; runs on
/// the caller's thread, one cycle at a time.
///
/// ```text
/// ┌──────────────────────── one cycle (config.interval) ────────────────────────┐
/// [Sampling: now() → transducer.read() → fix.query_current() → assemble → append]
///                                         [Flashing: LED on, dwell, LED off]
///                                                         [Sleeping: interval − elapsed]
/// ```
///
/// A stop request is observed at the top of each cycle and wakes any sleep
/// early; in-flight peripheral calls are never aborted.
pub struct AcquisitionLoop<P: TransducerProber, F: FixService, D: IndicatorDriver, C: Clock> {
    transducer: TransducerSession<P>,
    fix_source: FixSourceSession<F>,
    indicators: StatusIndicators<D>,
    clock: C,
    config: LoggerConfiguration,
    writer: Option<CsvRecordWriter>,
    state: AcquisitionState,
    diagnostics: LoggerDiagnostics,
    delegate: Option<Arc<dyn AcquisitionDelegate>>,
    stop: StopSignal,
    started_at: Option<DateTime<Utc>>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl<P, F, D, C> AcquisitionLoop<P, F, D, C>
where
    P: TransducerProber,
    F: FixService,
    D: IndicatorDriver,
    C: Clock,
{
    pub fn new(
        prober: P,
        fix_service: F,
        indicator_driver: D,
        clock: C,
        config: LoggerConfiguration,
    ) -> Self {
        Self {
            transducer: TransducerSession::new(prober),
            fix_source: FixSourceSession::new(fix_service),
            indicators: StatusIndicators::new(indicator_driver),
            clock,
            config,
            writer: None,
            state: AcquisitionState::Starting,
            diagnostics: LoggerDiagnostics::default(),
            delegate: None,
            stop: StopSignal::new(),
            started_at: None,
            last_timestamp: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn AcquisitionDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Handle for requesting a stop from another thread (e.g. a signal handler).
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    pub fn diagnostics(&self) -> &LoggerDiagnostics {
        &self.diagnostics
    }

    pub fn transducer_variant(&self) -> Option<TransducerVariant> {
        self.transducer.variant()
    }

    pub fn indicators(&self) -> &StatusIndicators<D> {
        &self.indicators
    }

    /// Hand back the indicator driver for platform cleanup after `Stopped`.
    pub fn into_indicator_driver(self) -> D {
        self.indicators.into_driver()
    }

    /// Path of this run's data file, once opened.
    pub fn data_file(&self) -> Option<&Path> {
        self.writer.as_ref().map(|w| w.file_path())
    }

    /// Start, cycle until a stop is requested, then stop.
    ///
    /// Only `Starting` faults are returned; sampling and write faults are
    /// absorbed into the record stream and the diagnostics.
    pub fn run(&mut self) -> Result<LoggerDiagnostics, InitError> {
        self.start()?;

        while !self.stop.is_stop_requested() {
            self.run_cycle();
        }

        log::info!("Data logging stopped by user");
        self.stop();
        Ok(self.diagnostics.clone())
    }

    /// `Starting`: indicators off, transducer, fix source, then the output file.
    ///
    /// Any failure moves straight to `Stopped` with all indicators off.
    pub fn start(&mut self) -> Result<(), InitError> {
        if !matches!(self.state, AcquisitionState::Starting) {
            return Err(InitError::Configuration(
                "can only start from starting state".into(),
            ));
        }
        self.notify_state();

        match self.initialize() {
            Ok(()) => {
                self.set_state(AcquisitionState::Sampling);
                Ok(())
            }
            Err(e) => {
                log::error!("A critical error occurred, stopping the datalogger: {}", e);
                self.enter_stopped(StopReason::InitFailed(e.clone()));
                Err(e)
            }
        }
    }

    /// One `Sampling → Flashing → Sleeping` cycle.
    pub fn run_cycle(&mut self) {
        if !self.state.is_running() {
            log::warn!("run_cycle called in {:?} state, ignoring", self.state);
            return;
        }

        let cycle_start = self.clock.monotonic();
        self.set_state(AcquisitionState::Sampling);

        // Captured before either read so read latency does not skew it.
        let timestamp = self.cycle_timestamp();
        let transducer = self.transducer.read();
        let fix = self.fix_source.query_current();
        self.count_reading(&transducer, &fix);

        let record = assemble(timestamp, transducer, fix);
        let outcome = self.append(&record);
        self.indicators
            .set(IndicatorLine::FixPresence, record.fix.has_fix());

        if let Some(ref delegate) = self.delegate {
            delegate.on_record(&record, outcome.as_ref().map(|_| ()));
        }

        // The pulse marks a completed cycle, not a successful write.
        self.set_state(AcquisitionState::Flashing);
        self.flash();

        self.set_state(AcquisitionState::Sleeping);
        let elapsed = self.clock.monotonic().saturating_sub(cycle_start);
        let remaining = self.config.interval.saturating_sub(elapsed);
        self.clock.sleep(remaining, &self.stop);

        self.diagnostics.cycles_completed += 1;
    }

    /// Enter `Stopped` after an operator stop. Idempotent.
    pub fn stop(&mut self) {
        self.enter_stopped(StopReason::Interrupted);
    }

    // --- Internal helpers ---

    fn initialize(&mut self) -> Result<(), InitError> {
        self.config.validate().map_err(InitError::Configuration)?;

        self.indicators.initialize()?;

        let variant = self.transducer.initialize()?;
        log::info!("Active transducer: {}", variant);
        self.indicators.set(IndicatorLine::TransducerHealth, true);

        self.fix_source.initialize()?;

        let started_at = self.clock.now();
        let path = self
            .config
            .output_directory
            .join(data_file_name(&self.config.file_prefix, started_at));
        let writer = CsvRecordWriter::open(path).map_err(|e| InitError::Storage(e.to_string()))?;
        log::info!("Data will be logged to {}", writer.file_path().display());
        log::info!("Logging interval: {:?}", self.config.interval);

        self.writer = Some(writer);
        self.started_at = Some(started_at);
        Ok(())
    }

    /// System time for this cycle, never earlier than the previous cycle's.
    fn cycle_timestamp(&mut self) -> DateTime<Utc> {
        let now = self.clock.now();
        let timestamp = match self.last_timestamp {
            Some(last) if now < last => {
                log::warn!(
                    "System clock stepped back by {}; reusing previous timestamp",
                    last - now
                );
                last
            }
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }

    fn count_reading(&mut self, transducer: &TransducerReading, fix: &FixReading) {
        if matches!(transducer, TransducerReading::ReadError) {
            self.diagnostics.transducer_read_errors += 1;
        }
        match fix {
            FixReading::Fix2D(fields) | FixReading::Fix3D(fields) => {
                log::info!(
                    "GPS Fix: {}, Lat: {:.6}, Lon: {:.6}",
                    fix.fix_type_label(),
                    fields.latitude,
                    fields.longitude
                );
            }
            FixReading::NoFix => {
                self.diagnostics.cycles_without_fix += 1;
                log::warn!("Waiting for GPS fix or no GPS data available...");
            }
            FixReading::QueryError => {
                self.diagnostics.cycles_without_fix += 1;
                self.diagnostics.fix_query_errors += 1;
            }
        }
    }

    fn append(&mut self, record: &Record) -> Result<(), WriteError> {
        let result = match self.writer.as_mut() {
            Some(writer) => writer.append(record),
            None => Err(WriteError::Closed),
        };

        match &result {
            Ok(()) => {
                self.diagnostics.rows_written += 1;
                let row = record.to_row();
                log::info!(
                    "Data logged to CSV: T={}C, H={}%, GPS_TS={}",
                    row[1],
                    row[2],
                    row[3]
                );
            }
            Err(e) => {
                self.diagnostics.write_failures += 1;
                log::error!("Error writing data row to CSV file: {}", e);
            }
        }
        result
    }

    fn flash(&mut self) {
        self.indicators.set(IndicatorLine::LoggingActivity, true);
        self.clock.sleep(self.config.flash_dwell, &self.stop);
        self.indicators.set(IndicatorLine::LoggingActivity, false);
    }

    fn enter_stopped(&mut self, reason: StopReason) {
        if self.state.is_terminal() {
            return;
        }

        self.indicators.all_off();

        let checksum = match self.writer.as_mut() {
            Some(writer) if writer.is_open() => match writer.close() {
                Ok(checksum) => Some(checksum),
                Err(e) => {
                    log::error!("Failed to finalize data file: {}", e);
                    None
                }
            },
            _ => None,
        };
        self.write_summary(&reason, checksum);

        self.set_state(AcquisitionState::Stopped(reason));
        if let Some(ref delegate) = self.delegate {
            delegate.on_stopped(&self.diagnostics);
        }
        log::info!("Datalogger finished. Indicators cleaned up.");
    }

    fn write_summary(&self, reason: &StopReason, checksum: Option<String>) {
        let (Some(writer), Some(started_at)) = (self.writer.as_ref(), self.started_at) else {
            return;
        };

        let stop_reason = match reason {
            StopReason::Interrupted => "interrupted".to_string(),
            StopReason::InitFailed(e) => e.to_string(),
        };
        let summary = SessionSummary::new(
            &writer.file_path().to_string_lossy(),
            self.transducer.variant(),
            started_at,
            self.clock.now(),
            stop_reason,
            self.diagnostics.clone(),
            checksum,
        );

        match summary::write_summary(&summary, writer.file_path()) {
            Ok(path) => log::info!("Session summary written to {}", path.display()),
            Err(e) => log::error!("Failed to write session summary: {}", e),
        }
    }

    fn set_state(&mut self, new_state: AcquisitionState) {
        if self.state == new_state {
            return;
        }
        self.state = new_state;
        self.notify_state();
    }

    fn notify_state(&self) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    use chrono::NaiveDateTime;

    use crate::models::error::FixServiceError;
    use crate::models::readings::{FixPacket, Measurement};
    use crate::processing::record_assembler::{NO_FIX, READ_ERROR};
    use crate::storage::summary::read_summary;
    use crate::testing::{
        FixScript, IndicatorLog, ManualClock, ProbeScript, ProberLog, RecordingDelegate,
        RecordingIndicators, ScriptedFixService, ScriptedProber,
    };

    type TestLoop = AcquisitionLoop<ScriptedProber, ScriptedFixService, RecordingIndicators, ManualClock>;

    struct Harness {
        acquisition: TestLoop,
        prober: ProberLog,
        fix: FixScript,
        indicators: IndicatorLog,
        clock: ManualClock,
        _dir: tempfile::TempDir,
    }

    fn harness_with(prober: ScriptedProber, service: ScriptedFixService) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggerConfiguration {
            output_directory: dir.path().join("data"),
            ..Default::default()
        };
        let prober_log = prober.log();
        let fix = service.script();
        let indicators = RecordingIndicators::new();
        let indicator_log = indicators.log();
        let clock = ManualClock::new();

        let acquisition = AcquisitionLoop::new(prober, service, indicators, clock.clone(), config);
        Harness {
            acquisition,
            prober: prober_log,
            fix,
            indicators: indicator_log,
            clock,
            _dir: dir,
        }
    }

    fn harness() -> Harness {
        harness_with(
            ScriptedProber::new(ProbeScript::Found, ProbeScript::Found),
            ScriptedFixService::new(),
        )
    }

    fn fix_packet(mode: i32) -> FixPacket {
        FixPacket {
            mode,
            time: Some("2025-06-22T14:00:00.000Z".into()),
            latitude: 34.123456,
            longitude: -81.234567,
            altitude: Some(120.4),
            ground_speed: Some(1.0),
            climb_rate: Some(0.0),
            track_deg: Some(90.0),
            satellite_count: Some(8),
        }
    }

    fn data_rows(acquisition: &TestLoop) -> Vec<csv::StringRecord> {
        let path = acquisition.data_file().unwrap();
        csv::Reader::from_path(path)
            .unwrap()
            .records()
            .map(|r| r.unwrap())
            .collect()
    }

    fn parse_ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S UTC").unwrap()
    }

    #[test]
    fn start_initializes_in_order() {
        let mut h = harness();
        let delegate = RecordingDelegate::new();
        h.acquisition.set_delegate(delegate.clone());

        h.acquisition.start().unwrap();

        assert_eq!(
            h.indicators.events(),
            vec![
                (IndicatorLine::TransducerHealth, false),
                (IndicatorLine::FixPresence, false),
                (IndicatorLine::LoggingActivity, false),
                (IndicatorLine::TransducerHealth, true),
            ]
        );
        assert_eq!(h.acquisition.transducer_variant(), Some(TransducerVariant::Sht4x));
        assert_eq!(
            *delegate.states.lock(),
            vec![AcquisitionState::Starting, AcquisitionState::Sampling]
        );

        let file_name = h.acquisition.data_file().unwrap().file_name().unwrap();
        assert_eq!(file_name, "sensor_data_20250622_140000.csv");
        // header only so far
        assert!(data_rows(&h.acquisition).is_empty());
    }

    #[test]
    fn missing_transducer_is_fatal() {
        let mut h = harness_with(
            ScriptedProber::new(ProbeScript::NotFound, ProbeScript::NotFound),
            ScriptedFixService::new(),
        );

        let err = h.acquisition.start().unwrap_err();

        assert!(matches!(err, InitError::TransducerNotFound { .. }));
        assert_eq!(
            h.acquisition.state(),
            &AcquisitionState::Stopped(StopReason::InitFailed(err))
        );
        assert!(h.acquisition.data_file().is_none());
        for line in IndicatorLine::ALL {
            assert!(!h.indicators.level(line));
        }
    }

    #[test]
    fn unreachable_fix_service_is_fatal_and_clears_indicators() {
        let mut h = harness_with(
            ScriptedProber::new(ProbeScript::Found, ProbeScript::Found),
            ScriptedFixService::refusing(),
        );

        let result = h.acquisition.run();

        assert!(matches!(result, Err(InitError::FixServiceUnreachable(_))));
        // transducer health was lit, then forced off on stop
        assert!(h
            .indicators
            .events()
            .contains(&(IndicatorLine::TransducerHealth, true)));
        assert!(!h.indicators.level(IndicatorLine::TransducerHealth));
        assert!(h.acquisition.state().stop_reason().unwrap().is_fatal());
    }

    #[test]
    fn unwritable_output_directory_is_fatal() {
        let mut h = harness();
        let blocker = h._dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        h.acquisition.config.output_directory = blocker.join("data");

        assert!(matches!(h.acquisition.start(), Err(InitError::Storage(_))));
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut h = harness();
        h.acquisition.start().unwrap();
        assert!(matches!(
            h.acquisition.start(),
            Err(InitError::Configuration(_))
        ));
    }

    #[test]
    fn one_row_per_cycle() {
        let mut h = harness();
        let delegate = RecordingDelegate::stopping_after(3, h.acquisition.stop_signal());
        h.acquisition.set_delegate(delegate.clone());

        let diagnostics = h.acquisition.run().unwrap();

        assert_eq!(diagnostics.cycles_completed, 3);
        assert_eq!(diagnostics.rows_written, 3);
        assert_eq!(data_rows(&h.acquisition).len(), 3);
        assert_eq!(
            h.acquisition.state(),
            &AcquisitionState::Stopped(StopReason::Interrupted)
        );
        assert_eq!(delegate.stopped.lock().as_ref(), Some(&diagnostics));

        let path = h.acquisition.data_file().unwrap();
        let summary = read_summary(path).unwrap();
        assert_eq!(summary.diagnostics.rows_written, 3);
        assert_eq!(summary.stop_reason, "interrupted");
        assert_eq!(summary.transducer_variant, Some(TransducerVariant::Sht4x));
        assert_eq!(summary.checksum.map(|c| c.len()), Some(64));
    }

    #[test]
    fn states_cycle_through_flashing_and_sleeping() {
        let mut h = harness();
        let delegate = RecordingDelegate::stopping_after(1, h.acquisition.stop_signal());
        h.acquisition.set_delegate(delegate.clone());

        h.acquisition.run().unwrap();

        assert_eq!(
            *delegate.states.lock(),
            vec![
                AcquisitionState::Starting,
                AcquisitionState::Sampling,
                AcquisitionState::Flashing,
                AcquisitionState::Sleeping,
                AcquisitionState::Stopped(StopReason::Interrupted),
            ]
        );
    }

    #[test]
    fn fix_presence_follows_each_cycle() {
        let mut h = harness();
        h.fix.push(Ok(fix_packet(3)));
        h.fix.push(Ok(fix_packet(0)));
        h.acquisition.start().unwrap();

        h.acquisition.run_cycle();
        assert!(h.acquisition.indicators().level(IndicatorLine::FixPresence));

        h.acquisition.run_cycle();
        assert!(!h.acquisition.indicators().level(IndicatorLine::FixPresence));

        let rows = data_rows(&h.acquisition);
        assert_eq!(&rows[0][4], "34.123456");
        assert_eq!(&rows[0][5], "-81.234567");
        assert_eq!(&rows[0][6], "120.40");
        assert_eq!(&rows[0][11], "3D");
        assert_eq!(&rows[1][4], NO_FIX);
        assert_eq!(&rows[1][11], "No Fix");
        assert_eq!(h.acquisition.diagnostics().cycles_without_fix, 1);
    }

    #[test]
    fn read_and_query_faults_do_not_stop_the_loop() {
        let mut h = harness();
        h.prober.push_measurement(Err("i2c nack".into()));
        h.fix.push(Err(FixServiceError::NoPacket));
        h.prober.push_measurement(Ok(Measurement {
            temperature_c: 30.0,
            humidity_pct: 20.0,
        }));
        h.acquisition.start().unwrap();

        h.acquisition.run_cycle();
        h.acquisition.run_cycle();

        let rows = data_rows(&h.acquisition);
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], READ_ERROR);
        assert_eq!(&rows[0][2], READ_ERROR);
        assert_eq!(&rows[1][1], "30.00");

        let d = h.acquisition.diagnostics();
        assert_eq!(d.transducer_read_errors, 1);
        assert_eq!(d.fix_query_errors, 1);
        assert!(h.acquisition.state().is_running());
    }

    #[test]
    fn write_failure_drops_record_but_still_flashes() {
        let mut h = harness();
        let delegate = RecordingDelegate::new();
        h.acquisition.set_delegate(delegate.clone());
        h.acquisition.start().unwrap();
        h.acquisition.writer.as_mut().unwrap().close().unwrap();

        h.acquisition.run_cycle();
        h.acquisition.run_cycle();

        let d = h.acquisition.diagnostics();
        assert_eq!(d.write_failures, 2);
        assert_eq!(d.rows_written, 0);
        assert_eq!(d.cycles_completed, 2);
        let pulses = h
            .indicators
            .events()
            .iter()
            .filter(|e| **e == (IndicatorLine::LoggingActivity, true))
            .count();
        assert_eq!(pulses, 2);
        assert!(delegate.rows.lock().iter().all(|(_, ok)| !ok));
    }

    #[test]
    fn cadence_compensates_for_dwell() {
        let mut h = harness();
        h.acquisition.start().unwrap();

        for _ in 0..3 {
            h.acquisition.run_cycle();
        }

        // dwell, then interval − dwell
        assert_eq!(
            h.clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(4)].repeat(3)
        );
        let rows = data_rows(&h.acquisition);
        for pair in rows.windows(2) {
            let gap = parse_ts(&pair[1][0]) - parse_ts(&pair[0][0]);
            assert!(gap >= chrono::Duration::seconds(4));
            assert_eq!(gap, chrono::Duration::seconds(5));
        }
    }

    #[test]
    fn cadence_holds_under_bounded_read_latency() {
        let mut h = harness();
        h.prober.set_latency(&h.clock, Duration::from_millis(1500));
        h.acquisition.start().unwrap();

        for _ in 0..3 {
            h.acquisition.run_cycle();
        }

        let rows = data_rows(&h.acquisition);
        for pair in rows.windows(2) {
            let gap = parse_ts(&pair[1][0]) - parse_ts(&pair[0][0]);
            assert_eq!(gap, chrono::Duration::seconds(5));
        }
    }

    #[test]
    fn row_is_stamped_before_the_transducer_read() {
        let mut h = harness();
        h.prober.set_latency(&h.clock, Duration::from_millis(1500));
        h.acquisition.start().unwrap();

        let cycle_start = h.clock.now();
        h.acquisition.run_cycle();

        assert!(h.clock.now() - cycle_start >= chrono::Duration::milliseconds(1500));
        let rows = data_rows(&h.acquisition);
        assert_eq!(
            &rows[0][0],
            cycle_start.format("%Y-%m-%d %H:%M:%S UTC").to_string()
        );
    }

    #[test]
    fn slow_read_elongates_cycle_without_negative_sleep() {
        let mut h = harness();
        h.prober.set_latency(&h.clock, Duration::from_secs(7));
        h.acquisition.start().unwrap();

        h.acquisition.run_cycle();

        assert_eq!(
            h.clock.sleeps(),
            vec![Duration::from_secs(1), Duration::ZERO]
        );
    }

    #[test]
    fn timestamps_never_go_backwards() {
        let mut h = harness();
        h.acquisition.start().unwrap();

        h.acquisition.run_cycle();
        h.clock.step_wall(chrono::Duration::seconds(-60));
        h.acquisition.run_cycle();

        let rows = data_rows(&h.acquisition);
        assert!(parse_ts(&rows[1][0]) >= parse_ts(&rows[0][0]));
    }

    #[test]
    fn stop_before_first_cycle_writes_header_only() {
        let mut h = harness();
        h.acquisition.stop_signal().request_stop();

        let diagnostics = h.acquisition.run().unwrap();

        assert_eq!(diagnostics.cycles_completed, 0);
        assert!(data_rows(&h.acquisition).is_empty());
        for line in IndicatorLine::ALL {
            assert!(!h.indicators.level(line));
        }
    }

    #[test]
    fn stop_forces_indicators_off() {
        let mut h = harness();
        h.fix.push(Ok(fix_packet(2)));
        h.acquisition.start().unwrap();
        h.acquisition.run_cycle();
        assert!(h.indicators.level(IndicatorLine::FixPresence));

        h.acquisition.stop();
        h.acquisition.stop();

        for line in IndicatorLine::ALL {
            assert!(!h.indicators.level(line));
        }
        assert!(h.acquisition.state().is_terminal());
        // no further cycles once stopped
        h.acquisition.run_cycle();
        assert_eq!(h.acquisition.diagnostics().cycles_completed, 1);
    }
}
