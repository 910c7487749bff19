//! Scripted collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use crate::models::diagnostics::LoggerDiagnostics;
use crate::models::error::{FixServiceError, IndicatorError, ProbeError, SensorFault, WriteError};
use crate::models::readings::{FixPacket, Measurement, TransducerVariant};
use crate::models::record::Record;
use crate::models::state::AcquisitionState;
use crate::session::stop_signal::StopSignal;
use crate::traits::clock::Clock;
use crate::traits::delegate::AcquisitionDelegate;
use crate::traits::fix_service::FixService;
use crate::traits::indicator::{IndicatorDriver, IndicatorLine};
use crate::traits::transducer::{TransducerDevice, TransducerProber};

// --- Clock ---

#[derive(Debug)]
struct ClockState {
    base: DateTime<Utc>,
    monotonic: Duration,
    wall_offset: chrono::Duration,
    sleeps: Vec<Duration>,
}

/// Virtual clock: time only moves on `sleep` and `advance`.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ClockState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ClockState {
                base: Utc.with_ymd_and_hms(2025, 6, 22, 14, 0, 0).unwrap(),
                monotonic: Duration::ZERO,
                wall_offset: chrono::Duration::zero(),
                sleeps: Vec::new(),
            })),
        }
    }

    /// Simulate time spent blocked in a peripheral call.
    pub fn advance(&self, by: Duration) {
        self.state.lock().monotonic += by;
    }

    /// Step the wall clock without touching monotonic time (NTP correction).
    pub fn step_wall(&self, by: chrono::Duration) {
        self.state.lock().wall_offset += by;
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().sleeps.clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let s = self.state.lock();
        s.base + chrono::Duration::from_std(s.monotonic).unwrap() + s.wall_offset
    }

    fn monotonic(&self) -> Duration {
        self.state.lock().monotonic
    }

    fn sleep(&self, duration: Duration, stop: &StopSignal) -> bool {
        if stop.is_stop_requested() {
            return true;
        }
        let mut s = self.state.lock();
        s.monotonic += duration;
        s.sleeps.push(duration);
        false
    }
}

// --- Transducer ---

#[derive(Debug, Clone, PartialEq)]
pub enum ProbeScript {
    Found,
    NotFound,
    BusError(String),
}

#[derive(Default)]
struct ProberState {
    probed: Vec<TransducerVariant>,
    measured_by: Vec<TransducerVariant>,
    measurements: VecDeque<Result<Measurement, String>>,
    latency: Option<(ManualClock, Duration)>,
}

/// Shared view into a `ScriptedProber` and the devices it hands out.
#[derive(Clone, Default)]
pub struct ProberLog {
    state: Arc<Mutex<ProberState>>,
}

impl ProberLog {
    pub fn probed(&self) -> Vec<TransducerVariant> {
        self.state.lock().probed.clone()
    }

    pub fn measured_by(&self) -> Vec<TransducerVariant> {
        self.state.lock().measured_by.clone()
    }

    /// Queue the outcome of the next `measure`. When the queue is empty,
    /// devices report 20.00 °C / 50.00 %.
    pub fn push_measurement(&self, outcome: Result<Measurement, String>) {
        self.state.lock().measurements.push_back(outcome);
    }

    /// Every `measure` advances `clock` by `latency`.
    pub fn set_latency(&self, clock: &ManualClock, latency: Duration) {
        self.state.lock().latency = Some((clock.clone(), latency));
    }
}

pub struct ScriptedProber {
    sht4x: ProbeScript,
    sht3x: ProbeScript,
    log: ProberLog,
}

impl ScriptedProber {
    pub fn new(sht4x: ProbeScript, sht3x: ProbeScript) -> Self {
        Self {
            sht4x,
            sht3x,
            log: ProberLog::default(),
        }
    }

    pub fn log(&self) -> ProberLog {
        self.log.clone()
    }
}

impl TransducerProber for ScriptedProber {
    type Device = ScriptedDevice;

    fn probe(&mut self, variant: TransducerVariant) -> Result<ScriptedDevice, ProbeError> {
        self.log.state.lock().probed.push(variant);
        let script = match variant {
            TransducerVariant::Sht4x => &self.sht4x,
            TransducerVariant::Sht3x => &self.sht3x,
        };
        match script {
            ProbeScript::Found => Ok(ScriptedDevice {
                variant,
                log: self.log.clone(),
            }),
            ProbeScript::NotFound => Err(ProbeError::NotFound),
            ProbeScript::BusError(reason) => Err(ProbeError::Bus(reason.clone())),
        }
    }
}

pub struct ScriptedDevice {
    variant: TransducerVariant,
    log: ProberLog,
}

impl TransducerDevice for ScriptedDevice {
    fn variant(&self) -> TransducerVariant {
        self.variant
    }

    fn measure(&mut self) -> Result<Measurement, SensorFault> {
        let mut s = self.log.state.lock();
        s.measured_by.push(self.variant);
        if let Some((clock, latency)) = &s.latency {
            clock.advance(*latency);
        }
        match s.measurements.pop_front() {
            Some(Ok(m)) => Ok(m),
            Some(Err(reason)) => Err(SensorFault(reason)),
            None => Ok(Measurement {
                temperature_c: 20.0,
                humidity_pct: 50.0,
            }),
        }
    }
}

// --- Fix service ---

/// Queue of `current()` outcomes. When empty, reports mode 0.
#[derive(Clone, Default)]
pub struct FixScript {
    queue: Arc<Mutex<VecDeque<Result<FixPacket, FixServiceError>>>>,
}

impl FixScript {
    pub fn push(&self, outcome: Result<FixPacket, FixServiceError>) {
        self.queue.lock().push_back(outcome);
    }
}

pub struct ScriptedFixService {
    refuse: bool,
    script: FixScript,
}

impl ScriptedFixService {
    pub fn new() -> Self {
        Self {
            refuse: false,
            script: FixScript::default(),
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            script: FixScript::default(),
        }
    }

    pub fn script(&self) -> FixScript {
        self.script.clone()
    }
}

impl FixService for ScriptedFixService {
    fn connect(&mut self) -> Result<(), FixServiceError> {
        if self.refuse {
            Err(FixServiceError::ConnectionRefused("127.0.0.1:2947".into()))
        } else {
            Ok(())
        }
    }

    fn current(&mut self) -> Result<FixPacket, FixServiceError> {
        self.script
            .queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(FixPacket::default()))
    }
}

// --- Indicators ---

#[derive(Default)]
struct IndicatorState {
    events: Vec<(IndicatorLine, bool)>,
    failing: bool,
}

#[derive(Clone, Default)]
pub struct IndicatorLog {
    state: Arc<Mutex<IndicatorState>>,
}

impl IndicatorLog {
    pub fn events(&self) -> Vec<(IndicatorLine, bool)> {
        self.state.lock().events.clone()
    }

    /// Levels per line as last written, `false` if never written.
    pub fn level(&self, line: IndicatorLine) -> bool {
        self.state
            .lock()
            .events
            .iter()
            .rev()
            .find(|(l, _)| *l == line)
            .map(|(_, on)| *on)
            .unwrap_or(false)
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }
}

pub struct RecordingIndicators {
    log: IndicatorLog,
}

impl RecordingIndicators {
    pub fn new() -> Self {
        Self {
            log: IndicatorLog::default(),
        }
    }

    pub fn log(&self) -> IndicatorLog {
        self.log.clone()
    }
}

impl IndicatorDriver for RecordingIndicators {
    fn set(&mut self, line: IndicatorLine, on: bool) -> Result<(), IndicatorError> {
        let mut s = self.log.state.lock();
        if s.failing {
            return Err(IndicatorError(format!("{} unavailable", line)));
        }
        s.events.push((line, on));
        Ok(())
    }
}

// --- Delegate ---

/// Records every callback; optionally raises `stop` after `stop_after` records.
pub struct RecordingDelegate {
    pub states: Mutex<Vec<AcquisitionState>>,
    pub rows: Mutex<Vec<(Record, bool)>>,
    pub stopped: Mutex<Option<LoggerDiagnostics>>,
    stop_after: Option<(usize, StopSignal)>,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            states: Mutex::new(Vec::new()),
            rows: Mutex::new(Vec::new()),
            stopped: Mutex::new(None),
            stop_after: None,
        })
    }

    pub fn stopping_after(records: usize, stop: StopSignal) -> Arc<Self> {
        Arc::new(Self {
            states: Mutex::new(Vec::new()),
            rows: Mutex::new(Vec::new()),
            stopped: Mutex::new(None),
            stop_after: Some((records, stop)),
        })
    }
}

impl AcquisitionDelegate for RecordingDelegate {
    fn on_state_changed(&self, state: &AcquisitionState) {
        self.states.lock().push(state.clone());
    }

    fn on_record(&self, record: &Record, outcome: Result<(), &WriteError>) {
        let mut rows = self.rows.lock();
        rows.push((record.clone(), outcome.is_ok()));
        if let Some((limit, stop)) = &self.stop_after {
            if rows.len() >= *limit {
                stop.request_stop();
            }
        }
    }

    fn on_stopped(&self, diagnostics: &LoggerDiagnostics) {
        *self.stopped.lock() = Some(diagnostics.clone());
    }
}
