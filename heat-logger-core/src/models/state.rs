use super::error::InitError;

/// Acquisition loop state machine.
///
/// State transitions:
/// ```text
/// starting → sampling → flashing → sleeping ─┐
///    │           ↑                           │
///    │           └───────────────────────────┘
///    ↓                      ↓ (stop requested)
///  stopped ←────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionState {
    Starting,
    Sampling,
    Flashing,
    Sleeping,
    Stopped(StopReason),
}

/// Why the loop entered `Stopped`.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// Operator requested a stop (interrupt).
    Interrupted,
    /// A fault during `Starting`.
    InitFailed(InitError),
}

impl AcquisitionState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Sampling | Self::Flashing | Self::Sleeping)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    pub fn stop_reason(&self) -> Option<&StopReason> {
        match self {
            Self::Stopped(reason) => Some(reason),
            _ => None,
        }
    }
}

impl StopReason {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InitFailed(_))
    }
}
