use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical temperature/humidity sensor model selected at startup.
///
/// Probed in declaration order; the first one that answers stays active
/// for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransducerVariant {
    /// Sensirion SHT4x (e.g. SHT45). Probed first.
    Sht4x,
    /// Sensirion SHT3x (e.g. SHT30/SHT31). Fallback.
    Sht3x,
}

impl TransducerVariant {
    /// Probe order used by `TransducerSession::initialize`.
    pub const PROBE_ORDER: [TransducerVariant; 2] = [Self::Sht4x, Self::Sht3x];
}

impl fmt::Display for TransducerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sht4x => f.write_str("SHT4x"),
            Self::Sht3x => f.write_str("SHT3x"),
        }
    }
}

/// One successful temperature/humidity measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

/// Transducer outcome for a single cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransducerReading {
    Uninitialized,
    Ok(Measurement),
    ReadError,
}

/// Raw "most recent fix" report as delivered by a fix service.
///
/// Position fields are only meaningful when `mode >= 2`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixPacket {
    pub mode: i32,
    pub time: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub ground_speed: Option<f64>,
    pub climb_rate: Option<f64>,
    pub track_deg: Option<f64>,
    pub satellite_count: Option<u32>,
}

/// Position solution fields. Optional fields are `None` when the service
/// did not report them for this fix.
#[derive(Debug, Clone, PartialEq)]
pub struct FixFields {
    /// Normalized to `YYYY-MM-DD HH:MM:SS UTC` when parseable, raw otherwise.
    pub fix_time: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub ground_speed: Option<f64>,
    pub climb_rate: Option<f64>,
    pub track_deg: Option<f64>,
    pub satellite_count: Option<u32>,
}

/// Fix outcome for a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum FixReading {
    NoFix,
    Fix2D(FixFields),
    Fix3D(FixFields),
    QueryError,
}

impl FixReading {
    /// Whether this reading carries a 2D or 3D position.
    pub fn has_fix(&self) -> bool {
        matches!(self, Self::Fix2D(_) | Self::Fix3D(_))
    }

    pub fn fields(&self) -> Option<&FixFields> {
        match self {
            Self::Fix2D(fields) | Self::Fix3D(fields) => Some(fields),
            Self::NoFix | Self::QueryError => None,
        }
    }

    /// Value of the `GPS_Fix_Type` column.
    pub fn fix_type_label(&self) -> &'static str {
        match self {
            Self::Fix2D(_) => "2D",
            Self::Fix3D(_) => "3D",
            Self::NoFix | Self::QueryError => "No Fix",
        }
    }
}
