//! Record assembly and row rendering.
//!
//! Missing values are rendered as sentinel tokens, one per cause, so that a
//! consumer can tell "the sensor failed" from "there was no fix" from
//! "the service didn't report this field".

use chrono::{DateTime, Utc};

use super::fix_time::format_system_time;
use crate::models::readings::{FixFields, FixReading, TransducerReading};
use crate::models::record::{Record, COLUMN_COUNT};

/// Optional fix field not supplied for the current fix.
pub const NOT_APPLICABLE: &str = "N/A";
/// Transducer session has no active variant.
pub const UNINITIALIZED: &str = "UNINITIALIZED";
/// Transducer read faulted this cycle.
pub const READ_ERROR: &str = "READ_ERROR";
/// Fix-derived field while the fix mode is below 2D.
pub const NO_FIX: &str = "NO_FIX";
/// Fix query faulted this cycle.
pub const QUERY_ERROR: &str = "QUERY_ERROR";

/// Combine one cycle's readings with the timestamp captured at cycle start.
pub fn assemble(
    system_timestamp: DateTime<Utc>,
    transducer: TransducerReading,
    fix: FixReading,
) -> Record {
    Record {
        system_timestamp_utc: format_system_time(system_timestamp),
        transducer,
        fix,
    }
}

/// Render a record in `CSV_HEADER` column order.
pub fn render_row(record: &Record) -> [String; COLUMN_COUNT] {
    let (temperature, humidity) = match &record.transducer {
        TransducerReading::Ok(m) => (
            format!("{:.2}", m.temperature_c),
            format!("{:.2}", m.humidity_pct),
        ),
        TransducerReading::ReadError => (READ_ERROR.to_string(), READ_ERROR.to_string()),
        TransducerReading::Uninitialized => {
            (UNINITIALIZED.to_string(), UNINITIALIZED.to_string())
        }
    };

    let fix_columns = match &record.fix {
        FixReading::Fix2D(fields) | FixReading::Fix3D(fields) => render_fix_fields(fields),
        FixReading::NoFix => sentinel_fix_columns(NO_FIX),
        FixReading::QueryError => sentinel_fix_columns(QUERY_ERROR),
    };
    let [fix_time, lat, lon, alt, speed, climb, track, sats] = fix_columns;

    [
        record.system_timestamp_utc.clone(),
        temperature,
        humidity,
        fix_time,
        lat,
        lon,
        alt,
        speed,
        climb,
        track,
        sats,
        record.fix.fix_type_label().to_string(),
    ]
}

fn render_fix_fields(fields: &FixFields) -> [String; 8] {
    [
        fields
            .fix_time
            .clone()
            .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
        format!("{:.6}", fields.latitude),
        format!("{:.6}", fields.longitude),
        two_decimals(fields.altitude),
        two_decimals(fields.ground_speed),
        two_decimals(fields.climb_rate),
        two_decimals(fields.track_deg),
        fields
            .satellite_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
    ]
}

fn two_decimals(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

fn sentinel_fix_columns(sentinel: &str) -> [String; 8] {
    std::array::from_fn(|_| sentinel.to_string())
}
