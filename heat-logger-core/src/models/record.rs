use super::readings::{FixReading, TransducerReading};
use crate::processing::record_assembler;

/// Number of columns in every output row.
pub const COLUMN_COUNT: usize = 12;

/// Fixed CSV schema, in column order.
pub const CSV_HEADER: [&str; COLUMN_COUNT] = [
    "System_Timestamp_UTC",
    "Temperature_C",
    "Humidity_RH",
    "GPS_Timestamp_UTC",
    "Latitude",
    "Longitude",
    "Altitude_m",
    "Speed_mps",
    "Climb_mps",
    "Track_deg",
    "Satellites",
    "GPS_Fix_Type",
];

/// One observation, assembled per cycle and serialized immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// System clock at cycle start, `YYYY-MM-DD HH:MM:SS UTC`.
    pub system_timestamp_utc: String,
    pub transducer: TransducerReading,
    pub fix: FixReading,
}

impl Record {
    /// Render as one CSV row in `CSV_HEADER` order.
    pub fn to_row(&self) -> [String; COLUMN_COUNT] {
        record_assembler::render_row(self)
    }
}
