use crate::models::error::InitError;
use crate::models::readings::{FixFields, FixPacket, FixReading};
use crate::processing::fix_time::normalize_fix_time;
use crate::traits::fix_service::FixService;

/// Owns the connection to the location-fix service.
pub struct FixSourceSession<S: FixService> {
    service: S,
    connected: bool,
}

impl<S: FixService> FixSourceSession<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            connected: false,
        }
    }

    /// Connect once. Any connection failure is fatal: an unreachable service
    /// means misconfiguration, not noise.
    pub fn initialize(&mut self) -> Result<(), InitError> {
        if self.connected {
            return Ok(());
        }
        self.service.connect().map_err(|e| {
            log::error!("Could not connect to the fix service: {}", e);
            InitError::FixServiceUnreachable(e.to_string())
        })?;
        self.connected = true;
        log::info!("Connected to fix service");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Query and classify the most recent fix. Faults become `QueryError`.
    pub fn query_current(&mut self) -> FixReading {
        if !self.connected {
            log::error!("Fix service queried before connecting");
            return FixReading::QueryError;
        }

        match self.service.current() {
            Ok(packet) => classify(packet),
            Err(e) => {
                log::error!("Error getting fix from fix service: {}", e);
                FixReading::QueryError
            }
        }
    }
}

/// Map a raw packet to a reading: mode < 2 is no fix, 2 is 2D, 3 and up is 3D.
pub fn classify(packet: FixPacket) -> FixReading {
    if packet.mode < 2 {
        return FixReading::NoFix;
    }

    let fields = FixFields {
        fix_time: packet.time.as_deref().map(normalize_fix_time),
        latitude: packet.latitude,
        longitude: packet.longitude,
        altitude: packet.altitude,
        ground_speed: packet.ground_speed,
        climb_rate: packet.climb_rate,
        track_deg: packet.track_deg,
        satellite_count: packet.satellite_count,
    };

    if packet.mode == 2 {
        FixReading::Fix2D(fields)
    } else {
        FixReading::Fix3D(fields)
    }
}
