//! Minimal gpsd JSON client.
//!
//! Speaks the gpsd line protocol over TCP: one `?WATCH` to enable the
//! watcher without streaming, then one `?POLL;` per query. Only the first
//! TPV and SKY entries of each POLL reply are used.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::Deserialize;

use heat_logger_core::models::error::FixServiceError;
use heat_logger_core::models::readings::FixPacket;
use heat_logger_core::traits::fix_service::FixService;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 2947;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Watcher on, no unsolicited TPV stream.
const WATCH_COMMAND: &str = "?WATCH={\"enable\":true};\n";
const POLL_COMMAND: &str = "?POLL;\n";
/// Non-POLL lines tolerated before giving up on a reply.
const MAX_SKIPPED_LINES: usize = 32;

#[derive(Debug, Deserialize)]
struct Envelope {
    class: String,
}

#[derive(Debug, Default, Deserialize)]
struct PollReply {
    #[serde(default)]
    tpv: Vec<Tpv>,
    #[serde(default)]
    sky: Vec<Sky>,
}

#[derive(Debug, Default, Deserialize)]
struct Tpv {
    #[serde(default)]
    mode: i32,
    time: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(rename = "altMSL")]
    alt_msl: Option<f64>,
    alt: Option<f64>,
    speed: Option<f64>,
    climb: Option<f64>,
    track: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Sky {
    #[serde(default)]
    satellites: Option<Vec<serde_json::Value>>,
    #[serde(rename = "nSat")]
    n_sat: Option<u32>,
}

/// gpsd client over a blocking TCP socket with read and write timeouts.
///
/// A query that times out or hits a closed socket is reported as an error
/// and drops the connection, so a late reply can never be taken as the
/// answer to a later poll. The next query reconnects.
#[derive(Debug)]
pub struct GpsdClient {
    host: String,
    port: u16,
    timeout: Duration,
    stream: Option<TcpStream>,
    reader: Option<BufReader<TcpStream>>,
    reconnect: bool,
}

impl GpsdClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_TIMEOUT,
            stream: None,
            reader: None,
            reconnect: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn resolve(&self) -> Result<SocketAddr, FixServiceError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| FixServiceError::Io(format!("invalid gpsd endpoint {}: {}", self.endpoint(), e)))?
            .next()
            .ok_or_else(|| FixServiceError::Io(format!("{} did not resolve", self.endpoint())))
    }

    fn send(&mut self, command: &str) -> Result<(), FixServiceError> {
        let stream = self.stream.as_mut().ok_or(FixServiceError::NotConnected)?;
        stream
            .write_all(command.as_bytes())
            .and_then(|_| stream.flush())
            .map_err(map_io)
    }

    fn read_line(&mut self) -> Result<String, FixServiceError> {
        let reader = self.reader.as_mut().ok_or(FixServiceError::NotConnected)?;
        let mut line = String::new();
        if reader.read_line(&mut line).map_err(map_io)? == 0 {
            return Err(FixServiceError::Io("connection closed by gpsd".into()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }

    fn disconnect(&mut self) {
        self.stream = None;
        self.reader = None;
    }

    /// Read lines until a POLL reply, skipping VERSION/DEVICES/WATCH chatter.
    fn read_poll(&mut self) -> Result<PollReply, FixServiceError> {
        for _ in 0..MAX_SKIPPED_LINES {
            let line = self.read_line()?;
            if line.is_empty() {
                continue;
            }
            let envelope: Envelope = serde_json::from_str(&line)
                .map_err(|e| FixServiceError::Protocol(format!("bad gpsd line: {}", e)))?;
            match envelope.class.as_str() {
                "POLL" => {
                    return serde_json::from_str(&line).map_err(|e| {
                        FixServiceError::Protocol(format!("bad POLL reply: {}", e))
                    })
                }
                "ERROR" => return Err(FixServiceError::Protocol(line)),
                other => log::trace!("Skipping gpsd {} message", other),
            }
        }
        Err(FixServiceError::NoPacket)
    }
}

impl Default for GpsdClient {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl FixService for GpsdClient {
    fn connect(&mut self) -> Result<(), FixServiceError> {
        let addr = self.resolve()?;
        let stream = TcpStream::connect_timeout(&addr, self.timeout).map_err(|e| {
            if e.kind() == io::ErrorKind::ConnectionRefused {
                FixServiceError::ConnectionRefused(self.endpoint())
            } else {
                FixServiceError::Io(format!("failed to connect to {}: {}", self.endpoint(), e))
            }
        })?;
        stream
            .set_read_timeout(Some(self.timeout))
            .and_then(|_| stream.set_write_timeout(Some(self.timeout)))
            .map_err(map_io)?;
        let reader_stream = stream.try_clone().map_err(map_io)?;

        self.reader = Some(BufReader::new(reader_stream));
        self.stream = Some(stream);
        self.send(WATCH_COMMAND).inspect_err(|_| self.disconnect())?;
        self.reconnect = true;
        log::info!("Connected to gpsd at {}", self.endpoint());
        Ok(())
    }

    fn current(&mut self) -> Result<FixPacket, FixServiceError> {
        if !self.is_connected() && self.reconnect {
            log::warn!("Reconnecting to gpsd at {}", self.endpoint());
            self.connect()?;
        }
        let reply = match self.send(POLL_COMMAND).and_then(|_| self.read_poll()) {
            Ok(reply) => reply,
            Err(e) => {
                // Whatever gpsd still has queued on this socket belongs to
                // this poll, not the next one.
                self.disconnect();
                return Err(e);
            }
        };
        to_packet(reply)
    }
}

fn map_io(err: io::Error) -> FixServiceError {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => FixServiceError::Timeout,
        _ => FixServiceError::Io(err.to_string()),
    }
}

/// An empty TPV list means gpsd has no active receiver: reported as mode 0.
fn to_packet(reply: PollReply) -> Result<FixPacket, FixServiceError> {
    let satellite_count = reply.sky.into_iter().next().and_then(|sky| {
        sky.satellites
            .map(|sats| sats.len() as u32)
            .or(sky.n_sat)
    });

    let Some(tpv) = reply.tpv.into_iter().next() else {
        return Ok(FixPacket {
            satellite_count,
            ..Default::default()
        });
    };

    let (latitude, longitude) = match (tpv.lat, tpv.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ if tpv.mode >= 2 => {
            return Err(FixServiceError::Protocol(format!(
                "mode {} fix without lat/lon",
                tpv.mode
            )))
        }
        _ => (0.0, 0.0),
    };

    Ok(FixPacket {
        mode: tpv.mode,
        time: tpv.time,
        latitude,
        longitude,
        altitude: tpv.alt_msl.or(tpv.alt),
        ground_speed: tpv.speed,
        climb_rate: tpv.climb,
        track_deg: tpv.track,
        satellite_count,
    })
}
