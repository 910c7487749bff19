use thiserror::Error;

use super::readings::TransducerVariant;

/// Fatal errors raised while the acquisition loop is starting.
///
/// Any of these stops the process: the loop transitions straight to
/// `Stopped` and the error propagates to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("indicator setup failed: {0}")]
    IndicatorSetup(String),

    #[error("no supported transducer found (tried {tried:?})")]
    TransducerNotFound { tried: Vec<TransducerVariant> },

    #[error("transducer bus error while probing {variant}: {reason}")]
    TransducerBus {
        variant: TransducerVariant,
        reason: String,
    },

    #[error("fix service unreachable: {0}")]
    FixServiceUnreachable(String),

    #[error("storage unavailable: {0}")]
    Storage(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Outcome of probing one transducer variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// Nothing answered at the variant's address, or the identity read did
    /// not match the variant's protocol.
    #[error("address not found")]
    NotFound,

    #[error("bus error: {0}")]
    Bus(String),
}

/// A fault reported by the transducer while measuring.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("sensor fault: {0}")]
pub struct SensorFault(pub String);

/// Errors reported by a location-fix service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixServiceError {
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("not connected")]
    NotConnected,

    #[error("no packet available yet")]
    NoPacket,

    #[error("timed out waiting for the fix service")]
    Timeout,

    #[error("i/o error: {0}")]
    Io(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Failure to drive a status indicator output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("indicator error: {0}")]
pub struct IndicatorError(pub String);

/// Errors from the durable CSV writer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("output file is not open")]
    Closed,

    #[error("serialization failed: {0}")]
    Serialize(String),

    #[error("write failed: {0}")]
    Io(String),

    #[error("sync to storage failed: {0}")]
    Sync(String),
}
