use crate::models::error::FixServiceError;
use crate::models::readings::FixPacket;

/// Interface to a long-running location-fix service.
///
/// Implemented by:
/// - `GpsdClient` (heat-logger-linux)
pub trait FixService: Send {
    /// One-time connection. `ConnectionRefused` here is treated as fatal.
    fn connect(&mut self) -> Result<(), FixServiceError>;

    /// The most recent fix known to the service.
    ///
    /// Must never return the answer to an earlier query. Errors here are
    /// per-cycle; an implementation may reconnect on the next call.
    fn current(&mut self) -> Result<FixPacket, FixServiceError>;
}
