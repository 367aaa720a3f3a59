//! Error types for the channel and protocol layers.
//!
//! Pump-level I/O failures are not represented here: the failing pump
//! logs them and stops the session locally. Only outcomes the caller can
//! act on are surfaced as explicit results.

use std::io;
use thiserror::Error;

/// Failure to acquire the byte channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The channel provider could not be started (missing executable,
    /// bad path). Fatal to `start()`, not retried.
    #[error("channel unavailable: {source}")]
    Unavailable {
        #[source]
        source: io::Error,
    },
}

/// Terminal outcomes of the single-attempt handshake.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeError {
    /// No byte arrived within the handshake timeout.
    #[error("timed out waiting for ACK")]
    Timeout,

    /// A byte arrived but it was not ACK. Carries the received value.
    #[error("unexpected response 0x{0:02X}, expected ACK (0x41)")]
    UnexpectedByte(u8),
}
