//! Byte channel abstraction.
//!
//! A duplex single-byte stream split into independent halves so the two
//! pumps never share state: one reader for the ingress direction, one
//! writer for the egress direction, and a control handle that owns
//! transport shutdown. The core assumes nothing about buffering beyond
//! "one byte in, one byte out"; no framing is added at this layer.

pub mod sim;
pub mod terminal;

use async_trait::async_trait;
use std::io;

/// Read end of a duplex byte channel.
#[async_trait]
pub trait ChannelReader: Send {
    /// Blocking read of exactly one byte. `Ok(None)` signals end of stream.
    async fn read_one(&mut self) -> io::Result<Option<u8>>;
}

/// Write end of a duplex byte channel. Every byte is flushed immediately.
#[async_trait]
pub trait ChannelWriter: Send {
    async fn write_one(&mut self, byte: u8) -> io::Result<()>;
}

/// Owning handle to the backing transport.
#[async_trait]
pub trait ChannelControl: Send {
    /// Request shutdown of the transport and wait for it to exit.
    /// Must be idempotent.
    async fn terminate(&mut self) -> io::Result<()>;
}

/// A duplex byte channel that can be split into its directional halves.
pub trait ByteChannel: Send {
    fn into_parts(self: Box<Self>) -> ChannelParts;
}

/// The split halves of a channel. Exactly one pump touches each direction;
/// the control handle stays with the [`Communicator`](crate::comm::Communicator).
pub struct ChannelParts {
    pub reader: Box<dyn ChannelReader>,
    pub writer: Box<dyn ChannelWriter>,
    pub control: Box<dyn ChannelControl>,
}
