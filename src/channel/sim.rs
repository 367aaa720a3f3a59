//! In-memory byte channel for exercising the protocol without hardware.
//!
//! [`pair`] returns a connected channel/peer pair: the channel half plugs
//! into a [`Communicator`](crate::comm::Communicator), the peer half lets
//! a test play the device (observe every byte written, inject responses,
//! or stay silent).

use async_trait::async_trait;
use std::io;
use tokio::sync::mpsc;

use crate::channel::{ByteChannel, ChannelControl, ChannelParts, ChannelReader, ChannelWriter};

/// Create a connected channel/peer pair.
pub fn pair() -> (SimChannel, SimPeer) {
    let (to_device_tx, to_device_rx) = mpsc::unbounded_channel();
    let (from_device_tx, from_device_rx) = mpsc::unbounded_channel();

    (
        SimChannel {
            rx: from_device_rx,
            tx: to_device_tx,
        },
        SimPeer {
            rx: to_device_rx,
            tx: from_device_tx,
        },
    )
}

/// Channel half handed to the Communicator.
pub struct SimChannel {
    rx: mpsc::UnboundedReceiver<u8>,
    tx: mpsc::UnboundedSender<u8>,
}

/// Device half driven by a test.
pub struct SimPeer {
    rx: mpsc::UnboundedReceiver<u8>,
    tx: mpsc::UnboundedSender<u8>,
}

impl SimPeer {
    /// Next byte written by the client, or `None` once the write side
    /// has shut down.
    pub async fn recv(&mut self) -> Option<u8> {
        self.rx.recv().await
    }

    /// Inject a byte as if the device had sent it. Returns false if the
    /// client side is gone.
    pub fn send(&self, byte: u8) -> bool {
        self.tx.send(byte).is_ok()
    }
}

impl ByteChannel for SimChannel {
    fn into_parts(self: Box<Self>) -> ChannelParts {
        ChannelParts {
            reader: Box::new(SimReader { rx: self.rx }),
            writer: Box::new(SimWriter { tx: self.tx }),
            control: Box::new(SimControl),
        }
    }
}

struct SimReader {
    rx: mpsc::UnboundedReceiver<u8>,
}

#[async_trait]
impl ChannelReader for SimReader {
    async fn read_one(&mut self) -> io::Result<Option<u8>> {
        // A dropped peer reads as end of stream, same as a closed pipe.
        Ok(self.rx.recv().await)
    }
}

struct SimWriter {
    tx: mpsc::UnboundedSender<u8>,
}

#[async_trait]
impl ChannelWriter for SimWriter {
    async fn write_one(&mut self, byte: u8) -> io::Result<()> {
        self.tx
            .send(byte)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer closed"))
    }
}

struct SimControl;

#[async_trait]
impl ChannelControl for SimControl {
    async fn terminate(&mut self) -> io::Result<()> {
        Ok(())
    }
}
