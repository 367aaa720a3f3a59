//! Protocol layer over the byte channel.
//!
//! The [`Communicator`] owns the two queues and both pumps, and exposes
//! the handshake and diagnostic operations. Egress is fire-and-forget in
//! submission order; ingress is consumed through bounded reads. The only
//! caller-visible suspension point is [`Communicator::read_byte`], always
//! bounded by its timeout.

pub mod pump;

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::channel::{ByteChannel, ChannelControl};
use crate::comm::pump::{egress_pump, ingress_pump};
use crate::error::HandshakeError;
use crate::protocol::{self, render_byte};

/// Protocol-level session over a duplex byte channel.
pub struct Communicator {
    egress: mpsc::UnboundedSender<u8>,
    ingress: mpsc::UnboundedReceiver<u8>,
    cancel: CancellationToken,
    control: Option<Box<dyn ChannelControl>>,
    pumps: Vec<JoinHandle<()>>,
    handshake_timeout: Duration,
}

impl Communicator {
    /// Split the channel and spawn both pumps. The session is live until
    /// [`close`](Self::close) or a pump-level I/O failure.
    pub fn start(channel: Box<dyn ByteChannel>) -> Self {
        let parts = channel.into_parts();
        let cancel = CancellationToken::new();

        let (egress_tx, egress_rx) = mpsc::unbounded_channel();
        let (ingress_tx, ingress_rx) = mpsc::unbounded_channel();

        let pumps = vec![
            tokio::spawn(ingress_pump(parts.reader, ingress_tx, cancel.clone())),
            tokio::spawn(egress_pump(parts.writer, egress_rx, cancel.clone())),
        ];

        Self {
            egress: egress_tx,
            ingress: ingress_rx,
            cancel,
            control: Some(parts.control),
            pumps,
            handshake_timeout: protocol::HANDSHAKE_TIMEOUT,
        }
    }

    /// Override how long [`perform_handshake`](Self::perform_handshake)
    /// waits for ACK. Defaults to [`protocol::HANDSHAKE_TIMEOUT`].
    pub fn set_handshake_timeout(&mut self, timeout: Duration) {
        self.handshake_timeout = timeout;
    }

    /// Whether the session is still live. False once `close` was called
    /// or a pump hit a fatal I/O error.
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Queue one byte for transmission and return immediately.
    ///
    /// Fire-and-forget: the byte reaches the wire exactly once, in
    /// submission order, as long as the session stays alive. After a
    /// pump failure the byte is dropped with a warning.
    pub fn send_byte(&self, byte: u8) {
        tracing::info!("-> sent 0x{:02X} ('{}')", byte, render_byte(byte));
        if self.egress.send(byte).is_err() {
            tracing::warn!("session closed, dropping 0x{:02X}", byte);
        }
    }

    /// Wait up to `timeout` for one received byte.
    ///
    /// Returns bytes in channel-arrival order. `None` means silence for
    /// the full timeout, or a session that is already dead with nothing
    /// left queued.
    pub async fn read_byte(&mut self, timeout: Duration) -> Option<u8> {
        match tokio::time::timeout(timeout, self.ingress.recv()).await {
            Ok(Some(byte)) => {
                tracing::info!("<- received 0x{:02X} ('{}')", byte, render_byte(byte));
                Some(byte)
            }
            Ok(None) | Err(_) => None,
        }
    }

    /// Single-attempt HELLO/ACK exchange.
    ///
    /// Sends HELLO and waits the configured handshake timeout for exactly
    /// one byte. No retry, no renegotiation: the first response (or its
    /// absence) is the verdict.
    pub async fn perform_handshake(&mut self) -> Result<(), HandshakeError> {
        tracing::info!("sending HELLO (0x{:02X})", protocol::HELLO);
        self.send_byte(protocol::HELLO);

        tracing::info!("waiting for ACK");
        match self.read_byte(self.handshake_timeout).await {
            None => Err(HandshakeError::Timeout),
            Some(protocol::ACK) => Ok(()),
            Some(other) => Err(HandshakeError::UnexpectedByte(other)),
        }
    }

    /// Best-effort diagnostic traffic: send the probe sequence with a
    /// fixed inter-byte gap, then drain whatever the device answers.
    ///
    /// Returns the collected responses; there is no pass/fail beyond
    /// what the caller makes of them.
    pub async fn test_communication(&mut self) -> Vec<u8> {
        for &byte in &protocol::PROBE_SEQUENCE {
            self.send_byte(byte);
            tokio::time::sleep(protocol::PROBE_GAP).await;
        }

        let mut responses = Vec::new();
        for _ in 0..protocol::PROBE_READ_ATTEMPTS {
            match self.read_byte(protocol::DEFAULT_READ_TIMEOUT).await {
                Some(byte) => responses.push(byte),
                None => break,
            }
        }
        responses
    }

    /// Tear the session down: stop both pumps, terminate the transport,
    /// wait for everything to finish. Safe to call more than once.
    pub async fn close(&mut self) {
        self.cancel.cancel();

        if let Some(mut control) = self.control.take() {
            if let Err(e) = control.terminate().await {
                tracing::warn!("terminating channel: {}", e);
            }
            for pump in self.pumps.drain(..) {
                let _ = pump.await;
            }
            tracing::info!("connection closed");
        }
    }
}
