//! Ingress and egress pumps.
//!
//! Two independent tasks bridge the channel halves to the Communicator's
//! queues. A shared cancellation token coordinates them: either pump
//! cancelling it stops the other promptly, so neither can block forever
//! once the session is over.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::channel::{ChannelReader, ChannelWriter};

/// Drain bytes from the channel into the ingress queue, preserving
/// arrival order.
///
/// Stops on cancellation, end of stream, or a read error. Errors are
/// contained here: the pump logs, cancels the session, and returns
/// without touching the rest of the system.
pub async fn ingress_pump(
    mut reader: Box<dyn ChannelReader>,
    ingress: mpsc::UnboundedSender<u8>,
    cancel: CancellationToken,
) {
    loop {
        let read = tokio::select! {
            _ = cancel.cancelled() => break,
            read = reader.read_one() => read,
        };

        match read {
            Ok(Some(byte)) => {
                // Receiver dropped means the Communicator is gone.
                if ingress.send(byte).is_err() {
                    break;
                }
            }
            Ok(None) => {
                tracing::warn!("channel closed by peer");
                cancel.cancel();
                break;
            }
            Err(e) => {
                tracing::error!("channel read failed: {}", e);
                cancel.cancel();
                break;
            }
        }
    }
    tracing::debug!("ingress pump stopped");
}

/// Drain the egress queue into the channel, one flushed byte at a time,
/// strictly in submission order.
///
/// A write error stops the session the same way a read error does.
pub async fn egress_pump(
    mut writer: Box<dyn ChannelWriter>,
    mut egress: mpsc::UnboundedReceiver<u8>,
    cancel: CancellationToken,
) {
    loop {
        let byte = tokio::select! {
            _ = cancel.cancelled() => break,
            byte = egress.recv() => match byte {
                Some(byte) => byte,
                // Sender dropped means the Communicator is gone.
                None => break,
            },
        };

        if let Err(e) = writer.write_one(byte).await {
            tracing::error!("channel write failed: {}", e);
            cancel.cancel();
            break;
        }
    }
    tracing::debug!("egress pump stopped");
}
