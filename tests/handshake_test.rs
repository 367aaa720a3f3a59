//! Integration tests for the handshake protocol and session lifecycle.
//!
//! All tests drive a Communicator against the in-memory sim channel, with
//! a spawned task playing the device side.

use std::time::{Duration, Instant};

use jt::channel::sim;
use jt::comm::Communicator;
use jt::error::HandshakeError;
use jt::protocol::{ACK, HELLO, PROBE_SEQUENCE, READY};

// =============================================================================
// Handshake
// =============================================================================

#[tokio::test]
async fn test_handshake_success_on_ack() {
    let (channel, mut peer) = sim::pair();
    let mut comm = Communicator::start(Box::new(channel));

    // Device: answer HELLO with ACK.
    let device = tokio::spawn(async move {
        assert_eq!(peer.recv().await, Some(HELLO));
        assert!(peer.send(ACK));
        peer
    });

    assert_eq!(comm.perform_handshake().await, Ok(()));

    let _peer = device.await.unwrap();
    comm.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_handshake_timeout_on_silent_device() {
    let (channel, _peer) = sim::pair();
    let mut comm = Communicator::start(Box::new(channel));

    // Device stays silent; the bounded wait must expire, not hang.
    assert_eq!(
        comm.perform_handshake().await,
        Err(HandshakeError::Timeout)
    );

    comm.close().await;
}

#[tokio::test]
async fn test_handshake_timeout_override_is_honored() {
    let (channel, _peer) = sim::pair();
    let mut comm = Communicator::start(Box::new(channel));
    comm.set_handshake_timeout(Duration::from_millis(50));

    // Silent device: the shortened wait must expire well before the
    // 5 s default would.
    let start = Instant::now();
    assert_eq!(
        comm.perform_handshake().await,
        Err(HandshakeError::Timeout)
    );
    assert!(
        start.elapsed() < Duration::from_secs(2),
        "override not applied: {:?}",
        start.elapsed()
    );

    comm.close().await;
}

#[tokio::test]
async fn test_handshake_rejects_unexpected_byte() {
    let (channel, mut peer) = sim::pair();
    let mut comm = Communicator::start(Box::new(channel));

    let device = tokio::spawn(async move {
        assert_eq!(peer.recv().await, Some(HELLO));
        // READY is defined by the firmware but is not a valid handshake
        // response.
        assert!(peer.send(READY));
        peer
    });

    assert_eq!(
        comm.perform_handshake().await,
        Err(HandshakeError::UnexpectedByte(0x52))
    );

    let _peer = device.await.unwrap();
    comm.close().await;
}

// =============================================================================
// Probe traffic
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_probe_sequence_is_echoed_back() {
    let (channel, mut peer) = sim::pair();
    let mut comm = Communicator::start(Box::new(channel));

    // Device: echo every byte it sees.
    tokio::spawn(async move {
        while let Some(byte) = peer.recv().await {
            if !peer.send(byte) {
                break;
            }
        }
    });

    let responses = comm.test_communication().await;
    assert_eq!(responses, PROBE_SEQUENCE.to_vec());

    comm.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_probe_with_silent_device_collects_nothing() {
    let (channel, mut peer) = sim::pair();
    let mut comm = Communicator::start(Box::new(channel));

    // Device: consume the probes, never answer.
    tokio::spawn(async move { while peer.recv().await.is_some() {} });

    let responses = comm.test_communication().await;
    assert!(responses.is_empty());

    comm.close().await;
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_close_is_idempotent() {
    let (channel, _peer) = sim::pair();
    let mut comm = Communicator::start(Box::new(channel));

    comm.close().await;
    assert!(!comm.is_running());

    // Second close must be a no-op, not a fault.
    comm.close().await;
    assert!(!comm.is_running());
}

#[tokio::test]
async fn test_close_stops_both_pumps_promptly() {
    let (channel, _peer) = sim::pair();
    let mut comm = Communicator::start(Box::new(channel));

    // close() joins both pump tasks, so it returning within the bound is
    // the liveness property itself.
    tokio::time::timeout(Duration::from_secs(1), comm.close())
        .await
        .expect("pumps did not stop within bound");
}

#[tokio::test]
async fn test_handshake_after_close_times_out_cleanly() {
    let (channel, _peer) = sim::pair();
    let mut comm = Communicator::start(Box::new(channel));
    comm.close().await;

    // A dead session answers with silence, never a fault.
    assert_eq!(
        comm.perform_handshake().await,
        Err(HandshakeError::Timeout)
    );
}
