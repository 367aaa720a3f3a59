//! Wire constants for the JTAG UART handshake protocol.
//!
//! Everything on the wire is a single unsigned byte; there is no framing
//! and no multi-byte message. The device firmware defines the constants
//! below and the timings the soft core can keep up with.

use std::time::Duration;

// =============================================================================
// Protocol bytes
// =============================================================================

/// Handshake request ('H'). Sent by us to open the exchange.
pub const HELLO: u8 = 0x48;

/// Expected handshake response ('A').
pub const ACK: u8 = 0x41;

/// Reserved ('R'). Defined by the device firmware but not part of any
/// exchange; kept for reference only.
pub const READY: u8 = 0x52;

/// Probe bytes sent by `test_communication`, in this order.
pub const PROBE_SEQUENCE: [u8; 4] = [0x11, 0x22, 0x33, 0x44];

// =============================================================================
// Timings
// =============================================================================

/// How long to wait for ACK after sending HELLO. Longer than the general
/// default: the soft core may need a moment after configuration before it
/// services the UART.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay between probe bytes so the device-side FIFO is not overrun.
pub const PROBE_GAP: Duration = Duration::from_millis(500);

/// Maximum bounded reads while draining probe responses.
pub const PROBE_READ_ATTEMPTS: usize = 5;

/// Default bounded-read timeout; also paces each read while draining
/// probe responses.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Read timeout after each byte sent from the interactive prompt.
pub const INTERACTIVE_READ_TIMEOUT: Duration = Duration::from_secs(2);

// =============================================================================
// Rendering
// =============================================================================

/// Render a byte for diagnostics: printable ASCII (0x20..=0x7E) as the
/// character itself, anything else as '?'. Presentation only, never part
/// of the wire contract.
pub fn render_byte(byte: u8) -> char {
    if (0x20..=0x7E).contains(&byte) {
        byte as char
    } else {
        '?'
    }
}
