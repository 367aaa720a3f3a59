//! JTAG UART handshake and byte-level diagnostics.
//!
//! Talks to an FPGA soft core through an external debug terminal
//! (`nios2-terminal` or compatible), treating the terminal's stdin/stdout
//! as a duplex byte channel. Two pump tasks bridge the channel to internal
//! queues; [`comm::Communicator`] layers the HELLO/ACK handshake and
//! diagnostic probe traffic on top.

pub mod channel;
pub mod comm;
pub mod error;
pub mod protocol;
