//! jt - handshake test client for a JTAG UART soft core.
//!
//! Spawns the debug terminal, performs the HELLO/ACK handshake, fires the
//! probe sequence, then drops into an interactive prompt for sending
//! single bytes by hand. Every exit path, including Ctrl-C, goes through
//! `Communicator::close` so the terminal process is never leaked.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use jt::channel::terminal::{TerminalChannel, TerminalConfig};
use jt::comm::Communicator;
use jt::protocol;

#[derive(Parser, Debug)]
#[command(name = "jt", version, about = "JTAG UART handshake and byte-level diagnostics")]
struct Cli {
    /// Debug terminal executable providing the JTAG UART streams
    #[arg(long, env = "JT_TERMINAL", default_value = "nios2-terminal")]
    terminal: PathBuf,

    /// JTAG UART instance to attach to
    #[arg(long, default_value_t = 0)]
    instance: u32,

    /// Seconds to let the link settle before the handshake
    #[arg(long, default_value_t = 2)]
    settle: u64,

    /// Seconds to wait for ACK after sending HELLO
    #[arg(long, default_value_t = 5)]
    handshake_timeout: u64,

    /// Skip the probe-byte exchange after the handshake
    #[arg(long)]
    no_probe: bool,

    /// Exit after the handshake instead of entering the interactive prompt
    #[arg(long)]
    no_interactive: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("unexpected error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = TerminalConfig {
        program: cli.terminal.clone(),
        instance: cli.instance,
    };

    let channel = match TerminalChannel::open(&config) {
        Ok(channel) => channel,
        Err(e) => {
            tracing::error!("{}", e);
            tracing::error!(
                "make sure the Quartus tools are on PATH, or point --terminal / JT_TERMINAL \
                 at the debug terminal executable"
            );
            return Ok(ExitCode::FAILURE);
        }
    };
    tracing::info!("JTAG UART connection established");

    let mut comm = Communicator::start(Box::new(channel));
    comm.set_handshake_timeout(Duration::from_secs(cli.handshake_timeout));

    let outcome = tokio::select! {
        outcome = session(&mut comm, &cli) => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
            Ok(ExitCode::SUCCESS)
        }
    };

    comm.close().await;
    outcome
}

async fn session(comm: &mut Communicator, cli: &Cli) -> Result<ExitCode> {
    if cli.settle > 0 {
        tracing::info!("waiting {}s for the link to settle", cli.settle);
        tokio::time::sleep(Duration::from_secs(cli.settle)).await;
    }

    tracing::info!("starting handshake");
    if let Err(e) = comm.perform_handshake().await {
        tracing::error!("handshake failed: {}", e);
        return Ok(ExitCode::FAILURE);
    }
    tracing::info!("handshake completed, device is responsive");

    if !cli.no_probe {
        tracing::info!("sending probe bytes");
        let responses = comm.test_communication().await;
        if responses.is_empty() {
            tracing::info!("no probe responses");
        } else {
            tracing::info!("collected {} probe response(s)", responses.len());
        }
    }

    if !cli.no_interactive {
        interactive(comm).await?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Interactive prompt: one byte per line as two hex digits, `q` quits.
/// Malformed input is reported and the loop continues.
async fn interactive(comm: &mut Communicator) -> Result<()> {
    println!("Enter a byte as two hex digits (e.g. 48), q to quit:");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("q") {
            break;
        }

        match parse_hex_byte(input) {
            Some(byte) => {
                comm.send_byte(byte);
                if comm
                    .read_byte(protocol::INTERACTIVE_READ_TIMEOUT)
                    .await
                    .is_none()
                {
                    println!("no response from device");
                }
            }
            None => {
                println!("invalid input '{}': expected 00..FF in hex", input);
            }
        }
    }
    Ok(())
}

/// Parse a bare two-digit hex byte. Rejects signs and anything longer
/// than two digits, which `u8::from_str_radix` would accept.
fn parse_hex_byte(input: &str) -> Option<u8> {
    if input.is_empty() || input.len() > 2 || !input.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(input, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_byte() {
        assert_eq!(parse_hex_byte("48"), Some(0x48));
        assert_eq!(parse_hex_byte("ff"), Some(0xFF));
        assert_eq!(parse_hex_byte("FF"), Some(0xFF));
        assert_eq!(parse_hex_byte("0"), Some(0x00));
        assert_eq!(parse_hex_byte(""), None);
        assert_eq!(parse_hex_byte("100"), None);
        assert_eq!(parse_hex_byte("+4"), None);
        assert_eq!(parse_hex_byte("zz"), None);
    }
}
