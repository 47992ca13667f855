//! Command-line front-end for the maple bus host driver.
//!
//! # Usage
//!
//! ```bash
//! maple-cli --port /dev/ttyUSB0 device-info --addr 0x20
//! maple-cli --port /dev/ttyUSB0 read-controller --addr 0x20
//! maple-cli decode-capture capture.bin
//! ```

use std::{fs, path::PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use maple_core::DeviceOps;
use maple_decoder::debittify;
use maple_transport::{SerialProxyTransport, BAUD_RATE};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Maple bus host driver
#[derive(Parser, Debug)]
#[command(name = "maple-cli")]
#[command(about = "Host-side driver for the maple bus proxy")]
#[command(version)]
struct Args {
    /// Serial port the maple proxy is attached to.
    #[arg(short, long, default_value = "/dev/ttyUSB0")]
    port: String,

    /// Baud rate override, mainly useful for testing against a loopback.
    #[arg(long, default_value_t = BAUD_RATE)]
    baud_rate: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe a device and report whether it responded.
    DeviceInfo {
        /// Device address, e.g. 0x20.
        #[arg(long, value_parser = parse_u8)]
        addr: u8,
    },
    /// Probe a device and print its parsed device-information block.
    DeviceInfoDetail {
        #[arg(long, value_parser = parse_u8)]
        addr: u8,
    },
    /// Poll a controller's button/analog condition.
    ReadController {
        #[arg(long, value_parser = parse_u8)]
        addr: u8,
    },
    /// Read one VMU flash block (all four phases).
    ReadFlash {
        #[arg(long, value_parser = parse_u8)]
        addr: u8,
        /// Flash block index.
        #[arg(long)]
        block: u16,
    },
    /// Query a VMU's memory-card layout.
    GetMemInfo {
        #[arg(long, value_parser = parse_u8)]
        addr: u8,
    },
    /// Reset a device.
    Reset {
        #[arg(long, value_parser = parse_u8)]
        addr: u8,
    },
    /// Decode a previously-captured raw sample-pair file offline, without a
    /// live proxy connection.
    DecodeCapture {
        /// Path to the raw capture file.
        file: PathBuf,
    },
}

fn parse_u8(s: &str) -> Result<u8, std::num::ParseIntError> {
    if let Some(hex) = s.strip_prefix("0x") {
        u8::from_str_radix(hex, 16)
    } else {
        s.parse()
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let Command::DecodeCapture { file } = &args.command else {
        let mut transport = SerialProxyTransport::connect(&args.port, args.baud_rate)
            .with_context(|| format!("connecting to proxy on {}", args.port))?;
        let mut ops = DeviceOps::new(&mut transport);
        return run_device_command(&mut ops, args.command);
    };
    decode_capture(file)
}

fn run_device_command<T: maple_core::ProxyTransport>(
    ops: &mut DeviceOps<'_, T>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::DeviceInfo { addr } => {
            let present = ops.device_info(addr)?;
            println!("device at {addr:#04x}: {}", if present { "present" } else { "absent" });
        }
        Command::DeviceInfoDetail { addr } => match ops.device_info_detail(addr)? {
            Some(info) => println!("{info:#?}"),
            None => println!("no device at {addr:#04x}"),
        },
        Command::ReadController { addr } => {
            let cond = ops.read_controller(addr)?;
            println!("{cond:#?}");
        }
        Command::ReadFlash { addr, block } => {
            let data = ops.read_flash(addr, block, 0)?;
            println!("read {} bytes from block {block}", data.len());
        }
        Command::GetMemInfo { addr } => {
            let info = ops.get_mem_info(addr)?;
            println!("{info:#?}");
        }
        Command::Reset { addr } => {
            ops.reset(addr)?;
            println!("reset sent to {addr:#04x}");
        }
        Command::DecodeCapture { .. } => {
            bail!("decode-capture does not require a proxy connection");
        }
    }

    Ok(())
}

/// Decode a raw sample-pair capture file offline, mirroring a live
/// round-trip's decode step without a proxy connection.
fn decode_capture(file: &PathBuf) -> anyhow::Result<()> {
    let raw = fs::read(file).with_context(|| format!("reading capture file {file:?}"))?;
    if raw.is_empty() {
        bail!("capture file {file:?} is empty");
    }
    let decoded = debittify(&raw);
    println!("bytes: {:02x?}", decoded.bytes);
    println!("useful_sample_count: {}", decoded.useful_sample_count);
    println!("idle_observed: {}", decoded.idle_observed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_u8;

    #[test]
    fn parse_u8_accepts_hex_and_decimal() {
        assert_eq!(parse_u8("0x20").expect("hex"), 0x20);
        assert_eq!(parse_u8("32").expect("decimal"), 32);
    }

    #[test]
    fn parse_u8_rejects_out_of_range() {
        assert!(parse_u8("0x100").is_err());
    }
}
