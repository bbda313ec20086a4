use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod dump;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode one complete packet given as hex.
    Decode(DecodeArgs),
    /// Encode a packet and print its wire form.
    Encode(EncodeArgs),
    /// Read a byte stream and print every packet and corrupted run.
    Dump(DumpArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Dump(args) => dump::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Packet bytes in hex, e.g. "50 03 C8 01 9A".
    #[arg(required = true, num_args = 1..)]
    pub hex: Vec<String>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Source address (hex, e.g. 50 or 0x50).
    #[arg(long, short = 's', value_parser = parse_address)]
    pub source: u8,
    /// Destination address (hex).
    #[arg(long, short = 'd', value_parser = parse_address)]
    pub destination: u8,
    /// Payload bytes in hex.
    #[arg(long, default_value = "")]
    pub data: String,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// File or device to read. Reads stdin when absent or "-".
    pub path: Option<PathBuf>,
    /// Longest gap between two bytes of one packet (e.g. 50ms, 1s).
    #[arg(long, default_value = "50ms", env = "IKBUS_BYTE_TIMEOUT")]
    pub byte_timeout: String,
    /// Exit after printing N elements.
    #[arg(long)]
    pub count: Option<usize>,
    /// Skip corrupted runs.
    #[arg(long)]
    pub valid_only: bool,
    /// JSON module table used to label addresses.
    #[arg(long, value_name = "FILE", env = "IKBUS_MODULES")]
    pub modules: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_address(input: &str) -> Result<u8, String> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    u8::from_str_radix(digits, 16).map_err(|_| format!("not a hex byte: {input}"))
}
