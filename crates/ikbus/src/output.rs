use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ikbus_frame::{to_hex, Packet, StreamElement};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PacketOutput {
    source: String,
    destination: String,
    payload_size: usize,
    payload: String,
    wire: String,
}

impl PacketOutput {
    fn new(packet: &Packet) -> Self {
        Self {
            source: byte_hex(packet.source()),
            destination: byte_hex(packet.destination()),
            payload_size: packet.payload().len(),
            payload: to_hex(packet.payload()),
            wire: packet.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ElementOutput<'a> {
    index: usize,
    valid: bool,
    len: usize,
    data: String,
    #[serde(flatten)]
    packet: Option<PacketOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// Print a single packet (decode and encode commands).
pub fn print_packet(packet: &Packet, format: OutputFormat) {
    let out = PacketOutput::new(packet);
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["SRC", "DST", "SIZE", "PAYLOAD", "WIRE"]);
            table.add_row(vec![
                out.source,
                out.destination,
                out.payload_size.to_string(),
                out.payload,
                out.wire,
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "src={} dst={} size={} payload=[{}] wire=[{}]",
                out.source, out.destination, out.payload_size, out.payload, out.wire
            );
        }
        OutputFormat::Raw => print_raw(&packet.to_wire()),
    }
}

/// Print one element of a dumped stream.
pub fn print_element(
    index: usize,
    element: &StreamElement,
    description: Option<&str>,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => print_json(&ElementOutput {
            index,
            valid: element.is_valid(),
            len: element.len(),
            data: element.to_string(),
            packet: element.packet().map(PacketOutput::new),
            description,
        }),
        OutputFormat::Table => {
            let (source, destination) = match element.packet() {
                Some(packet) => (byte_hex(packet.source()), byte_hex(packet.destination())),
                None => (String::new(), String::new()),
            };
            let mut table = new_table(vec!["#", "KIND", "SRC", "DST", "DATA", "DESCRIPTION"]);
            table.add_row(vec![
                index.to_string(),
                kind(element).to_string(),
                source,
                destination,
                element.to_string(),
                description.unwrap_or_default().to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => match description {
            Some(description) => println!("{index:>5} {:<7} {element}  {description}", kind(element)),
            None => println!("{index:>5} {:<7} {element}", kind(element)),
        },
        OutputFormat::Raw => print_raw(&element.data()),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn kind(element: &StreamElement) -> &'static str {
    if element.is_valid() {
        "valid"
    } else {
        "invalid"
    }
}

fn byte_hex(byte: u8) -> String {
    format!("{byte:02X}")
}
