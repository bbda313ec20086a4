use ikbus_frame::Packet;

use crate::error::Result;
use crate::message::BusMessage;
use crate::module::ModuleTable;
use crate::parser::{ParserChain, Parsed};

/// A vehicle profile: the modules present on the bus and how to parse their
/// messages.
#[derive(Debug)]
pub struct Profile<M> {
    name: String,
    modules: ModuleTable,
    parser: ParserChain<M>,
}

impl<M: BusMessage> Profile<M> {
    /// Bundle a module table and parser chain under `name`.
    pub fn new(name: impl Into<String>, modules: ModuleTable, parser: ParserChain<M>) -> Self {
        Self {
            name: name.into(),
            modules,
            parser,
        }
    }

    /// Profile name, e.g. the vehicle model.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Modules present on the bus.
    pub fn modules(&self) -> &ModuleTable {
        &self.modules
    }

    /// Parsers applied to valid packets.
    pub fn parser(&self) -> &ParserChain<M> {
        &self.parser
    }

    /// Parse a packet with this profile's parser chain.
    pub fn parse(&self, packet: &Packet) -> Result<Parsed<M>> {
        self.parser.parse(packet)
    }

    /// Module code for `id`, or the address in hex when unknown.
    pub fn address_label(&self, id: u8) -> String {
        match self.modules.code(id) {
            Some(code) => code.to_string(),
            None => format!("{id:02X}"),
        }
    }

    /// Render a packet as `SRC -> DST: description`.
    pub fn describe_packet(&self, packet: &Packet) -> Result<String> {
        let message = self.parse(packet)?;
        Ok(format!(
            "{} -> {}: {}",
            self.address_label(packet.source()),
            self.address_label(packet.destination()),
            message.describe()
        ))
    }
}

impl<M> std::fmt::Display for Profile<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
