use ikbus_frame::Packet;
use tracing::trace;

use crate::error::Result;
use crate::message::{BusMessage, UnknownMessage};

/// Turns packets into typed messages.
pub trait MessageParser {
    type Message;

    /// Try to parse `packet`.
    ///
    /// `Ok(None)` means the packet is not one this parser handles. `Err` is
    /// reserved for packets it does handle but finds malformed.
    fn parse(&self, packet: &Packet) -> Result<Option<Self::Message>>;
}

/// Result of running a [`ParserChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<M> {
    Recognized(M),
    Unknown(UnknownMessage),
}

impl<M> Parsed<M> {
    /// Whether a parser in the chain recognized the packet.
    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Recognized(_))
    }

    /// The recognized message, if any.
    pub fn recognized(self) -> Option<M> {
        match self {
            Self::Recognized(message) => Some(message),
            Self::Unknown(_) => None,
        }
    }
}

impl<M: BusMessage> BusMessage for Parsed<M> {
    fn source(&self) -> u8 {
        match self {
            Self::Recognized(message) => message.source(),
            Self::Unknown(message) => message.source(),
        }
    }

    fn destination(&self) -> u8 {
        match self {
            Self::Recognized(message) => message.destination(),
            Self::Unknown(message) => message.destination(),
        }
    }

    fn to_packet(&self) -> Result<Packet> {
        match self {
            Self::Recognized(message) => message.to_packet(),
            Self::Unknown(message) => message.to_packet(),
        }
    }

    fn type_description(&self) -> String {
        match self {
            Self::Recognized(message) => message.type_description(),
            Self::Unknown(message) => message.type_description(),
        }
    }

    fn detail_description(&self) -> Option<String> {
        match self {
            Self::Recognized(message) => message.detail_description(),
            Self::Unknown(message) => message.detail_description(),
        }
    }
}

type BoxedParser<M> = Box<dyn MessageParser<Message = M> + Send + Sync>;

/// Ordered list of parsers, tried first to last.
///
/// Packets no parser recognizes come back as [`Parsed::Unknown`], so parsing
/// a packet through a chain always yields a message.
pub struct ParserChain<M> {
    parsers: Vec<BoxedParser<M>>,
}

impl<M> ParserChain<M> {
    /// An empty chain: every packet is unknown.
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Append a parser, builder style.
    pub fn with<P>(mut self, parser: P) -> Self
    where
        P: MessageParser<Message = M> + Send + Sync + 'static,
    {
        self.push(parser);
        self
    }

    /// Append a parser; it is tried after those already present.
    pub fn push<P>(&mut self, parser: P)
    where
        P: MessageParser<Message = M> + Send + Sync + 'static,
    {
        self.parsers.push(Box::new(parser));
    }

    /// Number of parsers in the chain.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    /// Whether the chain has no parsers.
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Run `packet` through the chain. The first parser error stops it.
    pub fn parse(&self, packet: &Packet) -> Result<Parsed<M>> {
        for (index, parser) in self.parsers.iter().enumerate() {
            if let Some(message) = parser.parse(packet)? {
                trace!(parser = index, "packet recognized");
                return Ok(Parsed::Recognized(message));
            }
        }
        Ok(Parsed::Unknown(UnknownMessage::new(packet.clone())))
    }
}

impl<M> Default for ParserChain<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> MessageParser for ParserChain<M> {
    type Message = Parsed<M>;

    fn parse(&self, packet: &Packet) -> Result<Option<Parsed<M>>> {
        ParserChain::parse(self, packet).map(Some)
    }
}

impl<M> std::fmt::Debug for ParserChain<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserChain")
            .field("parsers", &self.parsers.len())
            .finish()
    }
}
