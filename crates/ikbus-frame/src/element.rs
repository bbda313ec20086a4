use bytes::Bytes;

use crate::codec::Packet;
use crate::hex::to_hex;

/// One classified unit of the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamElement {
    /// A packet whose length and checksum were consistent.
    Valid(Packet),
    /// A contiguous run of bytes that never formed a valid packet.
    Invalid(Bytes),
}

impl StreamElement {
    /// Whether this element is a checksum-verified packet.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The decoded packet, if this element is valid.
    pub fn packet(&self) -> Option<&Packet> {
        match self {
            Self::Valid(packet) => Some(packet),
            Self::Invalid(_) => None,
        }
    }

    /// Raw bytes of this element. Valid packets are re-encoded to wire form.
    pub fn data(&self) -> Bytes {
        match self {
            Self::Valid(packet) => packet.to_wire(),
            Self::Invalid(run) => run.clone(),
        }
    }

    /// Number of bytes this element covered on the wire.
    pub fn len(&self) -> usize {
        match self {
            Self::Valid(packet) => packet.wire_size(),
            Self::Invalid(run) => run.len(),
        }
    }

    /// Always false for elements produced by a reader.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Packet> for StreamElement {
    fn from(packet: Packet) -> Self {
        Self::Valid(packet)
    }
}

impl std::fmt::Display for StreamElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid(packet) => packet.fmt(f),
            Self::Invalid(run) => f.write_str(&to_hex(run)),
        }
    }
}
