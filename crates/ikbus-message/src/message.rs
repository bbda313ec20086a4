use ikbus_frame::Packet;

use crate::error::Result;

/// A typed application message carried by a single packet.
pub trait BusMessage: std::fmt::Debug {
    fn source(&self) -> u8;

    fn destination(&self) -> u8;

    /// Encode the message back into a packet.
    fn to_packet(&self) -> Result<Packet>;

    /// Short human-readable message type, e.g. `"Volume up"`.
    fn type_description(&self) -> String;

    /// Message-specific details, if any.
    fn detail_description(&self) -> Option<String> {
        None
    }

    /// `"<type>: <detail>"`, or just the type when there is no detail.
    fn describe(&self) -> String {
        let kind = self.type_description();
        match self.detail_description() {
            Some(detail) => format!("{kind}: {detail}"),
            None => kind,
        }
    }
}

/// A packet no parser recognized, kept opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMessage {
    packet: Packet,
}

impl UnknownMessage {
    /// Wrap a packet no parser recognized.
    pub fn new(packet: Packet) -> Self {
        Self { packet }
    }

    /// Borrow the wrapped packet.
    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// Unwrap the packet.
    pub fn into_packet(self) -> Packet {
        self.packet
    }
}

impl BusMessage for UnknownMessage {
    fn source(&self) -> u8 {
        self.packet.source()
    }

    fn destination(&self) -> u8 {
        self.packet.destination()
    }

    fn to_packet(&self) -> Result<Packet> {
        Ok(self.packet.clone())
    }

    fn type_description(&self) -> String {
        format!("Unknown message \"{}\"", self.packet)
    }
}

impl std::fmt::Display for UnknownMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Volume {
        up: bool,
        steps: u8,
    }

    impl BusMessage for Volume {
        fn source(&self) -> u8 {
            0x50
        }

        fn destination(&self) -> u8 {
            0x68
        }

        fn to_packet(&self) -> Result<Packet> {
            let code = (self.steps << 4) | u8::from(self.up);
            Ok(Packet::new(0x50, 0x68, vec![0x32, code])?)
        }

        fn type_description(&self) -> String {
            "Volume".to_string()
        }

        fn detail_description(&self) -> Option<String> {
            Some(format!("{} {}", if self.up { "up" } else { "down" }, self.steps))
        }
    }

    #[test]
    fn unknown_message_wraps_packet() {
        let packet = Packet::new(0x50, 0xC8, vec![0x01]).unwrap();
        let message = UnknownMessage::new(packet.clone());

        assert_eq!(message.source(), 0x50);
        assert_eq!(message.destination(), 0xC8);
        assert_eq!(message.to_packet().unwrap(), packet);
        assert_eq!(message.detail_description(), None);
        assert_eq!(message.to_string(), "Unknown message \"50 03 C8 01 9A\"");
        assert_eq!(message.into_packet(), packet);
    }

    #[test]
    fn describe_joins_type_and_detail() {
        let message = Volume { up: true, steps: 1 };

        assert_eq!(message.describe(), "Volume: up 1");
        assert_eq!(message.to_packet().unwrap().to_string(), "50 04 68 32 11 1F");
    }
}
