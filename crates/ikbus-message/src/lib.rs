//! Message layer on top of [`ikbus_frame`].
//!
//! Only valid packets reach this layer. A [`ParserChain`] tries each
//! registered [`MessageParser`] in turn and falls back to an opaque
//! [`UnknownMessage`], so every packet maps to some message. A [`ModuleTable`]
//! names bus addresses, and a [`Profile`] bundles both for one vehicle.
//!
//! No concrete message types ship with this crate.

pub mod error;
pub mod message;
pub mod module;
pub mod parser;
pub mod profile;

pub use error::{MessageError, Result};
pub use message::{BusMessage, UnknownMessage};
pub use module::{ModuleDescriptor, ModuleTable};
pub use parser::{MessageParser, Parsed, ParserChain};
pub use profile::Profile;
