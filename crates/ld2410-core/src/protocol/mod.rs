//! Protocol module: packet schemas, the identification trie, and framing.
//!
//! Wire format (multi-byte integers little-endian, except header and footer
//! which travel most-significant-byte first):
//!
//! ```text
//! [4-byte header][2-byte length][2-byte type code][length-2 bytes payload][4-byte footer]
//! ```
//!
//! The length field counts the type code plus the payload; header and footer
//! are not included.

pub mod identifier;
pub mod packet;
pub mod reader;
pub mod schema;
pub mod writer;

pub use identifier::{IdentifiedFrame, PacketTrie};
pub use packet::{Packet, PacketError};
pub use reader::PacketReader;
pub use schema::{FieldKind, FieldName, FieldRule, PacketKind, PacketSchema, REGISTRY};
pub use writer::PacketWriter;
