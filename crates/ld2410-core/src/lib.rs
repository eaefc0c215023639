//! # ld2410-core
//!
//! Protocol library for the HLK-LD2410 24 GHz presence radar: packet schemas,
//! the identification trie that recognises frames on a shared byte stream,
//! and the offset-table field codec used to read and write packet payloads.
//!
//! This crate has zero dependencies on OS APIs or concrete transports. The
//! two capability traits in [`io`] are the only boundary; anything that can
//! hand over one byte at a time (a serial TTY, a TCP socket, a scripted test
//! buffer) can feed a [`PacketReader`].
//!
//! The crate defines:
//!
//! - **`protocol::schema`** – the static registry of every known packet:
//!   identity constants, field layout rules, and the command/ack pairing.
//! - **`protocol::identifier`** – a prefix trie over the discriminating wire
//!   bytes, used to decide which schema is arriving while consuming the
//!   stream byte by byte.
//! - **`protocol::packet`** – a decoded/encoded packet instance with a flat
//!   byte buffer and a precomputed offset table for named field access.
//! - **`protocol::reader` / `protocol::writer`** – framing: pull one whole
//!   frame off a byte source, or serialise one packet to a byte sink.

pub mod io;
pub mod protocol;

pub use io::{ByteSink, ByteSource};
pub use protocol::identifier::{IdentifiedFrame, PacketTrie};
pub use protocol::packet::{Packet, PacketError};
pub use protocol::reader::PacketReader;
pub use protocol::schema::{FieldName, PacketKind, PacketSchema};
pub use protocol::writer::PacketWriter;
