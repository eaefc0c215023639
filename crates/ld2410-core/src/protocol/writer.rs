//! Frame writer: serializes one packet as a single sink write.

use tracing::trace;

use crate::io::ByteSink;
use crate::protocol::packet::Packet;
use crate::protocol::schema::{FRAME_OVERHEAD, TYPE_CODE_SIZE};

/// Serializes packets to a byte sink.
///
/// Frame order on the wire: header (most-significant-byte first), announced
/// length (type code size plus payload size, little-endian), type code (low
/// byte first), payload verbatim, footer (most-significant-byte first). The
/// whole frame is assembled into one buffer and handed to the sink in a
/// single call; the sink's contract is to write all of it before returning.
pub struct PacketWriter<W> {
    sink: W,
}

impl<W: ByteSink> PacketWriter<W> {
    pub fn new(sink: W) -> PacketWriter<W> {
        PacketWriter { sink }
    }

    /// Serializes `packet` and hands the frame to the sink.
    pub fn write(&mut self, packet: &Packet) {
        let schema = packet.schema();
        let payload = packet.payload();
        let announced = (TYPE_CODE_SIZE + payload.len()) as u16;

        let mut frame = Vec::with_capacity(FRAME_OVERHEAD + payload.len());
        frame.extend_from_slice(&schema.header.to_be_bytes());
        frame.extend_from_slice(&announced.to_le_bytes());
        frame.extend_from_slice(&schema.type_code.to_le_bytes());
        frame.extend_from_slice(payload);
        frame.extend_from_slice(&schema.footer.to_be_bytes());

        trace!(kind = ?packet.kind(), bytes = frame.len(), "frame serialized");
        self.sink.write_bytes(&frame);
    }

    /// Consumes the writer, returning the wrapped sink.
    pub fn into_sink(self) -> W {
        self.sink
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
