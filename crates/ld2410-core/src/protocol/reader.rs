//! Frame reader: one identification walk plus one payload pull per call.

use tracing::trace;

use crate::io::ByteSource;
use crate::protocol::identifier::PacketTrie;
use crate::protocol::packet::Packet;
use crate::protocol::schema::TYPE_CODE_SIZE;

/// Pulls whole packets off a byte source.
///
/// Each [`read`](PacketReader::read) performs a single trie walk. Nothing is
/// buffered across calls: a call that returns `None` (unrecognized bytes,
/// or no data available) has consumed whatever it looked at, and the next
/// call picks up further along the stream. That is the resynchronization
/// strategy; after line noise or an unconsumed footer, a handful of failed
/// walks land the reader back on the next genuine header.
///
/// The reader itself never blocks; whether `read` waits for data is decided
/// entirely by the source it wraps.
pub struct PacketReader<S> {
    source: S,
    trie: &'static PacketTrie,
}

impl<S: ByteSource> PacketReader<S> {
    /// A reader over `source`, identifying against the full registry.
    pub fn new(source: S) -> PacketReader<S> {
        PacketReader {
            source,
            trie: PacketTrie::global(),
        }
    }

    /// Tries to pull one packet. `None` means "no packet this call".
    ///
    /// On successful identification the announced length (which counts the
    /// type code) determines how many payload bytes to pull; the footer is
    /// left on the stream and skipped by subsequent walks. A source that
    /// runs out of bytes mid-payload aborts the frame.
    pub fn read(&mut self) -> Option<Packet> {
        let frame = self.trie.identify(&mut self.source)?;
        let payload_len = usize::from(frame.announced_len).saturating_sub(TYPE_CODE_SIZE);
        let mut payload = Vec::with_capacity(payload_len);
        for _ in 0..payload_len {
            payload.push(self.source.read_byte()?);
        }
        let packet = Packet::from_payload(frame.schema, payload);
        trace!(kind = ?packet.kind(), len = frame.announced_len, "frame decoded");
        Some(packet)
    }

    /// Consumes the reader, returning the wrapped source.
    pub fn into_source(self) -> S {
        self.source
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::schema::{FieldName, PacketKind};
    use std::collections::VecDeque;

    const BASIC_REPORT_FRAME: [u8; 23] = [
        0xF4, 0xF3, 0xF2, 0xF1, 0x0D, 0x00, 0x02, 0xAA, 0x02, 0x51, 0x01, 0x00, 0x00, 0x00,
        0x3B, 0x00, 0x00, 0x55, 0x00, 0xF8, 0xF7, 0xF6, 0xF5,
    ];

    #[test]
    fn test_reads_the_captured_basic_report() {
        let mut reader = PacketReader::new(VecDeque::from(BASIC_REPORT_FRAME.to_vec()));
        let packet = reader.read().expect("frame must decode");
        assert_eq!(packet.kind(), PacketKind::BasicReport);
        assert_eq!(packet.read(FieldName::TargetState), Some(0x02));
        assert_eq!(packet.read(FieldName::MovementTargetDistance), Some(0x0151));
        assert_eq!(packet.read(FieldName::StationaryTargetEnergy), Some(0x3B));
        assert_eq!(packet.read(FieldName::Tail), Some(0x55));
    }

    #[test]
    fn test_resyncs_over_the_footer_between_frames() {
        let mut bytes = BASIC_REPORT_FRAME.to_vec();
        bytes.extend_from_slice(&BASIC_REPORT_FRAME);
        let mut reader = PacketReader::new(VecDeque::from(bytes));

        assert!(reader.read().is_some());
        // The four footer bytes cost at most four failed walks.
        let mut attempts = 0;
        let second = loop {
            attempts += 1;
            assert!(attempts <= 5, "reader failed to resynchronize");
            if let Some(packet) = reader.read() {
                break packet;
            }
        };
        assert_eq!(second.kind(), PacketKind::BasicReport);
    }

    #[test]
    fn test_reads_engineering_report_with_gate_energies() {
        // Captured engineering frame: announced length 0x23, eight moving
        // and eight static gates.
        let frame: &[u8] = &[
            0xF4, 0xF3, 0xF2, 0xF1, 0x23, 0x00, 0x01, 0xAA, 0x03, 0x1E, 0x00, 0x3C, 0x00, 0x00,
            0x39, 0x00, 0x00, 0x08, 0x08, 0x3C, 0x22, 0x05, 0x03, 0x03, 0x04, 0x03, 0x06, 0x05,
            0x00, 0x00, 0x39, 0x10, 0x13, 0x06, 0x06, 0x08, 0x04, 0x03, 0x05, 0x55, 0x00, 0xF8,
            0xF7, 0xF6, 0xF5,
        ];
        let mut reader = PacketReader::new(VecDeque::from(frame.to_vec()));
        let packet = reader.read().expect("frame must decode");
        assert_eq!(packet.kind(), PacketKind::EngineeringReport);
        assert_eq!(packet.read(FieldName::TargetState), Some(0x03));
        assert_eq!(packet.read(FieldName::MovementTargetDistance), Some(0x1E));
        assert_eq!(packet.read(FieldName::MovementTargetEnergy), Some(0x3C));
        assert_eq!(packet.read(FieldName::StationaryTargetEnergy), Some(0x39));
        assert_eq!(
            packet.read_all(FieldName::GateMotionEnergy),
            vec![0x3C, 0x22, 0x05, 0x03, 0x03, 0x04, 0x03, 0x06]
        );
        assert_eq!(
            packet.read_all(FieldName::GateStaticEnergy),
            vec![0x05, 0x00, 0x00, 0x39, 0x10, 0x13, 0x06, 0x06]
        );
    }

    #[test]
    fn test_truncated_payload_yields_no_packet() {
        let mut reader =
            PacketReader::new(VecDeque::from(BASIC_REPORT_FRAME[..14].to_vec()));
        assert!(reader.read().is_none());
    }

    #[test]
    fn test_empty_source_yields_no_packet() {
        let mut reader = PacketReader::new(VecDeque::new());
        assert!(reader.read().is_none());
    }

    #[test]
    fn test_reads_command_ack_frames() {
        // EnableConfigurationAck: status 0, protocol version 1, buffer 0x40.
        let frame: &[u8] = &[
            0xFD, 0xFC, 0xFB, 0xFA, 0x08, 0x00, 0xFF, 0x01, 0x00, 0x00, 0x01, 0x00, 0x40, 0x00,
            0x04, 0x03, 0x02, 0x01,
        ];
        let mut reader = PacketReader::new(VecDeque::from(frame.to_vec()));
        let packet = reader.read().expect("ack must decode");
        assert_eq!(packet.kind(), PacketKind::EnableConfigurationAck);
        assert_eq!(packet.read(FieldName::Status), Some(0));
        assert_eq!(packet.read(FieldName::ProtocolVersion), Some(1));
        assert_eq!(packet.read(FieldName::BufferSize), Some(0x40));
    }
}
