//! Packet instances: a flat payload buffer plus a precomputed offset table.
//!
//! A [`Packet`] binds a payload to its [`PacketSchema`]. At construction the
//! schema's field rules are expanded into *materialized occurrences*: a fixed
//! rule contributes one occurrence, a repeated rule contributes as many as
//! the current value of its count field dictates. The expansion produces one
//! byte offset per occurrence, so named reads and writes afterwards are a
//! table lookup, never a re-parse.
//!
//! The expansion is recomputed every time an instance is built and never
//! again: writing a count field into an existing instance does not
//! retroactively add occurrences. On the encode path all bytes start at
//! zero, so repeated fields materialize with zero occurrences unless the
//! instance was built from received bytes that say otherwise.

use std::fmt;

use thiserror::Error;

use crate::protocol::schema::{FieldKind, FieldName, PacketKind, PacketSchema};

/// Errors from the field codec.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    /// The packet has fewer occurrences of the field than requested.
    #[error("{kind:?} has no occurrence {occurrence} of field {field:?}")]
    NoSuchField {
        kind: PacketKind,
        field: FieldName,
        occurrence: usize,
    },

    /// The occurrence's byte range falls outside the fixed buffer. The
    /// buffer is never resized after construction.
    #[error("field {field:?} spans bytes {start}..{end} outside the {len}-byte buffer")]
    OutOfRange {
        field: FieldName,
        start: usize,
        end: usize,
        len: usize,
    },

    /// A typed view was asked to interpret a packet of the wrong kind.
    #[error("expected a {expected:?} packet, got {actual:?}")]
    WrongKind {
        expected: PacketKind,
        actual: PacketKind,
    },
}

/// A decoded or under-construction packet bound to its schema.
#[derive(Debug, Clone)]
pub struct Packet {
    schema: &'static PacketSchema,
    data: Vec<u8>,
    /// Byte offset of each materialized occurrence, plus a terminal entry
    /// equal to the total laid-out size.
    offsets: Vec<u16>,
    /// Name and byte size of each materialized occurrence, in layout order.
    occurrences: Vec<(FieldName, u16)>,
}

impl Packet {
    /// Builds a zero-valued instance for `kind` (the encode path).
    ///
    /// Every fixed field is materialized and zero-filled; repeated fields
    /// resolve their counts against the all-zero buffer and therefore
    /// materialize zero occurrences.
    pub fn new(kind: PacketKind) -> Packet {
        let mut packet = Packet {
            schema: kind.schema(),
            data: Vec::new(),
            offsets: Vec::new(),
            occurrences: Vec::new(),
        };
        packet.lay_out_fields(true);
        packet
    }

    /// Binds already-received payload bytes to `schema` (the decode path).
    ///
    /// Repeated-field counts are resolved by reading the count field from
    /// the bytes laid out so far, in declaration order; a count field that
    /// cannot be read resolves to zero. The buffer is kept verbatim, so a
    /// payload longer than the laid-out region keeps its trailing bytes
    /// (some device firmwares append extras) and a shorter one simply yields
    /// `None` for the fields it cannot back.
    pub fn from_payload(schema: &'static PacketSchema, payload: Vec<u8>) -> Packet {
        let mut packet = Packet {
            schema,
            data: payload,
            offsets: Vec::new(),
            occurrences: Vec::new(),
        };
        packet.lay_out_fields(false);
        packet
    }

    fn lay_out_fields(&mut self, grow: bool) {
        let mut cursor: u16 = 0;
        for rule in self.schema.fields {
            let (size, count) = match rule.kind {
                FieldKind::Fixed(size) => (size, 1),
                FieldKind::Repeated {
                    element_size,
                    count_field,
                } => (element_size, self.read(count_field).unwrap_or(0) as usize),
            };
            for _ in 0..count {
                self.offsets.push(cursor);
                self.occurrences.push((rule.name, size));
                if grow {
                    self.data.resize(self.data.len() + size as usize, 0);
                }
                cursor += size;
            }
        }
        self.offsets.push(cursor);
    }

    pub fn kind(&self) -> PacketKind {
        self.schema.kind
    }

    pub fn schema(&self) -> &'static PacketSchema {
        self.schema
    }

    /// The raw payload bytes (everything between type code and footer).
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    /// Number of materialized occurrences of `name`.
    pub fn occurrences_of(&self, name: FieldName) -> usize {
        self.occurrences.iter().filter(|(f, _)| *f == name).count()
    }

    /// Reads the first occurrence of `name` as an unsigned little-endian
    /// integer, or `None` if the field is absent or its bytes fall outside
    /// the buffer.
    pub fn read(&self, name: FieldName) -> Option<u32> {
        self.read_nth(name, 0)
    }

    /// Reads the n-th occurrence (0-indexed) of `name`.
    pub fn read_nth(&self, name: FieldName, n: usize) -> Option<u32> {
        self.read_at(self.nth_index(name, n)?)
    }

    /// Every readable occurrence of `name`, in layout order.
    pub fn read_all(&self, name: FieldName) -> Vec<u32> {
        (0..self.occurrences.len())
            .filter(|&index| self.occurrences[index].0 == name)
            .filter_map(|index| self.read_at(index))
            .collect()
    }

    /// Writes `value` into the first occurrence of `name`.
    pub fn write(&mut self, name: FieldName, value: u32) -> Result<(), PacketError> {
        self.write_nth(name, 0, value)
    }

    /// Writes `value` into the n-th occurrence of `name`.
    ///
    /// # Errors
    ///
    /// [`PacketError::NoSuchField`] if fewer than `n + 1` occurrences exist;
    /// [`PacketError::OutOfRange`] if the occurrence's byte range exceeds
    /// the fixed buffer (the buffer is never grown to fit a write).
    pub fn write_nth(
        &mut self,
        name: FieldName,
        n: usize,
        value: u32,
    ) -> Result<(), PacketError> {
        let index = self.nth_index(name, n).ok_or(PacketError::NoSuchField {
            kind: self.kind(),
            field: name,
            occurrence: n,
        })?;
        let start = usize::from(self.offsets[index]);
        let size = usize::from(self.occurrences[index].1);
        if start + size > self.data.len() {
            return Err(PacketError::OutOfRange {
                field: name,
                start,
                end: start + size,
                len: self.data.len(),
            });
        }
        for (i, slot) in self.data[start..start + size].iter_mut().enumerate() {
            *slot = (value >> (8 * i)) as u8;
        }
        Ok(())
    }

    fn nth_index(&self, name: FieldName, n: usize) -> Option<usize> {
        self.occurrences
            .iter()
            .enumerate()
            .filter(|(_, (f, _))| *f == name)
            .nth(n)
            .map(|(index, _)| index)
    }

    fn read_at(&self, index: usize) -> Option<u32> {
        let start = usize::from(self.offsets[index]);
        let size = usize::from(self.occurrences[index].1);
        if start + size > self.data.len() {
            return None;
        }
        let mut value = 0u32;
        for (i, &byte) in self.data[start..start + size].iter().enumerate() {
            value |= u32::from(byte) << (8 * i);
        }
        Some(value)
    }

    /// Type code and payload as an uppercase hex string, for log lines.
    pub fn payload_hex(&self) -> String {
        let mut out = String::with_capacity(2 * (2 + self.data.len()));
        for byte in self
            .schema
            .type_code
            .to_le_bytes()
            .iter()
            .chain(self.data.iter())
        {
            out.push_str(&format!("{byte:02X}"));
        }
        out
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} (header=0x{:08X}, type=0x{:04X}, data size={})",
            self.schema.kind,
            self.schema.header,
            self.schema.type_code,
            self.data.len()
        )?;
        for (index, (name, _)) in self.occurrences.iter().enumerate() {
            match self.read_at(index) {
                Some(value) => write!(f, "\n    {name:?}: {value}")?,
                None => write!(f, "\n    {name:?}: <out of range>")?,
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Payload of the captured basic report frame
    /// `F4 F3 F2 F1 0D 00 02 AA 02 51 01 00 00 00 3B 00 00 55 00 F8 F7 F6 F5`.
    const BASIC_REPORT_PAYLOAD: [u8; 11] = [
        0x02, 0x51, 0x01, 0x00, 0x00, 0x00, 0x3B, 0x00, 0x00, 0x55, 0x00,
    ];

    fn basic_report() -> Packet {
        Packet::from_payload(
            PacketKind::BasicReport.schema(),
            BASIC_REPORT_PAYLOAD.to_vec(),
        )
    }

    #[test]
    fn test_decode_captured_basic_report_fields() {
        let packet = basic_report();
        assert_eq!(packet.read(FieldName::TargetState), Some(0x02));
        assert_eq!(packet.read(FieldName::MovementTargetDistance), Some(0x0151));
        assert_eq!(packet.read(FieldName::MovementTargetEnergy), Some(0x00));
        assert_eq!(packet.read(FieldName::StationaryTargetDistance), Some(0x0000));
        assert_eq!(packet.read(FieldName::StationaryTargetEnergy), Some(0x3B));
        assert_eq!(packet.read(FieldName::DetectionDistance), Some(0x0000));
        assert_eq!(packet.read(FieldName::Tail), Some(0x55));
        assert_eq!(packet.read(FieldName::Check), Some(0x00));
    }

    #[test]
    fn test_offsets_step_by_field_size() {
        let packet = basic_report();
        // 1 + 2 + 1 + 2 + 1 + 2 + 1 + 1 bytes, eight occurrences.
        assert_eq!(packet.offsets, vec![0, 1, 3, 4, 6, 7, 9, 10, 11]);
        assert_eq!(packet.occurrences.len() + 1, packet.offsets.len());
    }

    #[test]
    fn test_new_packet_is_zero_filled_to_fixed_size() {
        let packet = Packet::new(PacketKind::ConfigureMaxDistanceAndDuration);
        assert_eq!(packet.payload().len(), 2 + 4 + 2 + 4 + 2 + 4);
        assert!(packet.payload().iter().all(|&b| b == 0));
        assert_eq!(packet.read(FieldName::MaxMovingDistance), Some(0));
    }

    #[test]
    fn test_write_then_read_little_endian() {
        let mut packet = Packet::new(PacketKind::ConfigureGateSensitivity);
        packet.write(FieldName::GateValue, 0x0001_FFFF).unwrap();
        assert_eq!(packet.read(FieldName::GateValue), Some(0x0001_FFFF));
        // 4-byte field starting after the 2-byte gate word.
        assert_eq!(&packet.payload()[2..6], &[0xFF, 0xFF, 0x01, 0x00]);
    }

    #[test]
    fn test_write_unknown_field_is_rejected() {
        let mut packet = Packet::new(PacketKind::EnableConfiguration);
        let err = packet.write(FieldName::Status, 1).unwrap_err();
        assert_eq!(
            err,
            PacketError::NoSuchField {
                kind: PacketKind::EnableConfiguration,
                field: FieldName::Status,
                occurrence: 0,
            }
        );
    }

    #[test]
    fn test_short_buffer_reads_none_and_write_fails() {
        // Announced payload shorter than the schema lays out: the last two
        // fields have no backing bytes.
        let packet = Packet::from_payload(
            PacketKind::BasicReport.schema(),
            BASIC_REPORT_PAYLOAD[..9].to_vec(),
        );
        assert_eq!(packet.read(FieldName::DetectionDistance), Some(0));
        assert_eq!(packet.read(FieldName::Tail), None);
        assert_eq!(packet.read(FieldName::Check), None);

        let mut packet = packet;
        assert!(matches!(
            packet.write(FieldName::Check, 1),
            Err(PacketError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_repeated_fields_expand_to_count() {
        // ReadParametersAck with GateCount = 3:
        // status(2) header(1) count(1) motion(3) rest(3) duration(2).
        let payload = vec![
            0x00, 0x00, 0xAA, 0x03, 0x14, 0x15, 0x16, 0x19, 0x1A, 0x1B, 0x05, 0x00,
        ];
        let packet = Packet::from_payload(PacketKind::ReadParametersAck.schema(), payload);
        assert_eq!(packet.occurrences_of(FieldName::GateMotionSensitivity), 3);
        assert_eq!(
            packet.read_all(FieldName::GateMotionSensitivity),
            vec![0x14, 0x15, 0x16]
        );
        assert_eq!(
            packet.read_all(FieldName::GateRestSensitivity),
            vec![0x19, 0x1A, 0x1B]
        );
        assert_eq!(packet.read(FieldName::UnmannedDuration), Some(0x0005));
    }

    #[test]
    fn test_zero_count_materializes_no_occurrences() {
        let payload = vec![0x00, 0x00, 0xAA, 0x00, 0x07, 0x00];
        let packet = Packet::from_payload(PacketKind::ReadParametersAck.schema(), payload);
        assert_eq!(packet.occurrences_of(FieldName::GateMotionSensitivity), 0);
        assert!(packet.read_all(FieldName::GateMotionSensitivity).is_empty());
        assert_eq!(packet.read(FieldName::GateMotionSensitivity), None);
        // The duration still lands directly after the count field.
        assert_eq!(packet.read(FieldName::UnmannedDuration), Some(0x0007));
    }

    #[test]
    fn test_count_written_after_construction_adds_nothing() {
        let mut packet = Packet::new(PacketKind::ReadParametersAck);
        packet.write(FieldName::GateCount, 4).unwrap();
        // Expansion happened at construction time with count 0.
        assert_eq!(packet.occurrences_of(FieldName::GateMotionSensitivity), 0);
        assert_eq!(packet.read(FieldName::GateCount), Some(4));
    }

    #[test]
    fn test_read_nth_and_write_nth_address_single_occurrences() {
        let payload = vec![0x00, 0x00, 0xAA, 0x02, 0x01, 0x02, 0x03, 0x04, 0x00, 0x00];
        let mut packet = Packet::from_payload(PacketKind::ReadParametersAck.schema(), payload);
        assert_eq!(packet.read_nth(FieldName::GateMotionSensitivity, 1), Some(0x02));
        assert_eq!(packet.read_nth(FieldName::GateMotionSensitivity, 2), None);

        packet.write_nth(FieldName::GateMotionSensitivity, 1, 0x7F).unwrap();
        assert_eq!(packet.read_nth(FieldName::GateMotionSensitivity, 1), Some(0x7F));
        assert!(matches!(
            packet.write_nth(FieldName::GateMotionSensitivity, 2, 0),
            Err(PacketError::NoSuchField { occurrence: 2, .. })
        ));
    }

    #[test]
    fn test_trailing_payload_bytes_are_kept_verbatim() {
        // Engineering firmwares append bytes past the schema's layout; they
        // must survive in the buffer without disturbing field reads.
        let mut payload = BASIC_REPORT_PAYLOAD.to_vec();
        payload.extend_from_slice(&[0xDE, 0xAD]);
        let packet = Packet::from_payload(PacketKind::BasicReport.schema(), payload);
        assert_eq!(packet.read(FieldName::Tail), Some(0x55));
        assert_eq!(packet.payload().len(), 13);
    }

    #[test]
    fn test_display_names_every_occurrence() {
        let text = basic_report().to_string();
        assert!(text.starts_with("BasicReport"));
        assert!(text.contains("TargetState: 2"));
        assert!(text.contains("StationaryTargetEnergy: 59"));
    }

    #[test]
    fn test_payload_hex_leads_with_the_type_code() {
        let packet = basic_report();
        assert!(packet.payload_hex().starts_with("02AA"));
        assert!(packet.payload_hex().ends_with("5500"));
    }
}
