//! Frame identification: a prefix trie over the discriminating wire bytes.
//!
//! All command traffic shares one 4-byte header and all report traffic
//! another; what tells two frames apart is the 2-byte type code that arrives
//! *after* the length field. Identification therefore cannot wait for a
//! complete frame: the walker consumes the stream one byte at a time,
//! narrowing the candidate set at every step, and knows the schema the
//! moment the last type-code byte arrives.
//!
//! The trie is keyed on the six discriminator bytes of each schema (header
//! in wire order, then the type code low byte first). Schemas sharing a
//! prefix share nodes, so the whole registry collapses into two header
//! chains that fan out at the type code. The length field sits between
//! header and type code on the wire; it is not part of the discriminator,
//! and the walker captures it in passing after the fourth header byte.
//!
//! Nodes live in an arena `Vec` addressed by index. The arena is built once
//! from the static registry, is never mutated afterwards, and is shared
//! process-wide through [`PacketTrie::global`].

use std::sync::OnceLock;

use tracing::trace;

use crate::io::ByteSource;
use crate::protocol::schema::{PacketSchema, HEADER_SIZE, REGISTRY};

/// Result of a successful identification walk.
#[derive(Debug, Clone, Copy)]
pub struct IdentifiedFrame {
    /// The length announced between header and type code. Counts the type
    /// code itself plus the payload.
    pub announced_len: u16,
    pub schema: &'static PacketSchema,
}

#[derive(Debug, Clone, Copy)]
enum Transition {
    /// Another discriminator byte is needed; continue at this arena index.
    Descend(usize),
    /// The discriminator is complete; this schema is arriving.
    Accept(&'static PacketSchema),
}

#[derive(Debug, Default)]
struct TrieNode {
    edges: Vec<(u8, Transition)>,
}

impl TrieNode {
    fn transition(&self, byte: u8) -> Option<Transition> {
        self.edges
            .iter()
            .find(|(edge, _)| *edge == byte)
            .map(|(_, transition)| *transition)
    }
}

/// The identification trie. Build once, walk many times.
#[derive(Debug)]
pub struct PacketTrie {
    nodes: Vec<TrieNode>,
}

static GLOBAL: OnceLock<PacketTrie> = OnceLock::new();

impl PacketTrie {
    /// Builds a trie over `schemas`. Discriminators must be unique, which
    /// the registry tests guarantee for [`REGISTRY`].
    pub fn build(schemas: &'static [PacketSchema]) -> PacketTrie {
        let mut nodes = vec![TrieNode::default()];
        for schema in schemas {
            let discriminator = schema.discriminator();
            let mut node = 0;
            let last = discriminator[discriminator.len() - 1];
            for &byte in &discriminator[..discriminator.len() - 1] {
                let existing = nodes[node].edges.iter().find_map(|(edge, transition)| {
                    match transition {
                        Transition::Descend(child) if *edge == byte => Some(*child),
                        _ => None,
                    }
                });
                node = match existing {
                    Some(child) => child,
                    None => {
                        let child = nodes.len();
                        nodes.push(TrieNode::default());
                        nodes[node].edges.push((byte, Transition::Descend(child)));
                        child
                    }
                };
            }
            nodes[node].edges.push((last, Transition::Accept(schema)));
        }
        PacketTrie { nodes }
    }

    /// The process-wide trie over the full registry.
    pub fn global() -> &'static PacketTrie {
        GLOBAL.get_or_init(|| PacketTrie::build(&REGISTRY))
    }

    /// Walks the trie against `source`, one byte per step.
    ///
    /// Returns `None` when a byte matches no transition (unrecognized
    /// traffic; the bytes consumed so far are dropped and the caller simply
    /// tries again, which scans the stream forward) or when the source has
    /// no byte to give. After the four header bytes the walker reads the
    /// little-endian length field before resuming with the type code.
    pub fn identify<S: ByteSource + ?Sized>(&self, source: &mut S) -> Option<IdentifiedFrame> {
        let mut node = 0;
        let mut depth = 0;
        let mut announced_len = 0u16;
        loop {
            if depth == HEADER_SIZE {
                announced_len = read_u16_le(source)?;
            }
            let byte = source.read_byte()?;
            match self.nodes[node].transition(byte) {
                Some(Transition::Descend(child)) => {
                    node = child;
                    depth += 1;
                }
                Some(Transition::Accept(schema)) => {
                    return Some(IdentifiedFrame {
                        announced_len,
                        schema,
                    });
                }
                None => {
                    trace!(byte, depth, "byte matches no known frame; resyncing");
                    return None;
                }
            }
        }
    }

    /// Number of arena nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

fn read_u16_le<S: ByteSource + ?Sized>(source: &mut S) -> Option<u16> {
    let low = source.read_byte()?;
    let high = source.read_byte()?;
    Some(u16::from(low) | u16::from(high) << 8)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::schema::{PacketKind, DISCRIMINATOR_LEN};
    use std::collections::VecDeque;

    fn stream(bytes: &[u8]) -> VecDeque<u8> {
        VecDeque::from(bytes.to_vec())
    }

    #[test]
    fn test_shared_prefixes_share_nodes() {
        let trie = PacketTrie::build(&REGISTRY);
        // Without sharing, 24 schemas of 6 bytes each would need
        // 24 * (DISCRIMINATOR_LEN - 1) interior nodes plus the root.
        let unshared = REGISTRY.len() * (DISCRIMINATOR_LEN - 1) + 1;
        assert!(
            trie.node_count() < unshared / 2,
            "expected heavy prefix sharing, got {} nodes",
            trie.node_count()
        );
        // Two traffic classes means exactly two edges out of the root.
        assert_eq!(trie.nodes[0].edges.len(), 2);
    }

    #[test]
    fn test_identifies_basic_report_and_captures_length() {
        let mut source = stream(&[0xF4, 0xF3, 0xF2, 0xF1, 0x0D, 0x00, 0x02, 0xAA]);
        let frame = PacketTrie::global().identify(&mut source).unwrap();
        assert_eq!(frame.schema.kind, PacketKind::BasicReport);
        assert_eq!(frame.announced_len, 0x000D);
        assert!(source.is_empty(), "walk must consume exactly the prefix");
    }

    #[test]
    fn test_disambiguates_same_header_type_codes_back_to_back() {
        // Engineering report and basic report share the full 4-byte header
        // and the first type-code byte position only differs in value.
        let mut source = stream(&[
            0xF4, 0xF3, 0xF2, 0xF1, 0x23, 0x00, 0x01, 0xAA, // engineering
            0xF4, 0xF3, 0xF2, 0xF1, 0x0D, 0x00, 0x02, 0xAA, // basic
        ]);
        let trie = PacketTrie::global();
        let first = trie.identify(&mut source).unwrap();
        let second = trie.identify(&mut source).unwrap();
        assert_eq!(first.schema.kind, PacketKind::EngineeringReport);
        assert_eq!(first.announced_len, 0x0023);
        assert_eq!(second.schema.kind, PacketKind::BasicReport);
    }

    #[test]
    fn test_command_and_ack_diverge_on_the_last_byte() {
        let mut source = stream(&[0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0xFF, 0x00]);
        let command = PacketTrie::global().identify(&mut source).unwrap();
        assert_eq!(command.schema.kind, PacketKind::EnableConfiguration);

        let mut source = stream(&[0xFD, 0xFC, 0xFB, 0xFA, 0x08, 0x00, 0xFF, 0x01]);
        let ack = PacketTrie::global().identify(&mut source).unwrap();
        assert_eq!(ack.schema.kind, PacketKind::EnableConfigurationAck);
    }

    #[test]
    fn test_unknown_byte_fails_the_walk() {
        let mut source = stream(&[0x00, 0xF4, 0xF3]);
        assert!(PacketTrie::global().identify(&mut source).is_none());
        // Only the offending byte was consumed; the next walk starts after it.
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_mismatch_mid_header_drops_the_partial_prefix() {
        let mut garbage_then_frame = stream(&[
            0xF4, 0x00, // looks like a report header, then diverges
            0xF4, 0xF3, 0xF2, 0xF1, 0x0D, 0x00, 0x02, 0xAA,
        ]);
        let trie = PacketTrie::global();
        assert!(trie.identify(&mut garbage_then_frame).is_none());
        let frame = trie.identify(&mut garbage_then_frame).unwrap();
        assert_eq!(frame.schema.kind, PacketKind::BasicReport);
    }

    #[test]
    fn test_exhausted_source_aborts_the_walk() {
        let mut source = stream(&[0xF4, 0xF3]);
        assert!(PacketTrie::global().identify(&mut source).is_none());

        // Running dry inside the length field aborts too.
        let mut source = stream(&[0xF4, 0xF3, 0xF2, 0xF1, 0x0D]);
        assert!(PacketTrie::global().identify(&mut source).is_none());
    }

    #[test]
    fn test_unknown_type_code_under_known_header() {
        let mut source = stream(&[0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0x7B, 0x00]);
        assert!(PacketTrie::global().identify(&mut source).is_none());
    }
}
