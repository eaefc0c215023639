//! In-memory transport ends for tests and examples.
//!
//! The scripted-source side is a plain `VecDeque<u8>` (the core crate
//! implements `ByteSource` for it). This module adds the pieces that need
//! more than that: a sink whose contents remain inspectable after the
//! commander has taken ownership of it, and the two degenerate sources used
//! to exercise timeout behavior.

use std::sync::{Arc, Mutex};

use ld2410_core::{ByteSink, ByteSource};

/// A sink that records every byte written to it.
///
/// Cloning shares the underlying buffer, so a test can keep one handle,
/// hand the other to a `PacketWriter`, and assert on the recorded frames
/// afterwards.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    written: Arc<Mutex<Vec<u8>>>,
}

impl RecordingSink {
    pub fn new() -> RecordingSink {
        RecordingSink::default()
    }

    /// Everything written so far, in order.
    pub fn contents(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }
}

impl ByteSink for RecordingSink {
    fn write_bytes(&mut self, data: &[u8]) {
        self.written.lock().unwrap().extend_from_slice(data);
    }
}

/// A source that never has data. A command sent against it can only time
/// out.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSource;

impl ByteSource for SilentSource {
    fn read_byte(&mut self) -> Option<u8> {
        None
    }
}

/// A source that answers every poll with `0x00`, emulating UART adapters
/// that cannot distinguish "no data pending" from a genuine zero byte. The
/// identification trie treats the zeros as unrecognized traffic, so callers
/// see an endless stream of failed walks rather than garbage packets.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroSource;

impl ByteSource for ZeroSource {
    fn read_byte(&mut self) -> Option<u8> {
        Some(0)
    }
}
