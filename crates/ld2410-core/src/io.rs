//! Byte-level capability traits consumed by the framing layer.
//!
//! The protocol code never talks to a transport directly; it pulls single
//! bytes from a [`ByteSource`] and pushes whole frames into a [`ByteSink`].
//! Concrete adapters (serial streams, in-memory scripts, recording sinks)
//! live with the driver, not here.
//!
//! # The no-data signal
//!
//! `read_byte` returns `None` when no byte is currently available: the
//! scripted data ran out, the stream hit end-of-file, or nothing is pending
//! on a non-blocking handle. Some UART register interfaces can only report
//! `0x00` for "nothing pending"; such an adapter is still expressible (it
//! returns `Some(0)` forever) and the timeout-bounded command loop tolerates
//! it, but adapters that *can* tell the difference should say `None`.

use std::collections::VecDeque;

/// Produces one byte at a time from a full-duplex link.
///
/// A return of `None` means "no byte available right now"; it is not an
/// error. The framing layer gives up on the current frame and the caller
/// retries on its next poll.
pub trait ByteSource {
    fn read_byte(&mut self) -> Option<u8>;
}

/// Accepts a buffer of bytes and writes all of it before returning.
///
/// Implementations retry short writes internally; a frame is either fully
/// handed to the underlying transport or dropped by the adapter.
pub trait ByteSink {
    fn write_bytes(&mut self, data: &[u8]);
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
}

impl<W: ByteSink + ?Sized> ByteSink for &mut W {
    fn write_bytes(&mut self, data: &[u8]) {
        (**self).write_bytes(data)
    }
}

/// A `VecDeque` of bytes is a ready-made scripted source: bytes come out
/// front to back and exhaustion is the no-data signal.
impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self) -> Option<u8> {
        self.pop_front()
    }
}

/// A plain `Vec` accumulates everything written to it, in order.
impl ByteSink for Vec<u8> {
    fn write_bytes(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vecdeque_source_drains_front_to_back() {
        let mut source = VecDeque::from(vec![0x01, 0x02]);
        assert_eq!(source.read_byte(), Some(0x01));
        assert_eq!(source.read_byte(), Some(0x02));
        assert_eq!(source.read_byte(), None);
    }

    #[test]
    fn test_vec_sink_appends_in_order() {
        let mut sink = Vec::new();
        sink.write_bytes(&[0xAA]);
        sink.write_bytes(&[0xBB, 0xCC]);
        assert_eq!(sink, vec![0xAA, 0xBB, 0xCC]);
    }
}
