//! Adapters from `std::io` streams to the byte-level capability traits.

use std::io::{self, Read, Write};

use tracing::warn;

use ld2410_core::{ByteSink, ByteSource};

/// How many bytes one refill pulls from the inner stream.
const BUFFER_CAPACITY: usize = 64;

/// A byte source over any blocking `io::Read` stream.
///
/// Owns a fixed-capacity buffer that is refilled in bulk and drained one
/// byte at a time, so the per-byte polling of the identification walk does
/// not turn into per-byte syscalls. The buffer belongs to exactly this
/// source; nothing else sees or shares it.
///
/// `None` from `read_byte` means end of stream, nothing currently pending
/// on a non-blocking handle, or a hard read error (which is logged). A
/// blocking serial handle with a read timeout behaves exactly like the
/// device: bytes while the sensor talks, `None` while it is quiet.
pub struct StreamSource<R> {
    inner: R,
    buffer: [u8; BUFFER_CAPACITY],
    cursor: usize,
    pending: usize,
}

impl<R: Read> StreamSource<R> {
    pub fn new(inner: R) -> StreamSource<R> {
        StreamSource {
            inner,
            buffer: [0; BUFFER_CAPACITY],
            cursor: 0,
            pending: 0,
        }
    }

    fn refill(&mut self) -> bool {
        loop {
            match self.inner.read(&mut self.buffer) {
                Ok(0) => return false,
                Ok(read) => {
                    self.cursor = 0;
                    self.pending = read;
                    return true;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::TimedOut =>
                {
                    return false
                }
                Err(e) => {
                    warn!(error = %e, "byte source read failed");
                    return false;
                }
            }
        }
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn read_byte(&mut self) -> Option<u8> {
        if self.pending == 0 && !self.refill() {
            return None;
        }
        let byte = self.buffer[self.cursor];
        self.cursor += 1;
        self.pending -= 1;
        Some(byte)
    }
}

/// A byte sink over any `io::Write` stream.
///
/// Short writes are retried until the frame is fully handed over, matching
/// the sink capability's all-or-nothing contract. A hard error drops the
/// rest of the frame with a warning; the command layer then simply times
/// out waiting for an ack, which is the driver's normal failure path.
pub struct StreamSink<W> {
    inner: W,
}

impl<W: Write> StreamSink<W> {
    pub fn new(inner: W) -> StreamSink<W> {
        StreamSink { inner }
    }

    /// Consumes the adapter, returning the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for StreamSink<W> {
    fn write_bytes(&mut self, data: &[u8]) {
        let mut remaining = data;
        while !remaining.is_empty() {
            match self.inner.write(remaining) {
                Ok(0) => {
                    warn!(unwritten = remaining.len(), "sink closed mid-frame");
                    return;
                }
                Ok(written) => remaining = &remaining[written..],
                Err(e)
                    if e.kind() == io::ErrorKind::Interrupted
                        || e.kind() == io::ErrorKind::WouldBlock =>
                {
                    continue
                }
                Err(e) => {
                    warn!(error = %e, unwritten = remaining.len(), "dropping frame tail after sink error");
                    return;
                }
            }
        }
        self.inner.flush().ok();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// A reader that hands out its data in fixed-size chunks, the way a
    /// serial driver trickles bytes in.
    struct ChunkedReader {
        data: Vec<u8>,
        position: usize,
        chunk: usize,
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let end = (self.position + self.chunk).min(self.data.len());
            let slice = &self.data[self.position..end];
            buf[..slice.len()].copy_from_slice(slice);
            self.position = end;
            Ok(slice.len())
        }
    }

    /// A writer that accepts at most two bytes per call.
    struct DribbleWriter {
        written: Vec<u8>,
    }

    impl Write for DribbleWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let take = buf.len().min(2);
            self.written.extend_from_slice(&buf[..take]);
            Ok(take)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_source_drains_across_refills() {
        let mut source = StreamSource::new(ChunkedReader {
            data: (0..10).collect(),
            position: 0,
            chunk: 3,
        });
        let drained: Vec<u8> = std::iter::from_fn(|| source.read_byte()).collect();
        assert_eq!(drained, (0..10).collect::<Vec<u8>>());
        assert_eq!(source.read_byte(), None);
    }

    #[test]
    fn test_source_reports_none_at_end_of_stream() {
        let mut source = StreamSource::new(io::Cursor::new(vec![0xAB]));
        assert_eq!(source.read_byte(), Some(0xAB));
        assert_eq!(source.read_byte(), None);
    }

    #[test]
    fn test_sink_retries_short_writes_to_completion() {
        let mut sink = StreamSink::new(DribbleWriter { written: Vec::new() });
        sink.write_bytes(&[1, 2, 3, 4, 5]);
        assert_eq!(sink.into_inner().written, vec![1, 2, 3, 4, 5]);
    }
}
