//! Byte source and sink adapters.
//!
//! `stream` wraps anything implementing `std::io::Read`/`Write` (a serial
//! TTY handle, a TCP socket, a pipe). `memory` provides the scripted and
//! recording ends used by tests and examples; a plain `VecDeque<u8>` from
//! `ld2410_core::io` already works as a scripted source.

pub mod memory;
pub mod stream;

pub use memory::{RecordingSink, SilentSource, ZeroSource};
pub use stream::{StreamSink, StreamSource};
