//! # ld2410-driver
//!
//! Driver for the HLK-LD2410 presence radar, built on the
//! [`ld2410_core`] protocol library.
//!
//! The device speaks one protocol shape for everything: the host writes a
//! command frame and the sensor answers with an acknowledgement frame whose
//! identity is derived from the command's, while asynchronous target reports
//! keep arriving interleaved on the same line. The [`Commander`] hides that
//! dance: each method builds the command packet, sends it, discards
//! unrelated traffic until the matching ack arrives or a deadline passes,
//! and maps the ack's status word onto a typed result.
//!
//! Layout follows the use-case/adapter split:
//!
//! - **`application`** – the commander/correlator and the typed parameter
//!   and result structs for every device command.
//! - **`infrastructure`** – byte transport adapters: buffered `std::io`
//!   stream wrappers for real links, in-memory sources and sinks for tests
//!   and examples.

pub mod application;
pub mod infrastructure;

pub use application::commander::{CommandError, Commander, DEFAULT_COMMAND_TIMEOUT};
pub use application::types::{
    ConfigurationHandshake, FirmwareVersion, GateParameters, GateSensitivity,
    MaxDistanceAndDuration, SerialBaudRate, TargetReport,
};
pub use infrastructure::transport::memory::{RecordingSink, SilentSource, ZeroSource};
pub use infrastructure::transport::stream::{StreamSink, StreamSource};
