//! The command/acknowledgement correlator and the typed command facade.
//!
//! Every device command follows one protocol shape. Per invocation the
//! correlator moves through `Idle -> Sent -> { Acked | TimedOut }`:
//!
//! - `Idle -> Sent`: build a zero-valued packet for the command's identity,
//!   apply the caller's field values, hand it to the writer.
//! - `Sent -> Acked`: poll the reader until a decoded packet's identity
//!   equals the ack transform of the sent identity. Unrelated packets (the
//!   sensor keeps streaming reports while being configured) are discarded,
//!   not buffered.
//! - `Sent -> TimedOut`: once the monotonic clock passes the deadline the
//!   command is reported unanswered. This is a busy poll; the caller owns
//!   the decision to retry.
//!
//! The typed methods map ack status `0` to success and anything else to
//! [`CommandError::Rejected`].

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use ld2410_core::{
    ByteSink, ByteSource, FieldName, Packet, PacketError, PacketKind, PacketReader, PacketWriter,
};

use crate::application::types::{
    ConfigurationHandshake, FirmwareVersion, GateParameters, GateSensitivity,
    MaxDistanceAndDuration, SerialBaudRate,
};

/// Deadline applied when the caller does not pick one.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_millis(5000);

/// Outcomes of a command that did not logically succeed. None of these are
/// fatal; the link stays usable.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No matching acknowledgement arrived before the deadline.
    #[error("no acknowledgement within {0:?}")]
    NoResponse(Duration),

    /// The acknowledgement arrived with a nonzero status word. An ack whose
    /// status cannot be read at all reports `0xFFFF`.
    #[error("device rejected the command with status {0:#06X}")]
    Rejected(u16),

    /// The packet handed to the correlator has no ack counterpart (report
    /// frames, or an ack passed by mistake).
    #[error("{0:?} is not an acknowledgeable command")]
    NotAcknowledgeable(PacketKind),

    /// Building the command packet failed.
    #[error(transparent)]
    Packet(#[from] PacketError),
}

/// Sends commands and waits for their acknowledgements on one serial link.
///
/// Owns the link's reader and writer; the design assumes a single logical
/// thread of control per physical link, so there is nothing to lock.
pub struct Commander<S, W> {
    reader: PacketReader<S>,
    writer: PacketWriter<W>,
    timeout: Duration,
}

impl<S: ByteSource, W: ByteSink> Commander<S, W> {
    pub fn new(reader: PacketReader<S>, writer: PacketWriter<W>) -> Commander<S, W> {
        Commander {
            reader,
            writer,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Replaces the per-command deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Commander<S, W> {
        self.timeout = timeout;
        self
    }

    /// Direct access to the link's reader, for draining report frames
    /// between commands.
    pub fn reader_mut(&mut self) -> &mut PacketReader<S> {
        &mut self.reader
    }

    /// Dissolves the commander back into its reader and writer.
    pub fn into_parts(self) -> (PacketReader<S>, PacketWriter<W>) {
        (self.reader, self.writer)
    }

    /// Writes `command` and polls until its acknowledgement arrives or the
    /// deadline passes.
    ///
    /// # Errors
    ///
    /// [`CommandError::NoResponse`] on deadline expiry and
    /// [`CommandError::NotAcknowledgeable`] if `command` has no ack
    /// counterpart. A nonzero ack status is *not* an error here; use the
    /// typed methods for the status mapping.
    pub fn send_and_wait_ack(&mut self, command: &Packet) -> Result<Packet, CommandError> {
        let expected = command
            .kind()
            .ack()
            .ok_or(CommandError::NotAcknowledgeable(command.kind()))?;

        debug!(command = ?command.kind(), "sending");
        self.writer.write(command);

        let deadline = Instant::now() + self.timeout;
        loop {
            if Instant::now() >= deadline {
                warn!(command = ?command.kind(), timeout = ?self.timeout, "no acknowledgement");
                return Err(CommandError::NoResponse(self.timeout));
            }
            match self.reader.read() {
                Some(packet) if packet.kind() == expected => return Ok(packet),
                Some(packet) => {
                    debug!(kind = ?packet.kind(), "discarding unrelated packet while waiting")
                }
                None => {}
            }
        }
    }

    fn expect_success(ack: Packet) -> Result<Packet, CommandError> {
        match ack.read(FieldName::Status) {
            Some(0) => Ok(ack),
            Some(status) => Err(CommandError::Rejected(status as u16)),
            // A truncated ack with no readable status counts as a failure.
            None => Err(CommandError::Rejected(u16::MAX)),
        }
    }

    fn run(&mut self, command: &Packet) -> Result<Packet, CommandError> {
        Self::expect_success(self.send_and_wait_ack(command)?)
    }

    // ── Typed command set ─────────────────────────────────────────────────────

    /// Puts the sensor into configuration mode. Every other configuration
    /// command must be bracketed by this and [`end_configuration`].
    ///
    /// [`end_configuration`]: Commander::end_configuration
    pub fn enable_configuration(&mut self) -> Result<ConfigurationHandshake, CommandError> {
        let mut command = Packet::new(PacketKind::EnableConfiguration);
        command.write(FieldName::Value, 0x0001)?;
        let ack = self.run(&command)?;
        Ok(ConfigurationHandshake {
            protocol_version: ack.read(FieldName::ProtocolVersion).unwrap_or(0) as u16,
            buffer_size: ack.read(FieldName::BufferSize).unwrap_or(0) as u16,
        })
    }

    /// Leaves configuration mode; the sensor resumes normal reporting.
    pub fn end_configuration(&mut self) -> Result<(), CommandError> {
        self.run(&Packet::new(PacketKind::EndConfiguration)).map(drop)
    }

    /// Sets the furthest detection gates and the unmanned duration.
    pub fn configure_max_distance_and_duration(
        &mut self,
        params: MaxDistanceAndDuration,
    ) -> Result<(), CommandError> {
        let mut command = Packet::new(PacketKind::ConfigureMaxDistanceAndDuration);
        command.write(FieldName::MaxMovingDistanceWord, 0x0000)?;
        command.write(FieldName::MaxMovingDistance, params.max_moving_gate)?;
        command.write(FieldName::MaxStaticDistanceWord, 0x0001)?;
        command.write(FieldName::MaxStaticDistance, params.max_static_gate)?;
        command.write(FieldName::UnmannedDurationWord, 0x0002)?;
        command.write(FieldName::UnmannedDuration, params.unmanned_duration_s)?;
        self.run(&command).map(drop)
    }

    /// Reads the current gate sensitivities and unmanned duration.
    pub fn read_parameters(&mut self) -> Result<GateParameters, CommandError> {
        let ack = self.run(&Packet::new(PacketKind::ReadParameters))?;
        let narrow = |values: Vec<u32>| values.into_iter().map(|v| v as u8).collect();
        Ok(GateParameters {
            gate_count: ack.read(FieldName::GateCount).unwrap_or(0) as u8,
            motion_sensitivity: narrow(ack.read_all(FieldName::GateMotionSensitivity)),
            rest_sensitivity: narrow(ack.read_all(FieldName::GateRestSensitivity)),
            unmanned_duration_s: ack.read(FieldName::UnmannedDuration).unwrap_or(0) as u16,
        })
    }

    /// Switches the sensor to engineering-mode reports (per-gate energies).
    pub fn enable_engineering_mode(&mut self) -> Result<(), CommandError> {
        self.run(&Packet::new(PacketKind::EnableEngineeringMode))
            .map(drop)
    }

    /// Switches back to basic reports.
    pub fn close_engineering_mode(&mut self) -> Result<(), CommandError> {
        self.run(&Packet::new(PacketKind::CloseEngineeringMode))
            .map(drop)
    }

    /// Sets motion and stationary sensitivity for one gate (or all gates
    /// with `gate = 0xFFFF`).
    pub fn configure_gate_sensitivity(
        &mut self,
        params: GateSensitivity,
    ) -> Result<(), CommandError> {
        let mut command = Packet::new(PacketKind::ConfigureGateSensitivity);
        command.write(FieldName::GateWord, 0x0000)?;
        command.write(FieldName::GateValue, params.gate)?;
        command.write(FieldName::MotionSensitivityWord, 0x0001)?;
        command.write(FieldName::MotionSensitivityValue, params.motion_sensitivity)?;
        command.write(FieldName::StaticSensitivityWord, 0x0002)?;
        command.write(FieldName::StaticSensitivityValue, params.static_sensitivity)?;
        self.run(&command).map(drop)
    }

    /// Reads the firmware type and version.
    pub fn read_firmware_version(&mut self) -> Result<FirmwareVersion, CommandError> {
        let ack = self.run(&Packet::new(PacketKind::ReadFirmwareVersion))?;
        Ok(FirmwareVersion {
            firmware_type: ack.read(FieldName::FirmwareType).unwrap_or(0) as u16,
            major: ack.read(FieldName::MajorVersion).unwrap_or(0) as u16,
            minor: ack.read(FieldName::MinorVersion).unwrap_or(0),
        })
    }

    /// Selects the serial baud rate; takes effect after [`restart`].
    ///
    /// [`restart`]: Commander::restart
    pub fn set_baud_rate(&mut self, rate: SerialBaudRate) -> Result<(), CommandError> {
        let mut command = Packet::new(PacketKind::SetBaudRate);
        command.write(FieldName::BaudRateIndex, rate as u32)?;
        self.run(&command).map(drop)
    }

    /// Restores factory configuration; takes effect after [`restart`].
    ///
    /// [`restart`]: Commander::restart
    pub fn factory_reset(&mut self) -> Result<(), CommandError> {
        self.run(&Packet::new(PacketKind::FactoryReset)).map(drop)
    }

    /// Reboots the module.
    pub fn restart(&mut self) -> Result<(), CommandError> {
        self.run(&Packet::new(PacketKind::Restart)).map(drop)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
