//! Typed parameters and results for the device command set.
//!
//! The core crate deals in `u32` field values; the narrowing to the widths
//! the device documents (`u8` sensitivities, `u16` durations and versions)
//! happens here, and only here, with explicit casts.

use std::fmt;

use serde::{Deserialize, Serialize};

use ld2410_core::{FieldName, Packet, PacketError, PacketKind};

/// Baud rate selection indices accepted by the set-baud-rate command.
///
/// The index takes effect after a module restart; the factory default is
/// 256000 baud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum SerialBaudRate {
    B9600 = 0x0001,
    B19200 = 0x0002,
    B38400 = 0x0003,
    B57600 = 0x0004,
    B115200 = 0x0005,
    B230400 = 0x0006,
    B256000 = 0x0007,
    B460800 = 0x0008,
}

impl TryFrom<u16> for SerialBaudRate {
    type Error = ();

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0001 => Ok(SerialBaudRate::B9600),
            0x0002 => Ok(SerialBaudRate::B19200),
            0x0003 => Ok(SerialBaudRate::B38400),
            0x0004 => Ok(SerialBaudRate::B57600),
            0x0005 => Ok(SerialBaudRate::B115200),
            0x0006 => Ok(SerialBaudRate::B230400),
            0x0007 => Ok(SerialBaudRate::B256000),
            0x0008 => Ok(SerialBaudRate::B460800),
            _ => Err(()),
        }
    }
}

/// Parameters for the max-distance-gate and unmanned-duration command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxDistanceAndDuration {
    /// Furthest gate that still triggers motion detection (0..=8).
    pub max_moving_gate: u32,
    /// Furthest gate that still triggers stationary detection (0..=8).
    pub max_static_gate: u32,
    /// Seconds the sensor keeps reporting presence after the target leaves.
    pub unmanned_duration_s: u32,
}

/// Parameters for the per-gate sensitivity command. A `gate` of `0xFFFF`
/// applies the sensitivities to every gate at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSensitivity {
    pub gate: u32,
    /// Motion detection threshold in percent (0..=100).
    pub motion_sensitivity: u32,
    /// Stationary detection threshold in percent (0..=100).
    pub static_sensitivity: u32,
}

/// What the sensor reports back when configuration mode is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationHandshake {
    pub protocol_version: u16,
    pub buffer_size: u16,
}

/// Decoded read-parameters acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateParameters {
    pub gate_count: u8,
    /// Motion sensitivity per gate, gate 0 first.
    pub motion_sensitivity: Vec<u8>,
    /// Stationary (rest) sensitivity per gate, gate 0 first.
    pub rest_sensitivity: Vec<u8>,
    pub unmanned_duration_s: u16,
}

/// Decoded firmware version acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub firmware_type: u16,
    pub major: u16,
    pub minor: u32,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The device documents versions in hex, e.g. V1.02.22062416.
        write!(f, "V{:X}.{:08X}", self.major, self.minor)
    }
}

/// A decoded target report, from either report frame kind.
///
/// The per-gate energy vectors are empty for basic frames and carry one
/// entry per configured gate for engineering frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReport {
    pub target_state: u8,
    pub movement_distance_cm: u16,
    pub movement_energy: u8,
    pub stationary_distance_cm: u16,
    pub stationary_energy: u8,
    pub detection_distance_cm: u16,
    pub gate_motion_energy: Vec<u8>,
    pub gate_static_energy: Vec<u8>,
}

impl TargetReport {
    /// Interprets a report packet.
    ///
    /// # Errors
    ///
    /// [`PacketError::WrongKind`] if `packet` is not a report frame.
    pub fn from_packet(packet: &Packet) -> Result<TargetReport, PacketError> {
        match packet.kind() {
            PacketKind::BasicReport | PacketKind::EngineeringReport => {}
            actual => {
                return Err(PacketError::WrongKind {
                    expected: PacketKind::BasicReport,
                    actual,
                })
            }
        }
        let field = |name| packet.read(name).unwrap_or(0);
        let gates = |name| {
            packet
                .read_all(name)
                .into_iter()
                .map(|value| value as u8)
                .collect()
        };
        Ok(TargetReport {
            target_state: field(FieldName::TargetState) as u8,
            movement_distance_cm: field(FieldName::MovementTargetDistance) as u16,
            movement_energy: field(FieldName::MovementTargetEnergy) as u8,
            stationary_distance_cm: field(FieldName::StationaryTargetDistance) as u16,
            stationary_energy: field(FieldName::StationaryTargetEnergy) as u8,
            detection_distance_cm: field(FieldName::DetectionDistance) as u16,
            gate_motion_energy: gates(FieldName::GateMotionEnergy),
            gate_static_energy: gates(FieldName::GateStaticEnergy),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baud_rate_round_trips_through_u16() {
        for rate in [
            SerialBaudRate::B9600,
            SerialBaudRate::B115200,
            SerialBaudRate::B256000,
            SerialBaudRate::B460800,
        ] {
            assert_eq!(SerialBaudRate::try_from(rate as u16), Ok(rate));
        }
        assert!(SerialBaudRate::try_from(0).is_err());
        assert!(SerialBaudRate::try_from(9).is_err());
    }

    #[test]
    fn test_target_report_from_basic_frame() {
        let packet = Packet::from_payload(
            PacketKind::BasicReport.schema(),
            vec![0x02, 0x51, 0x01, 0x00, 0x00, 0x00, 0x3B, 0x00, 0x00, 0x55, 0x00],
        );
        let report = TargetReport::from_packet(&packet).unwrap();
        assert_eq!(report.target_state, 0x02);
        assert_eq!(report.movement_distance_cm, 0x0151);
        assert_eq!(report.stationary_energy, 0x3B);
        assert!(report.gate_motion_energy.is_empty());
    }

    #[test]
    fn test_target_report_from_engineering_frame_collects_gates() {
        let packet = Packet::from_payload(
            PacketKind::EngineeringReport.schema(),
            vec![
                0x03, 0x1E, 0x00, 0x3C, 0x00, 0x00, 0x39, 0x00, 0x00, 0x02, 0x02, 0x3C, 0x22,
                0x05, 0x06,
            ],
        );
        let report = TargetReport::from_packet(&packet).unwrap();
        assert_eq!(report.gate_motion_energy, vec![0x3C, 0x22]);
        assert_eq!(report.gate_static_energy, vec![0x05, 0x06]);
    }

    #[test]
    fn test_target_report_rejects_command_packets() {
        let packet = Packet::new(PacketKind::EnableConfiguration);
        assert!(matches!(
            TargetReport::from_packet(&packet),
            Err(PacketError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_firmware_version_displays_in_device_notation() {
        let version = FirmwareVersion {
            firmware_type: 0,
            major: 0x0102,
            minor: 0x2206_2416,
        };
        assert_eq!(version.to_string(), "V102.22062416");
    }
}
