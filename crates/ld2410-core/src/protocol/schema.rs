//! Static descriptions of every packet the LD2410 sends or accepts.
//!
//! A [`PacketSchema`] names a packet's identity (header constant, type code,
//! footer constant) and its ordered field layout. All schemas live in the
//! fixed [`REGISTRY`]; nothing is registered at runtime.
//!
//! Two traffic classes share the link: command/ack frames under the
//! `0xFDFCFBFA` header and asynchronous report frames under `0xF4F3F2F1`.
//! Each command's acknowledgement reuses the command's type code with bit 8
//! set (`0x00FF` → `0x01FF`), which is what makes the ack identity derivable
//! from the command identity in [`PacketKind::ack`].

use serde::{Deserialize, Serialize};

// ── Wire constants ────────────────────────────────────────────────────────────

/// Header opening every command and acknowledgement frame.
pub const COMMAND_HEADER: u32 = 0xFDFC_FBFA;
/// Trailer closing every command and acknowledgement frame.
pub const COMMAND_FOOTER: u32 = 0x0403_0201;
/// Header opening every sensor report frame.
pub const REPORT_HEADER: u32 = 0xF4F3_F2F1;
/// Trailer closing every sensor report frame.
pub const REPORT_FOOTER: u32 = 0x0807_0604;

/// Header size on the wire.
pub const HEADER_SIZE: usize = 4;
/// Size of the length field that follows the header.
pub const LENGTH_SIZE: usize = 2;
/// Size of the type code; the announced length includes it.
pub const TYPE_CODE_SIZE: usize = 2;
/// Footer size on the wire.
pub const FOOTER_SIZE: usize = 4;
/// Bytes a frame occupies beyond its payload.
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + LENGTH_SIZE + TYPE_CODE_SIZE + FOOTER_SIZE;

/// Number of bytes that distinguish one schema from another on the wire:
/// the four header bytes followed by the two type-code bytes.
pub const DISCRIMINATOR_LEN: usize = HEADER_SIZE + TYPE_CODE_SIZE;

// ── Field names ───────────────────────────────────────────────────────────────

/// Every named field occurring in any registry schema.
///
/// Names are shared across schemas; the byte width of a field is a property
/// of the schema it appears in, not of the name (`UnmannedDuration` is four
/// bytes in the distance/duration command and two in the parameter read ack,
/// exactly as the device documents it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldName {
    Value,
    Status,
    ProtocolVersion,
    BufferSize,
    MaxMovingDistanceWord,
    MaxMovingDistance,
    MaxStaticDistanceWord,
    MaxStaticDistance,
    UnmannedDurationWord,
    UnmannedDuration,
    ParameterHeader,
    GateCount,
    GateMotionSensitivity,
    GateRestSensitivity,
    GateWord,
    GateValue,
    MotionSensitivityWord,
    MotionSensitivityValue,
    StaticSensitivityWord,
    StaticSensitivityValue,
    FirmwareType,
    MajorVersion,
    MinorVersion,
    BaudRateIndex,
    TargetState,
    MovementTargetDistance,
    MovementTargetEnergy,
    StationaryTargetDistance,
    StationaryTargetEnergy,
    DetectionDistance,
    Tail,
    Check,
    MovingGateCount,
    StaticGateCount,
    GateMotionEnergy,
    GateStaticEnergy,
}

// ── Packet kinds ──────────────────────────────────────────────────────────────

/// Identity of every packet in the registry.
///
/// Commands carry even discriminants and their acknowledgements the next odd
/// value, so `command | 1` names the ack and `ack & !1` recovers the
/// command. Report frames have no ack counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PacketKind {
    EnableConfiguration = 2,
    EnableConfigurationAck = 3,
    EndConfiguration = 4,
    EndConfigurationAck = 5,
    ConfigureMaxDistanceAndDuration = 6,
    ConfigureMaxDistanceAndDurationAck = 7,
    ReadParameters = 8,
    ReadParametersAck = 9,
    EnableEngineeringMode = 10,
    EnableEngineeringModeAck = 11,
    CloseEngineeringMode = 12,
    CloseEngineeringModeAck = 13,
    ConfigureGateSensitivity = 14,
    ConfigureGateSensitivityAck = 15,
    ReadFirmwareVersion = 16,
    ReadFirmwareVersionAck = 17,
    SetBaudRate = 18,
    SetBaudRateAck = 19,
    FactoryReset = 20,
    FactoryResetAck = 21,
    Restart = 22,
    RestartAck = 23,
    BasicReport = 24,
    EngineeringReport = 26,
}

impl TryFrom<u8> for PacketKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(PacketKind::EnableConfiguration),
            3 => Ok(PacketKind::EnableConfigurationAck),
            4 => Ok(PacketKind::EndConfiguration),
            5 => Ok(PacketKind::EndConfigurationAck),
            6 => Ok(PacketKind::ConfigureMaxDistanceAndDuration),
            7 => Ok(PacketKind::ConfigureMaxDistanceAndDurationAck),
            8 => Ok(PacketKind::ReadParameters),
            9 => Ok(PacketKind::ReadParametersAck),
            10 => Ok(PacketKind::EnableEngineeringMode),
            11 => Ok(PacketKind::EnableEngineeringModeAck),
            12 => Ok(PacketKind::CloseEngineeringMode),
            13 => Ok(PacketKind::CloseEngineeringModeAck),
            14 => Ok(PacketKind::ConfigureGateSensitivity),
            15 => Ok(PacketKind::ConfigureGateSensitivityAck),
            16 => Ok(PacketKind::ReadFirmwareVersion),
            17 => Ok(PacketKind::ReadFirmwareVersionAck),
            18 => Ok(PacketKind::SetBaudRate),
            19 => Ok(PacketKind::SetBaudRateAck),
            20 => Ok(PacketKind::FactoryReset),
            21 => Ok(PacketKind::FactoryResetAck),
            22 => Ok(PacketKind::Restart),
            23 => Ok(PacketKind::RestartAck),
            24 => Ok(PacketKind::BasicReport),
            26 => Ok(PacketKind::EngineeringReport),
            _ => Err(()),
        }
    }
}

impl PacketKind {
    /// All registered kinds, in registry order. Handy for exhaustive tests.
    pub const ALL: [PacketKind; 24] = [
        PacketKind::EnableConfiguration,
        PacketKind::EnableConfigurationAck,
        PacketKind::EndConfiguration,
        PacketKind::EndConfigurationAck,
        PacketKind::ConfigureMaxDistanceAndDuration,
        PacketKind::ConfigureMaxDistanceAndDurationAck,
        PacketKind::ReadParameters,
        PacketKind::ReadParametersAck,
        PacketKind::EnableEngineeringMode,
        PacketKind::EnableEngineeringModeAck,
        PacketKind::CloseEngineeringMode,
        PacketKind::CloseEngineeringModeAck,
        PacketKind::ConfigureGateSensitivity,
        PacketKind::ConfigureGateSensitivityAck,
        PacketKind::ReadFirmwareVersion,
        PacketKind::ReadFirmwareVersionAck,
        PacketKind::SetBaudRate,
        PacketKind::SetBaudRateAck,
        PacketKind::FactoryReset,
        PacketKind::FactoryResetAck,
        PacketKind::Restart,
        PacketKind::RestartAck,
        PacketKind::BasicReport,
        PacketKind::EngineeringReport,
    ];

    /// Returns `true` for acknowledgement kinds.
    pub fn is_ack(self) -> bool {
        self as u8 & 1 == 1
    }

    /// The acknowledgement identity for this command, or `None` for kinds
    /// that are never acknowledged (report frames) or already are acks.
    pub fn ack(self) -> Option<PacketKind> {
        if self.is_ack() {
            return None;
        }
        PacketKind::try_from(self as u8 | 1).ok()
    }

    /// The command identity an acknowledgement answers. Identity for
    /// commands and reports.
    pub fn command(self) -> PacketKind {
        PacketKind::try_from(self as u8 & !1).unwrap_or(self)
    }

    /// The registry entry for this kind.
    ///
    /// Every variant has one; the pairing is asserted by the registry tests.
    pub fn schema(self) -> &'static PacketSchema {
        find_schema(self).expect("every PacketKind has a registry entry")
    }
}

// ── Field layout rules ────────────────────────────────────────────────────────

/// How many bytes a field occupies, and for repeated fields, where the
/// repetition count comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single occurrence of exactly this many bytes.
    Fixed(u16),
    /// `count_field` occurrences of `element_size` bytes each. The count
    /// field must be laid out earlier in the same schema.
    Repeated {
        element_size: u16,
        count_field: FieldName,
    },
}

/// One entry in a schema's ordered field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: FieldName,
    pub kind: FieldKind,
}

impl FieldRule {
    pub const fn fixed(name: FieldName, size: u16) -> Self {
        Self {
            name,
            kind: FieldKind::Fixed(size),
        }
    }

    pub const fn repeated(name: FieldName, element_size: u16, count_field: FieldName) -> Self {
        Self {
            name,
            kind: FieldKind::Repeated {
                element_size,
                count_field,
            },
        }
    }
}

// ── Packet schema ─────────────────────────────────────────────────────────────

/// Identity and field layout of one packet type.
#[derive(Debug)]
pub struct PacketSchema {
    pub kind: PacketKind,
    pub header: u32,
    pub type_code: u16,
    pub footer: u32,
    pub fields: &'static [FieldRule],
}

impl PacketSchema {
    /// The bytes that distinguish this schema on the wire, in the order they
    /// are observed: the header most-significant-byte first (the wire
    /// transmits it reversed relative to the stored integer), then the type
    /// code low byte first.
    pub fn discriminator(&self) -> [u8; DISCRIMINATOR_LEN] {
        let h = self.header.to_be_bytes();
        let t = self.type_code.to_le_bytes();
        [h[0], h[1], h[2], h[3], t[0], t[1]]
    }
}

/// Looks up the schema for `kind` with a linear scan; the registry is small
/// and fixed.
pub fn find_schema(kind: PacketKind) -> Option<&'static PacketSchema> {
    REGISTRY.iter().find(|schema| schema.kind == kind)
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Every packet the driver knows how to send or decode.
///
/// The `Word` fields in the two configuration commands are the device's
/// parameter-id prefixes (0x0000, 0x0001, 0x0002); the commander writes them
/// alongside the caller's values.
pub static REGISTRY: [PacketSchema; 24] = [
    PacketSchema {
        kind: PacketKind::EnableConfiguration,
        header: COMMAND_HEADER,
        type_code: 0x00FF,
        footer: COMMAND_FOOTER,
        fields: &[FieldRule::fixed(FieldName::Value, 2)],
    },
    PacketSchema {
        kind: PacketKind::EnableConfigurationAck,
        header: COMMAND_HEADER,
        type_code: 0x01FF,
        footer: COMMAND_FOOTER,
        fields: &[
            FieldRule::fixed(FieldName::Status, 2),
            FieldRule::fixed(FieldName::ProtocolVersion, 2),
            FieldRule::fixed(FieldName::BufferSize, 2),
        ],
    },
    PacketSchema {
        kind: PacketKind::EndConfiguration,
        header: COMMAND_HEADER,
        type_code: 0x00FE,
        footer: COMMAND_FOOTER,
        fields: &[],
    },
    PacketSchema {
        kind: PacketKind::EndConfigurationAck,
        header: COMMAND_HEADER,
        type_code: 0x01FE,
        footer: COMMAND_FOOTER,
        fields: &[FieldRule::fixed(FieldName::Status, 2)],
    },
    PacketSchema {
        kind: PacketKind::ConfigureMaxDistanceAndDuration,
        header: COMMAND_HEADER,
        type_code: 0x0060,
        footer: COMMAND_FOOTER,
        fields: &[
            FieldRule::fixed(FieldName::MaxMovingDistanceWord, 2),
            FieldRule::fixed(FieldName::MaxMovingDistance, 4),
            FieldRule::fixed(FieldName::MaxStaticDistanceWord, 2),
            FieldRule::fixed(FieldName::MaxStaticDistance, 4),
            FieldRule::fixed(FieldName::UnmannedDurationWord, 2),
            FieldRule::fixed(FieldName::UnmannedDuration, 4),
        ],
    },
    PacketSchema {
        kind: PacketKind::ConfigureMaxDistanceAndDurationAck,
        header: COMMAND_HEADER,
        type_code: 0x0160,
        footer: COMMAND_FOOTER,
        fields: &[FieldRule::fixed(FieldName::Status, 2)],
    },
    PacketSchema {
        kind: PacketKind::ReadParameters,
        header: COMMAND_HEADER,
        type_code: 0x0061,
        footer: COMMAND_FOOTER,
        fields: &[],
    },
    PacketSchema {
        kind: PacketKind::ReadParametersAck,
        header: COMMAND_HEADER,
        type_code: 0x0161,
        footer: COMMAND_FOOTER,
        fields: &[
            FieldRule::fixed(FieldName::Status, 2),
            FieldRule::fixed(FieldName::ParameterHeader, 1),
            FieldRule::fixed(FieldName::GateCount, 1),
            FieldRule::repeated(FieldName::GateMotionSensitivity, 1, FieldName::GateCount),
            FieldRule::repeated(FieldName::GateRestSensitivity, 1, FieldName::GateCount),
            FieldRule::fixed(FieldName::UnmannedDuration, 2),
        ],
    },
    PacketSchema {
        kind: PacketKind::EnableEngineeringMode,
        header: COMMAND_HEADER,
        type_code: 0x0062,
        footer: COMMAND_FOOTER,
        fields: &[],
    },
    PacketSchema {
        kind: PacketKind::EnableEngineeringModeAck,
        header: COMMAND_HEADER,
        type_code: 0x0162,
        footer: COMMAND_FOOTER,
        fields: &[FieldRule::fixed(FieldName::Status, 2)],
    },
    PacketSchema {
        kind: PacketKind::CloseEngineeringMode,
        header: COMMAND_HEADER,
        type_code: 0x0063,
        footer: COMMAND_FOOTER,
        fields: &[],
    },
    PacketSchema {
        kind: PacketKind::CloseEngineeringModeAck,
        header: COMMAND_HEADER,
        type_code: 0x0163,
        footer: COMMAND_FOOTER,
        fields: &[FieldRule::fixed(FieldName::Status, 2)],
    },
    PacketSchema {
        kind: PacketKind::ConfigureGateSensitivity,
        header: COMMAND_HEADER,
        type_code: 0x0064,
        footer: COMMAND_FOOTER,
        fields: &[
            FieldRule::fixed(FieldName::GateWord, 2),
            FieldRule::fixed(FieldName::GateValue, 4),
            FieldRule::fixed(FieldName::MotionSensitivityWord, 2),
            FieldRule::fixed(FieldName::MotionSensitivityValue, 4),
            FieldRule::fixed(FieldName::StaticSensitivityWord, 2),
            FieldRule::fixed(FieldName::StaticSensitivityValue, 4),
        ],
    },
    PacketSchema {
        kind: PacketKind::ConfigureGateSensitivityAck,
        header: COMMAND_HEADER,
        type_code: 0x0164,
        footer: COMMAND_FOOTER,
        fields: &[FieldRule::fixed(FieldName::Status, 2)],
    },
    PacketSchema {
        kind: PacketKind::ReadFirmwareVersion,
        header: COMMAND_HEADER,
        type_code: 0x00A0,
        footer: COMMAND_FOOTER,
        fields: &[],
    },
    PacketSchema {
        kind: PacketKind::ReadFirmwareVersionAck,
        header: COMMAND_HEADER,
        type_code: 0x01A0,
        footer: COMMAND_FOOTER,
        fields: &[
            FieldRule::fixed(FieldName::Status, 2),
            FieldRule::fixed(FieldName::FirmwareType, 2),
            FieldRule::fixed(FieldName::MajorVersion, 2),
            FieldRule::fixed(FieldName::MinorVersion, 4),
        ],
    },
    PacketSchema {
        kind: PacketKind::SetBaudRate,
        header: COMMAND_HEADER,
        type_code: 0x00A1,
        footer: COMMAND_FOOTER,
        fields: &[FieldRule::fixed(FieldName::BaudRateIndex, 2)],
    },
    PacketSchema {
        kind: PacketKind::SetBaudRateAck,
        header: COMMAND_HEADER,
        type_code: 0x01A1,
        footer: COMMAND_FOOTER,
        fields: &[FieldRule::fixed(FieldName::Status, 2)],
    },
    PacketSchema {
        kind: PacketKind::FactoryReset,
        header: COMMAND_HEADER,
        type_code: 0x00A2,
        footer: COMMAND_FOOTER,
        fields: &[],
    },
    PacketSchema {
        kind: PacketKind::FactoryResetAck,
        header: COMMAND_HEADER,
        type_code: 0x01A2,
        footer: COMMAND_FOOTER,
        fields: &[FieldRule::fixed(FieldName::Status, 2)],
    },
    PacketSchema {
        kind: PacketKind::Restart,
        header: COMMAND_HEADER,
        type_code: 0x00A3,
        footer: COMMAND_FOOTER,
        fields: &[],
    },
    PacketSchema {
        kind: PacketKind::RestartAck,
        header: COMMAND_HEADER,
        type_code: 0x01A3,
        footer: COMMAND_FOOTER,
        fields: &[FieldRule::fixed(FieldName::Status, 2)],
    },
    PacketSchema {
        kind: PacketKind::BasicReport,
        header: REPORT_HEADER,
        type_code: 0xAA02,
        footer: REPORT_FOOTER,
        fields: &[
            FieldRule::fixed(FieldName::TargetState, 1),
            FieldRule::fixed(FieldName::MovementTargetDistance, 2),
            FieldRule::fixed(FieldName::MovementTargetEnergy, 1),
            FieldRule::fixed(FieldName::StationaryTargetDistance, 2),
            FieldRule::fixed(FieldName::StationaryTargetEnergy, 1),
            FieldRule::fixed(FieldName::DetectionDistance, 2),
            FieldRule::fixed(FieldName::Tail, 1),
            FieldRule::fixed(FieldName::Check, 1),
        ],
    },
    PacketSchema {
        kind: PacketKind::EngineeringReport,
        header: REPORT_HEADER,
        type_code: 0xAA01,
        footer: REPORT_FOOTER,
        fields: &[
            FieldRule::fixed(FieldName::TargetState, 1),
            FieldRule::fixed(FieldName::MovementTargetDistance, 2),
            FieldRule::fixed(FieldName::MovementTargetEnergy, 1),
            FieldRule::fixed(FieldName::StationaryTargetDistance, 2),
            FieldRule::fixed(FieldName::StationaryTargetEnergy, 1),
            FieldRule::fixed(FieldName::DetectionDistance, 2),
            FieldRule::fixed(FieldName::MovingGateCount, 1),
            FieldRule::fixed(FieldName::StaticGateCount, 1),
            FieldRule::repeated(FieldName::GateMotionEnergy, 1, FieldName::MovingGateCount),
            FieldRule::repeated(FieldName::GateStaticEnergy, 1, FieldName::StaticGateCount),
        ],
    },
];

// ── Tests ─────────────────────────────────────────────────────────────────────
