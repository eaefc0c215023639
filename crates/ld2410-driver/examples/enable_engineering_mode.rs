//! Switches the sensor into engineering mode, then prints the reports.
//!
//! Runs against a scripted in-memory link so it works without hardware; to
//! drive a real sensor, build the reader and writer over a serial port
//! handle instead:
//!
//! ```ignore
//! let port = serial_port_handle()?; // anything Read + Write
//! let reader = PacketReader::new(StreamSource::new(port.try_clone()?));
//! let writer = PacketWriter::new(StreamSink::new(port));
//! ```

use std::collections::VecDeque;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ld2410_core::{PacketReader, PacketWriter};
use ld2410_driver::{Commander, TargetReport};

/// What the sensor would send over the session: a basic report already in
/// flight, the three acknowledgements, then engineering-mode reports.
fn scripted_sensor_output() -> VecDeque<u8> {
    let mut bytes = Vec::new();
    // Basic report, target at 0x0151 cm.
    bytes.extend_from_slice(&[
        0xF4, 0xF3, 0xF2, 0xF1, 0x0D, 0x00, 0x02, 0xAA, 0x02, 0x51, 0x01, 0x00, 0x00, 0x00,
        0x3B, 0x00, 0x00, 0x55, 0x00, 0xF8, 0xF7, 0xF6, 0xF5,
    ]);
    // EnableConfiguration ack: status 0, protocol v1, buffer 0x40.
    bytes.extend_from_slice(&[
        0xFD, 0xFC, 0xFB, 0xFA, 0x08, 0x00, 0xFF, 0x01, 0x00, 0x00, 0x01, 0x00, 0x40, 0x00,
        0x04, 0x03, 0x02, 0x01,
    ]);
    // EnableEngineeringMode ack.
    bytes.extend_from_slice(&[
        0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0x62, 0x01, 0x00, 0x00, 0x04, 0x03, 0x02, 0x01,
    ]);
    // EndConfiguration ack.
    bytes.extend_from_slice(&[
        0xFD, 0xFC, 0xFB, 0xFA, 0x04, 0x00, 0xFE, 0x01, 0x00, 0x00, 0x04, 0x03, 0x02, 0x01,
    ]);
    // Engineering report with eight gates per energy list.
    bytes.extend_from_slice(&[
        0xF4, 0xF3, 0xF2, 0xF1, 0x23, 0x00, 0x01, 0xAA, 0x03, 0x1E, 0x00, 0x3C, 0x00, 0x00,
        0x39, 0x00, 0x00, 0x08, 0x08, 0x3C, 0x22, 0x05, 0x03, 0x03, 0x04, 0x03, 0x06, 0x05,
        0x00, 0x00, 0x39, 0x10, 0x13, 0x06, 0x06, 0x08, 0x04, 0x03, 0x05, 0x55, 0x00, 0xF8,
        0xF7, 0xF6, 0xF5,
    ]);
    VecDeque::from(bytes)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let reader = PacketReader::new(scripted_sensor_output());
    let writer = PacketWriter::new(Vec::new());
    let mut commander = Commander::new(reader, writer);

    // Wait for the first frame so we know the sensor is talking.
    while commander.reader_mut().read().is_none() {}
    info!("sensor is alive");

    let handshake = commander.enable_configuration()?;
    info!(
        protocol_version = handshake.protocol_version,
        buffer_size = handshake.buffer_size,
        "configuration mode entered"
    );
    commander.enable_engineering_mode()?;
    commander.end_configuration()?;
    info!("engineering mode enabled");

    // Print whatever the sensor sends from here on. A failed poll is
    // routine (footers and line noise cost a few); a longer dry spell means
    // the scripted stream is spent.
    let mut idle_polls = 0;
    while idle_polls < 8 {
        let Some(packet) = commander.reader_mut().read() else {
            idle_polls += 1;
            continue;
        };
        idle_polls = 0;
        println!("{packet}");
        println!("  hex: {}", packet.payload_hex());
        if let Ok(report) = TargetReport::from_packet(&packet) {
            println!(
                "  target state {} at {} cm, gate energies {:?}",
                report.target_state, report.detection_distance_cm, report.gate_motion_energy
            );
        }
    }

    Ok(())
}
