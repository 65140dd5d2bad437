//! Integration tests for the file-level summarize API.
//!
//! Exercises format detection, gzip decompression and error rendering
//! against real files on disk.

use std::fs::File;
use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;

use pcapsum::capture::{self, DEFAULT_MAX_PACKETS};
use pcapsum::Error;

/// Minimal legacy pcap: little-endian microsecond header plus one Ethernet
/// frame carrying an IPv4 EtherType.
fn minimal_legacy_pcap() -> Vec<u8> {
    let mut data = Vec::new();

    data.extend_from_slice(&0xA1B2_C3D4u32.to_le_bytes()); // magic
    data.extend_from_slice(&2u16.to_le_bytes()); // version major
    data.extend_from_slice(&4u16.to_le_bytes()); // version minor
    data.extend_from_slice(&0u32.to_le_bytes()); // thiszone
    data.extend_from_slice(&0u32.to_le_bytes()); // sigfigs
    data.extend_from_slice(&65535u32.to_le_bytes()); // snaplen
    data.extend_from_slice(&1u32.to_le_bytes()); // network: Ethernet

    let frame = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // dst MAC
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // src MAC
        0x08, 0x00, // ethertype: IPv4
    ];
    data.extend_from_slice(&1u32.to_le_bytes()); // ts_sec
    data.extend_from_slice(&500_000u32.to_le_bytes()); // ts_usec
    data.extend_from_slice(&(frame.len() as u32).to_le_bytes());
    data.extend_from_slice(&(frame.len() as u32).to_le_bytes());
    data.extend_from_slice(&frame);

    data
}

/// Legacy pcap containing a single 4-byte frame, too short to classify.
fn short_frame_legacy_pcap() -> Vec<u8> {
    let mut data = minimal_legacy_pcap();
    data.truncate(24); // keep only the global header

    data.extend_from_slice(&2u32.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&4u32.to_le_bytes());
    data.extend_from_slice(&60u32.to_le_bytes());
    data.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);

    data
}

fn write_temp(data: &[u8], suffix: &str) -> NamedTempFile {
    let mut temp = NamedTempFile::with_suffix(suffix).unwrap();
    temp.write_all(data).unwrap();
    temp.flush().unwrap();
    temp
}

#[test]
fn summarizes_legacy_pcap_from_disk() {
    let temp = write_temp(&minimal_legacy_pcap(), ".pcap");
    let summary = capture::summarize_file(temp.path(), DEFAULT_MAX_PACKETS).unwrap();

    let path_line = format!("File path: {}", temp.path().display());
    assert_eq!(summary.metadata[0], path_line);
    assert_eq!(summary.metadata[1], "Capture type: PCAP (legacy)");
    assert!(summary
        .metadata
        .contains(&"Link-layer type (network): 1".to_string()));
    assert!(summary.metadata.contains(&"Total packets: 1".to_string()));
    assert!(summary
        .metadata
        .contains(&"Earliest timestamp (UTC): 1970-01-01T00:00:01.500000+00:00".to_string()));
    assert!(summary
        .ethertype_section
        .contains("- 0x0800 (IPv4): 1 packet(s)"));
}

#[test]
fn gzipped_capture_matches_uncompressed_summary() {
    let plain = write_temp(&minimal_legacy_pcap(), ".pcap");

    let gz = NamedTempFile::with_suffix(".pcap.gz").unwrap();
    {
        let file = File::create(gz.path()).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&minimal_legacy_pcap()).unwrap();
        encoder.finish().unwrap();
    }

    let from_plain = capture::summarize_file(plain.path(), DEFAULT_MAX_PACKETS).unwrap();
    let from_gz = capture::summarize_file(gz.path(), DEFAULT_MAX_PACKETS).unwrap();

    // Identical apart from the File path line.
    assert_eq!(from_plain.metadata[1..], from_gz.metadata[1..]);
    assert_eq!(from_plain.ethertype_section, from_gz.ethertype_section);
    assert_eq!(from_plain.sample_section, from_gz.sample_section);
}

#[test]
fn missing_file_surfaces_io_error() {
    let err = capture::summarize_file("/no/such/capture.pcap", DEFAULT_MAX_PACKETS).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(err.to_user_string().starts_with("Error: "));
}

#[test]
fn tiny_file_is_too_small() {
    let temp = write_temp(&[0xA1, 0xB2], ".pcap");
    let err = capture::summarize_file(temp.path(), DEFAULT_MAX_PACKETS).unwrap_err();
    assert!(matches!(err, Error::TooSmall { .. }));
}

#[test]
fn unknown_magic_is_unsupported_format() {
    let temp = write_temp(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x00], ".pcap");
    let err = capture::summarize_file(temp.path(), DEFAULT_MAX_PACKETS).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
}

#[test]
fn sample_cap_of_zero_yields_placeholder() {
    let temp = write_temp(&short_frame_legacy_pcap(), ".pcap");

    let capped = capture::summarize_file(temp.path(), 0).unwrap();
    assert_eq!(capped.sample_section, "No packet samples available.");

    let uncapped = capture::summarize_file(temp.path(), DEFAULT_MAX_PACKETS).unwrap();
    assert!(uncapped
        .sample_section
        .contains("captured=4, original=60, preview=deadbeef"));
}

#[test]
fn pcapng_capture_from_disk() {
    // One section, one interface, one 14-byte IPv4 frame.
    let mut data = Vec::new();

    let mut shb_body = Vec::new();
    shb_body.extend_from_slice(&0x1A2B_3C4Du32.to_le_bytes());
    shb_body.extend_from_slice(&1u16.to_le_bytes());
    shb_body.extend_from_slice(&0u16.to_le_bytes());
    shb_body.extend_from_slice(&u64::MAX.to_le_bytes());
    push_block(&mut data, 0x0A0D_0D0A, &shb_body);

    let mut idb_body = Vec::new();
    idb_body.extend_from_slice(&1u16.to_le_bytes());
    idb_body.extend_from_slice(&0u16.to_le_bytes());
    idb_body.extend_from_slice(&65535u32.to_le_bytes());
    push_block(&mut data, 0x0000_0001, &idb_body);

    let mut frame = vec![0u8; 12];
    frame.extend_from_slice(&[0x08, 0x00]);
    let mut epb_body = Vec::new();
    epb_body.extend_from_slice(&0u32.to_le_bytes());
    epb_body.extend_from_slice(&0u32.to_le_bytes()); // ts high
    epb_body.extend_from_slice(&1_500_000u32.to_le_bytes()); // ts low
    epb_body.extend_from_slice(&(frame.len() as u32).to_le_bytes());
    epb_body.extend_from_slice(&(frame.len() as u32).to_le_bytes());
    epb_body.extend_from_slice(&frame);
    epb_body.extend_from_slice(&[0u8; 2]); // pad to 32-bit boundary
    push_block(&mut data, 0x0000_0006, &epb_body);

    let temp = write_temp(&data, ".pcapng");
    let summary = capture::summarize_file(temp.path(), DEFAULT_MAX_PACKETS).unwrap();

    assert_eq!(summary.metadata[1], "Capture type: PCAPNG");
    assert!(summary
        .metadata
        .contains(&"Primary link-layer type: 1".to_string()));
    assert!(summary.metadata.contains(&"Total packets: 1".to_string()));
    assert!(summary
        .metadata
        .contains(&"Latest timestamp (UTC): 1970-01-01T00:00:01.500000+00:00".to_string()));
    assert!(summary
        .ethertype_section
        .contains("- 0x0800 (IPv4): 1 packet(s)"));
    assert!(summary.sample_section.contains("preview="));
}

fn push_block(data: &mut Vec<u8>, block_type: u32, body: &[u8]) {
    let total_len = (body.len() + 12) as u32;
    data.extend_from_slice(&block_type.to_le_bytes());
    data.extend_from_slice(&total_len.to_le_bytes());
    data.extend_from_slice(body);
    data.extend_from_slice(&total_len.to_le_bytes());
}
