//! Classic pcap stream parser.

use std::io::{ErrorKind, Read};

use tracing::debug;

use super::detect::FormatProfile;
use super::summary::{Accumulator, CaptureSummary, ProtocolKey};
use super::ETHERTYPE_MIN_LEN;
use crate::error::{Error, Result};

/// Global header length: magic, version, thiszone, sigfigs, snaplen, network.
const GLOBAL_HEADER_LEN: usize = 24;
/// Per-packet record header length.
const RECORD_HEADER_LEN: usize = 16;

/// Streaming parser for the classic single-stream pcap format.
///
/// Reads records one at a time and holds at most one packet payload in
/// memory, so memory stays bounded regardless of capture size.
pub struct LegacyPcapParser<R: Read> {
    reader: R,
    profile: FormatProfile,
    max_packets: usize,
}

impl<R: Read> LegacyPcapParser<R> {
    /// Create a parser over a stream positioned at the start of the capture.
    ///
    /// `profile` is the byte order and tick resolution already derived from
    /// the magic number during format detection.
    pub fn new(reader: R, profile: FormatProfile, max_packets: usize) -> Self {
        Self {
            reader,
            profile,
            max_packets,
        }
    }

    /// Decode the whole stream into a summary.
    ///
    /// `source` is the display label used for the `File path:` metadata line.
    pub fn parse(mut self, source: &str) -> Result<CaptureSummary> {
        let mut header = [0u8; GLOBAL_HEADER_LEN];
        self.reader
            .read_exact(&mut header)
            .map_err(|e| super::eof_as_too_small(e, "legacy pcap global header"))?;

        // Version, timezone and accuracy fields are not surfaced.
        let order = self.profile.byte_order;
        let snaplen = order.read_u32(&header, 16);
        let network = order.read_u32(&header, 20);

        let divisor = self.profile.resolution.divisor();
        let mut acc = Accumulator::new(self.max_packets);

        loop {
            let mut record = [0u8; RECORD_HEADER_LEN];
            match self.reader.read_exact(&mut record) {
                Ok(()) => {}
                // Fewer than 16 bytes left is the normal end of the stream.
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(Error::Io(e)),
            }

            let ts_sec = order.read_u32(&record, 0);
            let ts_subsec = order.read_u32(&record, 4);
            let captured_len = order.read_u32(&record, 8);
            let original_len = order.read_u32(&record, 12);

            let mut payload = Vec::new();
            (&mut self.reader)
                .take(u64::from(captured_len))
                .read_to_end(&mut payload)?;
            if payload.len() < captured_len as usize {
                // A trailing incomplete packet is silently dropped.
                debug!(
                    declared = captured_len,
                    available = payload.len(),
                    "capture ends mid-packet"
                );
                break;
            }

            let ts = f64::from(ts_sec) + f64::from(ts_subsec) / divisor;
            acc.observe(ts, captured_len);

            if captured_len >= ETHERTYPE_MIN_LEN {
                let code = u16::from_be_bytes([payload[12], payload[13]]);
                acc.count(ProtocolKey::Ether(code));
            } else {
                acc.count(ProtocolKey::Truncated);
                // Samples are collected only for these unclassifiable
                // frames; the pcapng parser samples every packet.
                acc.sample(ts, captured_len, original_len, &payload);
            }
        }

        if acc.total_packets() == 0 {
            return Err(Error::NoPackets);
        }

        let metadata = vec![
            format!("File path: {source}"),
            "Capture type: PCAP (legacy)".to_string(),
            format!("Link-layer type (network): {network}"),
            format!("Snapshot length: {snaplen}"),
        ];
        Ok(acc.finish(metadata))
    }
}
