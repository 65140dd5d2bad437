//! Capture container decoding.
//!
//! This module detects the container format from the leading magic number
//! and turns a capture file into a [`CaptureSummary`]: metadata lines, an
//! EtherType histogram and a bounded sample of packet previews.

mod detect;
pub mod ethertype;
mod legacy;
mod pcapng;
mod summary;

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

pub use detect::{ByteOrder, CaptureFormat, FormatProfile, TickResolution};
pub use legacy::LegacyPcapParser;
pub use pcapng::PcapNgParser;
pub use summary::CaptureSummary;

use crate::error::{Error, Result};

/// Default cap on retained sample entries.
pub const DEFAULT_MAX_PACKETS: usize = 50;

/// Minimum captured length that still carries an EtherType field.
pub(crate) const ETHERTYPE_MIN_LEN: u32 = 14;

/// Buffer size for reading capture files (64KB).
const BUFFER_SIZE: usize = 65536;

/// Gzip magic bytes.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Summarize a capture file.
///
/// Detects gzip compression and the capture format, then streams (legacy
/// pcap) or buffers (pcapng) the input through the matching parser.
/// `max_packets` bounds how many sample entries the summary retains.
pub fn summarize_file<P: AsRef<Path>>(path: P, max_packets: usize) -> Result<CaptureSummary> {
    let path = path.as_ref();
    let is_gzipped = is_gzip_file(path)?;

    let mut reader = open_reader(path, is_gzipped)?;
    let format = CaptureFormat::detect(&mut reader)?;

    // The magic bytes are consumed; reopen so the parser sees offset zero.
    drop(reader);
    let mut reader = open_reader(path, is_gzipped)?;

    let source = path.display().to_string();
    match format {
        CaptureFormat::Legacy(profile) => {
            tracing::debug!(source = %source, ?profile, "parsing legacy pcap");
            LegacyPcapParser::new(reader, profile, max_packets).parse(&source)
        }
        CaptureFormat::PcapNg => {
            tracing::debug!(source = %source, "parsing pcapng");
            let mut data = Vec::new();
            reader.read_to_end(&mut data)?;
            PcapNgParser::new(data, max_packets).parse(&source)
        }
    }
}

fn open_reader(path: &Path, is_gzipped: bool) -> Result<BufReader<Box<dyn Read>>> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if is_gzipped {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(BufReader::with_capacity(BUFFER_SIZE, reader))
}

/// Check if a file is gzipped by extension or magic bytes.
fn is_gzip_file(path: &Path) -> Result<bool> {
    if let Some(name) = path.file_name().and_then(|f| f.to_str()) {
        if name.to_lowercase().ends_with(".gz") {
            return Ok(true);
        }
    }

    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == GZIP_MAGIC),
        Err(_) => Ok(false), // too short to be gzipped
    }
}

/// Map an end-of-input error to `TooSmall`, passing real I/O failures through.
pub(crate) fn eof_as_too_small(err: io::Error, context: &'static str) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::TooSmall { context }
    } else {
        Error::Io(err)
    }
}
