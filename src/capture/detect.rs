//! Capture format detection.

use std::io::Read;

use crate::error::{Error, Result};

/// Legacy pcap magic, little-endian, microsecond timestamps.
pub const PCAP_MAGIC_LE_MICRO: u32 = 0xA1B2_C3D4;
/// Legacy pcap magic, big-endian, microsecond timestamps.
pub const PCAP_MAGIC_BE_MICRO: u32 = 0xD4C3_B2A1;
/// Legacy pcap magic, little-endian, nanosecond timestamps.
pub const PCAP_MAGIC_LE_NANO: u32 = 0xA1B2_3C4D;
/// Legacy pcap magic, big-endian, nanosecond timestamps.
pub const PCAP_MAGIC_BE_NANO: u32 = 0x4D3C_B2A1;
/// pcapng Section Header Block type, doubling as the file magic.
pub const PCAPNG_MAGIC: u32 = 0x0A0D_0D0A;

/// Byte order of multi-byte fields in a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Read a 16-bit field at `offset`. The caller checks bounds.
    pub(crate) fn read_u16(self, bytes: &[u8], offset: usize) -> u16 {
        let raw = [bytes[offset], bytes[offset + 1]];
        match self {
            ByteOrder::Little => u16::from_le_bytes(raw),
            ByteOrder::Big => u16::from_be_bytes(raw),
        }
    }

    /// Read a 32-bit field at `offset`. The caller checks bounds.
    pub(crate) fn read_u32(self, bytes: &[u8], offset: usize) -> u32 {
        let raw = [
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ];
        match self {
            ByteOrder::Little => u32::from_le_bytes(raw),
            ByteOrder::Big => u32::from_be_bytes(raw),
        }
    }
}

/// Timestamp tick resolution declared by a legacy pcap magic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResolution {
    Micro,
    Nano,
}

impl TickResolution {
    /// Sub-second ticks per second.
    pub(crate) fn divisor(self) -> f64 {
        match self {
            TickResolution::Micro => 1_000_000.0,
            TickResolution::Nano => 1_000_000_000.0,
        }
    }
}

/// Byte order and tick resolution, derived once and then fixed for the
/// remainder of a parse.
#[derive(Debug, Clone, Copy)]
pub struct FormatProfile {
    pub byte_order: ByteOrder,
    pub resolution: TickResolution,
}

/// Container format selected by the leading magic number.
#[derive(Debug, Clone, Copy)]
pub enum CaptureFormat {
    /// Classic pcap; byte order and resolution come from the magic itself.
    Legacy(FormatProfile),
    /// Block-structured pcapng; byte order is resolved later by the first
    /// Section Header Block.
    PcapNg,
}

impl CaptureFormat {
    /// Classify a leading magic number, interpreted little-endian.
    pub fn from_magic(magic: u32) -> Result<Self> {
        let profile = |byte_order, resolution| {
            CaptureFormat::Legacy(FormatProfile {
                byte_order,
                resolution,
            })
        };

        match magic {
            PCAP_MAGIC_LE_MICRO => Ok(profile(ByteOrder::Little, TickResolution::Micro)),
            PCAP_MAGIC_BE_MICRO => Ok(profile(ByteOrder::Big, TickResolution::Micro)),
            PCAP_MAGIC_LE_NANO => Ok(profile(ByteOrder::Little, TickResolution::Nano)),
            PCAP_MAGIC_BE_NANO => Ok(profile(ByteOrder::Big, TickResolution::Nano)),
            PCAPNG_MAGIC => Ok(CaptureFormat::PcapNg),
            _ => Err(Error::UnsupportedFormat { magic }),
        }
    }

    /// Sniff the format from the first four bytes of a source.
    ///
    /// Consumes exactly those bytes; the caller rewinds or reopens the
    /// source before handing it to the selected parser.
    pub fn detect<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| super::eof_as_too_small(e, "capture magic number"))?;
        Self::from_magic(u32::from_le_bytes(magic))
    }
}
