//! Error types for pcapsum.

use thiserror::Error;

/// Errors produced while decoding a capture file.
///
/// Framing errors (`TooSmall`, `UnsupportedFormat`, `UnsupportedByteOrder`,
/// `MalformedBlock`) abort a parse; an isolated bad packet block inside a
/// well-framed pcapng file is skipped instead and never surfaces here.
#[derive(Error, Debug)]
pub enum Error {
    /// Input ended before a required header could be read.
    #[error("file is too small to be a valid capture: missing {context}")]
    TooSmall { context: &'static str },

    /// The leading magic number matches no supported container format.
    #[error("unsupported capture format: magic number {magic:#010x}")]
    UnsupportedFormat { magic: u32 },

    /// A pcapng Section Header Block carried an unknown byte-order magic.
    #[error("unsupported pcapng byte-order magic {magic:#010x}")]
    UnsupportedByteOrder { magic: u32 },

    /// pcapng block framing was inconsistent; the rest of the container
    /// cannot be trusted.
    #[error("malformed pcapng block at offset {offset}: {reason}")]
    MalformedBlock { offset: usize, reason: &'static str },

    /// The container was structurally valid but held no decodable packets.
    #[error("no packets found in the capture")]
    NoPackets,

    /// Underlying I/O failure, surfaced verbatim.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Render in the `Error: ...` form expected by text-facing callers.
    pub fn to_user_string(&self) -> String {
        format!("Error: {self}")
    }
}

/// Result alias for capture decoding.
pub type Result<T> = std::result::Result<T, Error>;
