//! pcapng block-structured container parser.

use tracing::debug;

use super::detect::ByteOrder;
use super::summary::{Accumulator, CaptureSummary, ProtocolKey};
use super::ETHERTYPE_MIN_LEN;
use crate::error::{Error, Result};

/// Section Header Block type (also the file magic).
const SECTION_HEADER: u32 = 0x0A0D_0D0A;
/// Interface Description Block type.
const INTERFACE_DESCRIPTION: u32 = 0x0000_0001;
/// Enhanced Packet Block type.
const ENHANCED_PACKET: u32 = 0x0000_0006;

/// Section byte-order magic as read little-endian from the wire.
const BYTE_ORDER_LE: u32 = 0x1A2B_3C4D;
const BYTE_ORDER_BE: u32 = 0x4D3C_2B1A;

/// Minimum total block length: type, leading and trailing length fields.
const MIN_BLOCK_LEN: usize = 12;
/// Minimum Section Header Block body: byte-order magic, version, section length.
const SHB_MIN_BODY_LEN: usize = 12;
/// Minimum Interface Description Block body: link type, reserved, snaplen.
const IDB_MIN_BODY_LEN: usize = 8;
/// Fixed-field prefix of an Enhanced Packet Block body.
const EPB_FIXED_LEN: usize = 20;

/// EPB timestamps are treated as microsecond ticks. The per-interface
/// time-resolution option is not decoded.
const EPB_TICKS_PER_SECOND: f64 = 1_000_000.0;

/// A capture interface announced by an Interface Description Block,
/// recorded in discovery order.
#[derive(Debug, Clone, Copy)]
struct Interface {
    link_type: u16,
    snaplen: u32,
}

/// Whole-buffer parser for the pcapng container.
///
/// Unlike the legacy parser this holds the entire capture in memory while
/// iterating blocks.
pub struct PcapNgParser {
    data: Vec<u8>,
    max_packets: usize,
}

impl PcapNgParser {
    pub fn new(data: Vec<u8>, max_packets: usize) -> Self {
        Self { data, max_packets }
    }

    /// Decode the buffered capture into a summary.
    ///
    /// `source` is the display label used for the `File path:` metadata line.
    pub fn parse(self, source: &str) -> Result<CaptureSummary> {
        let data = &self.data;
        if data.len() < MIN_BLOCK_LEN {
            return Err(Error::TooSmall {
                context: "pcapng section header block",
            });
        }

        let mut acc = Accumulator::new(self.max_packets);
        // Established by the first Section Header Block.
        let mut section_order: Option<ByteOrder> = None;
        let mut interfaces: Vec<Interface> = Vec::new();

        let mut offset = 0usize;
        while offset + 8 <= data.len() {
            // Outer framing is always read little-endian; the section byte
            // order applies to block bodies only.
            let block_type = ByteOrder::Little.read_u32(data, offset);
            let total_len = ByteOrder::Little.read_u32(data, offset + 4) as usize;
            if total_len < MIN_BLOCK_LEN || offset + total_len > data.len() {
                return Err(Error::MalformedBlock {
                    offset,
                    reason: "block length out of bounds",
                });
            }
            let trailing_len = ByteOrder::Little.read_u32(data, offset + total_len - 4) as usize;
            if trailing_len != total_len {
                return Err(Error::MalformedBlock {
                    offset,
                    reason: "leading and trailing block lengths disagree",
                });
            }

            let body = &data[offset + 8..offset + total_len - 4];

            match block_type {
                SECTION_HEADER => {
                    if body.len() < SHB_MIN_BODY_LEN {
                        return Err(Error::MalformedBlock {
                            offset,
                            reason: "section header block too short",
                        });
                    }
                    let magic = ByteOrder::Little.read_u32(body, 0);
                    section_order = Some(match magic {
                        BYTE_ORDER_LE => ByteOrder::Little,
                        BYTE_ORDER_BE => ByteOrder::Big,
                        _ => return Err(Error::UnsupportedByteOrder { magic }),
                    });
                }
                INTERFACE_DESCRIPTION => {
                    let order = section_order_at(section_order, offset)?;
                    if body.len() < IDB_MIN_BODY_LEN {
                        return Err(Error::MalformedBlock {
                            offset,
                            reason: "interface description block too short",
                        });
                    }
                    interfaces.push(Interface {
                        link_type: order.read_u16(body, 0),
                        snaplen: order.read_u32(body, 4),
                    });
                }
                ENHANCED_PACKET => {
                    let order = section_order_at(section_order, offset)?;
                    if body.len() < EPB_FIXED_LEN {
                        // An isolated bad packet block is skipped, not fatal.
                        debug!(offset, "skipping enhanced packet block with short body");
                        offset += total_len;
                        continue;
                    }

                    let _interface_id = order.read_u32(body, 0);
                    let ts_high = order.read_u32(body, 4);
                    let ts_low = order.read_u32(body, 8);
                    let captured_len = order.read_u32(body, 12);
                    let original_len = order.read_u32(body, 16);

                    let payload_end = EPB_FIXED_LEN + captured_len as usize;
                    if payload_end > body.len() {
                        debug!(
                            offset,
                            captured_len, "skipping enhanced packet block with overrunning payload"
                        );
                        offset += total_len;
                        continue;
                    }
                    let payload = &body[EPB_FIXED_LEN..payload_end];

                    let ticks = (u64::from(ts_high) << 32) | u64::from(ts_low);
                    let ts = ticks as f64 / EPB_TICKS_PER_SECOND;

                    acc.observe(ts, captured_len);
                    if captured_len >= ETHERTYPE_MIN_LEN {
                        let code = u16::from_be_bytes([payload[12], payload[13]]);
                        acc.count(ProtocolKey::Ether(code));
                    } else {
                        acc.count(ProtocolKey::Truncated);
                    }
                    acc.sample(ts, captured_len, original_len, payload);
                }
                other => {
                    debug!(offset, block_type = other, "skipping block");
                }
            }

            offset += total_len;
        }

        if acc.total_packets() == 0 {
            return Err(Error::NoPackets);
        }

        // Only the first discovered interface is surfaced.
        let (link_type, snaplen) = match interfaces.first() {
            Some(iface) => (iface.link_type.to_string(), iface.snaplen.to_string()),
            None => ("unknown".to_string(), "unknown".to_string()),
        };
        let metadata = vec![
            format!("File path: {source}"),
            "Capture type: PCAPNG".to_string(),
            format!("Primary link-layer type: {link_type}"),
            format!("Primary snapshot length: {snaplen}"),
        ];
        Ok(acc.finish(metadata))
    }
}

/// Byte order of the current section, or a framing error for a body block
/// that arrived before any Section Header Block.
fn section_order_at(order: Option<ByteOrder>, offset: usize) -> Result<ByteOrder> {
    order.ok_or(Error::MalformedBlock {
        offset,
        reason: "block before section header",
    })
}
