//! pcapsum - Summarize pcap and pcapng capture files.
//!
//! This library decodes the classic pcap format and the block-structured
//! pcapng container into a text summary: capture metadata, an EtherType
//! histogram and a bounded sample of per-packet previews.
//!
//! # Example
//!
//! ```no_run
//! use pcapsum::capture::{self, DEFAULT_MAX_PACKETS};
//!
//! fn main() -> pcapsum::Result<()> {
//!     let summary = capture::summarize_file("capture.pcap", DEFAULT_MAX_PACKETS)?;
//!     for line in &summary.metadata {
//!         println!("{line}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod error;

pub use error::{Error, Result};
