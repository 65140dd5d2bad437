//! Per-parse accumulation and summary rendering.

use chrono::{LocalResult, SecondsFormat, TimeZone, Utc};

use super::ethertype;

/// Placeholder when the histogram is empty.
const NO_ETHERTYPE_INFO: &str = "No EtherType information.";
/// Placeholder when no sample lines were captured.
const NO_SAMPLES: &str = "No packet samples available.";

/// How many histogram entries the rendered section keeps.
const TOP_ETHERTYPES: usize = 5;
/// Number of payload bytes included in a sample preview.
const PREVIEW_BYTES: usize = 32;

/// Structured result of a successful parse. Immutable once returned.
#[derive(Debug, Clone)]
pub struct CaptureSummary {
    /// Ordered, human-readable `key: value` lines describing the capture.
    pub metadata: Vec<String>,
    /// Rendered EtherType histogram section.
    pub ethertype_section: String,
    /// Rendered packet sample section.
    pub sample_section: String,
}

/// Histogram key: an EtherType code, or the pseudo-bucket for frames too
/// short to carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProtocolKey {
    Ether(u16),
    Truncated,
}

impl ProtocolKey {
    fn label(self) -> String {
        match self {
            ProtocolKey::Ether(code) => ethertype::describe(code),
            ProtocolKey::Truncated => ethertype::TRUNCATED_LABEL.to_string(),
        }
    }
}

/// Running aggregates for a single parse.
///
/// Owned by the parse call that created it; nothing here outlives the parse
/// or is shared across threads.
#[derive(Debug)]
pub(crate) struct Accumulator {
    max_packets: usize,
    total_packets: u64,
    total_bytes: u64,
    earliest_ts: Option<f64>,
    latest_ts: Option<f64>,
    // Insertion order doubles as the tie-break for the top-N rendering.
    ether_counts: Vec<(ProtocolKey, u64)>,
    samples: Vec<String>,
}

impl Accumulator {
    pub(crate) fn new(max_packets: usize) -> Self {
        Self {
            max_packets,
            total_packets: 0,
            total_bytes: 0,
            earliest_ts: None,
            latest_ts: None,
            ether_counts: Vec::new(),
            samples: Vec::new(),
        }
    }

    /// Fold one decoded packet into the running totals.
    pub(crate) fn observe(&mut self, ts: f64, captured_len: u32) {
        self.total_packets += 1;
        self.total_bytes += u64::from(captured_len);
        self.earliest_ts = Some(self.earliest_ts.map_or(ts, |t| t.min(ts)));
        self.latest_ts = Some(self.latest_ts.map_or(ts, |t| t.max(ts)));
    }

    /// Count one occurrence of a protocol key.
    pub(crate) fn count(&mut self, key: ProtocolKey) {
        if let Some(entry) = self.ether_counts.iter_mut().find(|(k, _)| *k == key) {
            entry.1 += 1;
        } else {
            self.ether_counts.push((key, 1));
        }
    }

    /// Append a rendered sample line while the cap leaves room.
    pub(crate) fn sample(&mut self, ts: f64, captured_len: u32, original_len: u32, payload: &[u8]) {
        if self.samples.len() >= self.max_packets {
            return;
        }
        let preview = hex_preview(payload);
        self.samples.push(format!(
            "- ts={}, captured={captured_len}, original={original_len}, preview={preview}",
            format_timestamp(ts)
        ));
    }

    pub(crate) fn total_packets(&self) -> u64 {
        self.total_packets
    }

    /// Seconds between the earliest and latest packet, clamped at zero.
    fn duration(&self) -> f64 {
        match (self.earliest_ts, self.latest_ts) {
            (Some(earliest), Some(latest)) => (latest - earliest).max(0.0),
            _ => 0.0,
        }
    }

    /// Render the summary, appending the shared totals to the caller's
    /// format-specific metadata lines.
    pub(crate) fn finish(self, mut metadata: Vec<String>) -> CaptureSummary {
        metadata.push(format!("Total packets: {}", self.total_packets));
        metadata.push(format!("Total captured bytes: {}", self.total_bytes));
        metadata.push(format!(
            "Capture duration (approx): {:.6} seconds",
            self.duration()
        ));
        if let Some(ts) = self.earliest_ts {
            metadata.push(format!("Earliest timestamp (UTC): {}", format_timestamp(ts)));
        }
        if let Some(ts) = self.latest_ts {
            metadata.push(format!("Latest timestamp (UTC): {}", format_timestamp(ts)));
        }

        CaptureSummary {
            metadata,
            ethertype_section: self.render_ethertypes(),
            sample_section: self.render_samples(),
        }
    }

    fn render_ethertypes(&self) -> String {
        let mut ranked: Vec<&(ProtocolKey, u64)> = self.ether_counts.iter().collect();
        // Stable sort: equal counts keep first-observed order.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let lines: Vec<String> = ranked
            .iter()
            .take(TOP_ETHERTYPES)
            .map(|(key, count)| format!("- {}: {} packet(s)", key.label(), count))
            .collect();

        if lines.is_empty() {
            NO_ETHERTYPE_INFO.to_string()
        } else {
            lines.join("\n")
        }
    }

    fn render_samples(&self) -> String {
        if self.samples.is_empty() {
            NO_SAMPLES.to_string()
        } else {
            self.samples.join("\n")
        }
    }
}

/// Render a fractional Unix timestamp as ISO-8601 UTC with microsecond
/// precision, omitting the fraction when it is zero.
pub(crate) fn format_timestamp(ts: f64) -> String {
    let micros = (ts * 1_000_000.0).round() as i64;
    match Utc.timestamp_micros(micros) {
        LocalResult::Single(dt) => {
            let style = if micros % 1_000_000 == 0 {
                SecondsFormat::Secs
            } else {
                SecondsFormat::Micros
            };
            dt.to_rfc3339_opts(style, false)
        }
        _ => format!("{ts:.6}"),
    }
}

fn hex_preview(payload: &[u8]) -> String {
    payload
        .iter()
        .take(PREVIEW_BYTES)
        .map(|b| format!("{b:02x}"))
        .collect()
}
