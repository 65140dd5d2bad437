//! EtherType labels.

/// Pseudo-bucket label for frames too short to carry an EtherType field.
pub const TRUNCATED_LABEL: &str = "<truncated>";

/// Human-friendly label for a 16-bit EtherType code.
///
/// Well-known codes render as `0x0800 (IPv4)`; anything else falls back to
/// the bare 4-hex-digit uppercase form.
pub fn describe(code: u16) -> String {
    let name = match code {
        0x0800 => "IPv4",
        0x0806 => "ARP",
        0x0842 => "Wake-on-LAN",
        0x22F3 => "IETF TRILL",
        0x6003 => "DECnet",
        0x8035 => "RARP",
        0x809B => "Appletalk",
        0x80F3 => "AARP",
        0x8100 => "VLAN Tagged",
        0x86DD => "IPv6",
        0x8808 => "Ethernet Flow Control",
        0x8809 => "Ethernet Slow Protocols",
        0x8847 => "MPLS Unicast",
        0x8848 => "MPLS Multicast",
        0x8863 => "PPPoE Discovery",
        0x8864 => "PPPoE Session",
        0x88A8 => "Q-in-Q",
        0x88CC => "LLDP",
        0x88E5 => "MACsec",
        0x88F7 => "PTP",
        0x8906 => "Fibre Channel over Ethernet",
        0x8914 => "FCoE Initialization",
        0x9100 => "VLAN Tagged - double tagged",
        _ => return format!("0x{code:04X}"),
    };
    format!("0x{code:04X} ({name})")
}
