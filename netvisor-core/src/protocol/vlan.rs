//! IEEE 802.1Q / 802.1ad VLAN tag stripping.

use super::ethernet::ethertype;
use crate::error::ProtocolError;

/// Deepest tag stack followed before the frame is rejected.
pub const MAX_VLAN_DEPTH: usize = 8;

pub fn is_vlan_tag(ethertype: u16) -> bool {
    matches!(
        ethertype,
        ethertype::VLAN | ethertype::QINQ | ethertype::QINQ_LEGACY
    )
}

/// Skip any VLAN tags, returning the inner EtherType and payload.
///
/// The TPID has already been consumed by the link layer, so each tag is
/// the TCI (2 bytes) followed by the next EtherType (2 bytes).
pub fn strip(mut ethertype: u16, mut data: &[u8]) -> Result<(u16, &[u8]), ProtocolError> {
    let mut depth = 0;

    while is_vlan_tag(ethertype) {
        depth += 1;
        if depth > MAX_VLAN_DEPTH {
            return Err(ProtocolError::InvalidField {
                protocol: "vlan",
                field: "depth",
                reason: format!("more than {MAX_VLAN_DEPTH} stacked tags"),
            });
        }

        let tag = data.get(..4).ok_or(ProtocolError::PacketTooShort {
            protocol: "vlan",
            needed: 4,
            have: data.len(),
        })?;
        ethertype = u16::from_be_bytes([tag[2], tag[3]]);
        data = &data[4..];
    }

    Ok((ethertype, data))
}
