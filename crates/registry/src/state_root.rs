//! Deterministic SHA3-256 commitment over the registry state.
//!
//! Encoding (all integers big-endian):
//! statuses sorted by address (`address ‖ tag ‖ index`), then nodes in
//! registry order, then pending requests oldest first, then `key_turn` and
//! `active_nodes_count`. Each section is prefixed with its entry count.

use hex::encode as hex_encode;
use sha3::{Digest, Sha3_256};

use crate::registry::MembershipRegistry;
use crate::status::IdentityStatus;

const TAG_NO_REQUEST: u8 = 0;
const TAG_PENDING: u8 = 1;
const TAG_DECLINED: u8 = 2;
const TAG_ADMITTED: u8 = 3;

fn encode_status(out: &mut Vec<u8>, status: IdentityStatus) {
    let (tag, index) = match status {
        IdentityStatus::NoRequest => (TAG_NO_REQUEST, 0),
        IdentityStatus::Pending => (TAG_PENDING, 0),
        IdentityStatus::Declined => (TAG_DECLINED, 0),
        IdentityStatus::Admitted(index) => (TAG_ADMITTED, index),
    };
    out.push(tag);
    out.extend_from_slice(&index.to_be_bytes());
}

impl MembershipRegistry {
    pub(crate) fn canonical_bytes(&self) -> Vec<u8> {
        let mut accum = Vec::new();

        let mut statuses: Vec<_> = self.statuses.iter().collect();
        statuses.sort_by_key(|&(addr, _)| addr);
        accum.extend_from_slice(&(statuses.len() as u64).to_be_bytes());
        for (addr, status) in statuses {
            accum.extend_from_slice(addr.as_bytes());
            encode_status(&mut accum, *status);
        }

        accum.extend_from_slice(&(self.nodes.len() as u64).to_be_bytes());
        for node in &self.nodes {
            accum.extend_from_slice(node.address.as_bytes());
            accum.push(u8::from(node.activated));
            accum.push(u8::from(node.parity));
            for secret in node.secrets() {
                accum.extend_from_slice(secret.as_bytes());
            }
            accum.extend_from_slice(&node.entry_key_turn.to_be_bytes());
        }

        accum.extend_from_slice(&(self.requests.len() as u64).to_be_bytes());
        for request in self.requests.iter() {
            accum.extend_from_slice(request.address.as_bytes());
            accum.push(u8::from(request.parity));
            accum.extend_from_slice(request.public_key.as_bytes());
        }

        accum.extend_from_slice(&self.key_turn.to_be_bytes());
        accum.extend_from_slice(&self.active_nodes_count.to_be_bytes());
        accum
    }

    pub fn state_root(&self) -> [u8; 32] {
        let digest = Sha3_256::digest(self.canonical_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    }

    pub fn state_root_hex(&self) -> String {
        hex_encode(self.state_root())
    }
}

#[cfg(test)]
mod tests {
    use crate::registry::MembershipRegistry;
    use crate::types::{Address, Bytes32};

    fn addr(seed: u8) -> Address {
        Address([seed; 20])
    }

    #[test]
    fn test_state_root_is_deterministic() {
        let a = MembershipRegistry::genesis(&[addr(1), addr(2)]).expect("genesis");
        let b = MembershipRegistry::genesis(&[addr(1), addr(2)]).expect("genesis");
        assert_eq!(a.state_root(), b.state_root());
        assert_eq!(a.state_root_hex().len(), 64);
    }

    #[test]
    fn test_state_root_changes_on_every_mutation() {
        let mut reg = MembershipRegistry::genesis(&[addr(1)]).expect("genesis");
        let mut roots = vec![reg.state_root()];

        reg.request_to_join(&addr(2), false, Bytes32([2; 32])).expect("join");
        roots.push(reg.state_root());
        reg.accept_request(&addr(1), false, Bytes32::ZERO, Bytes32::ZERO, Bytes32::ZERO)
            .expect("accept");
        roots.push(reg.state_root());
        reg.deactivate(&addr(2)).expect("deactivate");
        roots.push(reg.state_root());
        reg.activate(&addr(2)).expect("activate");
        roots.push(reg.state_root());

        for pair in roots.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        // deactivate + activate is a round trip
        assert_eq!(roots[2], roots[4]);
    }

    #[test]
    fn test_state_root_ignores_event_journal() {
        let mut reg = MembershipRegistry::genesis(&[addr(1)]).expect("genesis");
        reg.request_to_join(&addr(2), false, Bytes32([2; 32])).expect("join");
        let restored = MembershipRegistry::from_snapshot(reg.snapshot()).expect("restore");
        assert_eq!(reg.state_root(), restored.state_root());
    }
}
