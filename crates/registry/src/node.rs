//! # Node Record
//!
//! `Node` is the registry's record for an admitted identity. Records are
//! append-only: a node's index is assigned once and never changes, and the
//! identity's `IdentityStatus::Admitted(index)` points back at it.
//!
//! The three secrets and their parity are the shared-secret material chosen
//! by the accepting member. They are stored as-is and never validated.
//! `entry_key_turn` is the key turn the node was admitted at; later secret
//! rotations use it to decide which epochs the node may read.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Bytes32};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub address: Address,
    pub activated: bool,
    /// Encoding of the shared secret, chosen by the accepting member.
    pub parity: bool,
    pub secret0: Bytes32,
    pub secret1: Bytes32,
    pub secret2: Bytes32,
    pub entry_key_turn: u64,
}

impl Node {
    /// Founder record seated at genesis: active, no secrets, key turn 0.
    pub(crate) fn founder(address: Address) -> Self {
        Node {
            address,
            activated: true,
            parity: false,
            secret0: Bytes32::ZERO,
            secret1: Bytes32::ZERO,
            secret2: Bytes32::ZERO,
            entry_key_turn: 0,
        }
    }

    pub fn secrets(&self) -> [Bytes32; 3] {
        [self.secret0, self.secret1, self.secret2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_founder_record() {
        let n = Node::founder(Address([1; 20]));
        assert!(n.activated);
        assert_eq!(n.entry_key_turn, 0);
        assert_eq!(n.secrets(), [Bytes32::ZERO; 3]);
    }
}
