//! Registry events.
//!
//! Each successful write produces exactly one [`RegistryEvent`]. The registry
//! appends it to its in-memory journal; the journal is not part of snapshots
//! or the state root.

use serde::{Deserialize, Serialize};

use crate::types::Address;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    JoinRequested {
        address: Address,
        parity: bool,
    },
    RequestAccepted {
        address: Address,
        accepted_by: Address,
        index: u64,
        entry_key_turn: u64,
    },
    RequestDeclined {
        address: Address,
        declined_by: Address,
    },
    NodeActivated {
        address: Address,
        index: u64,
    },
    NodeDeactivated {
        address: Address,
        index: u64,
    },
}

impl RegistryEvent {
    /// Identity the event is about.
    pub fn subject(&self) -> Address {
        match self {
            RegistryEvent::JoinRequested { address, .. }
            | RegistryEvent::RequestAccepted { address, .. }
            | RegistryEvent::RequestDeclined { address, .. }
            | RegistryEvent::NodeActivated { address, .. }
            | RegistryEvent::NodeDeactivated { address, .. } => *address,
        }
    }
}
