//! # Membership Registry
//!
//! Owns the identity→status index, the append-only node registry and the
//! pending request stack, plus the `key_turn` and `active_nodes_count`
//! counters.
//!
//! ## Invariant Preservation
//!
//! 1. Every `Admitted(i)` status has `nodes[i].address` equal to its key, and
//!    every node's address maps back to `Admitted(its index)`.
//! 2. The request stack holds exactly the `Pending` identities, each once.
//! 3. `key_turn` equals the number of accepted requests.
//! 4. `active_nodes_count` equals the number of activated nodes.
//!
//! Every mutating method validates all of its preconditions before touching
//! any field. An `Err` therefore always leaves the registry unchanged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::node::Node;
use crate::request::{JoinRequest, RequestStack};
use crate::status::IdentityStatus;
use crate::types::{Address, Bytes32};
use crate::Result;

/// Outcome of a successful `accept_request`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admission {
    pub address: Address,
    pub index: u64,
    pub entry_key_turn: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MembershipRegistry {
    pub(crate) statuses: HashMap<Address, IdentityStatus>,
    pub(crate) nodes: Vec<Node>,
    pub(crate) requests: RequestStack,
    pub(crate) key_turn: u64,
    pub(crate) active_nodes_count: u64,
    pub(crate) events: Vec<RegistryEvent>,
}

fn reject(operation: &'static str, err: RegistryError) -> RegistryError {
    warn!(operation, error = %err, "registry operation rejected");
    err
}

impl MembershipRegistry {
    // ════════════════════════════════════════════════════════════════════════
    // GENESIS
    // ════════════════════════════════════════════════════════════════════════

    /// Creates a registry with `founders` seated at indices `0..founders.len()`.
    ///
    /// Founders are active, carry `entry_key_turn == 0` and do not advance
    /// `key_turn`.
    pub fn genesis(founders: &[Address]) -> Result<Self> {
        if founders.is_empty() {
            return Err(RegistryError::NoFounders);
        }

        let mut statuses = HashMap::with_capacity(founders.len());
        let mut nodes = Vec::with_capacity(founders.len());
        for (index, founder) in founders.iter().enumerate() {
            if statuses
                .insert(*founder, IdentityStatus::Admitted(index as u64))
                .is_some()
            {
                return Err(RegistryError::DuplicateFounder { address: *founder });
            }
            nodes.push(Node::founder(*founder));
        }

        info!(founders = founders.len(), "membership registry genesis");
        Ok(MembershipRegistry {
            statuses,
            active_nodes_count: nodes.len() as u64,
            nodes,
            requests: RequestStack::new(),
            key_turn: 0,
            events: Vec::new(),
        })
    }

    // ════════════════════════════════════════════════════════════════════════
    // READS
    // ════════════════════════════════════════════════════════════════════════

    pub fn status_of(&self, address: &Address) -> IdentityStatus {
        self.statuses.get(address).copied().unwrap_or_default()
    }

    pub fn is_member(&self, address: &Address) -> bool {
        self.status_of(address).is_member()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Pending request by position, 0 being the oldest.
    pub fn request(&self, index: usize) -> Option<&JoinRequest> {
        self.requests.get(index)
    }

    pub fn node_of(&self, address: &Address) -> Option<&Node> {
        let index = self.status_of(address).node_index()?;
        self.nodes.get(index as usize)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn requests(&self) -> &[JoinRequest] {
        self.requests.as_slice()
    }

    /// The request the next accept or decline will consume.
    pub fn pending_top(&self) -> Option<&JoinRequest> {
        self.requests.peek()
    }

    pub fn key_turn(&self) -> u64 {
        self.key_turn
    }

    pub fn active_nodes_count(&self) -> u64 {
        self.active_nodes_count
    }

    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Drains the journal, oldest event first.
    ///
    /// Long-running hosts call this after forwarding events so the journal
    /// stays bounded.
    pub fn take_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    // ════════════════════════════════════════════════════════════════════════
    // REQUEST LIFECYCLE
    // ════════════════════════════════════════════════════════════════════════

    /// Queues a join request for an identity the registry has never seen.
    pub fn request_to_join(
        &mut self,
        identity: &Address,
        parity: bool,
        public_key: Bytes32,
    ) -> Result<RegistryEvent> {
        if self.status_of(identity) != IdentityStatus::NoRequest {
            return Err(reject(
                "request_to_join",
                RegistryError::DuplicateRequest { address: *identity },
            ));
        }

        debug_assert!(!self.requests.contains(identity));
        self.statuses.insert(*identity, IdentityStatus::Pending);
        self.requests.push(JoinRequest {
            address: *identity,
            parity,
            public_key,
        });

        debug!(address = %identity, pending = self.requests.len(), "join requested");
        Ok(self.record(RegistryEvent::JoinRequested {
            address: *identity,
            parity,
        }))
    }

    /// Admits the most recently submitted pending request.
    ///
    /// `parity` and the secrets come from the accepting member; the
    /// candidate's own request parity is not carried into the node.
    pub fn accept_request(
        &mut self,
        caller: &Address,
        parity: bool,
        secret0: Bytes32,
        secret1: Bytes32,
        secret2: Bytes32,
    ) -> Result<Admission> {
        self.require_member("accept_request", caller)?;
        let request = self
            .requests
            .pop()
            .ok_or_else(|| reject("accept_request", RegistryError::NoPendingRequests))?;
        let index = self.nodes.len() as u64;
        debug_assert!(self
            .status_of(&request.address)
            .can_transition_to(IdentityStatus::Admitted(index)));
        self.key_turn += 1;
        self.statuses
            .insert(request.address, IdentityStatus::Admitted(index));
        self.nodes.push(Node {
            address: request.address,
            activated: true,
            parity,
            secret0,
            secret1,
            secret2,
            entry_key_turn: self.key_turn,
        });
        self.active_nodes_count += 1;

        info!(
            address = %request.address,
            accepted_by = %caller,
            index,
            key_turn = self.key_turn,
            "join request accepted"
        );
        self.record(RegistryEvent::RequestAccepted {
            address: request.address,
            accepted_by: *caller,
            index,
            entry_key_turn: self.key_turn,
        });
        Ok(Admission {
            address: request.address,
            index,
            entry_key_turn: self.key_turn,
        })
    }

    /// Declines the most recently submitted pending request.
    ///
    /// Returns the declined identity.
    pub fn decline_request(&mut self, caller: &Address) -> Result<Address> {
        self.require_member("decline_request", caller)?;
        let request = self
            .requests
            .pop()
            .ok_or_else(|| reject("decline_request", RegistryError::NoPendingRequests))?;
        debug_assert!(self
            .status_of(&request.address)
            .can_transition_to(IdentityStatus::Declined));

        self.statuses.insert(request.address, IdentityStatus::Declined);

        info!(address = %request.address, declined_by = %caller, "join request declined");
        self.record(RegistryEvent::RequestDeclined {
            address: request.address,
            declined_by: *caller,
        });
        Ok(request.address)
    }

    // ════════════════════════════════════════════════════════════════════════
    // ACTIVATION
    // ════════════════════════════════════════════════════════════════════════

    /// Marks the caller's own node active.
    pub fn activate(&mut self, caller: &Address) -> Result<RegistryEvent> {
        let index = self.require_member("activate", caller)?;
        let node = &mut self.nodes[index];
        if node.activated {
            return Err(reject("activate", RegistryError::AlreadyActive { address: *caller }));
        }

        node.activated = true;
        self.active_nodes_count += 1;

        info!(address = %caller, index, active = self.active_nodes_count, "node activated");
        Ok(self.record(RegistryEvent::NodeActivated {
            address: *caller,
            index: index as u64,
        }))
    }

    /// Marks the caller's own node inactive.
    pub fn deactivate(&mut self, caller: &Address) -> Result<RegistryEvent> {
        self.deactivate_by_address(caller)
    }

    /// Deactivates any member's node.
    ///
    /// Only reachable through `deactivate` today; kept separate for
    /// operator-driven eviction.
    pub(crate) fn deactivate_by_address(&mut self, identity: &Address) -> Result<RegistryEvent> {
        let index = match self.status_of(identity) {
            IdentityStatus::Admitted(index) => index as usize,
            _ => {
                return Err(reject(
                    "deactivate",
                    RegistryError::NotAMember { address: *identity },
                ))
            }
        };
        let node = &mut self.nodes[index];
        if !node.activated {
            return Err(reject(
                "deactivate",
                RegistryError::AlreadyInactive { address: *identity },
            ));
        }

        node.activated = false;
        self.active_nodes_count -= 1;

        info!(address = %identity, index, active = self.active_nodes_count, "node deactivated");
        Ok(self.record(RegistryEvent::NodeDeactivated {
            address: *identity,
            index: index as u64,
        }))
    }

    // ════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ════════════════════════════════════════════════════════════════════════

    /// Node index of `caller`, or `Unauthorized` for non-members.
    fn require_member(&self, operation: &'static str, caller: &Address) -> Result<usize> {
        match self.status_of(caller) {
            IdentityStatus::Admitted(index) => Ok(index as usize),
            _ => Err(reject(operation, RegistryError::Unauthorized { address: *caller })),
        }
    }

    fn record(&mut self, event: RegistryEvent) -> RegistryEvent {
        self.events.push(event.clone());
        event
    }
}
