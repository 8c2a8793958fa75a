//! Thread-safe handle around a [`MembershipRegistry`].
//!
//! Every write runs to completion under the write lock, so concurrent callers
//! observe the operations in a single total order and never see a partially
//! applied one. Reads share the read lock.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::events::RegistryEvent;
use crate::node::Node;
use crate::persistence::RegistrySnapshot;
use crate::registry::{Admission, MembershipRegistry};
use crate::request::JoinRequest;
use crate::status::IdentityStatus;
use crate::types::{Address, Bytes32};
use crate::Result;

#[derive(Clone, Debug)]
pub struct SharedRegistry {
    inner: Arc<RwLock<MembershipRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: MembershipRegistry) -> Self {
        Self { inner: Arc::new(RwLock::new(registry)) }
    }

    // writes

    pub fn request_to_join(
        &self,
        identity: &Address,
        parity: bool,
        public_key: Bytes32,
    ) -> Result<RegistryEvent> {
        self.inner.write().request_to_join(identity, parity, public_key)
    }

    pub fn accept_request(
        &self,
        caller: &Address,
        parity: bool,
        secret0: Bytes32,
        secret1: Bytes32,
        secret2: Bytes32,
    ) -> Result<Admission> {
        self.inner
            .write()
            .accept_request(caller, parity, secret0, secret1, secret2)
    }

    pub fn decline_request(&self, caller: &Address) -> Result<Address> {
        self.inner.write().decline_request(caller)
    }

    pub fn activate(&self, caller: &Address) -> Result<RegistryEvent> {
        self.inner.write().activate(caller)
    }

    pub fn deactivate(&self, caller: &Address) -> Result<RegistryEvent> {
        self.inner.write().deactivate(caller)
    }

    /// Drains the journal under the write lock.
    pub fn take_events(&self) -> Vec<RegistryEvent> {
        self.inner.write().take_events()
    }

    // reads

    pub fn is_member(&self, address: &Address) -> bool {
        self.inner.read().is_member(address)
    }

    pub fn status_of(&self, address: &Address) -> IdentityStatus {
        self.inner.read().status_of(address)
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().node_count()
    }

    pub fn request_count(&self) -> usize {
        self.inner.read().request_count()
    }

    pub fn node(&self, index: usize) -> Option<Node> {
        self.inner.read().node(index).cloned()
    }

    pub fn request(&self, index: usize) -> Option<JoinRequest> {
        self.inner.read().request(index).cloned()
    }

    pub fn key_turn(&self) -> u64 {
        self.inner.read().key_turn()
    }

    pub fn active_nodes_count(&self) -> u64 {
        self.inner.read().active_nodes_count()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.inner.read().snapshot()
    }

    pub fn state_root_hex(&self) -> String {
        self.inner.read().state_root_hex()
    }

    /// Runs `f` against a consistent view of the registry.
    pub fn with_read<R>(&self, f: impl FnOnce(&MembershipRegistry) -> R) -> R {
        f(&self.inner.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_handle_clones_see_same_state() {
        let founder = Address([1; 20]);
        let shared = SharedRegistry::new(MembershipRegistry::genesis(&[founder]).expect("genesis"));
        let other = shared.clone();

        other.request_to_join(&Address([2; 20]), true, Bytes32([2; 32])).expect("join");
        assert_eq!(shared.request_count(), 1);
        assert_eq!(shared.status_of(&Address([2; 20])), IdentityStatus::Pending);
        assert_eq!(shared.with_read(|r| r.pending_top().map(|q| q.address)), Some(Address([2; 20])));
    }

    #[test]
    fn test_take_events_drains_journal() {
        let founder = Address([1; 20]);
        let shared = SharedRegistry::new(MembershipRegistry::genesis(&[founder]).expect("genesis"));
        shared.request_to_join(&Address([2; 20]), false, Bytes32([2; 32])).expect("join");
        shared.decline_request(&founder).expect("decline");

        let drained = shared.take_events();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].subject(), Address([2; 20]));
        assert!(shared.with_read(|r| r.events().is_empty()));

        shared.deactivate(&founder).expect("deactivate");
        assert_eq!(shared.take_events().len(), 1);
    }
}
