//! # Registry Snapshots
//!
//! Serializable form of the registry state: the identity→status map, the
//! node list, the pending request stack and both counters.
//!
//! ## Invariants checked on load
//!
//! 1. Every `Admitted(i)` status points at `nodes[i]` and that node carries
//!    the same address.
//! 2. Every node's address has status `Admitted(its index)`.
//! 3. The request stack contains each `Pending` identity exactly once and
//!    nothing else.
//! 4. `active_nodes_count` equals the number of activated nodes.
//! 5. Founders (entry key turn 0, zeroed secrets) come first; the k-th
//!    accepted node carries entry key turn k and `key_turn` equals the number
//!    of accepted nodes.
//!
//! The event journal is runtime-only and is not persisted.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SnapshotError;
use crate::node::Node;
use crate::registry::MembershipRegistry;
use crate::request::{JoinRequest, RequestStack};
use crate::status::IdentityStatus;
use crate::types::{Address, Bytes32};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub schema_version: u32,
    pub statuses: BTreeMap<Address, IdentityStatus>,
    pub nodes: Vec<Node>,
    /// Oldest first; the last entry is the next to be decided.
    pub requests: Vec<JoinRequest>,
    pub key_turn: u64,
    pub active_nodes_count: u64,
}

impl MembershipRegistry {
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            statuses: self.statuses.iter().map(|(a, s)| (*a, *s)).collect(),
            nodes: self.nodes.clone(),
            requests: self.requests.as_slice().to_vec(),
            key_turn: self.key_turn,
            active_nodes_count: self.active_nodes_count,
        }
    }

    /// Rebuilds a registry after validating every invariant of the snapshot.
    pub fn from_snapshot(snapshot: RegistrySnapshot) -> Result<Self, SnapshotError> {
        validate_snapshot_consistency(&snapshot)?;
        Ok(MembershipRegistry {
            statuses: snapshot
                .statuses
                .into_iter()
                .filter(|(_, s)| *s != IdentityStatus::NoRequest)
                .collect(),
            nodes: snapshot.nodes,
            requests: RequestStack::from_entries(snapshot.requests),
            key_turn: snapshot.key_turn,
            active_nodes_count: snapshot.active_nodes_count,
            events: Vec::new(),
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// CONSISTENCY VALIDATION
// ════════════════════════════════════════════════════════════════════════════════

pub fn validate_snapshot_consistency(snapshot: &RegistrySnapshot) -> Result<(), SnapshotError> {
    if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.schema_version));
    }

    // Check 1: admitted statuses point at matching nodes
    let mut admitted = 0usize;
    for (address, status) in &snapshot.statuses {
        if let IdentityStatus::Admitted(index) = status {
            admitted += 1;
            match snapshot.nodes.get(*index as usize) {
                Some(node) if node.address == *address => {}
                Some(node) => {
                    return Err(SnapshotError::Inconsistent(format!(
                        "status of {} points at node {} owned by {}",
                        address, index, node.address
                    )));
                }
                None => {
                    return Err(SnapshotError::Inconsistent(format!(
                        "status of {} points at missing node {}",
                        address, index
                    )));
                }
            }
        }
    }

    // Check 2: every node is backed by an admitted status
    if admitted != snapshot.nodes.len() {
        return Err(SnapshotError::Inconsistent(format!(
            "admitted status count ({}) != node count ({})",
            admitted,
            snapshot.nodes.len()
        )));
    }
    for (index, node) in snapshot.nodes.iter().enumerate() {
        let status = snapshot.statuses.get(&node.address).copied().unwrap_or_default();
        if status != IdentityStatus::Admitted(index as u64) {
            return Err(SnapshotError::Inconsistent(format!(
                "node {} ({}) has status {}",
                index, node.address, status
            )));
        }
    }

    // Check 3: pending set equals stack contents
    let mut seen = HashSet::with_capacity(snapshot.requests.len());
    for request in &snapshot.requests {
        if !seen.insert(request.address) {
            return Err(SnapshotError::Inconsistent(format!(
                "duplicate pending request for {}",
                request.address
            )));
        }
        let status = snapshot.statuses.get(&request.address).copied().unwrap_or_default();
        if status != IdentityStatus::Pending {
            return Err(SnapshotError::Inconsistent(format!(
                "queued request for {} but status is {}",
                request.address, status
            )));
        }
    }
    let pending = snapshot
        .statuses
        .values()
        .filter(|s| **s == IdentityStatus::Pending)
        .count();
    if pending != snapshot.requests.len() {
        return Err(SnapshotError::Inconsistent(format!(
            "pending status count ({}) != queued request count ({})",
            pending,
            snapshot.requests.len()
        )));
    }

    // Check 4: active counter
    let active = snapshot.nodes.iter().filter(|n| n.activated).count() as u64;
    if active != snapshot.active_nodes_count {
        return Err(SnapshotError::Inconsistent(format!(
            "active_nodes_count ({}) != activated nodes ({})",
            snapshot.active_nodes_count, active
        )));
    }

    // Check 5: key turns. Founders lead with turn 0 and zeroed secrets;
    // the k-th accepted node carries turn k and key_turn counts acceptances.
    let mut accepted = 0u64;
    for (index, node) in snapshot.nodes.iter().enumerate() {
        if node.entry_key_turn == 0 {
            if accepted > 0 || node.secrets() != [Bytes32::ZERO; 3] {
                return Err(SnapshotError::Inconsistent(format!(
                    "node {} ({}) has entry_key_turn 0 but is not a founder",
                    index, node.address
                )));
            }
            continue;
        }
        accepted += 1;
        if node.entry_key_turn != accepted {
            return Err(SnapshotError::Inconsistent(format!(
                "node {} has entry_key_turn {}, expected {}",
                index, node.entry_key_turn, accepted
            )));
        }
    }
    if snapshot.key_turn != accepted {
        return Err(SnapshotError::Inconsistent(format!(
            "key_turn ({}) != accepted node count ({})",
            snapshot.key_turn, accepted
        )));
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════════
// FILE IO
// ════════════════════════════════════════════════════════════════════════════════

/// Writes the snapshot as JSON through a sibling temp file and a rename.
pub fn save_snapshot(path: impl AsRef<Path>, snapshot: &RegistrySnapshot) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    let io_err = |source| SnapshotError::Io { path: path.to_path_buf(), source };

    let bytes = serde_json::to_vec_pretty(snapshot)?;
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
    file.write_all(&bytes).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)?;

    info!(path = %path.display(), nodes = snapshot.nodes.len(), "registry snapshot saved");
    Ok(())
}

/// Reads and validates a snapshot.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<RegistrySnapshot, SnapshotError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: RegistrySnapshot = serde_json::from_slice(&bytes)?;
    validate_snapshot_consistency(&snapshot)?;
    Ok(snapshot)
}
