//! Error types for registry operations, snapshots and configuration.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Address, ParseBytesError};

/// Rejection of a registry operation.
///
/// Every variant is a precondition violation detected before any state is
/// touched, so a returned error always means "nothing changed".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Identity already has a tracked status (pending, declined or admitted).
    #[error("identity {address} already has a tracked join status")]
    DuplicateRequest { address: Address },

    /// Accept or decline attempted with an empty request stack.
    #[error("no pending join requests")]
    NoPendingRequests,

    /// Caller is not a member.
    #[error("identity {address} is not authorized: not a member")]
    Unauthorized { address: Address },

    #[error("node {address} is already active")]
    AlreadyActive { address: Address },

    #[error("node {address} is already inactive")]
    AlreadyInactive { address: Address },

    /// Deactivation target is not a registered member.
    #[error("identity {address} is not a member")]
    NotAMember { address: Address },

    /// Genesis needs at least one founder, otherwise nobody can accept.
    #[error("registry genesis requires at least one founder")]
    NoFounders,

    #[error("founder {address} listed more than once")]
    DuplicateFounder { address: Address },
}

/// Failure while saving, loading or validating a registry snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot schema version {0}")]
    UnsupportedVersion(u32),

    /// Snapshot decoded fine but breaks a registry invariant.
    #[error("inconsistent snapshot: {0}")]
    Inconsistent(String),
}

/// Failure while loading [`RegistryConfig`](crate::config::RegistryConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid founder address {value:?}: {source}")]
    InvalidAddress {
        value: String,
        #[source]
        source: ParseBytesError,
    },

    #[error("config lists no founders")]
    NoFounders,
}
