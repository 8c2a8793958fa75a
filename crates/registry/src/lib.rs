//! # FELT Membership Registry
//!
//! Membership state machine for a federated-learning data-provider cohort.
//!
//! ## Flow
//!
//! ```text
//! candidate ──request_to_join──▶ [pending stack] ──accept_request──▶ node registry
//!                                      │                              (key_turn += 1)
//!                                      └────decline_request──▶ declined
//!
//! member ──activate / deactivate──▶ own node
//! ```
//!
//! ## Modules
//!
//! - `types`: `Address` and `Bytes32`
//! - `status`: `IdentityStatus` and its transition table
//! - `request`: `JoinRequest` and the LIFO `RequestStack`
//! - `node`: `Node` registry record
//! - `registry`: `MembershipRegistry`, all operations
//! - `shared`: `SharedRegistry`, single-writer handle for threaded hosts
//! - `persistence`: snapshots, consistency validation, file IO
//! - `state_root`: SHA3-256 commitment over the state
//! - `events`: `RegistryEvent` journal entries
//! - `config`: TOML configuration

pub mod config;
pub mod error;
pub mod events;
pub mod node;
pub mod persistence;
pub mod registry;
pub mod request;
pub mod shared;
pub mod state_root;
pub mod status;
pub mod types;

pub use config::RegistryConfig;
pub use error::{ConfigError, RegistryError, SnapshotError};
pub use events::RegistryEvent;
pub use node::Node;
pub use persistence::{load_snapshot, save_snapshot, validate_snapshot_consistency, RegistrySnapshot};
pub use registry::{Admission, MembershipRegistry};
pub use request::{JoinRequest, RequestStack};
pub use shared::SharedRegistry;
pub use status::IdentityStatus;
pub use types::{Address, Bytes32, ParseBytesError};

pub type Result<T> = std::result::Result<T, RegistryError>;
