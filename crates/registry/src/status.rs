//! # Identity Status & Request Lifecycle
//!
//! Every address known to the registry is in exactly one of four states.
//! Unknown addresses are implicitly `NoRequest`.
//!
//! ## Transition Rules (Closed Set)
//!
//! ```text
//! From          → To             Trigger
//! ─────────────── ────────────── ──────────────────────────────
//! NoRequest     → Pending        request_to_join
//! Pending       → Admitted(i)    accept_request (i = next registry slot)
//! Pending       → Declined       decline_request
//! ```
//!
//! The registry checks every status write against this table in debug
//! builds. `Admitted` and `Declined` are terminal. A declined address can never
//! request again, and an admitted address keeps its registry slot forever.
//! Founders enter `Admitted` directly at genesis, outside this table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an identity.
///
/// `Admitted` carries the permanent index of the identity's node in the
/// registry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityStatus {
    /// Never requested to join.
    #[default]
    NoRequest,
    /// Join request waiting for a member's decision.
    Pending,
    /// Join request was declined.
    Declined,
    /// Member with a node at the given registry index.
    Admitted(u64),
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityStatus::NoRequest => write!(f, "no-request"),
            IdentityStatus::Pending => write!(f, "pending"),
            IdentityStatus::Declined => write!(f, "declined"),
            IdentityStatus::Admitted(index) => write!(f, "admitted({})", index),
        }
    }
}

impl IdentityStatus {
    /// Returns whether a transition from `self` to `target` is allowed.
    ///
    /// The admitted index is not checked here; the registry assigns it.
    #[must_use]
    #[inline]
    pub const fn can_transition_to(&self, target: IdentityStatus) -> bool {
        matches!(
            (self, &target),
            (IdentityStatus::NoRequest, IdentityStatus::Pending)
                | (IdentityStatus::Pending, IdentityStatus::Admitted(_))
                | (IdentityStatus::Pending, IdentityStatus::Declined)
        )
    }

    #[must_use]
    #[inline]
    pub const fn is_member(&self) -> bool {
        matches!(self, IdentityStatus::Admitted(_))
    }

    /// Registry index for admitted identities.
    #[must_use]
    #[inline]
    pub const fn node_index(&self) -> Option<u64> {
        match self {
            IdentityStatus::Admitted(index) => Some(*index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [IdentityStatus; 4] = [
        IdentityStatus::NoRequest,
        IdentityStatus::Pending,
        IdentityStatus::Declined,
        IdentityStatus::Admitted(0),
    ];

    #[test]
    fn test_allowed_transitions() {
        assert!(IdentityStatus::NoRequest.can_transition_to(IdentityStatus::Pending));
        assert!(IdentityStatus::Pending.can_transition_to(IdentityStatus::Admitted(7)));
        assert!(IdentityStatus::Pending.can_transition_to(IdentityStatus::Declined));
    }

    #[test]
    fn test_terminal_states_have_no_exit() {
        for target in ALL {
            assert!(!IdentityStatus::Declined.can_transition_to(target));
            assert!(!IdentityStatus::Admitted(3).can_transition_to(target));
        }
    }

    #[test]
    fn test_no_skip_or_self_transitions() {
        assert!(!IdentityStatus::NoRequest.can_transition_to(IdentityStatus::Admitted(0)));
        assert!(!IdentityStatus::NoRequest.can_transition_to(IdentityStatus::Declined));
        assert!(!IdentityStatus::NoRequest.can_transition_to(IdentityStatus::NoRequest));
        assert!(!IdentityStatus::Pending.can_transition_to(IdentityStatus::Pending));
        assert!(!IdentityStatus::Pending.can_transition_to(IdentityStatus::NoRequest));
    }

    #[test]
    fn test_membership_helpers() {
        assert!(IdentityStatus::Admitted(2).is_member());
        assert_eq!(IdentityStatus::Admitted(2).node_index(), Some(2));
        assert_eq!(IdentityStatus::Pending.node_index(), None);
        assert!(!IdentityStatus::Pending.is_member());
        assert_eq!(IdentityStatus::default(), IdentityStatus::NoRequest);
    }

    #[test]
    fn test_display() {
        assert_eq!(IdentityStatus::NoRequest.to_string(), "no-request");
        assert_eq!(IdentityStatus::Admitted(4).to_string(), "admitted(4)");
    }
}
