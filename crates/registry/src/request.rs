//! # Join Requests
//!
//! A [`JoinRequest`] is created when an untracked identity asks to join and
//! is consumed when a member accepts or declines it.
//!
//! Pending requests live on a [`RequestStack`]: decisions always consume the
//! most recently submitted request (last in, first out). Index 0 is the
//! oldest request still waiting.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Bytes32};

/// SEC1 prefix byte for a compressed point with even Y.
const SEC1_EVEN_Y: u8 = 0x02;
/// SEC1 prefix byte for a compressed point with odd Y.
const SEC1_ODD_Y: u8 = 0x03;

/// A candidate's pending request to join the cohort.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub address: Address,
    /// Selects which of the two Y coordinates `public_key` belongs to.
    pub parity: bool,
    /// X coordinate of the candidate's elliptic-curve public key.
    pub public_key: Bytes32,
}

impl JoinRequest {
    /// 33-byte compressed encoding: parity prefix followed by the X coordinate.
    ///
    /// `false` parity maps to `0x02`, `true` to `0x03`.
    pub fn compressed_public_key(&self) -> [u8; 33] {
        let mut out = [0u8; 33];
        out[0] = if self.parity { SEC1_ODD_Y } else { SEC1_EVEN_Y };
        out[1..].copy_from_slice(self.public_key.as_bytes());
        out
    }
}

/// LIFO stack of pending join requests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestStack {
    entries: Vec<JoinRequest>,
}

impl RequestStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: Vec<JoinRequest>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, request: JoinRequest) {
        self.entries.push(request);
    }

    /// Removes the most recently pushed request.
    pub fn pop(&mut self) -> Option<JoinRequest> {
        self.entries.pop()
    }

    /// The request the next `pop` returns.
    pub fn peek(&self) -> Option<&JoinRequest> {
        self.entries.last()
    }

    pub fn get(&self, index: usize) -> Option<&JoinRequest> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.entries.iter().any(|r| &r.address == address)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &JoinRequest> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[JoinRequest] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(seed: u8) -> JoinRequest {
        JoinRequest {
            address: Address([seed; 20]),
            parity: seed % 2 == 1,
            public_key: Bytes32([seed; 32]),
        }
    }

    #[test]
    fn test_stack_pops_most_recent_first() {
        let mut stack = RequestStack::new();
        stack.push(req(1));
        stack.push(req(2));
        stack.push(req(3));

        assert_eq!(stack.peek().map(|r| r.address), Some(Address([3; 20])));
        assert_eq!(stack.pop().map(|r| r.address), Some(Address([3; 20])));
        assert_eq!(stack.pop().map(|r| r.address), Some(Address([2; 20])));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.get(0).map(|r| r.address), Some(Address([1; 20])));
    }

    #[test]
    fn test_empty_stack() {
        let mut stack = RequestStack::new();
        assert!(stack.is_empty());
        assert!(stack.pop().is_none());
        assert!(stack.peek().is_none());
    }

    #[test]
    fn test_contains() {
        let mut stack = RequestStack::new();
        stack.push(req(9));
        assert!(stack.contains(&Address([9; 20])));
        assert!(!stack.contains(&Address([8; 20])));
    }

    #[test]
    fn test_compressed_public_key_prefix() {
        let even = JoinRequest { parity: false, ..req(4) };
        let odd = JoinRequest { parity: true, ..req(4) };
        assert_eq!(even.compressed_public_key()[0], 0x02);
        assert_eq!(odd.compressed_public_key()[0], 0x03);
        assert_eq!(&odd.compressed_public_key()[1..], &[4u8; 32]);
    }
}
