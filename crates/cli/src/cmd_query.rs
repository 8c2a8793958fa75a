//! Read-only commands: `status`, `nodes`, `requests`, `summary`.
//!
//! Plain output is one line per entry; `--json` switches to JSON.

use anyhow::Result;
use serde_json::json;

use felt_registry::{Address, MembershipRegistry};

pub fn status(registry: &MembershipRegistry, address: &Address, as_json: bool) -> Result<String> {
    let status = registry.status_of(address);
    let node = registry.node_of(address);
    if as_json {
        return Ok(serde_json::to_string_pretty(&json!({
            "address": address,
            "status": status,
            "node": node,
        }))?);
    }

    let mut line = format!("{} {}", address, status);
    if let Some(node) = node {
        line.push_str(&format!(
            " activated={} entry_key_turn={}",
            node.activated, node.entry_key_turn
        ));
    }
    Ok(line)
}

pub fn nodes(registry: &MembershipRegistry, as_json: bool) -> Result<String> {
    if as_json {
        return Ok(serde_json::to_string_pretty(registry.nodes())?);
    }
    let lines: Vec<String> = registry
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| {
            format!(
                "{:>4} {} {} parity={} entry_key_turn={}",
                index,
                node.address,
                if node.activated { "active" } else { "inactive" },
                u8::from(node.parity),
                node.entry_key_turn
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Pending requests, oldest first; the last line is decided next.
pub fn requests(registry: &MembershipRegistry, as_json: bool) -> Result<String> {
    if as_json {
        return Ok(serde_json::to_string_pretty(registry.requests())?);
    }
    if registry.request_count() == 0 {
        return Ok("no pending requests".to_string());
    }
    let lines: Vec<String> = registry
        .requests()
        .iter()
        .enumerate()
        .map(|(index, request)| {
            format!(
                "{:>4} {} pubkey={}",
                index,
                request.address,
                hex::encode(request.compressed_public_key())
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

pub fn summary(registry: &MembershipRegistry, as_json: bool) -> Result<String> {
    let next = registry.pending_top().map(|r| r.address);
    if as_json {
        return Ok(serde_json::to_string_pretty(&json!({
            "nodes": registry.node_count(),
            "active_nodes": registry.active_nodes_count(),
            "pending_requests": registry.request_count(),
            "key_turn": registry.key_turn(),
            "next_decision": next,
            "state_root": registry.state_root_hex(),
        }))?);
    }
    Ok(format!(
        "nodes={} active={} pending={} key_turn={} next={} state_root={}",
        registry.node_count(),
        registry.active_nodes_count(),
        registry.request_count(),
        registry.key_turn(),
        next.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()),
        registry.state_root_hex()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use felt_registry::Bytes32;

    fn addr(seed: u8) -> Address {
        Address([seed; 20])
    }

    fn sample() -> MembershipRegistry {
        let mut reg = MembershipRegistry::genesis(&[addr(1)]).expect("genesis");
        reg.request_to_join(&addr(2), true, Bytes32([0xab; 32])).expect("join");
        reg
    }

    #[test]
    fn test_status_lines() {
        let reg = sample();
        let founder = status(&reg, &addr(1), false).expect("status");
        assert!(founder.ends_with("admitted(0) activated=true entry_key_turn=0"));
        let pending = status(&reg, &addr(2), false).expect("status");
        assert_eq!(pending, format!("{} pending", addr(2)));
    }

    #[test]
    fn test_status_json_for_unknown_identity() {
        let reg = sample();
        let out = status(&reg, &addr(9), true).expect("status");
        let v: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(v["status"], "NoRequest");
        assert!(v["node"].is_null());
    }

    #[test]
    fn test_requests_show_compressed_key() {
        let reg = sample();
        let out = requests(&reg, false).expect("requests");
        assert!(out.contains(&format!("pubkey=03{}", "ab".repeat(32))));
    }

    #[test]
    fn test_summary_names_next_decision() {
        let reg = sample();
        let out = summary(&reg, false).expect("summary");
        assert!(out.starts_with(&format!("nodes=1 active=1 pending=1 key_turn=0 next={}", addr(2))));
    }
}
