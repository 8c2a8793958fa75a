//! # Membership Write Commands
//!
//! - `init [--founder <hex>]... [--force]`
//! - `request-join --caller <hex> --public-key <hex32> [--odd]`
//! - `accept --caller <hex> --secret0 <hex32> --secret1 <hex32> --secret2 <hex32> [--odd]`
//! - `decline --caller <hex>`
//! - `activate --caller <hex>` / `deactivate --caller <hex>`
//!
//! Each write loads the snapshot, applies exactly one registry operation and
//! saves the snapshot back. The resulting event is printed as JSON. A
//! rejected operation leaves the snapshot file untouched.

use anyhow::{bail, Context as _, Result};
use serde_json::{json, Value};
use tracing::info;

use felt_registry::{Address, Bytes32, MembershipRegistry, RegistryEvent};

use crate::context::Context;

/// Creates a fresh snapshot seated with `founders` (or the config's founders).
pub fn init(ctx: &Context, founders: &[Address], force: bool) -> Result<Value> {
    if ctx.snapshot_path.exists() && !force {
        bail!(
            "snapshot {} already exists (use --force to overwrite)",
            ctx.snapshot_path.display()
        );
    }

    let founders = if founders.is_empty() {
        ctx.config
            .founder_addresses()
            .context("no --founder given and config has no usable founders")?
    } else {
        founders.to_vec()
    };

    let registry = MembershipRegistry::genesis(&founders).context("genesis failed")?;
    ctx.save(&registry)?;
    info!(path = %ctx.snapshot_path.display(), founders = founders.len(), "registry initialized");

    Ok(json!({
        "snapshot": ctx.snapshot_path.display().to_string(),
        "founders": founders,
        "state_root": registry.state_root_hex(),
    }))
}

/// Kind of single-operation write.
pub enum Write {
    RequestJoin { caller: Address, parity: bool, public_key: Bytes32 },
    Accept { caller: Address, parity: bool, secrets: [Bytes32; 3] },
    Decline { caller: Address },
    Activate { caller: Address },
    Deactivate { caller: Address },
}

pub fn apply(ctx: &Context, write: Write) -> Result<Value> {
    let mut registry = ctx.load()?;
    let event = apply_to(&mut registry, write)?;
    ctx.save(&registry)?;
    info!(subject = %event.subject(), path = %ctx.snapshot_path.display(), "registry write applied");

    let mut out = serde_json::to_value(&event)?;
    out["state_root"] = Value::String(registry.state_root_hex());
    Ok(out)
}

fn apply_to(registry: &mut MembershipRegistry, write: Write) -> Result<RegistryEvent> {
    match write {
        Write::RequestJoin { caller, parity, public_key } => {
            Ok(registry.request_to_join(&caller, parity, public_key)?)
        }
        Write::Accept { caller, parity, secrets: [s0, s1, s2] } => {
            let admission = registry.accept_request(&caller, parity, s0, s1, s2)?;
            Ok(RegistryEvent::RequestAccepted {
                address: admission.address,
                accepted_by: caller,
                index: admission.index,
                entry_key_turn: admission.entry_key_turn,
            })
        }
        Write::Decline { caller } => {
            let declined = registry.decline_request(&caller)?;
            Ok(RegistryEvent::RequestDeclined { address: declined, declined_by: caller })
        }
        Write::Activate { caller } => Ok(registry.activate(&caller)?),
        Write::Deactivate { caller } => Ok(registry.deactivate(&caller)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use felt_registry::{IdentityStatus, RegistryError};

    fn addr(seed: u8) -> Address {
        Address([seed; 20])
    }

    fn ctx_in(dir: &tempfile::TempDir) -> Context {
        Context::resolve(None, Some(dir.path().join("registry.json"))).expect("resolve")
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = ctx_in(&dir);
        init(&ctx, &[addr(1)], false).expect("first init");
        assert!(init(&ctx, &[addr(2)], false).is_err());

        init(&ctx, &[addr(2)], true).expect("forced init");
        assert!(ctx.load().expect("load").is_member(&addr(2)));
    }

    #[test]
    fn test_init_without_founders_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = ctx_in(&dir);
        assert!(init(&ctx, &[], false).is_err());
        assert!(!ctx.snapshot_path.exists());
    }

    #[test]
    fn test_write_sequence_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = ctx_in(&dir);
        init(&ctx, &[addr(1)], false).expect("init");

        let out = apply(
            &ctx,
            Write::RequestJoin { caller: addr(5), parity: true, public_key: Bytes32([5; 32]) },
        )
        .expect("join");
        assert_eq!(out["event"], "join_requested");

        let out = apply(
            &ctx,
            Write::Accept { caller: addr(1), parity: false, secrets: [Bytes32([9; 32]); 3] },
        )
        .expect("accept");
        assert_eq!(out["event"], "request_accepted");
        assert_eq!(out["address"], addr(5).to_hex());
        assert_eq!(out["accepted_by"], addr(1).to_hex());
        assert_eq!(out["index"], 1);
        assert_eq!(out["entry_key_turn"], 1);

        let reg = ctx.load().expect("load");
        assert_eq!(reg.status_of(&addr(5)), IdentityStatus::Admitted(1));
        assert_eq!(out["state_root"], reg.state_root_hex());
    }

    #[test]
    fn test_decline_reports_declined_identity() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = ctx_in(&dir);
        init(&ctx, &[addr(1)], false).expect("init");
        apply(&ctx, Write::RequestJoin { caller: addr(6), parity: false, public_key: Bytes32([6; 32]) })
            .expect("join 6");
        apply(&ctx, Write::RequestJoin { caller: addr(7), parity: false, public_key: Bytes32([7; 32]) })
            .expect("join 7");

        let out = apply(&ctx, Write::Decline { caller: addr(1) }).expect("decline");
        assert_eq!(out["event"], "request_declined");
        assert_eq!(out["address"], addr(7).to_hex());
        assert_eq!(out["declined_by"], addr(1).to_hex());
        assert_eq!(ctx.load().expect("load").status_of(&addr(6)), IdentityStatus::Pending);
    }

    #[test]
    fn test_rejected_write_keeps_snapshot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = ctx_in(&dir);
        init(&ctx, &[addr(1)], false).expect("init");
        let before = std::fs::read(&ctx.snapshot_path).expect("read");

        let err = apply(&ctx, Write::Decline { caller: addr(1) }).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RegistryError>(),
            Some(&RegistryError::NoPendingRequests)
        );
        assert_eq!(std::fs::read(&ctx.snapshot_path).expect("read"), before);
    }
}
