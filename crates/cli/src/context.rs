//! Resolves configuration and the snapshot location, and moves the registry
//! between disk and memory for a single command.
//!
//! ## Snapshot path resolution
//!
//! 1. `--snapshot <path>` (highest priority)
//! 2. `FELT_REGISTRY_SNAPSHOT`
//! 3. `snapshot_path` from `--config`
//! 4. Default: `./felt-registry.json`

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use felt_registry::config::load_from_file;
use felt_registry::{load_snapshot, save_snapshot, MembershipRegistry, RegistryConfig};

pub struct Context {
    pub config: RegistryConfig,
    pub snapshot_path: PathBuf,
}

impl Context {
    pub fn resolve(config_path: Option<&Path>, snapshot: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => load_from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => RegistryConfig::default(),
        };
        config.apply_env_overrides();
        let snapshot_path = snapshot.unwrap_or_else(|| config.snapshot_path.clone());
        Ok(Context { config, snapshot_path })
    }

    pub fn load(&self) -> Result<MembershipRegistry> {
        let snapshot = load_snapshot(&self.snapshot_path).with_context(|| {
            format!(
                "failed to load registry snapshot {} (run `init` first?)",
                self.snapshot_path.display()
            )
        })?;
        MembershipRegistry::from_snapshot(snapshot).context("failed to restore registry")
    }

    pub fn save(&self, registry: &MembershipRegistry) -> Result<()> {
        save_snapshot(&self.snapshot_path, &registry.snapshot()).with_context(|| {
            format!("failed to save registry snapshot {}", self.snapshot_path.display())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_snapshot_wins_over_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("cfg.toml");
        std::fs::write(&cfg_path, "snapshot_path = \"/from/config.json\"\n").expect("write");

        let ctx = Context::resolve(Some(&cfg_path), Some(dir.path().join("cli.json")))
            .expect("resolve");
        assert_eq!(ctx.snapshot_path, dir.path().join("cli.json"));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Context::resolve(Some(&dir.path().join("absent.toml")), None)
            .err()
            .expect("must fail");
        assert!(format!("{:#}", err).contains("failed to load config"));
    }

    #[test]
    fn test_load_without_init_mentions_init() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ctx = Context::resolve(None, Some(dir.path().join("none.json"))).expect("resolve");
        let err = ctx.load().err().expect("must fail");
        assert!(err.to_string().contains("run `init` first"));
    }
}
