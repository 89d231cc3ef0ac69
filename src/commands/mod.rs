pub mod apply;
pub mod lifecycle;
pub mod schema;

use crate::cli::ProviderArgs;
use crate::config::ProviderConfig;
use crate::context::{AcsContext, Timeouts};
use anyhow::{Context as AnyhowContext, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Resolve provider settings (flags, then config file, then environment)
/// and open a session.
pub fn connect(args: &ProviderArgs) -> Result<AcsContext> {
    let mut config = ProviderConfig::from_env();
    if let Some(path) = &args.provider_config {
        config = config.overlay(ProviderConfig::load(path)?);
    }
    let resolved = config
        .overlay(args.flags())
        .resolve()
        .context("Invalid provider configuration")?;

    let timeouts = Timeouts::uniform(Duration::from_secs(args.timeout_minutes.saturating_mul(60)));
    resolved.connect(timeouts)
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).with_context(|| format!("Could not write {}", path.display()))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
