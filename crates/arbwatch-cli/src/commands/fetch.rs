//! `arbwatch fetch`: resolve a firmware download link.

use std::path::Path;

use arbwatch_client::FirmwareLink;
use arbwatch_core::DeviceKey;

use super::AppContext;
use crate::error::{Error, Result};

/// What to print for a resolved link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// The download URL
    #[default]
    Url,
    /// The firmware version
    Version,
    /// `{"url": ..., "version": ...}`
    Json,
}

impl OutputMode {
    /// Pick the mode from the command flags.
    pub fn from_flags(json: bool, version_only: bool) -> Self {
        if json {
            OutputMode::Json
        } else if version_only {
            OutputMode::Version
        } else {
            OutputMode::Url
        }
    }
}

/// Render a link for stdout.
pub fn format_link(link: &FirmwareLink, mode: OutputMode) -> Result<String> {
    Ok(match mode {
        OutputMode::Url => link.url.clone(),
        OutputMode::Version => link.version.clone(),
        OutputMode::Json => serde_json::to_string(link)?,
    })
}

/// Write a link as pretty JSON.
pub fn write_link(link: &FirmwareLink, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(link)?;
    std::fs::write(path, json).map_err(|e| Error::io_with_path(e, path))
}

/// Resolve and print. With `output` the link goes to that file instead.
pub async fn run(
    ctx: &AppContext,
    device: &str,
    region: &str,
    target: Option<&str>,
    mode: OutputMode,
    output: Option<&Path>,
) -> Result<()> {
    let key = DeviceKey::from_parts(device, region)?;
    if !key.in_catalog() {
        log::warn!("{key} is not in the device catalog, trying anyway");
    }

    let link = ctx.resolver()?.resolve(&key, target).await?;

    match output {
        Some(path) => {
            write_link(&link, path)?;
            log::info!("Wrote {} to {}", link.version, path.display());
        }
        None => println!("{}", format_link(&link, mode)?),
    }
    Ok(())
}
