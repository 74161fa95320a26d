//! `arbwatch index`: list builds from a firmware history INI.

use std::path::Path;

use arbwatch_content::firmware_index::{IndexEntry, parse_section, section_name};
use arbwatch_core::DeviceKey;

use crate::error::{Error, Result};

/// Builds for a variant from INI text.
pub fn entries_for(ini: &str, device: &str, region: &str, max: usize) -> Result<Vec<IndexEntry>> {
    let key = DeviceKey::from_parts(device, region)?;
    let section = section_name(&key);
    log::debug!("Reading section [{section}]");
    Ok(parse_section(ini, &section, max))
}

/// Read an INI file, dropping bytes that are not valid UTF-8.
pub fn read_ini(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| Error::io_with_path(e, path))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Print one `version|url` line per build.
pub fn run(ini_path: &Path, device: &str, region: &str, max: usize) -> Result<()> {
    let ini = read_ini(ini_path)?;
    for entry in entries_for(&ini, device, region, max)? {
        println!("{entry}");
    }
    Ok(())
}
