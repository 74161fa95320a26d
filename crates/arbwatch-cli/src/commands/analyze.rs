//! `arbwatch analyze`: read the ARB index of an OTA package.

use std::path::{Path, PathBuf};

use arbwatch_analyze::{Analyzer, ArbReport, SystemRunner};

use super::AppContext;
use crate::error::{Error, Result};

/// Text form printed by default.
pub fn format_report(report: &ArbReport) -> String {
    format!(
        "ARB Index: {}\nMajor: {}\nMinor: {}",
        report.arb_index, report.major, report.minor
    )
}

/// Run the extraction pipeline on `package`.
pub async fn run(
    ctx: &AppContext,
    package: &Path,
    tools_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    if !package.is_file() {
        return Err(Error::usage(format!(
            "Firmware package not found: {}",
            package.display()
        )));
    }

    let mut tools = ctx.config.tool_config();
    if let Some(dir) = tools_dir {
        tools.tools_dir = dir;
    }
    let output_dir = output_dir.unwrap_or_else(|| ctx.config.tools.output_dir.clone());

    let report = Analyzer::new(tools, SystemRunner)
        .analyze(package, &output_dir)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_report(&report));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ArbwatchConfig;

    #[test]
    fn test_format_report() {
        let report = ArbReport {
            arb_index: 1,
            major: 3,
            minor: 0,
        };
        assert_eq!(format_report(&report), "ARB Index: 1\nMajor: 3\nMinor: 0");
    }

    #[tokio::test]
    async fn test_run_missing_package() {
        let ctx = AppContext::new(ArbwatchConfig::default(), Some(PathBuf::from("/tmp")));
        let err = run(&ctx, Path::new("/no/such/firmware.zip"), None, None, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
