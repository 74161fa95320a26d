//! Firmware package analysis.
//!
//! Analysis is a three-step pipeline over external tools:
//!
//! 1. the payload extractor pulls partition images out of the OTA zip
//! 2. the first `xbl_config*.img` among them is selected
//! 3. the ARB tool reads the anti-rollback index from that image
//!
//! The ARB tool prints lines such as:
//!
//! ```text
//! ARB (Anti-Rollback): 1
//! Major Version: 3
//! Minor Version: 0
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::runner::{CommandOutput, CommandRunner};

/// Image the ARB index is read from, without the `*.img` suffix.
pub const XBL_IMAGE_PREFIX: &str = "xbl_config";

static ARB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*ARB \(Anti-Rollback\):\s*(\d+)\s*$").expect("Invalid ARB regex")
});
static MAJOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*Major Version:\s*(\d+)\s*$").expect("Invalid major regex")
});
static MINOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*Minor Version:\s*(\d+)\s*$").expect("Invalid minor regex")
});

/// Parsed anti-rollback data for one firmware build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbReport {
    /// Anti-rollback index
    pub arb_index: u32,
    /// OEM major version
    pub major: u32,
    /// OEM minor version
    pub minor: u32,
}

impl ArbReport {
    /// Whether devices on this build can still be downgraded.
    pub fn is_safe(&self) -> bool {
        self.arb_index == 0
    }
}

/// Parse ARB tool output. A missing ARB line is an error; missing major
/// or minor lines default to 0.
pub fn parse_arb_output(stdout: &str) -> Result<ArbReport> {
    let capture = |re: &Regex| {
        re.captures(stdout)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
    };
    Ok(ArbReport {
        arb_index: capture(&ARB_RE).ok_or(Error::MissingField("arb"))?,
        major: capture(&MAJOR_RE).unwrap_or(0),
        minor: capture(&MINOR_RE).unwrap_or(0),
    })
}

/// External tool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Directory holding the tool binaries; bare names fall back to `PATH`
    pub tools_dir: PathBuf,
    /// Payload extractor binary name
    pub extractor: String,
    /// Extractor arguments; `{input}` and `{output}` are substituted
    pub extractor_args: Vec<String>,
    /// ARB reader binary name
    pub arb_tool: String,
    /// ARB reader arguments; `{image}` is substituted
    pub arb_args: Vec<String>,
    /// Per-tool time budget
    pub timeout: Duration,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tools_dir: PathBuf::from("tools"),
            extractor: "otaripper".to_string(),
            extractor_args: ["{input}", "-o", "{output}", "-p", XBL_IMAGE_PREFIX]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            arb_tool: "arbextract".to_string(),
            arb_args: vec!["{image}".to_string()],
            timeout: Duration::from_secs(600),
        }
    }
}

impl ToolConfig {
    /// Resolve a tool name against `tools_dir`.
    pub fn program(&self, name: &str) -> PathBuf {
        let local = self.tools_dir.join(name);
        if local.exists() {
            local
        } else {
            PathBuf::from(name)
        }
    }
}

/// Substitute `{key}` placeholders in an argument template.
pub fn expand_args(template: &[String], vars: &[(&str, &Path)]) -> Vec<String> {
    template
        .iter()
        .map(|arg| {
            vars.iter().fold(arg.clone(), |acc, (k, v)| {
                acc.replace(&format!("{{{k}}}"), &v.to_string_lossy())
            })
        })
        .collect()
}

/// Runs the extraction and ARB pipeline.
pub struct Analyzer<R> {
    config: ToolConfig,
    runner: R,
}

impl<R: CommandRunner> Analyzer<R> {
    /// Create an analyzer.
    pub fn new(config: ToolConfig, runner: R) -> Self {
        Self { config, runner }
    }

    /// Tool settings in use.
    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Analyze `package`, extracting into `output_dir`.
    pub async fn analyze(&self, package: &Path, output_dir: &Path) -> Result<ArbReport> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| Error::io_with_path(e, output_dir))?;

        let args = expand_args(
            &self.config.extractor_args,
            &[("input", package), ("output", output_dir)],
        );
        log::info!("Extracting {} into {}", package.display(), output_dir.display());
        self.run_tool(&self.config.extractor, &args).await?;

        let image = find_xbl_image(output_dir).await?;
        log::info!("Reading ARB index from {}", image.display());

        let args = expand_args(&self.config.arb_args, &[("image", image.as_path())]);
        let output = self.run_tool(&self.config.arb_tool, &args).await?;
        let report = parse_arb_output(&output.stdout)?;
        log::info!(
            "ARB {} (major {}, minor {})",
            report.arb_index,
            report.major,
            report.minor
        );
        Ok(report)
    }

    async fn run_tool(&self, name: &str, args: &[String]) -> Result<CommandOutput> {
        let program = self.config.program(name);
        let output = self
            .runner
            .run(&program, args, self.config.timeout)
            .await?;
        if !output.success() {
            return Err(Error::ToolFailed {
                tool: name.to_string(),
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// First `xbl_config*.img` in `dir`, by file name.
pub async fn find_xbl_image(dir: &Path) -> Result<PathBuf> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::io_with_path(e, dir))?;
    let mut found = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(e, dir))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(XBL_IMAGE_PREFIX) && name.ends_with(".img") {
            found.push(entry.path());
        }
    }
    found.sort();
    found
        .into_iter()
        .next()
        .ok_or_else(|| Error::ImageNotFound(dir.to_path_buf()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Output parsing
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_arb_output() {
        let report =
            parse_arb_output("ARB (Anti-Rollback): 1\nMajor Version: 3\nMinor Version: 0")
                .unwrap();
        assert_eq!(
            report,
            ArbReport {
                arb_index: 1,
                major: 3,
                minor: 0
            }
        );
        assert!(!report.is_safe());
    }

    #[test]
    fn test_parse_arb_output_whitespace() {
        let report = parse_arb_output(
            "ARB (Anti-Rollback):    1\nMajor Version:   3\nMinor Version:  0   ",
        )
        .unwrap();
        assert_eq!(report.arb_index, 1);
        assert_eq!(report.major, 3);
        assert_eq!(report.minor, 0);
    }

    #[test]
    fn test_parse_arb_output_defaults() {
        let report = parse_arb_output("noise\nARB (Anti-Rollback): 0\n").unwrap();
        assert_eq!(report.major, 0);
        assert_eq!(report.minor, 0);
        assert!(report.is_safe());
    }

    #[test]
    fn test_parse_arb_output_missing_arb() {
        let err = parse_arb_output("Something: 1\nOther data: 2").unwrap_err();
        assert!(matches!(err, Error::MissingField("arb")));
    }

    // -------------------------------------------------------------------------
    // Argument templates
    // -------------------------------------------------------------------------

    #[test]
    fn test_expand_args() {
        let template: Vec<String> = ["{input}", "-o", "{output}/x", "--keep"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let args = expand_args(
            &template,
            &[("input", Path::new("/fw.zip")), ("output", Path::new("/out"))],
        );
        assert_eq!(args, vec!["/fw.zip", "-o", "/out/x", "--keep"]);
    }

    #[test]
    fn test_program_falls_back_to_name() {
        let config = ToolConfig {
            tools_dir: PathBuf::from("/nonexistent/tools"),
            ..ToolConfig::default()
        };
        assert_eq!(config.program("otaripper"), PathBuf::from("otaripper"));
    }

    #[test]
    fn test_report_json_shape() {
        let json = serde_json::to_value(ArbReport {
            arb_index: 2,
            major: 3,
            minor: 1,
        })
        .unwrap();
        assert_eq!(json["arb_index"], 2);
        assert_eq!(json["major"], 3);
    }
}
