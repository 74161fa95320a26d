//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// arbwatch - OnePlus / Oppo anti-rollback index tracker
#[derive(Parser, Debug)]
#[command(name = "arbwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// History directory (overrides config and ARBWATCH_HISTORY_DIR)
    #[arg(long, global = true)]
    pub history_dir: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a firmware download link
    Fetch {
        /// Device id (`15`, `oneplus_15`, `Find X8`, `oppo_find_x8`)
        device: String,
        /// Region code (GLO, EU, IN, NA, CN, ...)
        region: String,
        /// Specific firmware version (mirror lookup only)
        #[arg(value_name = "VERSION")]
        target: Option<String>,
        /// Print the link as JSON
        #[arg(long, conflicts_with_all = ["url_only", "version_only"])]
        json: bool,
        /// Print only the URL
        #[arg(long, conflicts_with = "version_only")]
        url_only: bool,
        /// Print only the version
        #[arg(long)]
        version_only: bool,
        /// Also write the link as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract a firmware package and read its ARB index
    Analyze {
        /// OTA package (zip)
        package: PathBuf,
        /// Directory holding otaripper / arbextract
        #[arg(long)]
        tools_dir: Option<PathBuf>,
        /// Extraction directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a check result in the variant history
    Record(RecordArgs),

    /// Render, update, or validate the status README
    Readme {
        /// README action
        #[command(subcommand)]
        action: ReadmeAction,
    },

    /// Print firmware versions from a firmware history INI
    Index {
        /// INI file
        ini: PathBuf,
        /// Device id
        device: String,
        /// Region code
        region: String,
        /// Maximum number of versions
        #[arg(long, default_value_t = arbwatch_content::firmware_index::DEFAULT_MAX_VERSIONS)]
        max: usize,
    },

    /// Print the CI check matrix
    Matrix {
        /// Include the newest mirror versions per variant
        #[arg(long)]
        backfill: bool,
        /// Versions per variant in backfill mode
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Resolve a download link for every catalog variant
    Verify,

    /// Write the status website data as JSON
    Site {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configuration management
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of `record`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RecordArgs {
    /// Device id
    #[arg(required_unless_present = "json_file")]
    pub device: Option<String>,
    /// Region code
    #[arg(required_unless_present = "json_file")]
    pub region: Option<String>,
    /// Firmware version
    #[arg(value_name = "VERSION", required_unless_present = "json_file")]
    pub firmware: Option<String>,
    /// ARB index
    #[arg(required_unless_present = "json_file")]
    pub arb: Option<u32>,
    /// OEM major version
    pub major: Option<u32>,
    /// OEM minor version
    pub minor: Option<u32>,
    /// Read the result from a JSON file instead
    #[arg(long)]
    pub json_file: Option<PathBuf>,
    /// Backfilled data; never becomes the current entry
    #[arg(long)]
    pub historical: bool,
}

/// `readme` subcommands.
#[derive(Subcommand, Debug)]
pub enum ReadmeAction {
    /// Render the README from history
    Generate {
        /// Output file
        #[arg(short, long, default_value = "README.md")]
        output: PathBuf,
        /// Emit every catalog variant with placeholder values
        #[arg(long)]
        template: bool,
    },
    /// Rewrite marker values in place from history
    Update {
        /// README file (defaults to `paths.readme`)
        file: Option<PathBuf>,
    },
    /// Validate the placeholder markers of a README
    Check {
        /// README file (defaults to `paths.readme`)
        file: Option<PathBuf>,
        /// Require a marker set for every catalog variant
        #[arg(long)]
        catalog: bool,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Get a value by dotted key (`http.timeout_secs`)
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Create a default config file
    Init {
        /// Target file (defaults to the platform config dir)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from(["arbwatch", "fetch", "15", "GLO", "--url-only"]).unwrap();
        match cli.command {
            Command::Fetch {
                device,
                region,
                target,
                url_only,
                ..
            } => {
                assert_eq!(device, "15");
                assert_eq!(region, "GLO");
                assert!(target.is_none());
                assert!(url_only);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_fetch_output_modes_conflict() {
        assert!(
            Cli::try_parse_from(["arbwatch", "fetch", "15", "GLO", "--json", "--url-only"])
                .is_err()
        );
    }

    #[test]
    fn test_parse_record_positional() {
        let cli =
            Cli::try_parse_from(["arbwatch", "record", "15", "GLO", "CPH2747_16.0.1", "1", "3"])
                .unwrap();
        let Command::Record(args) = cli.command else {
            panic!("expected record");
        };
        assert_eq!(args.arb, Some(1));
        assert_eq!(args.major, Some(3));
        assert_eq!(args.minor, None);
        assert!(!args.historical);
    }

    #[test]
    fn test_parse_record_json_file() {
        let cli = Cli::try_parse_from(["arbwatch", "record", "--json-file", "result.json"]).unwrap();
        let Command::Record(args) = cli.command else {
            panic!("expected record");
        };
        assert_eq!(args.json_file, Some(PathBuf::from("result.json")));
        assert!(args.device.is_none());
    }

    #[test]
    fn test_record_requires_fields_without_json() {
        assert!(Cli::try_parse_from(["arbwatch", "record", "15", "GLO"]).is_err());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "arbwatch",
            "matrix",
            "--verbose",
            "--history-dir",
            "/tmp/h",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.history_dir, Some(PathBuf::from("/tmp/h")));
    }

    #[test]
    fn test_parse_site() {
        let cli = Cli::try_parse_from(["arbwatch", "site", "-o", "page/site.json"]).unwrap();
        let Command::Site { output } = cli.command else {
            panic!("expected site");
        };
        assert_eq!(output, Some(PathBuf::from("page/site.json")));
    }
}
