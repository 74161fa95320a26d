//! `arbwatch verify`: check that every catalog variant resolves to a link.

use std::fmt;
use std::time::Duration;

use arbwatch_client::Resolver;
use arbwatch_core::{DeviceKey, catalog};

use super::AppContext;
use crate::error::Result;

/// Time budget per variant.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(30);

const SEPARATOR_WIDTH: usize = 60;

/// Outcome of one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyResult {
    /// Device display name
    pub name: String,
    /// Region code
    pub region: String,
    /// Whether a usable link was found
    pub ok: bool,
    /// Short description
    pub message: String,
}

impl fmt::Display for VerifyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.ok { "OK" } else { "FAIL" };
        write!(
            f,
            "{:<20} | {:<6} | {:<10} | {}",
            self.name, self.region, status, self.message
        )
    }
}

/// Resolve one variant within `timeout`.
pub async fn verify_one(resolver: &Resolver, key: &DeviceKey, timeout: Duration) -> VerifyResult {
    let (ok, message) = match tokio::time::timeout(timeout, resolver.resolve(key, None)).await {
        Err(_) => (false, "Timeout".to_string()),
        Ok(Err(e)) if e.is_not_found() => (false, "No source".to_string()),
        Ok(Err(e)) => (false, e.to_string()),
        Ok(Ok(link)) if link.url.starts_with("http") => (true, "URL Found".to_string()),
        Ok(Ok(link)) => {
            let head: String = link.url.chars().take(30).collect();
            (false, format!("Invalid Output: {head}..."))
        }
    };
    VerifyResult {
        name: catalog::display_name(&key.device),
        region: key.region.code().to_string(),
        ok,
        message,
    }
}

/// Table header and separator.
pub fn header() -> String {
    format!(
        "{:<20} | {:<6} | {:<10} | Result\n{}",
        "Device",
        "Region",
        "Status",
        "-".repeat(SEPARATOR_WIDTH)
    )
}

/// Closing separator and failure summary.
pub fn summary(results: &[VerifyResult]) -> String {
    let failures: Vec<&VerifyResult> = results.iter().filter(|r| !r.ok).collect();
    let mut out = "-".repeat(SEPARATOR_WIDTH);
    if failures.is_empty() {
        out.push_str("\n\nAll devices passed verification!");
    } else {
        out.push_str(&format!("\n\nFound {} failures:", failures.len()));
        for f in failures {
            out.push_str(&format!("\n{} ({}): {}", f.name, f.region, f.message));
        }
    }
    out
}

/// Check `keys` in order, printing each row as it completes.
pub async fn verify_all(
    resolver: &Resolver,
    keys: &[DeviceKey],
    timeout: Duration,
) -> Vec<VerifyResult> {
    let mut results = Vec::with_capacity(keys.len());
    for key in keys {
        let result = verify_one(resolver, key, timeout).await;
        println!("{result}");
        results.push(result);
    }
    results
}

/// Entry point for `arbwatch verify`.
pub async fn run(ctx: &AppContext) -> Result<()> {
    let resolver = ctx.resolver()?;
    let keys = DeviceKey::all();

    println!("{}", header());
    let results = verify_all(&resolver, &keys, VERIFY_TIMEOUT).await;
    println!("{}", summary(&results));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use arbwatch_client::{FirmwareLink, FirmwareSource};
    use arbwatch_core::Region;
    use async_trait::async_trait;

    struct Canned {
        url: Option<&'static str>,
        delay: Duration,
    }

    #[async_trait]
    impl FirmwareSource for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn resolve(
            &self,
            _key: &DeviceKey,
            _target: Option<&str>,
        ) -> arbwatch_client::Result<Option<FirmwareLink>> {
            tokio::time::sleep(self.delay).await;
            Ok(self.url.map(|u| FirmwareLink {
                url: u.to_string(),
                version: "V1".to_string(),
            }))
        }
    }

    fn resolver(url: Option<&'static str>, delay: Duration) -> Resolver {
        Resolver::new(vec![Box::new(Canned { url, delay })])
    }

    fn key() -> DeviceKey {
        DeviceKey::new("15", Region::Glo)
    }

    // ------------------------------------------------------------------------
    // Single variant
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_verify_one_ok() {
        let r = verify_one(
            &resolver(Some("https://example.com/fw.zip"), Duration::ZERO),
            &key(),
            VERIFY_TIMEOUT,
        )
        .await;
        assert!(r.ok);
        assert_eq!(r.name, "OnePlus 15");
        assert_eq!(r.message, "URL Found");
    }

    #[tokio::test]
    async fn test_verify_one_no_source() {
        let r = verify_one(&resolver(None, Duration::ZERO), &key(), VERIFY_TIMEOUT).await;
        assert!(!r.ok);
        assert_eq!(r.message, "No source");
    }

    #[tokio::test]
    async fn test_verify_one_invalid_output() {
        let r = verify_one(
            &resolver(Some("ftp://example.com/a-very-long-path/firmware.zip"), Duration::ZERO),
            &key(),
            VERIFY_TIMEOUT,
        )
        .await;
        assert!(!r.ok);
        assert!(r.message.starts_with("Invalid Output: ftp://"));
        assert!(r.message.ends_with("..."));
    }

    #[tokio::test]
    async fn test_verify_one_timeout() {
        let r = verify_one(
            &resolver(Some("https://example.com"), Duration::from_secs(5)),
            &key(),
            Duration::from_millis(20),
        )
        .await;
        assert!(!r.ok);
        assert_eq!(r.message, "Timeout");
    }

    // ------------------------------------------------------------------------
    // Table
    // ------------------------------------------------------------------------

    #[test]
    fn test_header_and_row_layout() {
        let header = header();
        assert!(header.starts_with("Device"));
        assert!(header.contains("| Region |"));
        assert!(header.ends_with(&"-".repeat(60)));

        let row = VerifyResult {
            name: "OnePlus 15".to_string(),
            region: "GLO".to_string(),
            ok: true,
            message: "URL Found".to_string(),
        };
        assert_eq!(
            row.to_string(),
            "OnePlus 15           | GLO    | OK         | URL Found"
        );
    }

    #[test]
    fn test_summary() {
        let ok = VerifyResult {
            name: "OnePlus 15".to_string(),
            region: "GLO".to_string(),
            ok: true,
            message: "URL Found".to_string(),
        };
        assert!(summary(std::slice::from_ref(&ok)).ends_with("All devices passed verification!"));

        let bad = VerifyResult {
            ok: false,
            message: "Timeout".to_string(),
            ..ok.clone()
        };
        let text = summary(&[ok, bad]);
        assert!(text.contains("Found 1 failures:"));
        assert!(text.ends_with("OnePlus 15 (GLO): Timeout"));
    }
}
