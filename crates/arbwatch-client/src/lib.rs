//! # arbwatch-client
//!
//! Resolves firmware download links for tracked variants.
//!
//! Two sources are provided:
//! - [`OosApiSource`]: the OOS downloader API (latest build only)
//! - [`SpringerSource`]: the Springer OTA mirror (latest or a named version)
//!
//! [`Resolver`] tries them in order and reports [`Error::NotFound`] when
//! none has the variant.

pub mod error;
pub mod oos;
pub mod source;
pub mod springer;

pub use error::{Error, Result};
pub use oos::OosApiSource;
pub use source::{FirmwareLink, FirmwareSource, HttpConfig, Resolver};
pub use springer::SpringerSource;

/// Default resolver: OOS API first, Springer mirror as fallback.
pub fn default_resolver(
    http: reqwest::Client,
    oos_api_url: &str,
    springer_url: &str,
) -> Resolver {
    Resolver::new(vec![
        Box::new(OosApiSource::new(oos_api_url, http.clone())),
        Box::new(SpringerSource::new(springer_url, http)),
    ])
}
