//! HTTP-level tests for the firmware sources against a local mock server.

#![allow(clippy::unwrap_used)]

use arbwatch_client::{
    FirmwareSource, HttpConfig, OosApiSource, SpringerSource, default_resolver,
};
use arbwatch_core::{DeviceKey, Region};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MIRROR_PAGE: &str = r#"<html><body>
<select id="device" data-devices='{"OP 15": {"GLO": ["Version1", "Version2", "Version3"]}}'></select>
</body></html>"#;

fn client() -> reqwest::Client {
    HttpConfig {
        timeout: Duration::from_secs(2),
        ..HttpConfig::default()
    }
    .build_client()
    .unwrap()
}

fn key() -> DeviceKey {
    DeviceKey::new("15", Region::Glo)
}

fn result_box(url: &str) -> String {
    format!(r#"<html><div id="resultBox" data-url="{url}"></div></html>"#)
}

// ----------------------------------------------------------------------------
// OOS API
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_oos_success_trims_bodies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/oneplus/oneplus_15/GLO/url"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  https://example.com/fw.zip\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/oneplus/oneplus_15/GLO/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("CPH2747_16.0.3.501(EX01)\n"))
        .mount(&server)
        .await;

    let source = OosApiSource::new(format!("{}/api", server.uri()), client());
    let link = source.resolve(&key(), None).await.unwrap().unwrap();
    assert_eq!(link.url, "https://example.com/fw.zip");
    assert_eq!(link.version, "CPH2747_16.0.3.501(EX01)");
}

#[tokio::test]
async fn test_oos_oppo_brand_route() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oppo/oppo_find_x8/CN/url"))
        .respond_with(ResponseTemplate::new(200).set_body_string("https://example.com/x8.zip"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/oppo/oppo_find_x8/CN/version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("PKB110_15.0"))
        .mount(&server)
        .await;

    let source = OosApiSource::new(server.uri(), client());
    let link = source
        .resolve(&DeviceKey::new("Find X8", Region::Cn), None)
        .await
        .unwrap();
    assert_eq!(link.unwrap().version, "PKB110_15.0");
}

#[tokio::test]
async fn test_oos_rejects_non_url_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not_a_url"))
        .mount(&server)
        .await;

    let source = OosApiSource::new(server.uri(), client());
    assert!(source.resolve(&key(), None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_oos_http_error_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = OosApiSource::new(server.uri(), client());
    assert!(source.resolve(&key(), None).await.unwrap().is_none());
    assert!(source.fetch(&key()).await.is_err());
}

#[tokio::test]
async fn test_oos_timeout_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("https://late.example")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let source = OosApiSource::new(server.uri(), client());
    assert!(source.resolve(&key(), None).await.unwrap().is_none());
}

// ----------------------------------------------------------------------------
// Springer mirror
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_springer_latest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MIRROR_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("version=Version1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(result_box("https://example.com/v1.zip")),
        )
        .mount(&server)
        .await;

    let source = SpringerSource::new(server.uri(), client());
    let link = source.resolve(&key(), None).await.unwrap().unwrap();
    assert_eq!(link.url, "https://example.com/v1.zip");
    assert_eq!(link.version, "Version1");
}

#[tokio::test]
async fn test_springer_target_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MIRROR_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("device=OP+15"))
        .and(body_string_contains("region=GLO"))
        .and(body_string_contains("version=Version2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(result_box("https://example.com/v2.zip")),
        )
        .mount(&server)
        .await;

    let source = SpringerSource::new(server.uri(), client());
    let link = source.resolve(&key(), Some("Version2")).await.unwrap().unwrap();
    assert_eq!(link.url, "https://example.com/v2.zip");
    assert_eq!(link.version, "Version2");
}

#[tokio::test]
async fn test_springer_unknown_device_region_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MIRROR_PAGE))
        .mount(&server)
        .await;

    let source = SpringerSource::new(server.uri(), client());
    let other_device = DeviceKey::new("13", Region::Glo);
    let other_region = DeviceKey::new("15", Region::Eu);
    assert!(source.resolve(&other_device, None).await.unwrap().is_none());
    assert!(source.resolve(&other_region, None).await.unwrap().is_none());
    assert!(source.resolve(&key(), Some("Version99")).await.unwrap().is_none());
}

#[tokio::test]
async fn test_springer_missing_result_box() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MIRROR_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>No result</html>"))
        .mount(&server)
        .await;

    let source = SpringerSource::new(server.uri(), client());
    assert!(source.resolve(&key(), None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_springer_list_versions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MIRROR_PAGE))
        .mount(&server)
        .await;

    let source = SpringerSource::new(server.uri(), client());
    let versions = source.list_versions(&key()).await.unwrap();
    assert_eq!(versions, vec!["Version1", "Version2", "Version3"]);
    let none = source
        .list_versions(&DeviceKey::new("13", Region::Glo))
        .await
        .unwrap();
    assert!(none.is_empty());
}

// ----------------------------------------------------------------------------
// Fallback
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_default_resolver_falls_back_to_mirror() {
    let oos = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&oos)
        .await;

    let mirror = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MIRROR_PAGE))
        .mount(&mirror)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(result_box("https://springer.com/fw.zip")),
        )
        .mount(&mirror)
        .await;

    let resolver = default_resolver(client(), &oos.uri(), &mirror.uri());
    let link = resolver.resolve(&key(), None).await.unwrap();
    assert_eq!(link.url, "https://springer.com/fw.zip");
}

#[tokio::test]
async fn test_default_resolver_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let resolver = default_resolver(client(), &server.uri(), &server.uri());
    let err = resolver.resolve(&key(), None).await.unwrap_err();
    assert!(err.is_not_found());
}
