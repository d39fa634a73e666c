//! The library API end to end, with a mock fetcher.

use std::time::Duration;

use rpz_params::catalog::Record;
use rpz_params::config::ParameterSource;
use rpz_params::constants::PARAMETERS_CACHE_NAME;
use rpz_params::core::ParamsError;
use rpz_params::dataset::Dataset;
use rpz_params::provider::ParameterProvider;
use rpz_params::source::{DatasetOrigin, FallbackReason};
use rpz_params::test_utils::{MockFetcher, init_test_logging};
use tempfile::TempDir;

use crate::common::REMOTE_DOCUMENT;

fn remote() -> ParameterSource {
    ParameterSource::Remote {
        url: "https://params.test/parameters/".to_string(),
    }
}

#[tokio::test]
async fn test_remote_parameters_replace_bundled() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let fetcher = MockFetcher::document(temp.path(), REMOTE_DOCUMENT);
    let provider = ParameterProvider::new(fetcher.clone(), remote(), "1.1.0");

    let images = provider.docker_images().await.unwrap();
    assert_eq!(images.resolve("Ubuntu", "22.04").image, "ubuntu:22.04");
    assert_eq!(images.resolve("ubuntu", "14.04").display_name(), "Ubuntu 24.04 'Noble'");
    assert_eq!(images.resolve("gentoo", "1.0").image, "debian:bookworm");

    assert_eq!(
        provider.busybox_url("x86_64").await.unwrap(),
        "http://mirror.test/busybox-x86_64"
    );
    assert_eq!(
        provider.origin().await,
        &DatasetOrigin::Remote {
            url: "https://params.test/parameters/1.1.0".to_string()
        }
    );
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_bundled_resolution_order() {
    let temp = TempDir::new().unwrap();
    let provider = ParameterProvider::new(
        MockFetcher::failing(temp.path(), "connection reset"),
        remote(),
        "1.1.0",
    );

    let trusty = provider.resolve("docker_images", "Ubuntu", "14.04").await.unwrap();
    assert_eq!(trusty.display_name(), "Ubuntu 14.04 'Trusty'");

    let fallback = provider.resolve("docker_images", "ubuntu", "99.99").await.unwrap();
    assert_eq!(fallback.display_name(), "Ubuntu 15.10 'Wily'");

    let other = provider.resolve("docker_images", "gentoo", "1.0").await.unwrap();
    assert_eq!(other.display_name(), "Debian 8 'Jessie'");

    let boxes = provider.vagrant_boxes_x().await.unwrap();
    assert!(boxes.resolve("centos", "7.2").box_for("x86_64").is_ok());
}

#[tokio::test]
async fn test_every_failure_mode_yields_bundled_sections() {
    let bundled = Dataset::bundled();

    let cases = [
        (None, FallbackReason::Transport),
        (Some("{not json"), FallbackReason::Malformed),
        (Some("[]"), FallbackReason::Malformed),
        (Some(r#"{"version": "2.0"}"#), FallbackReason::IncompatibleVersion),
        (Some(r#"{"version": "1.0"}"#), FallbackReason::IncompatibleVersion),
    ];

    for (document, reason) in cases {
        let temp = TempDir::new().unwrap();
        let fetcher = match document {
            Some(doc) => MockFetcher::document(temp.path(), doc),
            None => MockFetcher::failing(temp.path(), "offline"),
        };
        let provider = ParameterProvider::new(fetcher, remote(), "1.1.0");

        for section in bundled.section_names() {
            assert_eq!(provider.get_parameter(section).await, bundled.section(section));
        }
        assert_eq!(provider.origin().await, &DatasetOrigin::Bundled { reason });
    }
}

#[tokio::test]
async fn test_malformed_cache_is_removed() {
    let temp = TempDir::new().unwrap();
    let provider = ParameterProvider::new(
        MockFetcher::document(temp.path(), "{not json"),
        remote(),
        "1.1.0",
    );

    let _ = provider.dataset().await;
    assert!(!temp.path().join(PARAMETERS_CACHE_NAME).exists());
}

#[tokio::test]
async fn test_concurrent_callers_share_one_fetch() {
    let temp = TempDir::new().unwrap();
    let fetcher = MockFetcher::document(temp.path(), REMOTE_DOCUMENT)
        .with_delay(Duration::from_millis(100));
    let provider = ParameterProvider::new(fetcher.clone(), remote(), "1.1.0");

    let (a, b, c) = tokio::join!(
        provider.get_parameter("docker_images"),
        provider.resolve("docker_images", "ubuntu", "22.04"),
        provider.rpzsudo_url("x86_64"),
    );

    assert!(a.is_some());
    assert_eq!(b.unwrap().as_image().unwrap().image, "ubuntu:22.04");
    assert_eq!(c.unwrap(), "http://mirror.test/rpzsudo-x86_64");
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_disabled_override_makes_no_calls() {
    let temp = TempDir::new().unwrap();
    let fetcher = MockFetcher::document(temp.path(), REMOTE_DOCUMENT);
    let source = ParameterSource::from_override(Some("disabled"), "https://params.test/");
    let provider = ParameterProvider::new(fetcher.clone(), source, "1.1.0");

    assert_eq!(provider.dataset().await, &Dataset::bundled());
    assert_eq!(
        provider.origin().await,
        &DatasetOrigin::Bundled {
            reason: FallbackReason::Disabled
        }
    );
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_missing_section_suggests_names() {
    let temp = TempDir::new().unwrap();
    let provider = ParameterProvider::new(
        MockFetcher::failing(temp.path(), "offline"),
        remote(),
        "1.1.0",
    );

    match provider.resolve("vagrant_box", "debian", "8").await {
        Err(ParamsError::SectionNotFound { section, suggestions }) => {
            assert_eq!(section, "vagrant_box");
            assert!(suggestions.contains(&"vagrant_boxes".to_string()));
        }
        other => panic!("expected SectionNotFound, got {other:?}"),
    }
}
