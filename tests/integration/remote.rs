//! The HTTP fetcher wired into the provider, against a local server.

use std::ffi::OsStr;
use std::time::Duration;

use rpz_params::config::{GlobalConfig, ParameterSource, ParametersConfig};
use rpz_params::constants::PARAMETERS_CACHE_NAME;
use rpz_params::provider::ParameterProvider;
use rpz_params::source::{DatasetOrigin, FallbackReason};
use tempfile::TempDir;

use crate::common::{REMOTE_DOCUMENT, ok_response, serve, status_response};

fn config_for(base: &str, temp: &TempDir) -> ParametersConfig {
    let global = GlobalConfig {
        cache_dir: Some(temp.path().join("cache")),
        fetch_timeout: Some(5),
        ..GlobalConfig::default()
    };
    let url = format!("{base}/parameters/");
    let mut config = ParametersConfig::resolve(&global, Some(OsStr::new(&url)), None).unwrap();
    config.version_tag = "1.1.0".to_string();
    config
}

#[tokio::test]
async fn test_download_then_not_modified() {
    let temp = TempDir::new().unwrap();
    let (base, server) = serve(vec![
        ok_response(REMOTE_DOCUMENT),
        status_response("304 Not Modified"),
    ])
    .await;
    let config = config_for(&base, &temp);

    let first = ParameterProvider::from_config(&config).await.unwrap();
    assert!(first.origin().await.is_remote());
    assert!(temp.path().join("cache").join(PARAMETERS_CACHE_NAME).exists());

    // A fresh provider revalidates the cached copy instead of downloading.
    let second = ParameterProvider::from_config(&config).await.unwrap();
    assert_eq!(
        second.origin().await,
        &DatasetOrigin::Remote {
            url: format!("{base}/parameters/1.1.0")
        }
    );
    assert_eq!(
        second.busybox_url("x86_64").await.unwrap(),
        "http://mirror.test/busybox-x86_64"
    );

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("GET /parameters/1.1.0 "));
    assert!(requests[1].to_lowercase().contains("if-modified-since:"));
}

#[tokio::test]
async fn test_server_error_falls_back() {
    let temp = TempDir::new().unwrap();
    let (base, _server) = serve(vec![status_response("503 Service Unavailable")]).await;

    let provider = ParameterProvider::from_config(&config_for(&base, &temp)).await.unwrap();
    assert_eq!(
        provider.origin().await,
        &DatasetOrigin::Bundled {
            reason: FallbackReason::Transport
        }
    );
    assert!(provider.get_parameter("vagrant_boxes").await.is_some());
}

#[tokio::test]
async fn test_malformed_download_is_purged() {
    let temp = TempDir::new().unwrap();
    let (base, _server) = serve(vec![ok_response("{not json")]).await;

    let provider = ParameterProvider::from_config(&config_for(&base, &temp)).await.unwrap();
    assert_eq!(
        provider.origin().await,
        &DatasetOrigin::Bundled {
            reason: FallbackReason::Malformed
        }
    );
    assert!(!temp.path().join("cache").join(PARAMETERS_CACHE_NAME).exists());
}

#[tokio::test]
async fn test_https_without_pinned_authority_falls_back() {
    let temp = TempDir::new().unwrap();
    let mut config = config_for("https://127.0.0.1:9", &temp);
    config.fetch_timeout = Duration::from_secs(1);
    assert!(matches!(config.source, ParameterSource::Remote { .. }));

    let provider = ParameterProvider::from_config(&config).await.unwrap();
    assert_eq!(
        provider.origin().await,
        &DatasetOrigin::Bundled {
            reason: FallbackReason::Transport
        }
    );
}
