//! Helpers shared by the integration tests.

use assert_cmd::Command;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// The binary with an isolated environment: no network, cache and config
/// under `home`.
pub fn rpz_params(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("rpz-params").unwrap();
    cmd.env("REPROZIP_PARAMETERS", "off")
        .env("RPZ_PARAMS_CACHE_DIR", home.join("cache"))
        .env("RPZ_PARAMS_CONFIG", home.join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

/// A parameter document inside the accepted version window.
pub const REMOTE_DOCUMENT: &str = r#"{
    "version": "1.1.7",
    "busybox_url": {"x86_64": "http://mirror.test/busybox-x86_64"},
    "rpzsudo_url": {"x86_64": "http://mirror.test/rpzsudo-x86_64"},
    "docker_images": {
        "default": {"distribution": "debian", "image": "debian:bookworm", "name": "Debian 12"},
        "images": [{
            "name": "^ubuntu$",
            "versions": [
                {"version": "^22\\.04$", "distribution": "ubuntu", "image": "ubuntu:22.04", "name": "Ubuntu 22.04 'Jammy'"}
            ],
            "default": {"distribution": "ubuntu", "image": "ubuntu:24.04", "name": "Ubuntu 24.04 'Noble'"}
        }]
    }
}"#;

/// `200 OK` with a JSON body.
pub fn ok_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

/// An empty response with `status`, e.g. `"304 Not Modified"`.
pub fn status_response(status: &str) -> String {
    format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
}

/// Serve one canned response per connection on a local port.
///
/// Returns the base URL and a handle yielding the raw request heads.
pub async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for response in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            requests.push(String::from_utf8_lossy(&buf).to_string());
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
        }
        requests
    });

    (base, handle)
}
