//! Loading input sources from disk or over HTTP.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use tracing::debug;

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reads a source from a local file path or fetches it over HTTP.
#[tracing::instrument(skip(client), fields(source = %source))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if is_remote(source) {
        fetch_bytes(client, source)
            .await
            .with_context(|| format!("failed to fetch {source}"))?
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("failed to read {source}"))?
    };
    debug!(bytes = bytes.len(), "Source loaded");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::env;

    /// Fails every request; local sources must never reach it.
    struct NoNetwork;

    #[async_trait]
    impl HttpClient for NoNetwork {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            panic!("unexpected HTTP request");
        }
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/counties-10m.json"));
        assert!(is_remote("http://localhost:8000/ewx_fog_daily.csv"));
        assert!(!is_remote("data/ewx_fog_daily.csv"));
        assert!(!is_remote("/tmp/http.csv"));
    }

    #[tokio::test]
    async fn test_load_local_file() {
        let path = env::temp_dir().join("fogmap_test_source.txt");
        tokio::fs::write(&path, b"station,date\n").await.unwrap();

        let bytes = load_source(&NoNetwork, path.to_str().unwrap()).await.unwrap();
        assert_eq!(bytes, b"station,date\n");

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_missing_file_is_error() {
        assert!(load_source(&NoNetwork, "/nonexistent/fog.csv").await.is_err());
    }
}
