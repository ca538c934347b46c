use std::net::SocketAddr;

use anyhow::{Context, Result};

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/caption";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub caption_endpoint: String,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Reads `.env` when present, then the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let listen_addr: SocketAddr = lookup("CAPTION_FORM_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("CAPTION_FORM_ADDR must be a socket address like 0.0.0.0:3000")?;

        let caption_endpoint =
            lookup("CAPTION_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        reqwest::Url::parse(&caption_endpoint)
            .with_context(|| format!("CAPTION_ENDPOINT is not a valid URL: {caption_endpoint}"))?;

        let max_upload_bytes = match lookup("CAPTION_MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("CAPTION_MAX_UPLOAD_BYTES must be a byte count, got {raw}"))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            listen_addr,
            caption_endpoint,
            max_upload_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.caption_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("CAPTION_FORM_ADDR", "127.0.0.1:8080"),
            ("CAPTION_ENDPOINT", "http://captioner:5000/caption"),
            ("CAPTION_MAX_UPLOAD_BYTES", "2048"),
        ]))
        .unwrap();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.caption_endpoint, "http://captioner:5000/caption");
        assert_eq!(config.max_upload_bytes, 2048);
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = Config::from_lookup(lookup(&[("CAPTION_FORM_ADDR", "nowhere")])).unwrap_err();
        assert!(err.to_string().contains("CAPTION_FORM_ADDR"));

        let err = Config::from_lookup(lookup(&[("CAPTION_ENDPOINT", "not a url")])).unwrap_err();
        assert!(err.to_string().contains("CAPTION_ENDPOINT"));

        let err =
            Config::from_lookup(lookup(&[("CAPTION_MAX_UPLOAD_BYTES", "lots")])).unwrap_err();
        assert!(err.to_string().contains("CAPTION_MAX_UPLOAD_BYTES"));
    }
}
