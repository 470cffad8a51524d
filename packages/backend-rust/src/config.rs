use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use flashcards_core::DEFAULT_MAX_CHUNK_CHARS;

const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub session_ttl: Duration,
    pub speech_max_chunk_chars: usize,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_parse::<u16>("PORT").unwrap_or(3000);

        let host = env_parse::<IpAddr>("HOST").unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let session_ttl =
            Duration::from_secs(env_parse::<u64>("SESSION_TTL_SECS").unwrap_or(DEFAULT_SESSION_TTL_SECS));

        let speech_max_chunk_chars = env_parse::<usize>("SPEECH_MAX_CHUNK_CHARS")
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_MAX_CHUNK_CHARS);

        Self {
            host,
            port,
            log_level,
            session_ttl,
            speech_max_chunk_chars,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 3000,
            log_level: "info".to_string(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            speech_max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }
}

pub(crate) fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse::<T>().ok())
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    let normalized = env_string(key)?.to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
