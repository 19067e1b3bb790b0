use std::env;
use std::path::PathBuf;

use crate::error::ClientError;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub ws_url: String,
    pub log_level: String,
    pub log_json: bool,
    pub session_file: PathBuf,
    pub push_token_path: String,
    pub event_buffer_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ClientError> {
        let _ = dotenvy::dotenv();

        let config = Self {
            api_url: env::var("API_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api/v1".to_string()),
            ws_url: env::var("WS_URL").unwrap_or_else(|_| "ws://localhost:8000".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_json: parse_or_default("LOG_JSON", false)?,
            session_file: env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".deliveet/auth-storage.json")),
            push_token_path: env::var("PUSH_TOKEN_PATH")
                .unwrap_or_else(|_| "/courier/api/fcm-token/".to_string()),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 256)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ClientError> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "API_URL must be an http(s) url, got {}",
                self.api_url
            )));
        }

        if !self.ws_url.starts_with("ws://") && !self.ws_url.starts_with("wss://") {
            return Err(ClientError::Config(format!(
                "WS_URL must be a ws(s) url, got {}",
                self.ws_url
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(ClientError::Config(
                "EVENT_BUFFER_SIZE must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Scheme and authority of `api_url`, used for endpoints that live
    /// outside the versioned API root.
    pub fn site_root(&self) -> String {
        site_root(&self.api_url)
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, ClientError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| ClientError::Config(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

fn site_root(url: &str) -> String {
    let after_scheme = url.find("://").map(|idx| idx + 3).unwrap_or(0);
    match url[after_scheme..].find('/') {
        Some(path_start) => url[..after_scheme + path_start].to_string(),
        None => url.trim_end_matches('/').to_string(),
    }
}
