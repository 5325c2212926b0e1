use std::{collections::HashMap, env, path::PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {key} value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub tokens: HashMap<String, String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value,
            })?,
            Err(_) => {
                info!("PORT not set, using default: 8080");
                8080
            }
        };

        let data_path = env::var("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/state.json"));

        let tokens = match env::var("APP_TOKENS") {
            Ok(value) => parse_tokens(&value)?,
            Err(_) => {
                info!("APP_TOKENS not set, no tokens loaded");
                HashMap::new()
            }
        };

        Ok(Self {
            port,
            data_path,
            tokens,
        })
    }
}

/// Parses `token:user,token:user`.
pub fn parse_tokens(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut tokens = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        match entry.split_once(':') {
            Some((token, user)) if !token.trim().is_empty() && !user.trim().is_empty() => {
                tokens.insert(token.trim().to_string(), user.trim().to_string());
            }
            _ => {
                return Err(ConfigError::Invalid {
                    key: "APP_TOKENS",
                    value: entry.to_string(),
                })
            }
        }
    }
    Ok(tokens)
}
