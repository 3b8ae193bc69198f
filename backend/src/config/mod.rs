//! Central module for application-wide configuration settings.
//!
//! Settings come from the process environment, optionally pre-seeded from an
//! env-style file named by `DEALERDB_CONFIG_PATH`. Parsing works on a plain
//! key/value map so tests never touch the real environment.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use dealerdb_query::{Identifier, IdentifierKind};

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub db_url: String,
    pub db_schema: Identifier,
    pub db_max_connections: u32,
    pub cors_allowed_origins: Vec<String>,
    pub expose_db_errors: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code} {message}")]
pub struct StartupError {
    pub code: &'static str,
    pub message: String,
}

impl ServiceConfig {
    pub fn load() -> Result<Self, StartupError> {
        let mut merged = HashMap::new();

        if let Ok(config_path) = std::env::var("DEALERDB_CONFIG_PATH") {
            let config_path = config_path.trim();
            if !config_path.is_empty() {
                merged.extend(parse_env_file(config_path)?);
            }
        }

        merged.extend(std::env::vars());

        Self::from_kv(&merged)
    }

    pub fn from_kv(kv: &HashMap<String, String>) -> Result<Self, StartupError> {
        let bind_addr = parse_socket_addr(
            kv.get("DEALERDB_BIND_ADDR"),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8081),
            "DEALERDB_BIND_ADDR",
        )?;

        let db_url = require_nonempty(kv, "DEALERDB_DB_URL")?;

        let schema = kv
            .get("DEALERDB_DB_SCHEMA")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or("public");
        let db_schema =
            Identifier::parse(IdentifierKind::Schema, schema).map_err(|err| StartupError {
                code: "ERR_INVALID_CONFIG",
                message: format!("DEALERDB_DB_SCHEMA: {}", err),
            })?;

        let db_max_connections = parse_u32(
            kv.get("DEALERDB_DB_MAX_CONNECTIONS"),
            10,
            "DEALERDB_DB_MAX_CONNECTIONS",
        )?;
        if db_max_connections == 0 {
            return Err(StartupError {
                code: "ERR_INVALID_CONFIG",
                message: "DEALERDB_DB_MAX_CONNECTIONS must be >= 1".to_string(),
            });
        }

        let cors_allowed_origins = kv
            .get("DEALERDB_CORS_ALLOWED_ORIGINS")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or("http://localhost:8080")
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect::<Vec<_>>();

        let expose_db_errors = match kv.get("DEALERDB_EXPOSE_DB_ERRORS") {
            None => false,
            Some(raw) if raw.trim().is_empty() => false,
            Some(raw) => parse_bool(raw).ok_or_else(|| StartupError {
                code: "ERR_INVALID_CONFIG",
                message: "DEALERDB_EXPOSE_DB_ERRORS must be a boolean".to_string(),
            })?,
        };

        Ok(Self {
            bind_addr,
            db_url,
            db_schema,
            db_max_connections,
            cors_allowed_origins,
            expose_db_errors,
        })
    }
}

fn parse_env_file(path: &str) -> Result<HashMap<String, String>, StartupError> {
    let contents = std::fs::read_to_string(path).map_err(|_| StartupError {
        code: "ERR_CONFIG_FILE_READ",
        message: format!("failed to read config file at {}", path),
    })?;

    let mut kv = HashMap::new();
    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| StartupError {
            code: "ERR_CONFIG_FILE_PARSE",
            message: format!("invalid config line {} (expected KEY=VALUE)", idx + 1),
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(StartupError {
                code: "ERR_CONFIG_FILE_PARSE",
                message: format!("invalid config line {} (empty key)", idx + 1),
            });
        }

        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        kv.insert(key.to_string(), value.to_string());
    }

    Ok(kv)
}

fn require_nonempty(kv: &HashMap<String, String>, key: &'static str) -> Result<String, StartupError> {
    kv.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .ok_or_else(|| StartupError {
            code: "ERR_MISSING_CONFIG",
            message: format!("missing required config key {}", key),
        })
}

fn parse_socket_addr(
    value: Option<&String>,
    default: SocketAddr,
    key: &'static str,
) -> Result<SocketAddr, StartupError> {
    match value {
        None => Ok(default),
        Some(v) if v.trim().is_empty() => Ok(default),
        Some(v) => v.trim().parse::<SocketAddr>().map_err(|_| StartupError {
            code: "ERR_INVALID_CONFIG",
            message: format!("{} must be a valid host:port socket address", key),
        }),
    }
}

fn parse_u32(value: Option<&String>, default: u32, key: &'static str) -> Result<u32, StartupError> {
    match value {
        None => Ok(default),
        Some(v) if v.trim().is_empty() => Ok(default),
        Some(v) => v.trim().parse::<u32>().map_err(|_| StartupError {
            code: "ERR_INVALID_CONFIG",
            message: format!("{} must be an integer", key),
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}
