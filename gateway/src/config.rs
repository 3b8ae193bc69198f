//! Gateway settings.
//!
//! Same sources as the data service: the process environment, optionally
//! pre-seeded from the env-style file named by `DEALERDB_CONFIG_PATH`.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::auth::models::UserRecord;

const DEFAULT_USERS: &str = "admin:{noop}admin:ADMIN,user:{noop}user:USER";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub upstream_url: String,
    pub users: Vec<UserRecord>,
    pub session_ttl_secs: u64,
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code} {message}")]
pub struct StartupError {
    pub code: &'static str,
    pub message: String,
}

impl StartupError {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            code: "ERR_INVALID_CONFIG",
            message: message.into(),
        }
    }
}

impl GatewayConfig {
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
        let bind_addr = match non_empty(kv, "DEALERDB_GATEWAY_BIND_ADDR") {
            None => SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8080),
            Some(raw) => raw.parse::<SocketAddr>().map_err(|_| {
                StartupError::invalid(
                    "DEALERDB_GATEWAY_BIND_ADDR must be a valid host:port socket address",
                )
            })?,
        };

        let upstream_url = non_empty(kv, "DEALERDB_UPSTREAM_URL")
            .unwrap_or("http://127.0.0.1:8081")
            .trim_end_matches('/')
            .to_string();
        if !(upstream_url.starts_with("http://") || upstream_url.starts_with("https://")) {
            return Err(StartupError::invalid(
                "DEALERDB_UPSTREAM_URL must be an http(s) URL",
            ));
        }

        let users = non_empty(kv, "DEALERDB_GATEWAY_USERS")
            .unwrap_or(DEFAULT_USERS)
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                UserRecord::parse(entry)
                    .map_err(|reason| StartupError::invalid(format!("DEALERDB_GATEWAY_USERS: {}", reason)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if users.is_empty() {
            return Err(StartupError::invalid(
                "DEALERDB_GATEWAY_USERS must define at least one user",
            ));
        }

        let session_ttl_secs = match non_empty(kv, "DEALERDB_SESSION_TTL_SECS") {
            None => 1800,
            Some(raw) => raw.parse::<u64>().ok().filter(|ttl| *ttl > 0).ok_or_else(|| {
                StartupError::invalid("DEALERDB_SESSION_TTL_SECS must be a positive integer")
            })?,
        };

        let static_dir = non_empty(kv, "DEALERDB_STATIC_DIR").map(PathBuf::from);

        Ok(Self {
            bind_addr,
            upstream_url,
            users,
            session_ttl_secs,
            static_dir,
        })
    }
}

fn non_empty<'a>(kv: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    kv.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
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

        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        kv.insert(key.trim().to_string(), value.to_string());
    }

    Ok(kv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;

    #[test]
    fn defaults_apply_to_an_empty_environment() {
        let cfg = GatewayConfig::from_kv(&HashMap::new()).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(cfg.upstream_url, "http://127.0.0.1:8081");
        assert_eq!(cfg.session_ttl_secs, 1800);
        assert!(cfg.static_dir.is_none());

        let roles = cfg
            .users
            .iter()
            .map(|u| (u.username.as_str(), u.role))
            .collect::<Vec<_>>();
        assert_eq!(roles, vec![("admin", Role::Admin), ("user", Role::User)]);
    }

    #[test]
    fn upstream_trailing_slash_is_trimmed() {
        let env = HashMap::from([(
            "DEALERDB_UPSTREAM_URL".to_string(),
            "http://data:8081/".to_string(),
        )]);
        let cfg = GatewayConfig::from_kv(&env).unwrap();
        assert_eq!(cfg.upstream_url, "http://data:8081");
    }

    #[test]
    fn rejects_malformed_user_entries() {
        let env = HashMap::from([(
            "DEALERDB_GATEWAY_USERS".to_string(),
            "admin:{plain}admin:ADMIN".to_string(),
        )]);
        let err = GatewayConfig::from_kv(&env).unwrap_err();
        assert_eq!(err.code, "ERR_INVALID_CONFIG");
    }

    #[test]
    fn rejects_zero_ttl() {
        let env = HashMap::from([(
            "DEALERDB_SESSION_TTL_SECS".to_string(),
            "0".to_string(),
        )]);
        assert!(GatewayConfig::from_kv(&env).is_err());
    }

    #[test]
    fn rejects_non_http_upstream() {
        let env = HashMap::from([(
            "DEALERDB_UPSTREAM_URL".to_string(),
            "ftp://data".to_string(),
        )]);
        assert!(GatewayConfig::from_kv(&env).is_err());
    }
}
