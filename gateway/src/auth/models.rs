//! Users, roles and the authenticated principal.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored secret, tagged with how it is encoded.
#[derive(Clone, PartialEq, Eq)]
pub enum PasswordHash {
    /// `{noop}` plaintext.
    Noop(String),
    /// `{sha256}` lowercase hex digest.
    Sha256(String),
}

impl PasswordHash {
    pub fn parse(raw: &str) -> Result<Self, String> {
        if let Some(plain) = raw.strip_prefix("{noop}") {
            return Ok(PasswordHash::Noop(plain.to_string()));
        }
        if let Some(digest) = raw.strip_prefix("{sha256}") {
            let digest = digest.to_ascii_lowercase();
            if digest.len() != 64 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err("sha256 secret must be 64 hex characters".to_string());
            }
            return Ok(PasswordHash::Sha256(digest));
        }
        Err("secret must start with {noop} or {sha256}".to_string())
    }

    pub fn verify(&self, candidate: &str) -> bool {
        match self {
            PasswordHash::Noop(plain) => sha256_hex(plain.as_bytes()) == sha256_hex(candidate.as_bytes()),
            PasswordHash::Sha256(digest) => *digest == sha256_hex(candidate.as_bytes()),
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordHash::Noop(_) => f.write_str("PasswordHash::Noop(..)"),
            PasswordHash::Sha256(_) => f.write_str("PasswordHash::Sha256(..)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password: PasswordHash,
    pub role: Role,
}

impl UserRecord {
    /// Parses `name:{scheme}secret:ROLE`. The secret may itself contain `:`.
    pub fn parse(entry: &str) -> Result<Self, String> {
        let (username, rest) = entry
            .split_once(':')
            .ok_or_else(|| format!("user entry '{}' must be name:secret:ROLE", entry))?;
        let (secret, role) = rest
            .rsplit_once(':')
            .ok_or_else(|| format!("user entry for '{}' is missing a role", username))?;

        let username = username.trim();
        if username.is_empty() {
            return Err("user name must not be empty".to_string());
        }
        let role = Role::parse(role)
            .ok_or_else(|| format!("unknown role '{}' for user '{}'", role, username))?;

        Ok(Self {
            username: username.to_string(),
            password: PasswordHash::parse(secret.trim())?,
            role,
        })
    }
}

/// The caller a request is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
