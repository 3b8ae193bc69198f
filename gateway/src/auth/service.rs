//! Credential checks and the in-memory session table.
//!
//! Session tokens are handed to the browser once; only their SHA-256 hex
//! digest is kept, keyed to the principal and an expiry instant.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::RngCore;
use tokio::sync::RwLock;

use super::errors::AuthError;
use super::models::{sha256_hex, Principal, UserRecord};

#[derive(Debug, Clone)]
pub struct CredentialStore {
    users: Arc<HashMap<String, UserRecord>>,
}

impl CredentialStore {
    pub fn new(users: Vec<UserRecord>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.username.clone(), user))
            .collect();
        Self {
            users: Arc::new(users),
        }
    }

    pub fn verify(&self, username: &str, password: &str) -> Option<Principal> {
        let user = self.users.get(username)?;
        if !user.password.verify(password) {
            return None;
        }
        Some(Principal {
            username: user.username.clone(),
            role: user.role,
        })
    }
}

#[derive(Clone)]
struct SessionEntry {
    principal: Principal,
    expires_at: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Opens a session and returns the raw token for the cookie.
    pub async fn create(&self, principal: Principal) -> String {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| entry.expires_at > now);
        sessions.insert(
            sha256_hex(token.as_bytes()),
            SessionEntry {
                principal,
                expires_at: now + self.ttl,
            },
        );
        token
    }

    pub async fn lookup(&self, token: &str) -> Option<Principal> {
        let key = sha256_hex(token.as_bytes());
        let entry = self.sessions.read().await.get(&key).cloned()?;
        if entry.expires_at > Instant::now() {
            return Some(entry.principal);
        }
        self.sessions.write().await.remove(&key);
        None
    }

    pub async fn revoke(&self, token: &str) -> bool {
        let key = sha256_hex(token.as_bytes());
        self.sessions.write().await.remove(&key).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Everything the gateway needs to decide who a request belongs to.
#[derive(Clone)]
pub struct AuthService {
    credentials: CredentialStore,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(users: Vec<UserRecord>, session_ttl: Duration) -> Self {
        Self {
            credentials: CredentialStore::new(users),
            sessions: SessionStore::new(session_ttl),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Form or JSON login. Returns the principal and a fresh session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<(Principal, String), AuthError> {
        let Some(principal) = self.credentials.verify(username, password) else {
            tracing::warn!(principal = %username, "login rejected");
            return Err(AuthError::LoginFailed);
        };
        let token = self.sessions.create(principal.clone()).await;
        tracing::info!(principal = %principal.username, role = %principal.role, "session opened");
        Ok((principal, token))
    }

    pub async fn logout(&self, token: &str) {
        if self.sessions.revoke(token).await {
            tracing::info!("session closed");
        }
    }

    pub fn basic(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        self.credentials
            .verify(username, password)
            .ok_or(AuthError::InvalidCredentials)
    }
}
