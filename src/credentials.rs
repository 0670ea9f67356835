use crate::CredentialError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

/// The secret half of a credential pair
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    /// Login password (plain)
    Password(String),
    /// Precomputed `H(username:realm:password)` as lower-case hex.
    /// Only usable for Digest, and only for the realm it was computed for.
    Ha1(String),
}

// secrets must never end up in logs
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Secret::Password(_) => f.write_str("Password(..)"),
            Secret::Ha1(_) => f.write_str("Ha1(..)"),
        }
    }
}

/// Login credentials for one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login username
    pub username: String,
    pub secret: Secret,
}

impl Credentials {
    /// Username and plain password
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Credentials {
            username: username.into(),
            secret: Secret::Password(password.into()),
        }
    }

    /// Username and a precomputed HA1 hex digest in lieu of the password
    pub fn with_ha1<U: Into<String>, H: Into<String>>(username: U, ha1: H) -> Self {
        Credentials {
            username: username.into(),
            secret: Secret::Ha1(ha1.into()),
        }
    }

    /// The plain password, if that is what we hold
    pub fn password(&self) -> Option<&str> {
        match &self.secret {
            Secret::Password(p) => Some(p),
            Secret::Ha1(_) => None,
        }
    }
}

/// Supplies credentials for a target account.
///
/// Implementations must tolerate concurrent lookups from independent request cycles.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn credentials(&self, account: &str) -> Result<Credentials, CredentialError>;
}

/// Fixed in-memory account table
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    accounts: HashMap<String, Credentials>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<A: Into<String>>(mut self, account: A, credentials: Credentials) -> Self {
        self.accounts.insert(account.into(), credentials);
        self
    }
}

#[async_trait]
impl CredentialSource for StaticCredentials {
    async fn credentials(&self, account: &str) -> Result<Credentials, CredentialError> {
        self.accounts
            .get(account)
            .cloned()
            .ok_or_else(|| CredentialError::NotFound(format!("no credentials for {}", account)))
    }
}
