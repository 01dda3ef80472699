//! Identity gate: resolve a bearer credential to a caller.
//!
//! Account management and token issuance live outside this crate. The
//! pipeline only needs a yes/no answer plus who is asking, so the gate is
//! a trait. [`StaticTokenGate`] is the in-process implementation: a token
//! table loaded from configuration, suited to deployments where an
//! external issuer provisions long-lived service tokens, and to tests.

use crate::error::ConfigError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Lawyer,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "lawyer" => Ok(Role::Lawyer),
            other => Err(format!("unknown role '{other}' (expected user, admin or lawyer)")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Lawyer => "lawyer",
        })
    }
}

/// A resolved caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "id")]
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            email: email.into(),
            role: Role::User,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

/// The caller could not be identified. Both variants mean HTTP 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("No token, authorization denied")]
    MissingToken,
    #[error("Token is not valid")]
    InvalidToken,
}

/// Resolves bearer tokens to identities.
#[async_trait]
pub trait IdentityGate: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Identity, IdentityError>;
}

/// Extract the token from an `Authorization` header value.
///
/// Accepts `Bearer <token>` with any casing of the scheme. A header that is
/// absent, blank, or has an empty token counts as missing.
pub fn bearer_token(header: Option<&str>) -> Result<&str, IdentityError> {
    let value = header.map(str::trim).unwrap_or("");
    if value.is_empty() || value.eq_ignore_ascii_case("bearer") {
        return Err(IdentityError::MissingToken);
    }
    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => return Err(IdentityError::InvalidToken),
    };
    if token.is_empty() {
        return Err(IdentityError::MissingToken);
    }
    Ok(token)
}

/// Fixed token → identity table.
#[derive(Clone, Default)]
pub struct StaticTokenGate {
    tokens: HashMap<String, Identity>,
}

impl fmt::Debug for StaticTokenGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenGate")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl StaticTokenGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Parse a table of the form
    /// `token=user_id:name:email[:role],token2=…`.
    ///
    /// Empty entries (e.g. a trailing comma) are skipped.
    pub fn from_table(table: &str) -> Result<Self, ConfigError> {
        let mut gate = Self::new();
        for entry in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let invalid = |reason: &str| ConfigError::InvalidTokenEntry {
                entry: redact(entry),
                reason: reason.to_string(),
            };

            let (token, who) = entry
                .split_once('=')
                .ok_or_else(|| invalid("expected token=user_id:name:email[:role]"))?;
            let token = token.trim();
            if token.is_empty() {
                return Err(invalid("token is empty"));
            }

            let fields: Vec<&str> = who.split(':').map(str::trim).collect();
            let (id, name, email, role) = match fields.as_slice() {
                [id, name, email] => (*id, *name, *email, Role::User),
                [id, name, email, role] => {
                    (*id, *name, *email, role.parse::<Role>().map_err(|e| invalid(&e))?)
                }
                _ => return Err(invalid("expected user_id:name:email[:role]")),
            };
            if id.is_empty() {
                return Err(invalid("user_id is empty"));
            }

            gate.tokens
                .insert(token.to_string(), Identity::new(id, name, email).with_role(role));
        }
        Ok(gate)
    }
}

/// Keep only the identity half of a table entry for error messages.
fn redact(entry: &str) -> String {
    match entry.split_once('=') {
        Some((_, who)) => format!("<token>={who}"),
        None => "<token>".to_string(),
    }
}

#[async_trait]
impl IdentityGate for StaticTokenGate {
    async fn resolve(&self, token: &str) -> Result<Identity, IdentityError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(IdentityError::InvalidToken)
    }
}
