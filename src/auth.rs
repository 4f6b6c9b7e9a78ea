use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Normalizes a typed user name; blank names are rejected
    pub fn parse(name: &str) -> Option<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_control) {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// "Is there a valid session, and for whom"
pub trait AuthProvider {
    fn current_user(&self) -> Option<UserId>;

    fn is_signed_in(&self) -> bool {
        self.current_user().is_some()
    }
}

/// Local sign-in by user name, held for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct LocalAuth {
    user: Option<UserId>,
}

impl LocalAuth {
    pub fn new(user: Option<UserId>) -> Self {
        Self { user }
    }

    pub fn sign_in(&mut self, user: UserId) {
        log::info!("signed in as {user}");
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            log::info!("signed out {user}");
        }
    }
}

impl AuthProvider for LocalAuth {
    fn current_user(&self) -> Option<UserId> {
        self.user.clone()
    }
}
