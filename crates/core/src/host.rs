//! Host seams used by the endpoint layer: capability checks and
//! anti-forgery tokens

use crate::store::hex_encode;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Capability required to manage licenses.
pub const MANAGE_CAPABILITY: &str = "manage_options";

/// Anti-forgery action name shared by the license endpoints.
pub const LICENSE_TOKEN_ACTION: &str = "fct_license_nonce";

/// Answers whether the current caller holds a capability.
pub trait CapabilityCheck: Send + Sync {
    fn can(&self, capability: &str) -> bool;
}

/// Issues and verifies per-action anti-forgery tokens.
pub trait TokenGuard: Send + Sync {
    fn issue(&self, action: &str) -> String;

    fn verify(&self, token: &str, action: &str) -> bool;
}

/// Fixed answer, for hosts where the operator is always trusted.
#[derive(Debug, Clone, Copy)]
pub struct StaticCapability(pub bool);

impl CapabilityCheck for StaticCapability {
    fn can(&self, _capability: &str) -> bool {
        self.0
    }
}

/// Secret-keyed tokens bound to an action and a time window.
///
/// A token stays valid for the window it was issued in and the one after,
/// so its lifetime is between one and two windows.
pub struct SessionTokenGuard {
    secret: String,
    window_secs: u64,
}

impl SessionTokenGuard {
    const DEFAULT_WINDOW_SECS: u64 = 12 * 60 * 60;
    const TOKEN_LEN: usize = 20;

    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            window_secs: Self::DEFAULT_WINDOW_SECS,
        }
    }

    pub fn with_window_secs(mut self, window_secs: u64) -> Self {
        self.window_secs = window_secs.max(1);
        self
    }

    pub fn issue_at(&self, action: &str, now: u64) -> String {
        self.token_for(action, self.tick(now))
    }

    pub fn verify_at(&self, token: &str, action: &str, now: u64) -> bool {
        if token.is_empty() {
            return false;
        }
        let tick = self.tick(now);
        [Some(tick), tick.checked_sub(1)]
            .into_iter()
            .flatten()
            .any(|t| constant_time_eq(&self.token_for(action, t), token))
    }

    fn tick(&self, now: u64) -> u64 {
        now / self.window_secs
    }

    fn token_for(&self, action: &str, tick: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b"|");
        hasher.update(action.as_bytes());
        hasher.update(b"|");
        hasher.update(tick.to_be_bytes());
        let digest = hasher.finalize();
        let mut token = hex_encode(&digest);
        token.truncate(Self::TOKEN_LEN);
        token
    }
}

impl TokenGuard for SessionTokenGuard {
    fn issue(&self, action: &str) -> String {
        self.issue_at(action, now_epoch())
    }

    fn verify(&self, token: &str, action: &str) -> bool {
        self.verify_at(token, action, now_epoch())
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
