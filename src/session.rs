//! Admin login gate.
//!
//! The admin panel keeps a login marker and timestamp on the client; the
//! marker is honoured for 24 hours. This is a convenience gate, not a
//! security boundary. The only server-side check is the shared password.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// How long a recorded login stays valid.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Login marker plus the time it was recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSession {
    pub logged_in: bool,
    pub login_time: Option<DateTime<Utc>>,
}

impl AdminSession {
    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.logged_in = true;
        self.login_time = Some(now);
    }

    pub fn logout(&mut self) {
        self.logged_in = false;
        self.login_time = None;
    }

    /// `true` while the marker is set and younger than 24 hours. An expired
    /// or incomplete marker is cleared.
    pub fn is_authenticated(&mut self, now: DateTime<Utc>) -> bool {
        let valid = match (self.logged_in, self.login_time) {
            (true, Some(login_time)) => now - login_time < Duration::hours(SESSION_TTL_HOURS),
            _ => false,
        };
        if !valid {
            self.logout();
        }
        valid
    }
}

/// Constant-time comparison of the submitted password against the
/// configured one. Always `false` when no password is configured.
pub fn verify_password(expected: Option<&str>, provided: &str) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    if expected.len() != provided.len() {
        return false;
    }
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
