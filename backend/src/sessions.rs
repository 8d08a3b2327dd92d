//! Session-store abstraction for operator logins.
//!
//! The store is deliberately an interface (`add`/`validate`/`revoke`) so the
//! backing choice can change without touching call sites; the bundled
//! implementation keeps tokens in memory, which matches the tool's lifetime:
//! sessions do not survive a restart.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{HttpRequest, HttpResponse};
use std::collections::HashSet;
use std::sync::RwLock;

pub trait SessionStore: Send + Sync {
    fn add(&self, token: String);
    fn validate(&self, token: &str) -> bool;
    fn revoke(&self, token: &str);
}

/// In-memory token set behind a `RwLock`: validation happens on every API
/// call, additions and revocations only on login/logout.
#[derive(Default)]
pub struct MemorySessionStore {
    tokens: RwLock<HashSet<String>>,
}

impl SessionStore for MemorySessionStore {
    fn add(&self, token: String) {
        self.tokens
            .write()
            .expect("session store lock poisoned")
            .insert(token);
    }

    fn validate(&self, token: &str) -> bool {
        self.tokens
            .read()
            .expect("session store lock poisoned")
            .contains(token)
    }

    fn revoke(&self, token: &str) {
        self.tokens
            .write()
            .expect("session store lock poisoned")
            .remove(token);
    }
}

/// Extracts the bearer token from the `Authorization` header, if any.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Guard called at the top of every protected handler. Returns the 401
/// response to send when the request carries no valid session token.
pub fn require_auth(req: &HttpRequest, sessions: &dyn SessionStore) -> Result<(), HttpResponse> {
    match bearer_token(req) {
        Some(token) if sessions.validate(token) => Ok(()),
        _ => Err(HttpResponse::Unauthorized().body("Missing or invalid session token")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_validate_until_revoked() {
        let store = MemorySessionStore::default();
        assert!(!store.validate("t1"));

        store.add("t1".to_string());
        assert!(store.validate("t1"));
        assert!(!store.validate("t2"));

        store.revoke("t1");
        assert!(!store.validate("t1"));
    }
}
