use std::collections::{HashMap, HashSet};

use base64::Engine;
use rand::RngCore;

use crate::common::{debug, Time};

pub(crate) type SessionToken = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionGrant {
    pub(crate) token: SessionToken,
    pub(crate) expires_at: Time,
}

#[derive(Debug)]
struct SessionEntry {
    user_id: u64,
    expires_at: Time,
}

/// Bearer token table.
///
/// A token only identifies the user. Role and scope are looked up again in the
/// directory for every request.
#[derive(Debug)]
pub(crate) struct SessionManager {
    ttl: chrono::Duration,
    sessions: HashMap<SessionToken, SessionEntry>,
    by_user: HashMap<u64, HashSet<SessionToken>>,
}

impl SessionManager {
    pub(crate) fn new(ttl: chrono::Duration) -> Self {
        Self {
            ttl,
            sessions: HashMap::new(),
            by_user: HashMap::new(),
        }
    }

    pub(crate) fn issue(&mut self, user_id: u64, now: Time) -> SessionGrant {
        let token = gen_token();
        let expires_at = now + self.ttl;

        self.sessions.insert(
            token.clone(),
            SessionEntry {
                user_id,
                expires_at,
            },
        );
        self.by_user
            .entry(user_id)
            .or_default()
            .insert(token.clone());
        debug!(user_id, %expires_at, "Session issued");

        SessionGrant { token, expires_at }
    }

    /// User behind `token`, if the token is known and still valid.
    pub(crate) fn validate(&mut self, token: &str, now: Time) -> Option<u64> {
        let entry = self.sessions.get(token)?;
        if entry.expires_at > now {
            return Some(entry.user_id);
        }
        debug!(user_id = entry.user_id, "Session expired");
        self.revoke(token);
        None
    }

    pub(crate) fn revoke(&mut self, token: &str) -> bool {
        match self.sessions.remove(token) {
            Some(entry) => {
                if let Some(tokens) = self.by_user.get_mut(&entry.user_id) {
                    tokens.remove(token);
                    if tokens.is_empty() {
                        self.by_user.remove(&entry.user_id);
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Revoke every session of a user. Returns how many were revoked.
    pub(crate) fn revoke_user(&mut self, user_id: u64) -> usize {
        let tokens = self.by_user.remove(&user_id).unwrap_or_default();
        for token in &tokens {
            self.sessions.remove(token);
        }
        debug!(user_id, count = tokens.len(), "Sessions revoked");
        tokens.len()
    }

    /// Drop every expired session.
    pub(crate) fn prune(&mut self, now: Time) -> usize {
        let expired: Vec<SessionToken> = self
            .sessions
            .iter()
            .filter(|(_, entry)| entry.expires_at <= now)
            .map(|(token, _)| token.clone())
            .collect();
        for token in &expired {
            self.revoke(token);
        }
        expired.len()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}

// 256 random bits, base64url without padding.
fn gen_token() -> SessionToken {
    let mut buf = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}
