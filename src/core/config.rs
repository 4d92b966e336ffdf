use std::fmt;

use serde::Deserialize;

use crate::identity::Role;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub users: Vec<UserEntry>,
    // Lifetime of an issued bearer token.
    pub session_ttl_seconds: Option<u64>,
    // Buffer of the channel feeding the gatekeeper.
    pub request_channel_buffer: Option<usize>,
}

impl Config {
    const DEFAULT_SESSION_TTL_SECONDS: u64 = 60 * 60;
    const MAX_SESSION_TTL_SECONDS: u64 = 60 * 60 * 24 * 365;
    const DEFAULT_REQUEST_CHANNEL_BUFFER: usize = 1024;

    pub fn session_ttl(&self) -> chrono::Duration {
        let seconds = self
            .session_ttl_seconds
            .unwrap_or(Config::DEFAULT_SESSION_TTL_SECONDS)
            .clamp(1, Config::MAX_SESSION_TTL_SECONDS);
        chrono::Duration::seconds(seconds as i64)
    }

    pub fn request_channel_buffer(&self) -> usize {
        self.request_channel_buffer
            .unwrap_or(Config::DEFAULT_REQUEST_CHANNEL_BUFFER)
            .max(1)
    }
}

#[derive(Deserialize, Clone)]
pub struct UserEntry {
    pub id: u64,
    pub name: String,
    pub email: String,
    // Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
    pub organization_id: String,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
}

impl fmt::Debug for UserEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("UserEntry")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("organization_id", &self.organization_id)
            .field("department_id", &self.department_id)
            .field("team_id", &self.team_id)
            .finish_non_exhaustive()
    }
}
