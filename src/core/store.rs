use crate::common::Result;
use crate::core::{Config, Directory, SessionManager};

/// State owned by the gatekeeper task and lent to each middleware in turn.
#[derive(Debug)]
pub(crate) struct Store {
    pub(crate) directory: Directory,
    pub(crate) sessions: SessionManager,
}

impl Store {
    pub(crate) fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            directory: Directory::from_entries(config.users.clone())?,
            sessions: SessionManager::new(config.session_ttl()),
        })
    }
}
