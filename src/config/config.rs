use serde::Deserialize;

use crate::client::GuardTable;
use crate::core;
use crate::server::http;

/// Whole configuration file.
#[derive(Deserialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub server: http::Config,
    #[serde(default)]
    pub gate: core::Config,
    // Route guard table evaluated by `hrgate route`. Falls back to the built in table.
    #[serde(default)]
    pub guard: Option<GuardTable>,
}

impl Config {
    pub fn guard_table(&self) -> GuardTable {
        self.guard.clone().unwrap_or_default()
    }
}
