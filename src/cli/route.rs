use std::path::PathBuf;

use clap::Args;

use crate::client::{Area, Decision, GuardTable, Session};
use crate::config::Initializer;
use crate::identity::{PrincipalPayload, Role};
use crate::Result;

/// Evaluate the route guard offline
#[derive(Args, Debug)]
pub struct RouteCommand {
    /// Path to navigate to (e.g. /hr/dashboard)
    pub path: String,
    /// Role of the signed in user. Anonymous when omitted
    #[arg(long)]
    pub role: Option<String>,
    /// Configuration file to read the guard table from
    #[arg(long, short = 'C', env = "HRGATE_SERVER_CONFIG_PATH")]
    pub config: Option<PathBuf>,
}

impl RouteCommand {
    pub async fn run(self) -> Result<()> {
        let guards = match self.config {
            Some(path) => Initializer::load_config_file(path).await?.config.guard_table(),
            None => GuardTable::default(),
        };

        let session = match self.role {
            Some(role) => {
                let payload = PrincipalPayload {
                    role: Some(role),
                    ..Default::default()
                };
                Session::signed_in(payload.into_principal(Role::Employee)?)
            }
            None => Session::anonymous(),
        };

        let area = Area::for_path(&self.path)
            .map(|area| area.to_string())
            .unwrap_or_else(|| "public".to_owned());

        match guards.evaluate(&session, &self.path) {
            Decision::Allow => println!("{}\tallow", area),
            Decision::Redirect(target) => println!("{}\tredirect {}", area, target),
        }

        Ok(())
    }
}
