use clap::Args;

use crate::client::http::HttpClient;
use crate::client::Portal;
use crate::identity::SignInArea;
use crate::protocol::SignInRequest;
use crate::{HrGateError, Result};

/// Sign in through one of the two sign-in areas
#[derive(Args, Debug)]
pub struct SignInCommand {
    /// Sign-in area
    #[arg(long, value_enum, default_value_t = SignInArea::User)]
    pub area: SignInArea,
    /// Account email
    #[arg(long, env = "HRGATE_EMAIL")]
    pub email: String,
    /// Account password
    #[arg(long, env = "HRGATE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl SignInCommand {
    pub async fn run(self, client: HttpClient) -> Result<()> {
        let SignInCommand {
            area,
            email,
            password,
        } = self;

        let mut portal = Portal::new(client);
        let navigation = portal
            .sign_in(area, SignInRequest::new(email, password))
            .await;

        let Some(principal) = portal.session().principal() else {
            return Err(HrGateError::Unauthenticated {
                message: portal.store().error().map(str::to_owned),
            });
        };

        println!(
            "Signed in as {} <{}> ({})",
            principal.name, principal.email, principal.role
        );
        println!("Landing {}", navigation.route());
        if let Some(token) = portal.api().token() {
            println!("export HRGATE_TOKEN={}", token);
        }

        Ok(())
    }
}
