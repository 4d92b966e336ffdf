use clap::{Args, Parser, Subcommand};

use crate::cli::{employees, hash, route, server, signin};
use crate::client::http::HttpClient;
use crate::server::DEFAULT_PORT;

/// Hrgate command
#[derive(Parser, Debug)]
#[command(version, propagate_version = true, subcommand_required = true)]
pub struct HrGateCommand {
    /// Client options
    #[command(flatten)]
    pub client: ClientOptions,
    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Client options
#[derive(Args, Debug)]
pub struct ClientOptions {
    /// Remote hrgate server host
    #[arg(long, env = "HRGATE_HOST", default_value = "127.0.0.1", global = true)]
    pub host: String,
    /// Server listening port
    #[arg(long, env = "HRGATE_PORT", default_value = DEFAULT_PORT, global = true)]
    pub port: u16,
    /// Bearer token printed by signin
    #[arg(long, env = "HRGATE_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,
}

impl ClientOptions {
    /// Http client for the configured server, carrying the token if one was given.
    pub fn http_client(self) -> crate::Result<HttpClient> {
        let client = HttpClient::from_addr(&self.host, self.port)?;
        Ok(match self.token {
            Some(token) => client.with_token(token),
            None => client,
        })
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and print the bearer token
    Signin(signin::SignInCommand),
    /// List, show or re-role employees
    Employees(employees::EmployeesCommand),
    /// Evaluate the route guard for a path and role
    Route(route::RouteCommand),
    /// Hash a password for the configuration file
    HashPassword(hash::HashPasswordCommand),
    /// Server
    Server(server::ServerCommand),
}

/// Parse command line args
pub fn parse() -> HrGateCommand {
    HrGateCommand::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SignInArea;

    #[test]
    fn parse_signin() {
        let command = HrGateCommand::try_parse_from([
            "hrgate",
            "signin",
            "--area",
            "admin",
            "--email",
            "root@acme.test",
            "--password",
            "secret",
            "--port",
            "9000",
        ])
        .unwrap();

        assert_eq!(command.client.port, 9000);
        match command.command {
            Command::Signin(signin) => assert_eq!(signin.area, SignInArea::Admin),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(HrGateCommand::try_parse_from(["hrgate"]).is_err());
    }
}
