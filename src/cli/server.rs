use std::path::PathBuf;

use clap::Args;

use crate::common::debug;
use crate::config::Initializer;
use crate::server::http::Config as ServerConfig;
use crate::Result;

/// Running hrgate server
#[derive(Args, Debug)]
pub struct ServerCommand {
    /// Configuration file path
    #[arg(
        long,
        short = 'C',
        default_value = "./files/config.yaml",
        env = "HRGATE_SERVER_CONFIG_PATH"
    )]
    config: PathBuf,
    /// Http binding address host(e.g. 0.0.0.0, localhost)
    #[arg(long, env = "HRGATE_SERVER_HOST")]
    bind_host: Option<String>,
    /// Http binding address port
    #[arg(long, env = "HRGATE_SERVER_PORT")]
    bind_port: Option<String>,
    /// Directory of the built portal to serve
    #[arg(long, env = "HRGATE_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

impl ServerCommand {
    pub async fn run(self) -> Result<()> {
        let ServerCommand {
            config,
            mut bind_host,
            mut bind_port,
            mut static_dir,
        } = self;

        let mut initializer = Initializer::load_config_file(config).await?;

        let mut config = {
            let mut config = ServerConfig::default();

            config.set_listen_host(&mut bind_host);
            config.set_listen_port(&mut bind_port);
            config.set_static_dir(&mut static_dir);
            config
        };

        initializer.config.server.override_merge(&mut config);

        debug!("{:?}", initializer);

        initializer.run(tokio::signal::ctrl_c()).await
    }
}
