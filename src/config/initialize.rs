use std::future::Future;
use std::path::Path;

use tokio::fs;
use tokio::net::TcpListener;

use crate::common::{info, Result};
use crate::config::Config;
use crate::core;
use crate::server::http::Server;

#[derive(Debug)]
pub struct Initializer {
    pub config: Config,
    listener: Option<TcpListener>,
}

impl Initializer {
    pub async fn load_config_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let f = fs::File::open(path).await?;
        let config = serde_yaml::from_reader::<_, Config>(f.into_std().await)?;

        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: TcpListener) {
        self.listener = Some(listener);
    }

    /// Start the gatekeeper and serve the http api until `shutdown` resolves.
    pub async fn run(self, shutdown: impl Future + Send + 'static) -> crate::Result<()> {
        self.run_inner(shutdown).await.map_err(crate::HrGateError::from)
    }

    async fn run_inner(self, shutdown: impl Future + Send + 'static) -> Result<()> {
        let gatekeeper = core::Builder::from_config(self.config.gate).build()?;
        let request_sender = gatekeeper.request_channel();

        let gatekeeper_handle = tokio::spawn(gatekeeper.run());

        let listener = match self.listener {
            Some(listener) => listener,
            None => TcpListener::bind(self.config.server.listen_addr()).await?,
        };

        let server = Server::new(self.config.server);
        let result = server.run(request_sender, listener, shutdown).await;

        // Server dropped its senders, so the gatekeeper drains and stops.
        if gatekeeper_handle.await.is_err() {
            info!("Gatekeeper task aborted");
        }

        result
    }
}
