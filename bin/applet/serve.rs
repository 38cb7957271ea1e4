use anyhow::{Context, Error as Anyhow};
use clap::Parser;
use lib::server::{Config, Server};
use lib::session::Handler;
use tracing::{info, instrument};

/// Runs the game service.
#[derive(Debug, Default, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Serve {
    /// The server configuration in RON notation.
    #[clap(default_value_t)]
    config: Config,
}

impl Serve {
    #[instrument(level = "trace", skip(self), err)]
    pub async fn execute(self) -> Result<(), Anyhow> {
        let config = self.config;
        info!(games = config.games.len(), tokens = config.tokens.len(), "seeding");

        let handler = Handler::new(config.store(), config.identity());
        let server = Server::bind(config.bind, handler)
            .await
            .with_context(|| format!("failed to listen on {}", config.bind))?;

        Ok(server.run().await?)
    }
}
