//! Clap argument types.

use clap::Parser;

use formrelay::config::ConfigOverrides;

/// Relay browser form submissions to a chat webhook.
///
/// Flags override the `DISCORD_WEBHOOK`, `PORT` and `RELAY_HOST`
/// environment variables, which may also come from a `.env` file.
#[derive(Parser, Debug)]
#[command(name = "formrelay", version = formrelay::constants::VERSION)]
pub struct Cli {
    /// Destination webhook URL [env: DISCORD_WEBHOOK].
    #[arg(long, value_name = "URL")]
    pub webhook_url: Option<String>,

    /// Port to listen on [env: PORT] [default: 3000].
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Address to bind [env: RELAY_HOST] [default: 0.0.0.0].
    #[arg(long)]
    pub host: Option<String>,
}

impl Cli {
    /// Command-line values as config overrides.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            webhook_url: self.webhook_url.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}
