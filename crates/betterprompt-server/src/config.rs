use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use betterprompt_db::DbConfig;
use betterprompt_optimizer::client::{DEFAULT_BASE_URL, DEFAULT_SITE_URL};
use betterprompt_optimizer::Credentials;
use clap::Args;

/// Settings for the HTTP server and the optimizer behind it.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "BETTERPROMPT_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    #[arg(long, env = "BETTERPROMPT_PORT", default_value = "3720")]
    pub port: u16,

    /// Primary completion-service key
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: Option<String>,

    /// Secondary completion-service key, tried when the primary is rate limited,
    /// out of quota or unreachable
    #[arg(long, env = "OPENROUTER_API_KEY2", hide_env_values = true)]
    pub openrouter_api_key2: Option<String>,

    #[arg(long, env = "OPENROUTER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub openrouter_url: String,

    /// Sent as HTTP-Referer on completion requests
    #[arg(long, env = "BETTERPROMPT_SITE_URL", default_value = DEFAULT_SITE_URL)]
    pub site_url: String,

    /// Deadline for each completion call (seconds)
    #[arg(long, env = "BETTERPROMPT_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Postgres connection URL (requires the `postgres` feature)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// SQLite database file
    #[arg(long, env = "BETTERPROMPT_SQLITE_PATH")]
    pub sqlite_path: Option<String>,

    /// Static identity token accepted alongside database-issued keys
    #[arg(long, env = "BETTERPROMPT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// User the static identity token resolves to
    #[arg(long, env = "BETTERPROMPT_DEFAULT_USER", default_value = "default")]
    pub default_user: String,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::from_raw(
            self.openrouter_api_key.as_deref(),
            self.openrouter_api_key2.as_deref(),
        )
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            database_url: self.database_url.clone().filter(|u| !u.is_empty()),
            sqlite_path: self.sqlite_path.clone().filter(|p| !p.is_empty()),
        }
    }
}
