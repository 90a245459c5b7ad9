use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use betterprompt_core::Model;
use betterprompt_optimizer::local;
use betterprompt_server::{auth, build_optimizer, config::ServerConfig};

#[derive(Parser)]
#[command(name = "betterprompt-server", about = "Prompt optimization service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    server: ServerConfig,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new identity token for a user
    Keygen {
        /// User the token resolves to
        #[arg(long)]
        user: String,
        /// Human-readable name for the key
        #[arg(long, default_value = "")]
        name: String,
    },
    /// List all identity tokens (metadata only, no secrets)
    ListKeys,
    /// Revoke (delete) an identity token by ID
    RevokeKey {
        /// The API key ID to revoke
        id: String,
    },
    /// Run the local rewriter on a prompt and print the result
    Rewrite {
        text: String,
    },
    /// Probe the configured OpenRouter keys
    CheckKeys,
    /// List the supported completion models
    ListModels,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.server;

    match cli.command {
        Some(Commands::Rewrite { text }) => {
            if text.trim().is_empty() {
                bail!("prompt is required");
            }
            println!("{}", local::rewrite(&text));
        }
        Some(Commands::CheckKeys) => {
            let report = build_optimizer(&config).probe_credentials().await;
            let slots = [
                ("primary", &report.primary_key),
                ("secondary", &report.secondary_key),
            ];
            for (slot, status) in slots {
                let configured = if status.configured { "configured" } else { "not configured" };
                println!("{slot:<10} {configured:<15} {}", status.status);
            }
        }
        Some(Commands::ListModels) => {
            for &model in Model::ALL {
                let marker = if model == Model::default() { " (default)" } else { "" };
                println!("{:<46} {}{marker}", model.as_str(), model.display_name());
            }
        }
        Some(Commands::Keygen { user, name }) => {
            let db = betterprompt_db::open_database(&config.db_config()).await?;
            let raw_key = auth::generate_api_key();
            let hash = auth::sha256_hex(&raw_key);
            let api_key = db.insert_api_key(&user, &name, &hash).await?;
            eprintln!("Created API key (id: {}) for user {user}", api_key.id);
            if !name.is_empty() {
                eprintln!("  name: {name}");
            }
            // Print the raw key to stdout so it can be captured
            println!("{raw_key}");
            eprintln!("\nSave this key, it cannot be retrieved again.");
        }
        Some(Commands::ListKeys) => {
            let db = betterprompt_db::open_database(&config.db_config()).await?;
            let keys = db.list_api_keys().await?;
            if keys.is_empty() {
                eprintln!("No API keys found.");
            } else {
                println!(
                    "{:<38} {:<20} {:<20} {:<28} LAST USED",
                    "ID", "USER", "NAME", "CREATED"
                );
                for key in keys {
                    println!(
                        "{:<38} {:<20} {:<20} {:<28} {}",
                        key.id,
                        key.user_id,
                        if key.name.is_empty() { "-" } else { &key.name },
                        key.created_at,
                        key.last_used_at.as_deref().unwrap_or("never"),
                    );
                }
            }
        }
        Some(Commands::RevokeKey { id }) => {
            let db = betterprompt_db::open_database(&config.db_config()).await?;
            db.delete_api_key(&id).await?;
            eprintln!("Revoked API key {id}");
        }
        None => {
            let db = betterprompt_db::open_database(&config.db_config()).await?;
            let addr = config.addr();
            let listener = TcpListener::bind(addr).await?;
            info!("betterprompt-server listening on http://{addr}");
            betterprompt_server::serve(listener, db, &config).await?;
        }
    }

    Ok(())
}
