//! Branch Service - HTTP API for branch records and uploads.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use branch_service_lib::config::DEFAULT_PORT;

#[derive(Parser)]
#[command(name = "branch-service")]
#[command(about = "Branch management service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(long, env = "BRANCH_SERVICE_HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "BRANCH_SERVICE_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Print an access and refresh token for a user id
    Token {
        #[arg(long)]
        uid: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            branch_service_lib::run_embedded(&host, port).await?;
        }
        Commands::Token { uid } => {
            let pair = branch_service_lib::issue_token(&uid)?;
            println!("access_token:  {}", pair.access_token);
            println!("refresh_token: {}", pair.refresh_token);
            println!("expires_in:    {}s", pair.expires_in);
        }
    }

    Ok(())
}
