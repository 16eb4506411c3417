use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sheets_json_proxy::config::Config;
use sheets_json_proxy::local::{self, AppState, DEFAULT_PORT};
use sheets_json_proxy::sheets::SheetsClient;
use tracing::{debug, info};

/// Serve the dashboard and the sheet endpoint locally.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Interface to listen on.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory static files are served from.
    #[arg(long, env = "STATIC_ROOT", default_value = ".")]
    root: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env has to be loaded before clap reads PORT and friends
    let dotenv = dotenvy::dotenv();
    sheets_json_proxy::set_up_logging();
    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(err) => debug!("No .env loaded: {}", err),
    }

    let args = Args::parse();
    let state = Arc::new(AppState {
        config: Config::load_from_env(),
        client: SheetsClient::new()?,
        static_root: args.root,
    });

    local::serve(state, &args.host, args.port).await?;
    Ok(())
}
