use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twap_server::{ServiceConfig, TwapServer};

fn print_help() {
    eprintln!(
        r#"TWAP Server - time-weighted order execution over WebSocket

USAGE:
    twap-server [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    HOST                Server host (default: 0.0.0.0)
    PORT                Server port (default: 8000)
    RUST_LOG            Log level filter

EXAMPLES:
    # Run with defaults
    twap-server

    # Run with config file
    twap-server --config twap.json

    # Run with custom port
    PORT=9000 twap-server
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "twap_server=info,twap_engine=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = if let Some(path) = config_path {
        tracing::info!("Loading configuration from: {}", path);
        ServiceConfig::from_file(&path)?
    } else {
        tracing::info!("Using default configuration");
        ServiceConfig::default()
    };

    // Env overrides
    if let Ok(host) = std::env::var("HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!("Ignoring invalid PORT '{}'", port),
        }
    }

    tracing::info!("Service: {}", config.name);
    tracing::info!("Paper balances: {:?}", config.paper.balances);
    tracing::info!("Paper prices: {:?}", config.paper.prices);
    tracing::info!(
        "WebSocket: ws://{}:{}/ws-twap",
        config.server.host,
        config.server.port
    );

    TwapServer::new(config).run().await
}
