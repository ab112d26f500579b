use clap::Parser;
use kalshi_book::cli::{Cli, Commands};
use kalshi_book::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            toml::from_str(include_str!("../config.toml.example"))?
        }
    };

    config.validate()?;

    // Initialize telemetry
    kalshi_book::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Watch(args) => {
            tracing::info!(market = %args.ticker, "Watching order book");
            args.execute(&config).await?;
        }
        Commands::Book(args) => {
            args.execute(&config).await?;
        }
        Commands::Verify(args) => {
            tracing::info!(market = %args.ticker, "Verifying streamed book against REST");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  WebSocket: {}", config.api.ws_url);
            println!("  REST: {}", config.api.rest_url);
            println!(
                "  Keepalive: ping every {}s, pong within {}s",
                config.feed.ping_interval_secs, config.feed.pong_timeout_secs
            );
            println!("  Buffer: {} books", config.feed.buffer_size);
            println!(
                "  Backoff: {}ms to {}ms",
                config.feed.initial_backoff_ms, config.feed.max_backoff_ms
            );
            match config.telemetry.metrics_port {
                Some(port) => println!("  Metrics: :{}", port),
                None => println!("  Metrics: disabled"),
            }
        }
    }

    Ok(())
}
