use clap::Parser;
use updown_edge::cli::{Cli, Commands};
use updown_edge::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) if std::path::Path::new(&cli.config).exists() => return Err(e),
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {:#}", cli.config, e);
            eprintln!("Using default configuration");
            Config::default()
        }
    };

    // Initialize telemetry
    let _telemetry = updown_edge::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            args.execute(&config).await?;
        }
        Commands::Round(args) => {
            args.execute(&config)?;
        }
        Commands::Quote(args) => {
            args.execute(&config).await?;
        }
        Commands::Markets(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Asset: {} ({}s rounds)", config.market.asset, config.market.round_duration_secs);
            println!("  Feed: {} via {}", config.feed_symbol(), config.feed.ws_url);
            println!(
                "  Strategy: window={}s threshold={}% min_edge={}% size=${}",
                config.strategy.momentum_window_secs,
                config.strategy.momentum_threshold_pct,
                config.strategy.min_edge_pct,
                config.strategy.bet_size_usdc
            );
            println!(
                "  Execution: {} cooldown={}s policy={:?}",
                config.execution.mode, config.execution.cooldown_secs, config.execution.cooldown_policy
            );
            println!();
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
