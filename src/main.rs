//! Bot manager entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use strum::IntoEnumIterator;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bot_manager::api::{create_router, AppState};
use bot_manager::client::{BotApi, Endpoint, EnvConfig, HttpBotApi};
use bot_manager::config::Config;
use bot_manager::error::DashboardError;
use bot_manager::logs::LogTable;
use bot_manager::metrics;
use bot_manager::monitor::BotStatus;
use bot_manager::utils::shutdown_signal;

/// Operator control panel for the trading bot.
#[derive(Parser, Debug)]
#[command(name = "bot-manager")]
#[command(about = "Web dashboard to start, stop and monitor a trading bot")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Dashboard HTTP port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard (default).
    Serve {
        /// Dashboard HTTP port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate configuration and print the resolved endpoints.
    CheckConfig,

    /// Print the bot's run-state.
    Status,

    /// Print the profit/loss log table.
    Logs,

    /// Print raw bot output.
    BotLogs,

    /// Start the bot. Missing fields are taken from the bot's current env.
    Start {
        /// Kite Connect request token.
        #[arg(long)]
        request_token: Option<String>,

        /// Lot quantity per trade.
        #[arg(long)]
        quantity: Option<String>,

        /// Option expiry.
        #[arg(long)]
        expiry: Option<String>,
    },

    /// Stop the bot.
    Stop,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("bot_manager=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    match args.command {
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Status) => cmd_status().await,
        Some(Command::Logs) => cmd_logs().await,
        Some(Command::BotLogs) => cmd_bot_logs().await,
        Some(Command::Start {
            request_token,
            quantity,
            expiry,
        }) => cmd_start(request_token, quantity, expiry).await,
        Some(Command::Stop) => cmd_stop().await,
        None => cmd_serve(args.port).await,
    }
}

/// Load and validate configuration.
fn load_config() -> bot_manager::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        DashboardError::from(e)
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(DashboardError::InvalidConfig(e));
    }
    Ok(config)
}

/// Print the configuration check report.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("BOT MANAGER - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    let client = HttpBotApi::new(&config)?;

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Bot API: {}", client.endpoints().base_url());
    for endpoint in Endpoint::iter() {
        println!(
            "  {:<10} {:<5} {}",
            endpoint.to_string(),
            endpoint.method().as_str(),
            client.endpoints().resolve(endpoint)
        );
    }
    println!("  Dashboard Port: {}", config.port);
    println!("  Poll Interval: {}s", config.poll_interval_secs);
    println!("  Re-poll Delay: {}ms", config.repoll_delay_ms);
    println!("  HTTP Timeout: {}ms", config.http_timeout_ms);
    println!("  Secure Cookie: {}", config.cookie_secure);
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("  Kite Login: {}", config.kite_login_url());
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print the bot's run-state.
async fn cmd_status() -> anyhow::Result<()> {
    let config = load_config()?;
    let client = HttpBotApi::new(&config)?;
    let status = BotStatus::from(client.bot_status().await?);
    println!("{}", status);
    Ok(())
}

/// Print the profit/loss log table as tab-separated text.
async fn cmd_logs() -> anyhow::Result<()> {
    let config = load_config()?;
    let client = HttpBotApi::new(&config)?;
    let table = LogTable::from_response(&client.fetch_logs().await?);

    if table.is_empty() {
        println!("No logs available");
        return Ok(());
    }
    println!("Total: {} entries", table.count);

    let header: Vec<&str> = table.columns.iter().map(|c| c.label.as_str()).collect();
    println!("{}", header.join("\t"));
    for row in &table.rows {
        let cells: Vec<&str> = row.iter().map(|c| c.text.as_str()).collect();
        println!("{}", cells.join("\t"));
    }
    Ok(())
}

/// Print raw bot output.
async fn cmd_bot_logs() -> anyhow::Result<()> {
    let config = load_config()?;
    let client = HttpBotApi::new(&config)?;
    let output = client.fetch_bot_logs().await?;
    if output.trim().is_empty() {
        println!("No bot output yet");
    } else {
        println!("{}", output);
    }
    Ok(())
}

/// Start the bot from the command line.
async fn cmd_start(
    request_token: Option<String>,
    quantity: Option<String>,
    expiry: Option<String>,
) -> anyhow::Result<()> {
    let config = load_config()?;
    let client = HttpBotApi::new(&config)?;

    let mut env = if request_token.is_some() && quantity.is_some() && expiry.is_some() {
        EnvConfig::default()
    } else {
        client.fetch_env().await?
    };
    if let Some(token) = request_token {
        env.kite_request_token = token;
    }
    if let Some(quantity) = quantity {
        env.trading_quantity = quantity;
    }
    if let Some(expiry) = expiry {
        env.option_expiry = expiry;
    }

    let response = client.start_bot(&env).await?;
    match response.pid {
        Some(pid) => println!("Bot started successfully! PID: {}", pid),
        None => println!("Bot started successfully!"),
    }
    Ok(())
}

/// Stop the bot from the command line.
async fn cmd_stop() -> anyhow::Result<()> {
    let config = load_config()?;
    let client = HttpBotApi::new(&config)?;
    client.stop_bot().await?;
    println!("Bot stopped successfully!");
    Ok(())
}

/// Serve the dashboard until Ctrl-C or SIGTERM.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config()?;
    if let Some(port) = port_override {
        config.port = port;
    }

    let metrics_handle = if config.metrics_enabled {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to install metrics recorder: {}", e);
                None
            }
        }
    } else {
        None
    };
    metrics::init_metrics();

    let client = HttpBotApi::new(&config)?;
    info!("Bot API: {}", client.endpoints().base_url());
    info!("Status poll interval: {}s", config.poll_interval_secs);

    let poll_interval = Duration::from_secs(config.poll_interval_secs);
    let port = config.port;

    let mut app_state = AppState::new(config, client);
    if let Some(handle) = metrics_handle {
        app_state = app_state.with_metrics(handle);
    }

    // Dropping the handle stops the poller.
    let poller = app_state.panel.start_polling(poll_interval);
    let panel = Arc::clone(&app_state.panel);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", addr);

    let router = create_router(app_state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.stop();
    info!(last_status = %panel.board().current(), "Dashboard stopped");
    Ok(())
}
