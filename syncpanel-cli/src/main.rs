//! Sync Panel - control panel for a folder-to-drive sync agent
//!
//! Drives the agent from the terminal, or hosts the browser panel next to
//! it.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use syncpanel::cli::{self, ConfigCommands, CredentialsCommands, EngineCommand};
use syncpanel::server::{self, ServerConfig};
use syncpanel::watch::{self, WatchOptions};

#[derive(Parser, Debug)]
#[command(name = "syncpanel")]
#[command(author = "Sync Panel Team")]
#[command(version)]
#[command(about = "Control panel for a folder-to-drive sync agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Sync agent URL
    #[arg(long, default_value = "http://localhost:8080", env = "SYNCPANEL_AGENT_URL", global = true)]
    url: String,

    /// Panel settings file (TOML)
    #[arg(long, env = "SYNCPANEL_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the full panel
    Status,
    /// Start the sync engine
    Start,
    /// Stop the sync engine
    Stop,
    /// Trigger a manual sync
    Sync,
    /// Show or change the sync configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Check or upload Google Drive credentials
    Credentials {
        #[command(subcommand)]
        command: CredentialsCommands,
    },
    /// Keep the panel on screen, refreshing until Ctrl+C
    Watch {
        /// Clear the screen before each redraw
        #[arg(long)]
        clear: bool,
    },
    /// Host the browser panel and forward /api to the agent
    Serve {
        /// Port for the web UI
        #[arg(short, long, default_value = "8090", env = "SYNCPANEL_PORT")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Directory holding the built browser panel
        #[arg(long, default_value = "ui/dist")]
        ui_dir: PathBuf,

        /// Open the panel in a browser once the server is up
        #[arg(long)]
        open: bool,
    },
    /// Show version information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let fallback = cli::default_settings_path();
    let settings = cli::load_settings(cli.settings.as_deref(), fallback.as_deref())?;
    let controller = cli::connect(&cli.url, &settings);

    match cli.command {
        Commands::Status => cli::show_status(&controller).await?,
        Commands::Start => EngineCommand::Start.execute(&controller).await?,
        Commands::Stop => EngineCommand::Stop.execute(&controller).await?,
        Commands::Sync => EngineCommand::Sync.execute(&controller).await?,
        Commands::Config { command } => command.execute(&controller).await?,
        Commands::Credentials { command } => command.execute(&controller).await?,
        Commands::Watch { clear } => {
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl+C: {}", e);
                }
            };
            watch::watch(
                &controller,
                &settings,
                WatchOptions { clear_screen: clear },
                &mut std::io::stdout(),
                shutdown,
            )
            .await?;
        }
        Commands::Serve {
            port,
            host,
            ui_dir,
            open,
        } => {
            serve(
                ServerConfig {
                    bind: SocketAddr::new(host, port),
                    agent_url: cli.url.clone(),
                    ui_dir,
                },
                open,
            )
            .await?;
        }
        Commands::Version => {
            println!("syncpanel {}", env!("CARGO_PKG_VERSION"));
            println!("Control panel for a folder-to-drive sync agent");
        }
    }

    Ok(())
}

async fn serve(config: ServerConfig, open_browser: bool) -> anyhow::Result<()> {
    let (addr, server_handle) = server::start_server(config).await?;
    let ui_url = format!("http://{}", addr);

    if open_browser {
        info!("Opening browser...");
        if let Err(e) = open::that(&ui_url) {
            tracing::warn!("Failed to open browser: {}", e);
            info!("Please open {} in your browser", ui_url);
        }
    }

    info!("Sync panel is running at {}", ui_url);
    info!("Press Ctrl+C to stop");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
        }
        result = server_handle => {
            match result {
                Ok(Err(e)) => tracing::error!("{}", e),
                Err(e) => tracing::error!("Server task failed: {}", e),
                Ok(Ok(())) => {}
            }
        }
    }

    Ok(())
}
