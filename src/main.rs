use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pawprint::channels::telegram::TelegramChannel;
use pawprint::channels::Channel;
use pawprint::config::Config;
use pawprint::error::{ReaderError, Result};
use pawprint::flows::IntakeFlow;
use pawprint::gateway::Gateway;

#[derive(Parser)]
#[command(name = "pawprint", version, about = "Image and album intake bot for Telegram")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config file
    Init,
    /// Start the bot
    Start,
    /// Config management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file
    Show,
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // File + stderr for `start`, stderr only otherwise
    init_tracing(matches!(&cli.command, Commands::Start))?;

    match cli.command {
        Commands::Init => cmd_init(&cli.config)?,
        Commands::Start => cmd_start(&cli.config).await?,
        Commands::Config { action } => {
            let path = cli.config.unwrap_or_else(Config::default_path);
            match action {
                ConfigAction::Show => {
                    let content = std::fs::read_to_string(&path)?;
                    println!("{content}");
                }
                ConfigAction::Path => println!("{}", path.display()),
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn pawprint_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pawprint")
}

fn log_file_path() -> PathBuf {
    pawprint_dir().join("pawprint.log")
}

fn load_config(path: &Option<PathBuf>) -> Result<Config> {
    let config_path = path.clone().unwrap_or_else(Config::default_path);
    if !config_path.exists() {
        return Err(ReaderError::Config(format!(
            "Config not found at {}. Run `pawprint init` first.",
            config_path.display()
        )));
    }
    Config::load(&config_path)
}

fn init_tracing(with_file: bool) -> std::result::Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if with_file {
            "info".into()
        } else {
            "warn".into()
        }
    });

    let stderr_layer = tracing_subscriber::fmt::layer();

    if with_file {
        let _ = std::fs::create_dir_all(pawprint_dir());
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path())?;

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_init(path: &Option<PathBuf>) -> Result<()> {
    let config_path = path.clone().unwrap_or_else(Config::default_path);
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        std::fs::write(&config_path, Config::default_toml())?;
        println!("Created config at {}", config_path.display());
        println!("Set TELEGRAM_BOT_TOKEN and run `pawprint start`.");
    }
    Ok(())
}

async fn cmd_start(config_path: &Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;

    let tg_config = config
        .channels
        .telegram
        .clone()
        .filter(|t| t.enabled)
        .ok_or_else(|| ReaderError::Config("Telegram channel is not enabled".to_string()))?;

    let channel = Arc::new(TelegramChannel::new(tg_config)?);
    let gateway = Arc::new(Gateway::new(
        Arc::new(IntakeFlow::new(&config)),
        channel.outbox(),
        config.conversation.clone(),
    ));

    let polling = {
        let channel = channel.clone();
        let gateway = gateway.clone();
        tokio::spawn(async move {
            if let Err(e) = channel.start(gateway).await {
                tracing::error!("Telegram channel error: {e}");
            }
        })
    };

    println!("Pawprint v{} started", env!("CARGO_PKG_VERSION"));
    println!(
        "  Album window: {} ms",
        config.readers.media_group_wait_ms
    );
    println!("  Log:          {}", log_file_path().display());
    println!();
    println!("Press Ctrl+C to stop.");
    info!("Telegram channel started");

    tokio::signal::ctrl_c().await.ok();
    println!("\nShutting down...");

    gateway.shutdown();
    channel.stop().await?;
    // The poll loop only notices `stop` after the current long-poll returns.
    polling.abort();

    println!("Pawprint stopped.");
    Ok(())
}
