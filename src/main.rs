use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use gallerist::{
    Config, album::AlbumStore, album_builder, create_app, open_album, render, startup_checks,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Overrides `app.log_level`
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web server (default if no command specified)
    Serve {
        /// Album root, overrides `album.source_directory`
        album: Option<PathBuf>,

        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,

        /// Theme directory, overrides `theme.directory`
        #[arg(long)]
        theme: Option<PathBuf>,

        /// Automatically quit after specified number of seconds (useful for testing)
        #[arg(long)]
        quit_after: Option<u64>,
    },

    /// Write metadata.json and thumbnails for every folder, then exit
    BuildMetadata {
        /// Album root, overrides `album.source_directory`
        album: Option<PathBuf>,

        /// Reconcile folders that already have metadata with the disk
        #[arg(long)]
        update: bool,

        /// Only process the top folder
        #[arg(long)]
        no_recursive: bool,
    },

    /// Create a theme skeleton
    CreateTheme {
        /// Theme name, recorded in theme.json
        name: String,
        /// Directory to create the theme in
        directory: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_found = cli.config.exists();
    let mut config = load_config(&cli.config)?;

    // Set up logging before anything else is reported
    let log_level = cli.log_level.as_deref().unwrap_or(&config.app.log_level);
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if config_found {
        info!("Configuration loaded from: {:?}", cli.config);
    } else {
        info!("Config file not found at {:?}, using defaults", cli.config);
    }

    match cli.command {
        Some(Commands::Serve {
            album,
            port,
            host,
            theme,
            quit_after,
        }) => {
            if let Some(album) = album {
                config.album.source_directory = album;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(theme) = theme {
                config.theme.directory = Some(theme);
            }
            run_server(config, quit_after).await
        }
        Some(Commands::BuildMetadata {
            album,
            update,
            no_recursive,
        }) => {
            if let Some(album) = album {
                config.album.source_directory = album;
            }
            if no_recursive {
                config.album.recursive = false;
            }
            build_metadata(config, update).await
        }
        Some(Commands::CreateTheme { name, directory }) => {
            let written = render::create_theme(&name, &directory)?;
            println!(
                "Theme '{}' ready in {:?} ({} files written)",
                name,
                directory,
                written.len()
            );
            Ok(())
        }
        None => {
            // Default to serve command if no subcommand specified
            run_server(config, None).await
        }
    }
}

fn load_config(config_path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if config_path.exists() {
        let config_content = std::fs::read_to_string(config_path)?;
        Ok(toml_edit::de::from_str::<Config>(&config_content)?)
    } else {
        Ok(Config::default())
    }
}

async fn build_metadata(config: Config, update: bool) -> Result<(), Box<dyn std::error::Error>> {
    let builder = album_builder(&config.album);
    let root = config.album.source_directory.clone();
    info!(
        "Building metadata for {:?} (update: {}, recursive: {})",
        root, update, config.album.recursive
    );

    let album = tokio::task::spawn_blocking(move || builder.build(&root, update)).await??;
    info!("Metadata written for {} folders", album.len());
    Ok(())
}

async fn run_server(config: Config, quit_after: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting {} server", config.app.name);
    info!("Album source directory: {:?}", config.album.source_directory);
    match &config.theme.directory {
        Some(dir) => info!("Theme '{}' directory: {:?}", config.theme.name, dir),
        None => info!("Using built-in theme"),
    }

    // Perform startup checks
    match startup_checks::perform_startup_checks(&config).await {
        Ok(()) => info!("All startup checks passed"),
        Err(errors) => {
            for error in &errors {
                tracing::error!("Startup check failed: {}", error);
            }
            tracing::error!("Critical startup check failed, exiting");
            return Err("Critical startup check failed".into());
        }
    }

    let album = open_album(&config).await?;

    if let Some(interval_minutes) = config.album.refresh_interval_minutes
        && interval_minutes > 0
    {
        info!(
            "Starting background album reconciliation every {} minutes",
            interval_minutes
        );
        AlbumStore::start_background_refresh(album.clone(), interval_minutes);
    }

    let addr = SocketAddr::from((config.server.host.parse::<std::net::IpAddr>()?, config.server.port));
    let app = create_app(config, album).await;

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Set up graceful shutdown
    let server = axum::serve(listener, app);
    let graceful = server.with_graceful_shutdown(shutdown_signal(quit_after));

    if let Err(e) = graceful.await {
        tracing::error!("Server error: {}", e);
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(quit_after: Option<u64>) {
    use tokio::signal;
    use tokio::time::{Duration, sleep};

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let quit_timer = async {
        if let Some(seconds) = quit_after {
            info!(
                "Server will automatically shut down after {} seconds",
                seconds
            );
            sleep(Duration::from_secs(seconds)).await;
            info!("Quit timer expired, shutting down");
        } else {
            std::future::pending::<()>().await
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        },
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        },
        _ = quit_timer => {},
    }
}
