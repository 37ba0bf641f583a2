mod config;

use std::net::SocketAddr;

use dotenv::dotenv;
use services::{AppServices, Clock, TutorService};
use storage::repository::Storage;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Command, Config, prepare_sqlite_dir, print_usage};

/// Connect to the configured store, or fall back to the unavailable store so
/// the diagnostics route still answers.
async fn connect_storage(config: &Config) -> Storage {
    let url = match config.store_url() {
        Ok(Some(url)) => url,
        Ok(None) => {
            warn!("QUEST_DB_URL is not set; running without a database");
            return Storage::unavailable();
        }
        Err(err) => {
            error!(error = %err, "cannot resolve database url");
            return Storage::unavailable();
        }
    };

    if let Err(err) = prepare_sqlite_dir(&url) {
        error!(error = %err, "cannot create database directory");
        return Storage::unavailable();
    }

    match Storage::sqlite(&url).await {
        Ok(storage) => {
            info!("connected to database");
            storage
        }
        Err(err) => {
            error!(error = %err, "failed to connect to database");
            Storage::unavailable()
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

async fn serve(config: &Config, storage: Storage) -> Result<(), Box<dyn std::error::Error>> {
    let tutor = TutorService::from_config(config.tutor.clone())?;
    let services = AppServices::new(storage.clone(), tutor, Clock::default_clock());
    if !services.tutor().enabled() {
        warn!("GROQ_API_KEY is not set; AI tutor requests will fail");
    }

    let state = api::AppState::new(services, config.env_status());
    let router = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    storage.close().await;
    info!("database connection closed");
    served?;
    Ok(())
}

async fn seed(storage: Storage) -> Result<(), Box<dyn std::error::Error>> {
    let services = AppServices::new(storage.clone(), TutorService::disabled(), Clock::default_clock());
    let result = services.lessons().reseed().await;
    storage.close().await;
    let count = result?;
    println!("Installed {count} sample lessons.");
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if args.command == Command::Help {
        print_usage();
        return Ok(());
    }

    let config = Config::from_env(&args)?;
    let storage = connect_storage(&config).await;

    match args.command {
        Command::Serve => serve(&config, storage).await,
        Command::Seed => seed(storage).await,
        Command::Help => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let dotenv_loaded = dotenv().is_ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    if dotenv_loaded {
        info!("loaded .env");
    }

    if let Err(err) = run().await {
        error!(error = %err, "exiting");
        std::process::exit(2);
    }
}
