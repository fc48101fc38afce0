use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use restaurant_server::auth::hash_password;
use restaurant_server::config::{FileConfig, ServerConfig};
use restaurant_server::pos::HttpPosClient;
use restaurant_server::server::{AppState, create_router};
use restaurant_server::store::{SqliteStore, Store};
use restaurant_server::types::{NewUser, Role};
use restaurant_server::uploads::UploadStorage;

#[derive(Parser)]
#[command(name = "restaurant-server")]
#[command(about = "Restaurant ordering and reservation backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// TOML config file; flags given here override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Host to bind to [default: 127.0.0.1]
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to [default: 8081]
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database and uploads [default: ./data]
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Base URL of the POS API [default: https://pos.chulkani.com]
        #[arg(long)]
        pos_base_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Create the database and optionally set the POS company code
    Init {
        /// Data directory for the database and uploads
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// POS company code to store in settings
        #[arg(long)]
        company_code: Option<String>,
    },

    /// Create a user account
    CreateUser {
        /// Data directory for the database and uploads
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// Give the account the admin role
        #[arg(long)]
        admin: bool,
    },
}

fn open_store(data_dir: &Path) -> anyhow::Result<SqliteStore> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let store = SqliteStore::new(ServerConfig::db_path_in(data_dir))?;
    store.initialize()?;
    Ok(store)
}

fn run_init(data_dir: PathBuf, company_code: Option<String>) -> anyhow::Result<()> {
    let store = open_store(&data_dir)?;

    if let Some(code) = company_code {
        let code = code.trim();
        if code.is_empty() {
            bail!("Company code cannot be empty");
        }
        store.set_company_code(code)?;
        println!("Company code set to {code}");
    }

    match store.get_company_code()? {
        Some(code) => println!("Initialized {} (company code {code})", data_dir.display()),
        None => println!(
            "Initialized {} (no company code yet, set one with --company-code or POST /api/settings/update)",
            data_dir.display()
        ),
    }

    store.close()?;
    Ok(())
}

fn run_create_user(
    data_dir: PathBuf,
    name: String,
    email: String,
    password: String,
    admin: bool,
) -> anyhow::Result<()> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        bail!("Name, email and password are required");
    }

    let store = open_store(&data_dir)?;
    let user = NewUser {
        name: name.trim().to_string(),
        email: email.trim().to_lowercase(),
        password_hash: hash_password(&password)?,
        role: if admin { Role::Admin } else { Role::Customer },
    };

    let id = match store.create_user(&user) {
        Ok(id) => id,
        Err(restaurant_server::error::Error::AlreadyExists) => {
            bail!("A user with email {} already exists", user.email)
        }
        Err(e) => return Err(e.into()),
    };

    println!("Created user {id} ({})", user.email);
    store.close()?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let store: Arc<dyn Store> = Arc::new(open_store(&config.data_dir)?);

    let uploads_dir = config.uploads_dir();
    fs::create_dir_all(&uploads_dir)
        .with_context(|| format!("Failed to create {}", uploads_dir.display()))?;

    let pos = HttpPosClient::new(config.pos_base_url.clone(), config.pos_timeout)?;

    if store.get_company_code()?.is_none() {
        tracing::warn!("No company code configured; POS features are unavailable until one is set");
    }

    let state = Arc::new(AppState::new(
        store.clone(),
        Arc::new(pos),
        UploadStorage::new(uploads_dir),
        config.max_upload_bytes,
    ));

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Using POS at {}", config.pos_base_url);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close()?;
    info!("Server stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("restaurant_server=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                company_code,
            } => {
                run_init(data_dir, company_code)?;
            }
            AdminCommands::CreateUser {
                data_dir,
                name,
                email,
                password,
                admin,
            } => {
                run_create_user(data_dir, name, email, password, admin)?;
            }
        },
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
            pos_base_url,
        } => {
            let file = match config {
                Some(path) => FileConfig::load(&path)?,
                None => FileConfig::default(),
            };

            let mut config = ServerConfig::from_file_config(file);
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.data_dir = data_dir;
            }
            if let Some(url) = pos_base_url {
                config.pos_base_url = url.trim_end_matches('/').to_string();
            }

            run_serve(config).await?;
        }
    }

    Ok(())
}
