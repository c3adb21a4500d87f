use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;
use identity_gate::{
    AuthSettings, DatabaseConfig, RegisterRequest, create_account_service, create_app_state,
    create_connection, create_router, ensure_schema, load_dotenv,
};

#[derive(Parser)]
#[command(name = "identity-gate")]
#[command(about = "JWT authentication and authorization service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Server {
        #[arg(short, long, env = "PORT", default_value = "8080")]
        port: u16,
        #[arg(long, env = "DATABASE_URL", default_value = "memory")]
        db_url: String,
        /// HMAC secret used to sign and verify tokens
        #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
        secret_key: String,
        /// Upper bound on each database operation
        #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 100)]
        request_timeout_secs: u64,
    },
    /// Initialize the database
    Init {
        #[arg(long, env = "DATABASE_URL", default_value = "memory")]
        db_url: String,
    },
    /// Create an ADMIN identity
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        phone_number: String,
        #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, env = "DATABASE_URL", default_value = "memory")]
        db_url: String,
        #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
        secret_key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before clap and the filter, so `env = ...` fallbacks and RUST_LOG see the file.
    let dotenv = load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("identity_gate=info".parse()?)
                .add_directive("surrealdb=warn".parse()?),
        )
        .with_max_level(Level::INFO)
        .init();

    match dotenv {
        Ok(Some(path)) => debug!("Loaded environment from {}", path.display()),
        Ok(None) => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Server {
            port,
            db_url,
            secret_key,
            request_timeout_secs,
        } => {
            let settings = AuthSettings::new(secret_key)
                .with_store_timeout(Duration::from_secs(request_timeout_secs));
            settings.validate()?;

            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for REST server: {}", db_config.url);

            let db = create_connection(db_config).await?;
            ensure_schema(&db).await?;

            let app = create_router(create_app_state(&settings, db));

            let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
            info!("Server listening on http://0.0.0.0:{}", port);

            axum::serve(listener, app).await?;
        }
        Commands::Init { db_url } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            info!("Initializing database...");
            let db = create_connection(db_config).await?;
            ensure_schema(&db).await?;
            info!("Database initialized successfully");
        }
        Commands::CreateAdmin {
            email,
            first_name,
            last_name,
            phone_number,
            password,
            db_url,
            secret_key,
        } => {
            let settings = AuthSettings::new(secret_key);
            settings.validate()?;

            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            let db = create_connection(db_config).await?;
            ensure_schema(&db).await?;

            let accounts = create_account_service(&settings, db);
            let tokens = accounts
                .create_admin(RegisterRequest {
                    email: email.clone(),
                    first_name,
                    last_name,
                    phone_number,
                    password: password.clone(),
                    password_confirm: password,
                })
                .await?;

            println!("Admin created successfully!");
            println!();
            println!("  Email:        {}", email);
            println!("  Access token: {}", tokens.access_token);
            println!();
            println!("Use with: -H 'Authorization: Bearer <access token>'");
        }
    }

    Ok(())
}
