use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use survey_backend::cli_utils;
use survey_backend::config::{ServerConfig, ServerOverrides};
use survey_backend::create_router;

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Args {
    #[arrrg(optional, "PostgreSQL database URL (falls back to DATABASE_URL)")]
    database_url: Option<String>,
    #[arrrg(optional, "Host to bind the HTTP server")]
    host: Option<String>,
    #[arrrg(optional, "Port to bind the HTTP server")]
    port: Option<u16>,
    #[arrrg(optional, "Comma-separated list of allowed CORS origins")]
    allowed_origins: Option<String>,
    #[arrrg(optional, "Maximum number of pooled database connections")]
    max_connections: Option<u32>,
    #[arrrg(flag, "Enable verbose logging")]
    verbose: bool,
}

impl Args {
    fn into_overrides(self) -> ServerOverrides {
        ServerOverrides {
            database_url: self.database_url,
            host: self.host,
            port: self.port,
            allowed_origins: self.allowed_origins,
            max_connections: self.max_connections,
            verbose: self.verbose,
        }
    }
}

const HELP_TEXT: &str = r#"surveyd - survey collection daemon

USAGE:
    surveyd [OPTIONS]

OPTIONS:
    --database-url <URL>         PostgreSQL URL [env: DATABASE_URL]
    --host <HOST>                Host to bind [env: SURVEY_HOST] [default: 127.0.0.1]
    --port <PORT>                Port to bind [env: SURVEY_PORT] [default: 8080]
    --allowed-origins <LIST>     Comma-separated CORS origins [env: SURVEY_ALLOWED_ORIGINS]
                                 [default: https://ailights.org,http://localhost:3000]
    --max-connections <N>        Pool size [env: SURVEY_MAX_CONNECTIONS] [default: 5]
    --verbose                    Log at debug level (RUST_LOG overrides)

DESCRIPTION:
    Creates the survey tables if they are absent, then serves the survey API.
    The server supports graceful shutdown via SIGTERM or Ctrl+C.

API ENDPOINTS:
    POST   /api/submit    Validate and store one questionnaire submission
    GET    /api/stats     Number of stored responses
    GET    /health        Liveness, independent of the database
    GET    /ready         Readiness, checks the database"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = Args::from_command_line("USAGE: surveyd [OPTIONS]");

    if !free.is_empty() && free[0] == "help" {
        println!("{}", HELP_TEXT);
        return Ok(());
    }
    if !free.is_empty() {
        cli_utils::exit_with_usage_error(&format!("Unexpected arguments: {:?}", free), HELP_TEXT);
    }

    let config = ServerConfig::from_env(args.into_overrides())
        .unwrap_or_else(|e| cli_utils::exit_with_error(&e.to_string()));

    let default_level = if config.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(database = %config.redacted_database_url(), "connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    info!("applying migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app = create_router(pool.clone(), &config.allowed_origins);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    info!(
        address = %addr,
        origins = ?config.allowed_origins,
        "survey daemon listening"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("closing database pool");
    pool.close().await;

    if let Err(e) = served {
        error!(error = %e, "server error");
        return Err(e.into());
    }
    info!("survey daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
