//! Reverts the most recent schema migration of the survey store.
//!
//! Reverting the schema migration drops all three survey tables and every stored
//! response with them, so the tool refuses to run without `--yes`.

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use survey_backend::cli_utils;
use survey_backend::config::{database_url_from_env, redact_database_url};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "PostgreSQL database URL (falls back to DATABASE_URL)")]
    database_url: Option<String>,
    #[arrrg(flag, "Confirm that stored responses may be dropped")]
    yes: bool,
}

const USAGE: &str = r#"Usage: survey-migrate-down [--database-url <URL>] --yes

Revert the most recent migration. This can drop every stored response.

Arguments:
  --database-url <URL>    PostgreSQL URL [env: DATABASE_URL]
  --yes                   Required confirmation"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (options, free) = Options::from_command_line(USAGE);
    if !free.is_empty() {
        cli_utils::exit_with_usage_error(&format!("Unexpected arguments: {:?}", free), USAGE);
    }
    if !options.yes {
        cli_utils::exit_with_usage_error("refusing to revert without --yes", USAGE);
    }

    let database_url = database_url_from_env(options.database_url)
        .unwrap_or_else(|e| cli_utils::exit_with_error(&e.to_string()));
    let pool = sqlx::PgPool::connect(&database_url).await?;

    let migrator = sqlx::migrate!("./migrations");
    let latest: Option<i64> = sqlx::query_scalar(
        "SELECT version FROM _sqlx_migrations WHERE success ORDER BY version DESC LIMIT 1",
    )
    .fetch_optional(&pool)
    .await?;
    let Some(latest) = latest else {
        println!("{}: nothing to revert", redact_database_url(&database_url));
        pool.close().await;
        return Ok(());
    };

    // undo() reverts every migration newer than the target version.
    let target = migrator
        .iter()
        .map(|m| m.version)
        .filter(|v| *v < latest)
        .max()
        .unwrap_or(0);
    migrator.undo(&pool, target).await?;
    println!(
        "{}: reverted migration {}",
        redact_database_url(&database_url),
        latest
    );

    pool.close().await;
    Ok(())
}
