//! # Monitoring Command Handlers
//!
//! `health`, `ready` and `stats` query the corresponding server endpoints.

use crate::commands::validate_args_count_or_exit;
use crate::monitor::{HealthResponse, ReadyResponse, StatsResponse};
use crate::{cli_utils, http_utils};

/// Handles `surveyctl health`.
pub async fn handle_health_command(args: &[String], client: &http_utils::SurveyClient) {
    validate_args_count_or_exit(args, 1, 1, "Usage: surveyctl health");
    let health = http_utils::execute_or_exit(
        || client.get::<HealthResponse>("/health"),
        "Health check failed",
    )
    .await;
    cli_utils::print_json_or_exit(&health, "health");
}

/// Handles `surveyctl ready`.
pub async fn handle_ready_command(args: &[String], client: &http_utils::SurveyClient) {
    validate_args_count_or_exit(args, 1, 1, "Usage: surveyctl ready");
    let ready = http_utils::execute_or_exit(
        || client.get::<ReadyResponse>("/ready"),
        "Readiness check failed",
    )
    .await;
    cli_utils::print_json_or_exit(&ready, "readiness");
}

/// Handles `surveyctl stats`.
pub async fn handle_stats_command(args: &[String], client: &http_utils::SurveyClient) {
    validate_args_count_or_exit(args, 1, 1, "Usage: surveyctl stats");
    let stats = http_utils::execute_or_exit(
        || client.get::<StatsResponse>("/api/stats"),
        "Failed to fetch stats",
    )
    .await;
    cli_utils::print_json_or_exit(&stats, "stats");
}
