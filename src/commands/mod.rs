//! # Command Handlers
//!
//! Command handlers for the surveyctl CLI application.
//!
//! ## Structure
//!
//! - `monitor` - Liveness, readiness and statistics probes
//! - `submit` - Local validation and submission of questionnaire files

pub mod monitor;
pub mod submit;

pub use monitor::{handle_health_command, handle_ready_command, handle_stats_command};
pub use submit::{handle_submit_command, handle_validate_command};

use crate::cli_utils;

/// Exits with a usage error unless `args` holds between `min` and `max` entries
/// (the subcommand itself included).
pub fn validate_args_count_or_exit(args: &[String], min: usize, max: usize, usage: &str) {
    if args.len() < min {
        cli_utils::exit_with_usage_error("Not enough arguments", usage);
    }
    if args.len() > max {
        cli_utils::exit_with_usage_error(
            &format!("Unexpected arguments: {:?}", &args[max..]),
            usage,
        );
    }
}
