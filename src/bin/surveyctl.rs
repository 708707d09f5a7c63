use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use survey_backend::{
    cli_utils,
    commands::{
        handle_health_command, handle_ready_command, handle_stats_command, handle_submit_command,
        handle_validate_command,
    },
    http_utils,
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "Base URL of the survey API server")]
    base_url: String,
}

const USAGE: &str = r#"Usage: surveyctl [options] <command> [args...]

Options:
  --base-url <url>     Base URL of the survey API server (default: http://localhost:8080)

Commands:
  health                  Check that the server is serving requests
  ready                   Check that the server can reach its database
  stats                   Show the number of stored responses
  validate <file.json>    Validate a submission locally and print its canonical form
  submit <file.json>      Validate a submission and send it to the server"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (options, free) =
        Options::from_command_line_relaxed("USAGE: surveyctl <command> [args...]");

    if free.is_empty() {
        cli_utils::exit_with_usage_error("No command specified", USAGE);
    }

    let base_url = if options.base_url.is_empty() {
        "http://localhost:8080".to_string()
    } else {
        options.base_url
    };

    let client = http_utils::SurveyClient::new(base_url);

    match free[0].as_str() {
        "health" => handle_health_command(&free, &client).await,
        "ready" => handle_ready_command(&free, &client).await,
        "stats" => handle_stats_command(&free, &client).await,
        "validate" => handle_validate_command(&free),
        "submit" => handle_submit_command(&free, &client).await,
        "help" => println!("{}", USAGE),
        _ => {
            cli_utils::exit_with_usage_error(&format!("Unknown command '{}'", free[0]), USAGE);
        }
    }

    Ok(())
}
