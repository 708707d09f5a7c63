//! # Submission Command Handlers
//!
//! `validate <file.json>` checks a questionnaire file locally with the same rules the
//! server applies; `submit <file.json>` validates it and then posts it.

use std::fs;

use serde_json::Value;

use crate::commands::validate_args_count_or_exit;
use crate::submission::ValidatedSubmission;
use crate::survey_response::SubmitResponse;
use crate::{cli_utils, http_utils};

const VALIDATE_USAGE: &str = "Usage: surveyctl validate <file.json>";
const SUBMIT_USAGE: &str = "Usage: surveyctl submit <file.json>";

/// Reads and validates a submission file.
pub fn load_submission(path: &str) -> Result<ValidatedSubmission, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    let payload: Value =
        serde_json::from_str(&contents).map_err(|e| format!("Invalid JSON in {}: {}", path, e))?;
    ValidatedSubmission::from_value(&payload)
        .map_err(|rejection| cli_utils::describe_rejection(&rejection))
}

/// Handles `surveyctl validate <file.json>`; prints the canonical payload on success.
pub fn handle_validate_command(args: &[String]) {
    validate_args_count_or_exit(args, 2, 2, VALIDATE_USAGE);
    let submission = load_submission(&args[1]).unwrap_or_else(|e| cli_utils::exit_with_error(&e));
    cli_utils::print_json_or_exit(&submission.to_payload(), "submission");
}

/// Handles `surveyctl submit <file.json>`.
pub async fn handle_submit_command(args: &[String], client: &http_utils::SurveyClient) {
    validate_args_count_or_exit(args, 2, 2, SUBMIT_USAGE);
    let submission = load_submission(&args[1]).unwrap_or_else(|e| cli_utils::exit_with_error(&e));
    let payload = submission.to_payload();

    let response = http_utils::execute_or_exit(
        || client.post::<Value, SubmitResponse>("/api/submit", &payload),
        "Failed to submit survey response",
    )
    .await;

    println!("Recorded survey response {}", response.response_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::valid_payload;
    use std::path::PathBuf;
    use std::process;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "surveyctl_{}_{}_{}.json",
            name,
            process::id(),
            timestamp
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_valid_file() {
        let path = write_temp("valid", &valid_payload().to_string());
        let submission = load_submission(path.to_str().unwrap()).unwrap();
        assert_eq!(submission.willingness.value(), 5);
        fs::remove_file(path).ok();
    }

    #[test]
    fn load_reports_every_field() {
        let mut payload = valid_payload();
        payload["q1_eligible"] = serde_json::json!("yes");
        payload["q9_retention_time"] = serde_json::json!("");
        let path = write_temp("invalid", &payload.to_string());
        let message = load_submission(path.to_str().unwrap()).unwrap_err();
        assert!(message.starts_with("2 field(s) failed validation"));
        assert!(message.contains("q1_eligible (wrong type)"));
        assert!(message.contains("q9_retention_time (invalid value)"));
        fs::remove_file(path).ok();
    }

    #[test]
    fn load_rejects_non_json() {
        let path = write_temp("garbage", "q1_eligible=true");
        let message = load_submission(path.to_str().unwrap()).unwrap_err();
        assert!(message.starts_with("Invalid JSON"));
        fs::remove_file(path).ok();
    }

    #[test]
    fn load_missing_file() {
        let message = load_submission("/nonexistent/survey.json").unwrap_err();
        assert!(message.starts_with("Failed to read"));
    }
}
