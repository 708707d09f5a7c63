use std::process;

use serde::Serialize;

use crate::validate::SubmissionRejection;

/// Exit status for runtime failures.
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for command-line misuse.
pub const EXIT_USAGE: i32 = 2;

/// Prints `message` to stderr and exits with [`EXIT_FAILURE`].
pub fn exit_with_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(EXIT_FAILURE);
}

/// Prints `message` and the usage text to stderr and exits with [`EXIT_USAGE`].
pub fn exit_with_usage_error(message: &str, usage: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!();
    eprintln!("{}", usage);
    process::exit(EXIT_USAGE);
}

/// Renders a rejection as one summary line followed by one indented line per field.
pub fn describe_rejection(rejection: &SubmissionRejection) -> String {
    let mut message = format!("{} field(s) failed validation", rejection.errors().len());
    for error in rejection.errors() {
        message.push_str(&format!("\n  {}", error));
    }
    message
}

/// Pretty-prints `value` as JSON on stdout, exiting if it cannot be serialized.
pub fn print_json_or_exit<T: Serialize>(value: &T, context: &str) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => exit_with_error(&format!("Failed to format {}: {}", context, e)),
    }
}
