use anyhow::Result;
use colored::Colorize;
use indexctl_core::{Outcome, Output, ReconcileError};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Failure document printed in JSON mode.
#[derive(Serialize)]
struct Failure<'a> {
    failed: bool,
    msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Output>,
}

pub fn render_outcome(outcome: &Outcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text => {
            let status = if outcome.changed {
                "changed".yellow()
            } else {
                "ok".green()
            };
            let message = outcome.output.message.as_deref().unwrap_or("");
            Ok(format!("{status}: {message} (HTTP {})", outcome.output.rc))
        }
    }
}

pub fn render_failure(err: &ReconcileError, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let failure = Failure {
                failed: true,
                msg: err.to_string(),
                output: err.output(),
            };
            Ok(serde_json::to_string_pretty(&failure)?)
        }
        OutputFormat::Text => {
            let mut lines = vec![format!("{} {}", "✗".red(), err)];
            if let Some(output) = err.output() {
                if let Some(request) = &output.request {
                    lines.push(format!("  {}: {}", "Request".cyan(), request));
                }
                if let Some(response) = &output.response {
                    lines.push(format!("  {}: {}", "Response".cyan(), response));
                }
            }
            Ok(lines.join("\n"))
        }
    }
}

pub fn print_outcome(outcome: &Outcome, format: OutputFormat) -> Result<()> {
    println!("{}", render_outcome(outcome, format)?);
    Ok(())
}

/// JSON failures go to stdout so callers can parse them; text goes to stderr.
pub fn print_failure(err: &ReconcileError, format: OutputFormat) -> Result<()> {
    let rendered = render_failure(err, format)?;
    match format {
        OutputFormat::Json => println!("{rendered}"),
        OutputFormat::Text => eprintln!("{rendered}"),
    }
    Ok(())
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_json_outcome() {
        let outcome = Outcome::changed(Output::new(200).with_message("Index 'logs' has been created."));
        let rendered = render_outcome(&outcome, OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(
            value,
            json!({
                "changed": true,
                "output": { "rc": 200, "message": "Index 'logs' has been created." }
            })
        );
    }

    #[test]
    fn test_json_failure_carries_output() {
        let err = ReconcileError::write_failed(400, "http://es:9200/tweets/_doc/", "bad doc");
        let rendered = render_failure(&err, OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["failed"], json!(true));
        assert_eq!(value["output"]["rc"], json!(400));
        assert_eq!(value["output"]["request"], json!("http://es:9200/tweets/_doc/"));
        assert_eq!(value["output"]["response"], json!("bad doc"));
    }

    #[test]
    fn test_json_failure_without_status_omits_output() {
        let err = ReconcileError::invalid_payload("document must be a mapping");
        let rendered = render_failure(&err, OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert!(value.get("output").is_none());
        assert!(value["msg"].as_str().unwrap().contains("document must be a mapping"));
    }

    #[test]
    fn test_text_outcome_mentions_message_and_status() {
        let outcome = Outcome::unchanged(Output::new(200).with_message("Index 'logs' already exists."));
        let rendered = render_outcome(&outcome, OutputFormat::Text).unwrap();
        assert!(rendered.contains("Index 'logs' already exists."));
        assert!(rendered.contains("(HTTP 200)"));
    }

    #[test]
    fn test_text_failure_lists_request() {
        let err = ReconcileError::service_unavailable(500, "http://es:9200/logs");
        let rendered = render_failure(&err, OutputFormat::Text).unwrap();
        assert!(rendered.contains("HTTP 500"));
        assert!(rendered.contains("http://es:9200/logs"));
    }
}
