mod cli;
mod config;
mod logging;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indexctl_core::{IndexClient, Outcome, Reconciler};

use cli::{ApplyArgs, Cli, Commands, OutputFormat};
use output::print_error;

/// Exit status when the reconciliation itself failed.
const EXIT_FAILED: i32 = 1;
/// Exit status for invalid arguments or settings.
const EXIT_USAGE: i32 = 2;

#[tokio::main]
async fn main() {
    std::process::exit(exit_code(run().await));
}

/// Errors that escape a command are argument or settings problems.
fn exit_code(result: Result<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            print_error(&format!("{e:#}"));
            EXIT_USAGE
        }
    }
}

fn reconcile_exit_code(result: &indexctl_core::Result<Outcome>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => EXIT_FAILED,
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Apply(args) => apply(&cli, args, format).await,
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                let settings = config::load_settings(cli.config.as_deref(), None)?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&settings)?),
                    OutputFormat::Text => {
                        let shown = serde_json::to_value(&settings)?;
                        if let Some(entries) = shown.as_object() {
                            for (key, value) in entries {
                                println!("{}: {}", key.cyan(), value);
                            }
                        }
                    }
                }
                Ok(0)
            }
        },
    }
}

async fn apply(cli: &Cli, args: &ApplyArgs, format: OutputFormat) -> Result<i32> {
    let settings = config::load_settings(cli.config.as_deref(), Some(args))?;
    logging::init_tracing_with_level(logging::effective_level(cli.verbose, &settings.log_level));

    let task = settings.into_task()?;
    tracing::debug!(
        target_url = task.target.base_url(),
        resource = task.target.name(),
        state = task.desired.label(),
        dry_run = task.dry_run,
        "reconciling"
    );

    let reconciler = Reconciler::new(IndexClient::new(task.client)?).with_dry_run(task.dry_run);
    let result = reconciler.reconcile(&task.target, &task.desired).await;
    match &result {
        Ok(outcome) => output::print_outcome(outcome, format)?,
        Err(e) => {
            tracing::error!(category = %e.category(), status = ?e.status_code(), "reconciliation failed");
            output::print_failure(e, format)?;
        }
    }
    Ok(reconcile_exit_code(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexctl_core::{Output, ReconcileError};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Run `apply` the way `main` does, with an empty settings file so the
    /// working directory cannot leak settings in.
    async fn apply_exit_code(extra: &[&str]) -> i32 {
        let dir = tempfile::tempdir().expect("tmp dir");
        let settings = dir.path().join("indexctl.toml");
        std::fs::write(&settings, "").expect("write toml");
        let settings = settings.to_string_lossy().to_string();

        let mut argv = vec!["indexctl", "--config", settings.as_str(), "apply"];
        argv.extend_from_slice(extra);
        let cli = Cli::try_parse_from(argv).expect("arguments");
        let Commands::Apply(args) = &cli.command else {
            panic!("expected apply");
        };
        exit_code(apply(&cli, args, OutputFormat::Json).await)
    }

    async fn index_service(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/logs"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_reconcile_result_maps_to_exit_status() {
        let ok = Ok(Outcome::unchanged(Output::new(200)));
        assert_eq!(reconcile_exit_code(&ok), 0);
        let failed = Err(ReconcileError::write_failed(500, "http://h/logs", "boom"));
        assert_eq!(reconcile_exit_code(&failed), EXIT_FAILED);
    }

    #[test]
    fn test_escaped_error_is_usage_status() {
        assert_eq!(exit_code(Ok(EXIT_FAILED)), EXIT_FAILED);
        assert_eq!(exit_code(Err(anyhow::anyhow!("`url` is required"))), EXIT_USAGE);
    }

    #[tokio::test]
    async fn test_apply_exits_zero_when_converged() {
        let server = index_service(200).await;
        let uri = server.uri();
        let code = apply_exit_code(&["--url", uri.as_str(), "-t", "index", "-n", "logs"]).await;
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_apply_exits_one_when_service_fails() {
        let server = index_service(500).await;
        let uri = server.uri();
        let code = apply_exit_code(&["--url", uri.as_str(), "-t", "index", "-n", "logs"]).await;
        assert_eq!(code, EXIT_FAILED);
    }

    #[tokio::test]
    async fn test_apply_exits_two_on_bad_settings() {
        assert_eq!(apply_exit_code(&["-t", "index", "-n", "logs"]).await, EXIT_USAGE);

        let server = index_service(200).await;
        let uri = server.uri();
        let code =
            apply_exit_code(&["--url", uri.as_str(), "-t", "index", "-n", "logs#old"]).await;
        assert_eq!(code, EXIT_USAGE);
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
