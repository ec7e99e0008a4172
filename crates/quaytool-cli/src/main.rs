//! Quaytool CLI - batch administration of a Quay registry.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use quaytool_reconcile::Reconciler;
use quaytool_registry::{RegistryAuth, RegistryClient, RegistryConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{output, requires_token, Cli, GlobalArgs};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.global.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("quaytool_cli={level},quaytool_reconcile={level},quaytool_registry={level}")
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Cli { global, command } = cli;
    let request = command.into_request(global.organization.clone());

    if requires_token(&request) && global.token.is_none() {
        anyhow::bail!("Can not continue: --token is required for {}", request.name());
    }

    let reconciler = Reconciler::new(build_client(&global)?);

    match reconciler.execute(&request).await {
        Ok(execution) => output::print_execution(&execution, global.output),
        Err(err) if !err.is_fatal() => {
            tracing::warn!(command = request.name(), error = %err, "nothing done");
            eprintln!("Can not continue: {err}");
            Ok(())
        }
        Err(err) => {
            if let Some(report) = err.partial_report() {
                output::print_report(report, global.output)?;
            }
            Err(err).with_context(|| format!("{} failed", request.name()))
        }
    }
}

fn build_client(global: &GlobalArgs) -> Result<RegistryClient> {
    let api_url = global
        .api_url
        .as_deref()
        .context("--api-url (or QUAY_API_URL) is required")?;

    let config = RegistryConfig::new(api_url)
        .with_auth(RegistryAuth::from_token(global.token.clone()))
        .with_timeout(Duration::from_secs(global.timeout))
        .with_tls_verification(!global.insecure);

    RegistryClient::new(config).context("Failed to create registry client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cli(server: &MockServer, args: &[&str]) -> Cli {
        let api_url = format!("{}/api/v1", server.uri());
        let mut argv = vec!["quaytool", "--api-url", api_url.as_str(), "--token", "secret"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn test_missing_input_is_not_a_failure() {
        let server = MockServer::start().await;
        let result = run(cli(&server, &["create-robot", "--robot", "ci"])).await;

        assert!(result.is_ok());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_api_url_without_endpoint_path_is_rejected() {
        let cli = Cli::try_parse_from([
            "quaytool",
            "--api-url",
            "https://quay.example.com",
            "info",
        ])
        .unwrap();

        let err = run(cli).await.unwrap_err();
        assert!(format!("{err:#}").contains("/api/v"));
    }

    #[tokio::test]
    async fn test_visibility_requires_token() {
        let cli = Cli::try_parse_from([
            "quaytool",
            "--api-url",
            "https://quay.example.com/api/v1",
            "--organization",
            "acme",
            "set-visibility",
            "--visibility",
            "public",
        ])
        .unwrap();
        if cli.global.token.is_some() {
            // ADMIN_TOKEN is set in the environment.
            return;
        }

        let err = run(cli).await.unwrap_err();
        assert!(err.to_string().contains("--token"));
    }

    #[tokio::test]
    async fn test_halted_batch_fails_the_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/repository"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "repositories": [{"namespace": "acme", "name": "a"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/repository/acme/a/changevisibility"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let result = run(cli(
            &server,
            &["--organization", "acme", "set-visibility", "--visibility", "public"],
        ))
        .await;

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("set-visibility failed"));
    }

    #[tokio::test]
    async fn test_per_item_failures_do_not_fail_the_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/organization/acme/robots"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"robots": []})))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/organization/acme/robots/ci"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid"))
            .expect(1)
            .mount(&server)
            .await;

        let result = run(cli(
            &server,
            &["--organization", "acme", "--output", "json", "create-robot", "--robot", "ci"],
        ))
        .await;

        assert!(result.is_ok());
    }
}
