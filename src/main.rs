//! Magpie CLI entrypoint for mining a GitHub repository.

use std::io::{self, Write};
use std::process::ExitCode;

use camino::Utf8Path;
use magpie::export::{ProjectSummary, write_project_file};
use magpie::telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink};
use magpie::{
    MagpieConfig, MiningError, OctocrabQueryGateway, PersonalAccessToken, Project, ProjectMiner,
    RepositoryLocator,
};
use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<(), MiningError> {
    let config = load_config()?;
    config.validate()?;

    let locator = config.require_repository()?;
    let token = PersonalAccessToken::new(config.resolve_token()?)?;
    let request = config.mining_request(&locator)?;

    let telemetry: &dyn TelemetrySink = if config.telemetry {
        &StderrJsonlTelemetrySink
    } else {
        &NoopTelemetrySink
    };

    let gateway = OctocrabQueryGateway::for_token(&token, &locator)?;
    let project = ProjectMiner::new(&gateway)
        .with_telemetry(telemetry)
        .with_max_rounds(config.max_rounds)
        .mine(&request)
        .await?;

    if let Some(output) = config.output.as_deref() {
        write_project_file(Utf8Path::new(output), &project)?;
    }

    write_summary(&locator, &project)
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`MiningError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<MagpieConfig, MiningError> {
    MagpieConfig::load().map_err(|error| MiningError::Configuration {
        message: error.to_string(),
    })
}

fn write_summary(locator: &RepositoryLocator, project: &Project) -> Result<(), MiningError> {
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "{}/{}: {}",
        locator.owner().as_str(),
        locator.repository().as_str(),
        ProjectSummary::of(project)
    )
    .map_err(|error| MiningError::Io {
        message: error.to_string(),
    })
}
