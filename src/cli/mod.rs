//! CLI command handling
//!
//! Builds the suite for a command, runs it, and turns the report into an
//! exit code.

use std::path::{Path, PathBuf};

use crate::backend::ManagementClient;
use crate::checks::acceptance::AcceptanceSuite;
use crate::checks::auth::{AuthSuite, HealthCheck};
use crate::checks::auth_config::{EnableAutoconfirm, ShowAuthConfig};
use crate::checks::deployment::DeploymentSuite;
use crate::checks::smoke::SmokeSuite;
use crate::checks::verification::VerificationSuite;
use crate::checks::walkthrough::WalkthroughSuite;
use crate::checks::{run_suite, Suite};
use crate::commands::{AuthConfigCommands, Commands};
use crate::common::config::CONFIG_TEMPLATE;
use crate::common::{paths, Config, Error, Result};
use crate::testing::ScenarioSuite;

/// Options that apply to every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Explicit config file instead of the platform default
    pub config: Option<PathBuf>,
    pub verbose: bool,
    /// Print the report as JSON instead of the summary table
    pub json: bool,
}

/// Dispatch a CLI command, returning the process exit code
pub async fn dispatch(command: Commands, opts: &GlobalOptions) -> Result<i32> {
    if let Commands::InitConfig { force } = command {
        let path = init_config(opts.config.as_deref(), force)?;
        println!("Wrote configuration template to {}", path.display());
        return Ok(0);
    }

    let config = Config::load(opts.config.as_deref())?;
    tracing::debug!(?config.timeouts, "configuration loaded");

    let suite: Box<dyn Suite + '_> = match command {
        Commands::AuthConfig(AuthConfigCommands::Show) => {
            Box::new(ShowAuthConfig::new(ManagementClient::from_config(&config)?))
        }
        Commands::AuthConfig(AuthConfigCommands::EnableAutoconfirm { allow_unverified }) => {
            Box::new(EnableAutoconfirm::new(
                ManagementClient::from_config(&config)?,
                allow_unverified,
            ))
        }
        Commands::Health => Box::new(HealthCheck::new(&config)?),
        Commands::Auth => Box::new(AuthSuite::new(&config)?),
        Commands::Acceptance => Box::new(AcceptanceSuite::new(&config)?),
        Commands::Verify {
            confirm_via_function,
        } => Box::new(VerificationSuite::new(&config, confirm_via_function)?),
        Commands::Deploy { urls } => {
            Box::new(DeploymentSuite::new(&config, &urls, opts.verbose)?)
        }
        Commands::Smoke { urls, name } => Box::new(SmokeSuite::new(&config, &urls, name)?),
        Commands::Walkthrough { url } => Box::new(WalkthroughSuite::new(&config, url)?),
        Commands::Scenario { path } => {
            Box::new(ScenarioSuite::load(&config, &path, opts.verbose)?)
        }
        Commands::InitConfig { .. } => unreachable!("handled above"),
    };

    let report = run_suite(suite.as_ref(), opts.json).await?;
    Ok(report.exit_code())
}

/// Write the configuration template to `path`, or the default config file
pub fn init_config(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => {
            paths::ensure_config_dir()?;
            paths::config_path()
                .ok_or_else(|| Error::Config("No config directory on this platform".to_string()))?
        }
    };

    if target.exists() && !force {
        return Err(Error::Config(format!(
            "'{}' already exists; pass --force to overwrite",
            target.display()
        )));
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&target, CONFIG_TEMPLATE)?;
    Ok(target)
}
