//! CLI command definitions
//!
//! Defines the clap commands for the goals-check CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect or change the backend auth configuration
    #[command(subcommand)]
    AuthConfig(AuthConfigCommands),

    /// Check the auth service health endpoint
    Health,

    /// Demo login, sign-up, sign-in, goal CRUD and auto-confirm consistency
    Auth,

    /// Full new-user workflow plus the demo account workflow
    Acceptance,

    /// Demo login, new user sign-up and sign-in, deployment reachable
    Verify {
        /// Confirm the new user's email through the auto-confirm edge function
        #[arg(long)]
        confirm_via_function: bool,
    },

    /// Probe deployed HTML, JS and CSS assets over plain HTTP
    Deploy {
        /// Deployment URLs (default: deployment.url)
        urls: Vec<String>,
    },

    /// Load pages in a headless browser and check they render without errors
    Smoke {
        /// Page URLs (default: deployment.url)
        urls: Vec<String>,

        /// Name used for the report step and screenshot
        #[arg(long)]
        name: Option<String>,
    },

    /// Headless demo login and navigation walkthrough
    Walkthrough {
        /// App URL (default: deployment.url)
        url: Option<String>,
    },

    /// Run a YAML browser scenario
    Scenario {
        /// Path to the YAML scenario file
        path: PathBuf,
    },

    /// Write a commented configuration template
    InitConfig {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthConfigCommands {
    /// Print the key auth settings
    Show,

    /// Enable email auto-confirmation
    EnableAutoconfirm {
        /// Also allow sign-in with an unverified email address
        #[arg(long)]
        allow_unverified: bool,
    },
}
