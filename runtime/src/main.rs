// Copyright 2026 JapaAdvisor Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use japa_runtime::cli;
use japa_runtime::config::Config;
use japa_runtime::roadmap::UserProfile;
use std::net::IpAddr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "japa",
    about = "JapaAdvisor — study-visa requirements and study-abroad roadmaps",
    version,
    after_help = "Run 'japa <command> --help' for details on each command."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the REST API
    Serve {
        /// Port to listen on (overrides JAPA_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Address to bind (overrides JAPA_BIND)
        #[arg(long)]
        bind: Option<IpAddr>,
    },
    /// Print the study-visa requirements of a country as JSON
    Requirements {
        /// Country name, e.g. "Canada", "united kingdom", "America"
        country: String,
    },
    /// Generate a personalized roadmap
    Roadmap {
        #[arg(long)]
        name: String,
        #[arg(long)]
        degree: String,
        #[arg(long, default_value = "")]
        work_experience: String,
        /// Destination country
        #[arg(long)]
        country: String,
        /// Career or education goal
        #[arg(long)]
        goal: String,
    },
    /// List supported countries
    Countries {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check environment and diagnose issues
    Doctor,
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose { "japa=debug" } else { "japa=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let mut config = Config::from_env();

    let result = match cli.command {
        Commands::Serve { port, bind } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(bind) = bind {
                config.bind = bind;
            }
            cli::serve::run(config).await
        }
        Commands::Requirements { country } => cli::requirements_cmd::run(&country, config).await,
        Commands::Roadmap {
            name,
            degree,
            work_experience,
            country,
            goal,
        } => {
            let profile = UserProfile {
                full_name: name,
                degree,
                work_experience,
                target_country: country,
                goal,
            };
            cli::roadmap_cmd::run(profile, config).await
        }
        Commands::Countries { json } => cli::countries_cmd::run(&config, json),
        Commands::Doctor => cli::doctor::run(&config),
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
