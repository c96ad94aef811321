mod cli;
mod commands;
mod config;
mod error;
mod output;
mod source;

use crate::{
    cli::{Args, Commands},
    commands::{CommandExecutor, LintOptions},
    config::AppConfig,
    error::{AppError, Result},
};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use std::process;
use tracing::{debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = ?e, "Application failed");
        #[cfg(feature = "colored-output")]
        {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        #[cfg(not(feature = "colored-output"))]
        {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet)?;

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }
    if args.no_color {
        config.colored_output = false;
    }
    #[cfg(feature = "colored-output")]
    if !config.colored_output {
        colored::control::set_override(false);
    }
    debug!(?config, "configuration loaded");

    match args.command {
        Commands::Lint {
            inputs,
            details,
            format,
            no_rules,
            tokens_only,
            strict,
        } => {
            let options = LintOptions {
                details: details.map(Into::into).unwrap_or(config.details),
                format: format.unwrap_or(config.output_format),
                rules: !no_rules,
                tokens_only,
                strict: strict || config.strict,
            };
            let executor = CommandExecutor::new(config)?;
            executor.lint(&inputs, options).await?;
        }

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Args::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }

        Commands::Config { show, reset } => {
            if reset {
                let path = AppConfig::reset(args.config.as_deref())?;
                println!("Configuration reset to defaults: {}", path.display());
            } else if show {
                if let Some(path) = args
                    .config
                    .clone()
                    .or_else(AppConfig::default_config_path)
                {
                    println!("# {}", path.display());
                }
                print!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries the lint output only.
fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .with(filter)
        .try_init()
        .map_err(|e| AppError::Initialization(e.to_string()))
}
