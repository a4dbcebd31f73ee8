//! llvmpkg - Fetch, build and package LLVM releases
//!
//! This is the CLI application that drives the fetch, build and package
//! stages of the builder crate and renders their events.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, GlobalArgs, StageArgs};
use crate::display::{CommandResult, InfoReport, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use llvmpkg_builder::{Pipeline, UrlTemplate};
use llvmpkg_config::{Config, SourceVariant};
use llvmpkg_events::EventReceiver;
use llvmpkg_types::{ColorChoice, Compiler, CompilerKind, OutputFormat, Settings};
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!(code = ?e.code(), "Application error: {}", e);
        if json_mode {
            let failure = serde_json::json!({
                "error": e.to_string(),
                "code": e.code(),
            });
            println!("{failure}");
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting llvmpkg v{}", env!("CARGO_PKG_VERSION"));

    // 1. File config (or defaults), 2. environment, 3. CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, cli.command.stage_args());
    config.validate()?;

    let settings = resolve_settings(cli.command.stage_args());
    let json_output = cli.global.json || config.general.default_output == OutputFormat::Json;
    let color = cli.global.color.unwrap_or(config.general.color);

    let (event_sender, event_receiver) = llvmpkg_events::channel();
    let pipeline = Pipeline::new(config, settings, event_sender)?;

    let renderer = OutputRenderer::new(json_output, color);
    let colors_enabled = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.debug, json_output);

    let result =
        execute_command_with_events(cli.command, pipeline, event_receiver, &mut event_handler)
            .await?;

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    pipeline: Pipeline,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<CommandResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, &pipeline));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    pipeline: &Pipeline,
) -> Result<CommandResult, CliError> {
    match command {
        Commands::Fetch(_) => Ok(CommandResult::Fetch(pipeline.fetch().await?)),
        Commands::Build(_) => Ok(CommandResult::Build(pipeline.build().await?)),
        Commands::Package(_) => Ok(CommandResult::Package(pipeline.package().await?)),
        Commands::Run(_) => Ok(CommandResult::Run(pipeline.run().await?)),
        Commands::Info(_) => {
            let config = pipeline.config();
            let template = UrlTemplate::from_config(&config.source)?;
            Ok(CommandResult::Info(Box::new(InfoReport {
                metadata: pipeline.recipe().metadata(),
                settings: pipeline.settings().clone(),
                components: pipeline
                    .recipe()
                    .components()
                    .iter()
                    .map(llvmpkg_builder::ComponentSpec::label)
                    .collect(),
                url_template: template.pattern().to_string(),
                staging_root: config.staging_root(),
                config: config.clone(),
            })))
        }
    }
}

/// Settings for the host, with the axes given on the command line replaced
fn resolve_settings(args: &StageArgs) -> Settings {
    let mut settings = Settings::host();
    if let Some(os) = args.os {
        settings.os = os;
        settings.compiler.kind = CompilerKind::default_for(os);
    }
    if let Some(arch) = args.arch {
        settings.arch = arch;
    }
    if let Some(build_type) = args.build_type {
        settings.build_type = build_type;
    }
    if let Some(kind) = args.compiler {
        settings.compiler = Compiler {
            kind,
            version: None,
        };
    }
    if let Some(version) = &args.compiler_version {
        settings.compiler.version = Some(version.clone());
    }
    settings
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &GlobalArgs, args: &StageArgs) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if let Some(root) = &args.root {
        config.paths.root = Some(root.clone());
    }
    if args.static_libs {
        config.build.shared = false;
    }
    if args.minimal {
        config.source.variant = SourceVariant::Minimal;
    }
    if let Some(jobs) = args.jobs {
        config.build.jobs = jobs;
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let default_filter = if debug_enabled {
        "info,llvmpkg=debug,llvmpkg_builder=debug"
    } else {
        "warn"
    };
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter))
    };

    if json_mode {
        // stdout carries the JSON result; logs go to stderr as JSON lines
        if debug_enabled {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(filter())
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_writer(std::io::sink)
                .with_env_filter("off")
                .init();
        }
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter())
            .init();
    }
}
