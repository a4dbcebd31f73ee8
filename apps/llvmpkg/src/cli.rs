//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use llvmpkg_errors::ConfigError;
use llvmpkg_types::{Arch, BuildType, ColorChoice, CompilerKind, Os};
use std::path::PathBuf;

/// llvmpkg - Fetch, build and package LLVM releases
#[derive(Parser)]
#[command(name = "llvmpkg")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch, build and package LLVM releases")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Show debug events and enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Download and unpack the LLVM sources into the staging root
    Fetch(StageArgs),

    /// Configure, compile and install an already fetched source tree
    Build(StageArgs),

    /// Copy the install tree into the package layout
    #[command(alias = "pack")]
    Package(StageArgs),

    /// Fetch, build and package in one go
    Run(StageArgs),

    /// Show package metadata and the effective configuration
    Info(StageArgs),
}

impl Commands {
    pub fn stage_args(&self) -> &StageArgs {
        match self {
            Commands::Fetch(args)
            | Commands::Build(args)
            | Commands::Package(args)
            | Commands::Run(args)
            | Commands::Info(args) => args,
        }
    }
}

/// Build configuration shared by the stage commands
#[derive(Args, Debug, Default)]
pub struct StageArgs {
    /// Staging root holding the source, build, install and package trees
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Target operating system
    #[arg(long, value_enum)]
    pub os: Option<Os>,

    /// Target architecture
    #[arg(long, value_enum)]
    pub arch: Option<Arch>,

    /// CMake build type
    #[arg(long, value_enum)]
    pub build_type: Option<BuildType>,

    /// Compiler family (gcc, clang, apple-clang, msvc)
    #[arg(long, value_parser = parse_compiler)]
    pub compiler: Option<CompilerKind>,

    /// Compiler version
    #[arg(long, value_name = "VERSION")]
    pub compiler_version: Option<String>,

    /// Build static libraries instead of shared ones
    #[arg(long = "static")]
    pub static_libs: bool,

    /// Fetch and build LLVM only, without clang and the runtimes
    #[arg(long)]
    pub minimal: bool,

    /// Parallel job hint for the compile step
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

fn parse_compiler(value: &str) -> Result<CompilerKind, String> {
    value.parse().map_err(|e: ConfigError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn stage_flags_parse() {
        let cli = Cli::try_parse_from([
            "llvmpkg",
            "--json",
            "run",
            "--root",
            "/tmp/stage",
            "--arch",
            "x86",
            "--compiler",
            "clang",
            "--compiler-version",
            "3.9",
            "--static",
            "--minimal",
            "-j",
            "8",
        ])
        .unwrap();

        assert!(cli.global.json);
        let Commands::Run(args) = &cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.root, Some(PathBuf::from("/tmp/stage")));
        assert_eq!(args.arch, Some(Arch::X86));
        assert_eq!(args.compiler, Some(CompilerKind::Clang));
        assert_eq!(args.compiler_version.as_deref(), Some("3.9"));
        assert!(args.static_libs);
        assert!(args.minimal);
        assert_eq!(args.jobs, Some(8));
    }

    #[test]
    fn unknown_compiler_is_rejected() {
        assert!(Cli::try_parse_from(["llvmpkg", "build", "--compiler", "tcc"]).is_err());
    }
}
