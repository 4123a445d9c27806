//! CLI entry point and command dispatch for topotest.

mod cmd;

use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use cmd::check::{CheckArgs, OutputFormat};

/// Environment variable holding a tracing filter, e.g. `TOPOTEST_LOG=debug`
const LOG_ENV: &str = "TOPOTEST_LOG";

#[derive(Parser)]
#[command(name = "topotest")]
#[command(version)]
#[command(about = "Attribute-aware topology testing for GeoJSON datasets", long_about = None)]
#[command(
    after_help = "GETTING STARTED:\n    topotest config init                    Write a starter topotest.json\n    topotest check roads.geojson -t roads   Test a file as dataset type 'roads'\n\n    Issue files are written next to each input in TopologyTest_Output/."
)]
struct Cli {
    /// Suppress progress bars and decorative output
    #[arg(long, short, global = true)]
    quiet: bool,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the enabled topology checks and write issue files
    Check(CheckArgs),
    /// Print the topology summary for a dataset without writing files
    Summary {
        /// GeoJSON file to test
        file: PathBuf,
        /// Dataset type (a key of dataset_rules)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        dataset_type: String,
        /// Config file (default: discovered)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Report invalid intersections and save them to a single file
    Intersections {
        /// GeoJSON file to test
        file: PathBuf,
        /// Dataset type (a key of dataset_rules)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        dataset_type: String,
        /// Config file (default: discovered)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Directory for the output file (default: next to the input)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
    /// Inspect and manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion script
    Completion {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show version information (-v for build details)
    Version,
}

/// Subcommands for config management
#[derive(Subcommand)]
enum ConfigCommands {
    /// Validate config structure and settings
    Validate {
        /// Config file (default: discovered)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// Write a starter config file
    Init {
        /// Where to write the config
        #[arg(default_value = topotest::paths::CONFIG_FILE)]
        path: PathBuf,
        /// Write the global config instead
        #[arg(long, conflicts_with = "path")]
        global: bool,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show effective settings
    Show {
        /// Dataset type to resolve (default: global settings)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        dataset_type: Option<String>,
        /// Config file (default: discovered)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Run on a thread with an 8 MB stack; boolean ops on large polygons
    // recurse deeply and Windows defaults to 1 MB.
    const STACK_SIZE: usize = 8 * 1024 * 1024;

    let thread = std::thread::Builder::new()
        .stack_size(STACK_SIZE)
        .spawn(run)?;

    match thread.join() {
        Ok(result) => result,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.quiet {
        std::env::set_var(topotest::ui::QUIET_ENV, "1");
    }
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check(args) => cmd::check::cmd_check(&args),
        Commands::Summary {
            file,
            dataset_type,
            config,
            format,
        } => cmd::summary::cmd_summary(&file, &dataset_type, config.as_deref(), format),
        Commands::Intersections {
            file,
            dataset_type,
            config,
            output_dir,
        } => cmd::intersections::cmd_intersections(
            &file,
            &dataset_type,
            config.as_deref(),
            output_dir.as_deref(),
        ),
        Commands::Config { command } => match command {
            ConfigCommands::Validate { config } => cmd::config::cmd_config_validate(config.as_deref()),
            ConfigCommands::Init {
                path,
                global,
                force,
            } => cmd::config::cmd_config_init(&path, global, force),
            ConfigCommands::Show {
                dataset_type,
                config,
            } => cmd::config::cmd_config_show(dataset_type.as_deref(), config.as_deref()),
        },
        Commands::Completion { shell } => cmd_completion(shell),
        Commands::Version => cmd_version(cli.verbose > 0),
    }
}

/// Log to stderr. `-v` flags take precedence over `TOPOTEST_LOG`; the default
/// level is `warn`.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn cmd_completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "topotest", &mut io::stdout());
    Ok(())
}

fn cmd_version(verbose: bool) -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    println!("topotest {}", VERSION);

    if verbose {
        const GIT_SHA: &str = env!("GIT_SHA");
        const BUILD_DATE: &str = env!("BUILD_DATE");
        println!("commit: {}", GIT_SHA);
        println!("built: {}", BUILD_DATE);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_parses_repeated_inputs() {
        let cli = Cli::try_parse_from([
            "topotest",
            "check",
            "--input",
            "roads=roads.geojson",
            "--input",
            "buildings=buildings.geojson",
            "--skip",
            "gaps,dangles",
        ])
        .unwrap();

        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.inputs.len(), 2);
                assert_eq!(args.skip, vec!["gaps".to_string(), "dangles".to_string()]);
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_global_verbose_counts() {
        let cli = Cli::try_parse_from(["topotest", "-vv", "version"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }
}
