//! Kiln CLI — drives the template build integration from the command line.
//!
//! `kiln load` resolves individual module identifiers the way a bundler
//! would, and `kiln build` runs repeated build passes over a set of
//! templates to exercise the incremental cache.

#![warn(missing_docs)]

mod build;
mod load;
mod logging;
mod options;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Kiln — component templates compiled for your bundler.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Kiln component template compiler")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `kiln.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Project root, overriding the configuration file.
    #[arg(long, global = true)]
    pub root: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load module identifiers and print the resulting modules.
    Load(LoadArgs),
    /// Run build passes over templates and their sub-resources.
    Build(BuildArgs),
}

/// Arguments for the `kiln load` subcommand.
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Module identifiers, e.g. `src/card.html?type=componentScript&i=0`.
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `kiln build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Template files to build.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Number of build passes to run against the same caches.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub passes: u32,

    /// Drop every cached entry before each pass.
    #[arg(long)]
    pub cold: bool,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Module output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Module source on stdout, diagnostics on stderr.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
    /// Optional project root override.
    pub root: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.quiet, cli.verbose);

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
        root: cli.root,
    };

    let result = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime.block_on(async {
            match cli.command {
                Command::Load(ref args) => load::run(args, &global).await,
                Command::Build(ref args) => build::run(args, &global).await,
            }
        }),
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_load_default() {
        let cli = Cli::parse_from(["kiln", "load", "src/card.html"]);
        match cli.command {
            Command::Load(ref args) => {
                assert_eq!(args.ids, vec!["src/card.html"]);
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected Load command"),
        }
    }

    #[test]
    fn parse_load_json_multiple() {
        let cli = Cli::parse_from([
            "kiln",
            "load",
            "a.html",
            "a.html?type=componentScript&i=0",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::Load(ref args) => {
                assert_eq!(args.ids.len(), 2);
                assert_eq!(args.format, ReportFormat::Json);
            }
            _ => panic!("expected Load command"),
        }
    }

    #[test]
    fn load_requires_an_id() {
        assert!(Cli::try_parse_from(["kiln", "load"]).is_err());
    }

    #[test]
    fn parse_build_with_passes() {
        let cli = Cli::parse_from(["kiln", "build", "a.html", "b.html", "--passes", "3"]);
        match cli.command {
            Command::Build(ref args) => {
                assert_eq!(args.files, vec!["a.html", "b.html"]);
                assert_eq!(args.passes, 3);
                assert!(!args.cold);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn build_defaults_to_one_pass() {
        let cli = Cli::parse_from(["kiln", "build", "a.html"]);
        match cli.command {
            Command::Build(ref args) => assert_eq!(args.passes, 1),
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_cold() {
        let cli = Cli::parse_from(["kiln", "build", "a.html", "--passes", "2", "--cold"]);
        match cli.command {
            Command::Build(ref args) => assert!(args.cold),
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn zero_passes_rejected() {
        assert!(Cli::try_parse_from(["kiln", "build", "a.html", "--passes", "0"]).is_err());
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "kiln",
            "--quiet",
            "--color",
            "never",
            "--config",
            "/p/kiln.toml",
            "--root",
            "/p",
            "build",
            "x.html",
        ]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.config.as_deref(), Some("/p/kiln.toml"));
        assert_eq!(cli.root.as_deref(), Some("/p"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kiln", "load", "a.html", "-v"]);
        assert!(cli.verbose);
    }
}
