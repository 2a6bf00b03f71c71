//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::nav::TieBreak;
use crate::page::DeliveryOrder;

// ============================================================================
// Root CLI
// ============================================================================

/// Sticky anchor navigation: build and simulate in-page tables of contents.
#[derive(Parser, Debug)]
#[command(name = "anchornav", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "ANCHORNAV_COLOR")]
    pub color: ColorChoice,

    /// Log line format.
    #[arg(long, default_value = "human", global = true, env = "ANCHORNAV_LOG_FORMAT")]
    pub log_format: LogFormatArg,

    /// Navigation settings file.
    #[arg(long, global = true, env = "ANCHORNAV_CONFIG")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the navigation list for a rendered HTML document.
    Outline(OutlineArgs),

    /// Run a scenario against a simulated page.
    Simulate(SimulateArgs),

    /// List built-in scenarios.
    Scenarios(ScenariosArgs),

    /// Work with navigation settings files.
    Config(ConfigCommand),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Outline / Simulate / Scenarios
// ============================================================================

/// Arguments for `outline`.
#[derive(Args, Debug)]
pub struct OutlineArgs {
    /// Rendered HTML document.
    pub document: PathBuf,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutlineFormat,
}

/// Arguments for `simulate`.
#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("source").required(true).multiple(false))]
pub struct SimulateArgs {
    /// Scenario file.
    #[arg(group = "source")]
    pub scenario: Option<PathBuf>,

    /// Name of a built-in scenario.
    #[arg(short, long, group = "source")]
    pub builtin: Option<String>,

    /// Write structured events (JSONL) to this file; `-` for stdout.
    #[arg(long, env = "ANCHORNAV_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Write Prometheus metrics text to this file after the run.
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,

    /// Override the tie-break policy.
    #[arg(long)]
    pub tie_break: Option<TieBreak>,

    /// Override the intersection delivery order.
    #[arg(long)]
    pub delivery: Option<DeliveryOrder>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `scenarios`.
#[derive(Args, Debug)]
pub struct ScenariosArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Config Command
// ============================================================================

/// Settings file commands.
#[derive(Args, Debug)]
pub struct ConfigCommand {
    /// Config subcommand.
    #[command(subcommand)]
    pub subcommand: ConfigSubcommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Validate settings files.
    Validate(ConfigValidateArgs),

    /// Print the effective settings.
    Show(ConfigShowArgs),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
pub struct ConfigValidateArgs {
    /// Settings files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `config show`.
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable lines.
    #[default]
    Human,
    /// JSON lines.
    Json,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Output format for `outline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutlineFormat {
    /// Numbered list of labels and targets.
    #[default]
    Human,
    /// JSON array of entries.
    Json,
    /// `<li>` fragment ready for the navigation container.
    Html,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outline_defaults_to_human() {
        let cli = Cli::try_parse_from(["anchornav", "outline", "page.html"]).unwrap();
        match cli.command {
            Commands::Outline(args) => {
                assert_eq!(args.format, OutlineFormat::Human);
                assert_eq!(args.document, PathBuf::from("page.html"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn outline_html_format() {
        let cli = Cli::try_parse_from(["anchornav", "outline", "p.html", "--format", "html"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Outline(OutlineArgs {
                format: OutlineFormat::Html,
                ..
            })
        ));
    }

    #[test]
    fn simulate_requires_a_source() {
        assert!(Cli::try_parse_from(["anchornav", "simulate"]).is_err());
    }

    #[test]
    fn simulate_sources_are_exclusive() {
        let cli = Cli::try_parse_from([
            "anchornav",
            "simulate",
            "s.yaml",
            "--builtin",
            "back-to-top",
        ]);
        assert!(cli.is_err());
    }

    #[test]
    fn simulate_overrides() {
        let cli = Cli::try_parse_from([
            "anchornav",
            "simulate",
            "--builtin",
            "rebuild",
            "--tie-break",
            "last-delivered",
            "--delivery",
            "reverse",
        ])
        .unwrap();
        let Commands::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.tie_break, Some(TieBreak::LastDelivered));
        assert_eq!(args.delivery, Some(DeliveryOrder::Reverse));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "anchornav",
            "scenarios",
            "-vv",
            "--color",
            "never",
            "--config",
            "nav.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.config, Some(PathBuf::from("nav.yaml")));
    }

    #[test]
    fn config_validate_requires_files() {
        assert!(Cli::try_parse_from(["anchornav", "config", "validate"]).is_err());
        assert!(Cli::try_parse_from(["anchornav", "config", "validate", "a.yaml", "--strict"]).is_ok());
    }

    #[test]
    fn completions_shells() {
        for shell in ["bash", "zsh", "fish", "powershell", "elvish"] {
            assert!(Cli::try_parse_from(["anchornav", "completions", shell]).is_ok(), "{shell}");
        }
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
