//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use depin_core::SourceKind;
use depin_core::chart::ChartPeriod;
use depin_core::history::StatusFilter;

use crate::config::SourceOverrides;

#[derive(Parser, Debug)]
#[command(name = "depin")]
#[command(author, version, about = "Monitor a DePIN sensor network, its ledger and anomaly detector")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Compact JSON output (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where view data comes from
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Data source: live backend or local simulator (overrides config)
    #[arg(long, global = true)]
    pub source: Option<SourceKind>,

    /// Backend base URL
    #[arg(long, global = true, env = "DEPIN_API_URL")]
    pub api_url: Option<String>,

    /// Backend API key, sent as X-API-Key
    #[arg(long, global = true, env = "DEPIN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Seed for the simulator, for reproducible output
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

impl SourceArgs {
    pub fn overrides(&self) -> SourceOverrides {
        SourceOverrides {
            source: self.source,
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            seed: self.seed,
        }
    }
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl OutputArgs {
    /// The global `--json` flag wins over `--format`.
    pub fn resolve(&self, json: bool) -> OutputFormat {
        if json { OutputFormat::Json } else { self.format }
    }
}

/// Reusable sync arguments for snapshot commands
#[derive(Debug, Clone, Args)]
pub struct CycleArgs {
    /// Number of sync cycles to run before printing
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub cycles: u32,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show network stats, recent sensor readings and the activity chart
    Dashboard {
        #[command(flatten)]
        cycles: CycleArgs,

        /// Chart period (24h, 7d, 30d)
        #[arg(long, default_value = "24h")]
        period: ChartPeriod,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show chain stats and the most recent blocks
    Blocks {
        #[command(flatten)]
        cycles: CycleArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show anomaly detector stats and recent detections
    Analysis {
        #[command(flatten)]
        cycles: CycleArgs,

        /// Only show results from this model
        #[arg(short, long)]
        model: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Browse the verification history
    History {
        #[command(flatten)]
        cycles: CycleArgs,

        /// Case-insensitive search on device or hash
        #[arg(short, long, default_value = "")]
        search: String,

        /// Status filter (all, verified, pending, failed)
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// Page to show (1-based, clamped to the available pages)
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Export the filtered entries as CSV (to the export directory unless a path is given, `-` for stdout)
        #[arg(short, long, num_args = 0..=1, value_name = "PATH")]
        export: Option<Option<PathBuf>>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// View or change user settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Show or change the color theme
    Theme {
        /// New theme; omit to show the current one
        #[arg(value_enum)]
        value: Option<ThemeArg>,
    },

    /// Sign in or out of the console
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check the configuration, settings store and backend
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Launch the interactive terminal dashboard
    #[cfg(feature = "tui")]
    Tui,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Show the saved settings
    Show {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Change one setting and save
    Set {
        /// Setting to change
        #[arg(value_enum)]
        key: SettingKey,

        /// New value
        value: String,
    },

    /// Export settings as pretty JSON
    Export {
        /// Destination file (defaults to iot-settings-YYYY-MM-DD.json in the export directory, `-` for stdout)
        path: Option<PathBuf>,
    },

    /// Import settings from a JSON file and save them
    Import {
        /// File to import
        path: PathBuf,
    },

    /// Restore the default settings
    Reset,

    /// Check a new password (read from stdin as two lines: new, confirm)
    Password,
}

/// Settings that can be changed with `settings set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SettingKey {
    FullName,
    Email,
    Phone,
    EmailNotifications,
    SmsNotifications,
    AlertNotifications,
    AutoRefresh,
    RefreshInterval,
    DataRetention,
    Theme,
    Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Dark,
    Light,
    Toggle,
}

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Mark the console as signed in
    Login,
    /// Sign out
    Logout,
    /// Show whether the console is signed in
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the current configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Parse a boolean setting value with common spellings.
pub fn parse_bool_arg(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" | "enable" | "enabled" => Ok(true),
        "false" | "no" | "off" | "0" | "disable" | "disabled" => Ok(false),
        _ => Err(format!(
            "Invalid boolean value '{}'. Use: true/false, yes/no, on/off, or 1/0",
            s
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use depin_core::HistoryStatus;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bool_arg() {
        assert_eq!(parse_bool_arg("yes"), Ok(true));
        assert_eq!(parse_bool_arg("ON"), Ok(true));
        assert_eq!(parse_bool_arg("disabled"), Ok(false));
        assert_eq!(parse_bool_arg("0"), Ok(false));
        assert!(parse_bool_arg("maybe").is_err());
    }

    #[test]
    fn test_parse_history_args() {
        let cli = Cli::try_parse_from([
            "depin",
            "history",
            "--search",
            "sensor-01",
            "--status",
            "failed",
            "--page",
            "2",
            "--export",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::History {
                search,
                status,
                page,
                export,
                ..
            }) => {
                assert_eq!(search, "sensor-01");
                assert_eq!(status, StatusFilter::Only(HistoryStatus::Failed));
                assert_eq!(page, 2);
                assert_eq!(export, Some(None));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_export_with_path() {
        let cli =
            Cli::try_parse_from(["depin", "history", "--export", "out.csv"]).unwrap();
        match cli.command {
            Some(Commands::History { export, .. }) => {
                assert_eq!(export, Some(Some(PathBuf::from("out.csv"))));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_source_flags() {
        let cli = Cli::try_parse_from([
            "depin",
            "blocks",
            "--source",
            "simulated",
            "--seed",
            "42",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.source.source, Some(SourceKind::Simulated));
        assert_eq!(cli.source.seed, Some(42));
        assert!(cli.json);
    }

    #[test]
    fn test_zero_cycles_rejected() {
        assert!(Cli::try_parse_from(["depin", "dashboard", "--cycles", "0"]).is_err());
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["depin"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_json_flag_overrides_format() {
        let args = OutputArgs::default();
        assert_eq!(args.resolve(true), OutputFormat::Json);
        assert_eq!(args.resolve(false), OutputFormat::Text);
    }
}
