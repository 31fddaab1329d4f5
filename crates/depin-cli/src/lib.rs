//! Command-line interface and terminal dashboard for DePIN network monitoring.
//!
//! The `depin` binary watches a sensor network, its verification ledger and
//! its anomaly detector, either through the monitoring backend's REST API or
//! against a local simulator.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | *(none)* / `tui` | Interactive terminal dashboard |
//! | `dashboard` | Network stats, recent readings and activity chart |
//! | `blocks` | Chain stats and recent blocks |
//! | `analysis` | Detector stats and recent detections |
//! | `history` | Search, filter, page and export the verification log |
//! | `settings` | Show, change, export, import or reset user settings |
//! | `theme` | Show or change the color theme |
//! | `auth` | Sign in, sign out, show login state |
//! | `config` | Manage the configuration file |
//! | `completions` | Generate shell completions |
//!
//! # Output Formats
//!
//! - **Text** (default): Human-readable colored output
//! - **JSON**: Machine-readable JSON (`--format json` or `--json`)
//!
//! # Configuration
//!
//! The CLI reads `~/.config/depin/config.toml` (or platform equivalent):
//!
//! ```toml
//! source = "live"
//! export_directory = "/home/me/exports"
//!
//! [api]
//! url = "http://localhost:8000"
//! key = "secret"
//!
//! [intervals]
//! dashboard = 1000
//! ```
//!
//! Settings, theme and login state live in `store.json` in the platform data
//! directory, next to the TUI log file.
//!
//! # Environment Variables
//!
//! - `DEPIN_API_URL`: Backend base URL (overridden by `--api-url`)
//! - `DEPIN_API_KEY`: Backend API key (overridden by `--api-key`)
//! - `NO_COLOR`: Disable colored output when set
//! - `RUST_LOG`: Log filter when neither `--verbose` nor `--quiet` is given
//!
//! # Examples
//!
//! ```bash
//! depin --source simulated dashboard --cycles 5
//! depin history --status failed --search sensor-01 --export
//! depin settings set refresh-interval 60
//! depin theme toggle
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
#[cfg(feature = "tui")]
pub mod tui;
pub mod util;

// Re-export core dependencies for convenience
pub use depin_core;
pub use depin_types;
