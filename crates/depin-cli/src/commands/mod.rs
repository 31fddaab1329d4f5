//! Command implementations for the CLI.

mod config;
mod doctor;
mod history;
mod settings;
mod snapshot;

pub use config::cmd_config;
pub use doctor::{Check, cmd_doctor, run_checks};
pub use history::{HistoryArgs, cmd_history};
pub use settings::{
    apply_setting, check_password, cmd_auth, cmd_settings, cmd_theme, save_form,
};
pub use snapshot::{SnapshotArgs, cmd_analysis, cmd_blocks, cmd_dashboard, resolve_model, run_cycles};
