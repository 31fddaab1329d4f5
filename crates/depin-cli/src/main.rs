use std::fs::{self, File};
use std::io;
use std::sync::Mutex;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use depin_cli::cli::{Cli, Commands};
use depin_cli::commands::{
    HistoryArgs, SnapshotArgs, cmd_analysis, cmd_auth, cmd_blocks, cmd_config, cmd_dashboard,
    cmd_doctor, cmd_history, cmd_settings, cmd_theme,
};
use depin_cli::config::{Config, open_store};
use depin_cli::format::FormatOptions;
use depin_core::{AppContext, Monitor};

fn log_filter(cli: &Cli) -> EnvFilter {
    if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Log to stderr, or to a file when the terminal belongs to the TUI.
fn init_tracing(cli: &Cli, tui: bool) {
    let filter = log_filter(cli);
    if !tui {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
        return;
    }

    let path = Config::log_path();
    let file = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| File::options().create(true).append(true).open(&path));
    match file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "depin", &mut io::stdout());
        return Ok(());
    }

    #[cfg(feature = "tui")]
    let tui_mode = matches!(cli.command, None | Some(Commands::Tui));
    #[cfg(not(feature = "tui"))]
    let tui_mode = false;
    init_tracing(&cli, tui_mode);

    let config = Config::load();
    let opts = FormatOptions::new(cli.no_color || config.no_color, cli.compact);
    let overrides = cli.source.overrides();
    let output = cli.output.as_ref();
    let export_dir = config.export_dir();

    let Some(command) = cli.command else {
        return run_tui(&config, &overrides).await;
    };

    match command {
        Commands::Dashboard {
            cycles,
            period,
            output: format,
        } => {
            let monitor = Monitor::new(config.build_source(&overrides)?);
            cmd_dashboard(
                &monitor,
                period,
                SnapshotArgs {
                    cycles: cycles.cycles,
                    format: format.resolve(cli.json),
                    output,
                    opts: &opts,
                },
            )
            .await?;
        }
        Commands::Blocks {
            cycles,
            output: format,
        } => {
            let monitor = Monitor::new(config.build_source(&overrides)?);
            cmd_blocks(
                &monitor,
                SnapshotArgs {
                    cycles: cycles.cycles,
                    format: format.resolve(cli.json),
                    output,
                    opts: &opts,
                },
            )
            .await?;
        }
        Commands::Analysis {
            cycles,
            model,
            output: format,
        } => {
            let monitor = Monitor::new(config.build_source(&overrides)?);
            cmd_analysis(
                &monitor,
                model.as_deref(),
                SnapshotArgs {
                    cycles: cycles.cycles,
                    format: format.resolve(cli.json),
                    output,
                    opts: &opts,
                },
            )
            .await?;
        }
        Commands::History {
            cycles,
            search,
            status,
            page,
            export,
            output: format,
        } => {
            let monitor = Monitor::new(config.build_source(&overrides)?);
            cmd_history(
                &monitor,
                HistoryArgs {
                    cycles: cycles.cycles,
                    search,
                    status,
                    page,
                    export,
                    export_dir: &export_dir,
                    format: format.resolve(cli.json),
                    output,
                    quiet: cli.quiet,
                    opts: &opts,
                },
            )
            .await?;
        }
        Commands::Settings { action } => {
            let ctx = AppContext::new(open_store());
            cmd_settings(
                &ctx,
                action,
                &export_dir,
                cli.json,
                output,
                cli.quiet,
                &opts,
            )?;
        }
        Commands::Theme { value } => {
            let ctx = AppContext::new(open_store());
            cmd_theme(&ctx, value, cli.quiet)?;
        }
        Commands::Auth { action } => {
            let ctx = AppContext::new(open_store());
            cmd_auth(&ctx, action, cli.quiet)?;
        }
        Commands::Config { action } => {
            cmd_config(action, &config, cli.quiet)?;
        }
        Commands::Doctor => {
            cmd_doctor(&config, &overrides, opts.no_color).await?;
        }
        Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
        #[cfg(feature = "tui")]
        Commands::Tui => {
            run_tui(&config, &overrides).await?;
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
async fn run_tui(config: &Config, overrides: &depin_cli::config::SourceOverrides) -> Result<()> {
    let source = config.build_source(overrides)?;
    let ctx = AppContext::new(open_store());
    depin_cli::tui::run(source, ctx, config).await
}

#[cfg(not(feature = "tui"))]
async fn run_tui(_config: &Config, _overrides: &depin_cli::config::SourceOverrides) -> Result<()> {
    Cli::command().print_help()?;
    Ok(())
}
