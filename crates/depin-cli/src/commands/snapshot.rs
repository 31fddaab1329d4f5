//! One-shot snapshots of the dashboard, ledger and analysis views.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use depin_core::analysis::MODELS;
use depin_core::chart::ChartPeriod;
use depin_core::view::View;
use depin_core::{Monitor, Shared, sync_once};
use tracing::debug;

use crate::cli::OutputFormat;
use crate::format::{
    FormatOptions, format_analysis_json, format_analysis_text, format_blocks_json,
    format_blocks_text, format_dashboard_json, format_dashboard_text,
};
use crate::util::write_output;

/// Arguments shared by the snapshot commands.
pub struct SnapshotArgs<'a> {
    pub cycles: u32,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub opts: &'a FormatOptions,
}

/// Run `cycles` sync cycles of one view back to back.
pub async fn run_cycles<V: View>(monitor: &Monitor, view: &Shared<V>, cycles: u32) -> Result<()> {
    for cycle in 1..=cycles {
        debug!("{} sync cycle {}/{}", V::NAME, cycle, cycles);
        sync_once(view, monitor.source().as_ref())
            .await
            .with_context(|| format!("Failed to sync {} from {} source", V::NAME, monitor.kind()))?;
    }
    Ok(())
}

pub async fn cmd_dashboard(
    monitor: &Monitor,
    period: ChartPeriod,
    args: SnapshotArgs<'_>,
) -> Result<()> {
    if monitor.dashboard.read(|v| v.chart().period()) != period {
        monitor.dashboard.update(|v| v.set_period(period));
    }
    run_cycles(monitor, &monitor.dashboard, args.cycles).await?;

    let kind = monitor.kind();
    let content = monitor.dashboard.read(|view| match args.format {
        OutputFormat::Json => format_dashboard_json(view, kind, args.opts),
        OutputFormat::Text => Ok(format_dashboard_text(view, kind, args.opts)),
    })?;
    write_output(args.output, &content)
}

pub async fn cmd_blocks(monitor: &Monitor, args: SnapshotArgs<'_>) -> Result<()> {
    run_cycles(monitor, &monitor.blockchain, args.cycles).await?;

    let content = monitor.blockchain.read(|view| match args.format {
        OutputFormat::Json => format_blocks_json(view, args.opts),
        OutputFormat::Text => Ok(format_blocks_text(view, args.opts)),
    })?;
    write_output(args.output, &content)
}

/// Resolve a model name case-insensitively against the known models.
pub fn resolve_model(name: &str) -> Result<&'static str> {
    match MODELS.iter().find(|m| m.eq_ignore_ascii_case(name.trim())) {
        Some(model) => Ok(model),
        None => bail!("Unknown model '{}'. Known models: {}", name, MODELS.join(", ")),
    }
}

pub async fn cmd_analysis(
    monitor: &Monitor,
    model: Option<&str>,
    args: SnapshotArgs<'_>,
) -> Result<()> {
    let model = model.map(resolve_model).transpose()?;
    monitor
        .run_analysis(args.cycles as usize)
        .await
        .with_context(|| format!("Failed to run analysis on {} source", monitor.kind()))?;
    monitor
        .analysis
        .update(|v| v.set_model_filter(model.map(str::to_string)));

    let content = monitor.analysis.read(|view| match args.format {
        OutputFormat::Json => format_analysis_json(view, args.opts),
        OutputFormat::Text => Ok(format_analysis_text(view, args.opts)),
    })?;
    write_output(args.output, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use depin_core::Simulator;

    fn monitor() -> Monitor {
        Monitor::new(Arc::new(Simulator::with_seed(21)))
    }

    fn args<'a>(cycles: u32, opts: &'a FormatOptions, out: &'a PathBuf) -> SnapshotArgs<'a> {
        SnapshotArgs {
            cycles,
            format: OutputFormat::Json,
            output: Some(out),
            opts,
        }
    }

    #[test]
    fn test_resolve_model() {
        assert_eq!(resolve_model("random forest").unwrap(), "Random Forest");
        assert!(resolve_model("Linear Regression").is_err());
    }

    #[tokio::test]
    async fn test_blocks_cycles_grow_chain() {
        let monitor = monitor();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("blocks.json");
        let opts = FormatOptions::new(true, false);

        cmd_blocks(&monitor, args(3, &opts, &out)).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["linked"], true);
        assert_eq!(value["blocks"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_dashboard_period() {
        let monitor = monitor();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dashboard.json");
        let opts = FormatOptions::new(true, true);

        cmd_dashboard(&monitor, ChartPeriod::Week, args(1, &opts, &out))
            .await
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["chart_period"], "7d");
        assert_eq!(value["activity"].as_array().unwrap().len(), 7);
        assert_eq!(value["readings"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_analysis_model_filter() {
        let monitor = monitor();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("analysis.json");
        let opts = FormatOptions::new(true, false);

        cmd_analysis(&monitor, Some("autoencoder"), args(4, &opts, &out))
            .await
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["model_filter"], "Autoencoder");
        assert!(
            value["results"]
                .as_array()
                .unwrap()
                .iter()
                .all(|r| r["model"] == "Autoencoder")
        );
    }

    #[tokio::test]
    async fn test_sync_failure_is_reported() {
        let sim = Arc::new(Simulator::with_seed(22));
        sim.set_should_fail(true);
        let monitor = Monitor::new(sim);
        let opts = FormatOptions::default();
        let err = cmd_blocks(
            &monitor,
            SnapshotArgs {
                cycles: 1,
                format: OutputFormat::Text,
                output: None,
                opts: &opts,
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Failed to sync blockchain"));
    }
}
