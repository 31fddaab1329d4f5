//! History command implementation.

use std::path::{Path, PathBuf};

use anyhow::Result;
use depin_core::Monitor;
use depin_core::export::history_file_name;
use depin_core::history::StatusFilter;

use crate::cli::OutputFormat;
use crate::commands::snapshot::run_cycles;
use crate::format::{FormatOptions, format_history_json, format_history_text};
use crate::util::{ExportTarget, today, write_output};

/// Arguments for the history command.
pub struct HistoryArgs<'a> {
    pub cycles: u32,
    pub search: String,
    pub status: StatusFilter,
    pub page: usize,
    /// `Some(None)` exports to the export directory under the default name;
    /// a path of `-` exports to stdout instead of the page.
    pub export: Option<Option<PathBuf>>,
    pub export_dir: &'a Path,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_history(monitor: &Monitor, args: HistoryArgs<'_>) -> Result<()> {
    let HistoryArgs {
        cycles,
        search,
        status,
        page,
        export,
        export_dir,
        format,
        output,
        quiet,
        opts,
    } = args;

    run_cycles(monitor, &monitor.history, cycles).await?;

    let (content, csv, exported) = monitor.history.update(|view| {
        view.query.set_search(search);
        view.query.set_status(status);
        view.set_page(page);
        let content = match format {
            OutputFormat::Json => format_history_json(view, opts),
            OutputFormat::Text => Ok(format_history_text(view, opts)),
        };
        (content, view.export_csv(), view.filtered().len())
    });

    let target =
        export.map(|explicit| ExportTarget::resolve(explicit, export_dir, &history_file_name(today())));
    if let Some(target) = &target {
        target.write(&csv)?;
        if !quiet {
            eprintln!("Exported {} entries to {}", exported, target);
        }
    }

    let content = content?;
    match (&target, output) {
        // The CSV already went to stdout.
        (Some(ExportTarget::Stdout), None) => Ok(()),
        _ => write_output(output, &content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use depin_core::export::CSV_HEADER;
    use depin_core::{HistoryStatus, Simulator};

    fn base<'a>(dir: &'a Path, out: &'a PathBuf, opts: &'a FormatOptions) -> HistoryArgs<'a> {
        HistoryArgs {
            cycles: 1,
            search: String::new(),
            status: StatusFilter::All,
            page: 1,
            export: None,
            export_dir: dir,
            format: OutputFormat::Json,
            output: Some(out),
            quiet: true,
            opts,
        }
    }

    #[tokio::test]
    async fn test_history_export_to_directory() {
        let monitor = Monitor::new(Arc::new(Simulator::with_seed(31)));
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("page.json");
        let opts = FormatOptions::new(true, false);

        cmd_history(
            &monitor,
            HistoryArgs {
                export: Some(None),
                ..base(dir.path(), &out, &opts)
            },
        )
        .await
        .unwrap();

        let csv_path = dir.path().join(history_file_name(today()));
        let csv = std::fs::read_to_string(csv_path).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(lines.count(), 8);
    }

    #[tokio::test]
    async fn test_history_export_dash_writes_no_file() {
        let monitor = Monitor::new(Arc::new(Simulator::with_seed(33)));
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("page.json");
        let opts = FormatOptions::new(true, false);

        cmd_history(
            &monitor,
            HistoryArgs {
                export: Some(Some(PathBuf::from("-"))),
                ..base(dir.path(), &out, &opts)
            },
        )
        .await
        .unwrap();

        assert!(!dir.path().join("-").exists());
        assert!(!dir.path().join(history_file_name(today())).exists());
        // An explicit --output still receives the page.
        assert!(out.exists());
    }

    #[tokio::test]
    async fn test_history_status_filter_and_page_clamp() {
        let monitor = Monitor::new(Arc::new(Simulator::with_seed(32)));
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("page.json");
        let opts = FormatOptions::new(true, false);

        cmd_history(
            &monitor,
            HistoryArgs {
                status: StatusFilter::Only(HistoryStatus::Verified),
                page: 9,
                ..base(dir.path(), &out, &opts)
            },
        )
        .await
        .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["status"], "verified");
        assert_eq!(value["page"], 1);
        assert!(
            value["entries"]
                .as_array()
                .unwrap()
                .iter()
                .all(|e| e["status"] == "verified")
        );
    }
}
