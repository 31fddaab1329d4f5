//! Output formatting utilities for text and JSON output.

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use time::OffsetDateTime;

use depin_core::analysis::AnalysisView;
use depin_core::blockchain::BlockchainView;
use depin_core::chart::ActivityPoint;
use depin_core::dashboard::DashboardView;
use depin_core::history::{HistoryView, StatusFilter};
use depin_core::stats::{HistorySummary, SeverityCounts};
use depin_core::{
    AiStats, AnalysisResult, Block, ChainStats, DashboardStats, HistoryEntry, HistoryStatus,
    ReadingStatus, SensorReading, Settings, Severity, SourceKind,
};
use depin_types::{format_timestamp, shorten_hash};

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool, compact: bool) -> Self {
        Self { no_color, compact }
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if self.no_color {
            return text.to_string();
        }
        match tone {
            Tone::Good => text.green().to_string(),
            Tone::Warn => text.yellow().to_string(),
            Tone::Bad => text.red().to_string(),
            Tone::Info => text.cyan().to_string(),
            Tone::Muted => text.dimmed().to_string(),
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.bold().to_string()
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Good,
    Warn,
    Bad,
    Info,
    Muted,
}

fn reading_tone(status: ReadingStatus) -> Tone {
    match status {
        ReadingStatus::Normal => Tone::Good,
        ReadingStatus::Warning => Tone::Warn,
        ReadingStatus::Critical => Tone::Bad,
    }
}

fn severity_tone(severity: Severity) -> Tone {
    match severity {
        Severity::Low => Tone::Info,
        Severity::Medium => Tone::Warn,
        Severity::High => Tone::Bad,
    }
}

fn history_tone(status: HistoryStatus) -> Tone {
    match status {
        HistoryStatus::Verified => Tone::Good,
        HistoryStatus::Pending => Tone::Warn,
        HistoryStatus::Failed => Tone::Bad,
    }
}

fn table(rows: Builder) -> String {
    let mut table = rows.build();
    table.with(Style::rounded());
    table.to_string()
}

fn stat_line(label: &str, value: impl std::fmt::Display) -> String {
    format!("  {:<18} {}\n", label, value)
}

/// Render values as a one-line block sparkline.
#[must_use]
pub fn sparkline(values: &[f64]) -> String {
    const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    values
        .iter()
        .map(|v| {
            if range <= f64::EPSILON {
                LEVELS[LEVELS.len() / 2]
            } else {
                let idx = ((v - min) / range * (LEVELS.len() - 1) as f64).round() as usize;
                LEVELS[idx.min(LEVELS.len() - 1)]
            }
        })
        .collect()
}

fn synced_line(last: Option<OffsetDateTime>, opts: &FormatOptions) -> String {
    let text = match last {
        Some(ts) => format!("Last synced {}", format_timestamp(ts)),
        None => "Not synced yet".to_string(),
    };
    format!("{}\n", opts.paint(&text, Tone::Muted))
}

// ============================================================================
// Dashboard
// ============================================================================

#[must_use]
pub fn format_dashboard_text(
    view: &DashboardView,
    source: SourceKind,
    opts: &FormatOptions,
) -> String {
    let stats = view.stats;
    let mut output = format!("{} ({})\n", opts.heading("Network overview"), source);
    output.push_str(&stat_line("Active devices", stats.active_devices));
    output.push_str(&stat_line("Data points", stats.total_data));
    let alerts = if stats.alerts > 0 {
        opts.paint(&stats.alerts.to_string(), Tone::Warn)
    } else {
        stats.alerts.to_string()
    };
    output.push_str(&stat_line("Alerts", alerts));
    output.push_str(&stat_line("Uptime", format!("{:.1}%", stats.uptime)));
    output.push('\n');

    if view.readings().is_empty() {
        output.push_str("No sensor readings yet.\n");
    } else {
        let (normal, warning, critical) = view.status_counts();
        output.push_str(&format!(
            "{} ({} normal, {} warning, {} critical)\n",
            opts.heading("Recent readings"),
            normal,
            warning,
            critical
        ));
        let mut rows = Builder::default();
        rows.push_record(["Device", "Value", "Status", "Time"]);
        for reading in view.readings() {
            rows.push_record([
                reading.device.clone(),
                reading.display_value(),
                opts.paint(reading.status.as_str(), reading_tone(reading.status)),
                format_timestamp(reading.timestamp),
            ]);
        }
        output.push_str(&table(rows));
        output.push('\n');
    }

    let chart = view.chart();
    let values = chart.values();
    if !values.is_empty() {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        output.push('\n');
        output.push_str(&format!(
            "{} ({})  {}  min {:.1} max {:.1}\n",
            opts.heading("Activity"),
            chart.period(),
            opts.paint(&sparkline(&values), Tone::Info),
            min,
            max
        ));
    }
    output.push_str(&synced_line(view.last_synced(), opts));
    output
}

pub fn format_dashboard_json(
    view: &DashboardView,
    source: SourceKind,
    opts: &FormatOptions,
) -> Result<String> {
    #[derive(Serialize)]
    struct DashboardJson<'a> {
        source: SourceKind,
        stats: DashboardStats,
        readings: &'a [SensorReading],
        chart_period: String,
        activity: &'a [ActivityPoint],
        #[serde(with = "time::serde::rfc3339::option")]
        last_synced: Option<OffsetDateTime>,
    }

    opts.as_json(&DashboardJson {
        source,
        stats: view.stats,
        readings: view.readings(),
        chart_period: view.chart().period().to_string(),
        activity: view.chart().points(),
        last_synced: view.last_synced(),
    })
}

// ============================================================================
// Blockchain
// ============================================================================

#[must_use]
pub fn format_blocks_text(view: &BlockchainView, opts: &FormatOptions) -> String {
    let stats = view.stats;
    let mut output = format!("{}\n", opts.heading("Ledger"));
    output.push_str(&stat_line("Total blocks", stats.total_blocks));
    output.push_str(&stat_line("Transactions", stats.total_transactions));
    output.push_str(&stat_line(
        "Avg block time",
        format!("{:.1}s", stats.average_block_time),
    ));
    output.push_str(&stat_line(
        "Hash rate",
        format!("{:.1} TH/s", stats.network_hash_rate),
    ));
    let linked = if view.is_linked() {
        opts.paint("linked", Tone::Good)
    } else {
        opts.paint("BROKEN", Tone::Bad)
    };
    output.push_str(&stat_line("Chain", linked));
    output.push('\n');

    if view.blocks().is_empty() {
        output.push_str("No blocks yet.\n");
    } else {
        let mut rows = Builder::default();
        rows.push_record(["Height", "Hash", "Previous", "Txs", "Miner", "Time"]);
        for block in view.blocks() {
            rows.push_record([
                format!("#{}", block.height),
                block.short_hash(),
                shorten_hash(&block.previous_hash, 10),
                block.transactions.to_string(),
                block.miner.clone(),
                format_timestamp(block.timestamp),
            ]);
        }
        output.push_str(&table(rows));
        output.push('\n');
    }
    output.push_str(&synced_line(view.last_synced(), opts));
    output
}

pub fn format_blocks_json(view: &BlockchainView, opts: &FormatOptions) -> Result<String> {
    #[derive(Serialize)]
    struct BlocksJson<'a> {
        stats: ChainStats,
        linked: bool,
        blocks: Vec<&'a Block>,
    }

    opts.as_json(&BlocksJson {
        stats: view.stats,
        linked: view.is_linked(),
        blocks: view.blocks().iter().collect(),
    })
}

// ============================================================================
// Analysis
// ============================================================================

#[must_use]
pub fn format_analysis_text(view: &AnalysisView, opts: &FormatOptions) -> String {
    let stats = view.stats;
    let counts = view.severity_counts();
    let mut output = format!("{}\n", opts.heading("Anomaly detection"));
    output.push_str(&stat_line("Analyses", stats.total_analyses));
    output.push_str(&stat_line("Anomalies", stats.anomalies_detected));
    output.push_str(&stat_line("Accuracy", format!("{:.1}%", stats.accuracy)));
    output.push_str(&stat_line("Models active", stats.models_active));
    output.push_str(&stat_line(
        "Severity",
        format!(
            "{} low, {} medium, {} high",
            counts.low,
            counts.medium,
            opts.paint(&counts.high.to_string(), Tone::Bad)
        ),
    ));
    if let Some(model) = view.model_filter() {
        output.push_str(&stat_line("Model filter", model));
    }
    output.push('\n');

    let results = view.filtered();
    if results.is_empty() {
        output.push_str("No detections.\n");
    } else {
        let mut rows = Builder::default();
        rows.push_record(["Device", "Detection", "Severity", "Conf.", "Model", "Time"]);
        for result in &results {
            rows.push_record([
                result.device.clone(),
                result.detection_type.clone(),
                opts.paint(result.severity.as_str(), severity_tone(result.severity)),
                format!("{}%", result.confidence),
                result.model.clone(),
                format_timestamp(result.detected_at),
            ]);
        }
        output.push_str(&table(rows));
        output.push('\n');
        if let Some(latest) = results.first() {
            output.push_str(&format!(
                "Latest: {}\n  {}\n",
                latest.description,
                opts.paint(&latest.recommendation, Tone::Muted)
            ));
        }
    }
    output.push_str(&synced_line(view.last_synced(), opts));
    output
}

pub fn format_analysis_json(view: &AnalysisView, opts: &FormatOptions) -> Result<String> {
    #[derive(Serialize)]
    struct AnalysisJson<'a> {
        stats: AiStats,
        severity: SeverityCounts,
        model_filter: Option<&'a str>,
        results: Vec<&'a AnalysisResult>,
    }

    opts.as_json(&AnalysisJson {
        stats: view.stats,
        severity: view.severity_counts(),
        model_filter: view.model_filter(),
        results: view.filtered(),
    })
}

// ============================================================================
// History
// ============================================================================

#[must_use]
pub fn format_history_text(view: &HistoryView, opts: &FormatOptions) -> String {
    let summary = view.summary();
    let mut output = format!(
        "{} ({} entries: {} verified, {} pending, {} failed)\n",
        opts.heading("Verification history"),
        summary.total(),
        opts.paint(&summary.verified.to_string(), Tone::Good),
        opts.paint(&summary.pending.to_string(), Tone::Warn),
        opts.paint(&summary.failed.to_string(), Tone::Bad),
    );
    let query = &view.query;
    if !query.search().is_empty() || query.status() != StatusFilter::All {
        output.push_str(&format!(
            "Filter: search \"{}\", status {}\n",
            query.search(),
            query.status()
        ));
    }

    view.with_page(|page| {
        if page.entries.is_empty() {
            output.push_str("No matching entries.\n");
            return;
        }
        let mut rows = Builder::default();
        rows.push_record(["ID", "Device", "Hash", "Value", "Status", "Time"]);
        for entry in page.entries {
            rows.push_record([
                entry.id.to_string(),
                entry.device.clone(),
                shorten_hash(&entry.hash, 12),
                entry.value.clone(),
                opts.paint(entry.status.as_str(), history_tone(entry.status)),
                format_timestamp(entry.timestamp),
            ]);
        }
        output.push_str(&table(rows));
        output.push('\n');
        output.push_str(&format!(
            "Page {} of {} ({} matches)\n",
            page.page, page.total_pages, page.matches
        ));
    });
    output
}

pub fn format_history_json(view: &HistoryView, opts: &FormatOptions) -> Result<String> {
    #[derive(Serialize)]
    struct HistoryJson<'a> {
        search: &'a str,
        status: String,
        page: usize,
        total_pages: usize,
        matches: usize,
        summary: HistorySummary,
        entries: &'a [&'a HistoryEntry],
    }

    view.with_page(|page| {
        opts.as_json(&HistoryJson {
            search: view.query.search(),
            status: view.query.status().to_string(),
            page: page.page,
            total_pages: page.total_pages,
            matches: page.matches,
            summary: view.summary(),
            entries: page.entries,
        })
    })
}

// ============================================================================
// Settings
// ============================================================================

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

#[must_use]
pub fn format_settings_text(settings: &Settings, opts: &FormatOptions) -> String {
    let mut output = format!("{}\n", opts.heading("Profile"));
    output.push_str(&stat_line("Full name", &settings.full_name));
    output.push_str(&stat_line("Email", &settings.email));
    output.push_str(&stat_line("Phone", &settings.phone));
    output.push_str(&format!("\n{}\n", opts.heading("Notifications")));
    output.push_str(&stat_line("Email", on_off(settings.email_notifications)));
    output.push_str(&stat_line("SMS", on_off(settings.sms_notifications)));
    output.push_str(&stat_line("Alerts", on_off(settings.alert_notifications)));
    output.push_str(&format!("\n{}\n", opts.heading("System")));
    output.push_str(&stat_line("Auto refresh", on_off(settings.auto_refresh)));
    output.push_str(&stat_line(
        "Refresh interval",
        format!("{}s", settings.refresh_interval),
    ));
    output.push_str(&stat_line(
        "Data retention",
        format!("{} days", settings.data_retention),
    ));
    output.push_str(&stat_line("Theme", settings.theme));
    output.push_str(&stat_line("Language", &settings.language));
    output
}

pub fn format_settings_json(settings: &Settings, opts: &FormatOptions) -> Result<String> {
    opts.as_json(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use depin_core::{Shared, Simulator, sync_once};

    fn plain() -> FormatOptions {
        FormatOptions::new(true, false)
    }

    #[test]
    fn test_sparkline_levels() {
        assert_eq!(sparkline(&[0.0, 7.0]), "▁█");
        assert_eq!(sparkline(&[5.0, 5.0, 5.0]).chars().count(), 3);
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn test_as_json_compact() {
        let opts = FormatOptions::new(true, true);
        assert_eq!(opts.as_json(&[1, 2]).unwrap(), "[1,2]\n");
        let pretty = plain().as_json(&[1, 2]).unwrap();
        assert!(pretty.contains('\n'));
        assert!(pretty.len() > "[1,2]\n".len());
    }

    #[test]
    fn test_empty_views_render() {
        let opts = plain();
        assert!(format_blocks_text(&BlockchainView::default(), &opts).contains("No blocks yet"));
        assert!(format_analysis_text(&AnalysisView::default(), &opts).contains("No detections"));
        assert!(
            format_history_text(&HistoryView::default(), &opts).contains("No matching entries")
        );
        let dashboard = format_dashboard_text(
            &DashboardView::default(),
            SourceKind::Simulated,
            &opts,
        );
        assert!(dashboard.contains("No sensor readings yet"));
        assert!(dashboard.contains("Not synced yet"));
    }

    #[test]
    fn test_history_text_has_page_footer() {
        let sim = Simulator::with_seed(11);
        let view = HistoryView::from_entries(sim.seed_history(OffsetDateTime::now_utc()));
        let text = format_history_text(&view, &plain());
        assert!(text.contains("Page 1 of 1 (8 matches)"));
        assert!(text.contains("Verification history (8 entries"));
    }

    #[test]
    fn test_history_json_fields() {
        let sim = Simulator::with_seed(12);
        let view = HistoryView::from_entries(sim.seed_history(OffsetDateTime::now_utc()));
        let json = format_history_json(&view, &plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["page"], 1);
        assert_eq!(value["matches"], 8);
        assert_eq!(value["status"], "all");
        assert_eq!(value["entries"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn test_plain_output_has_no_ansi() {
        let text = format_settings_text(&Settings::default(), &plain());
        assert!(!text.contains('\x1b'));
        assert!(text.contains("admin@iot.com"));
        assert!(text.contains("30s"));
    }

    #[test]
    fn test_settings_json_is_camel_case() {
        let json = format_settings_json(&Settings::default(), &plain()).unwrap();
        assert!(json.contains("\"refreshInterval\": 30"));
        assert!(json.contains("\"theme\": \"dark\""));
    }

    #[tokio::test]
    async fn test_blocks_json_reports_linkage() {
        let sim = Simulator::with_seed(13);
        let view = Shared::<BlockchainView>::default();
        sync_once(&view, &sim).await.unwrap();
        let json = view.read(|v| format_blocks_json(v, &plain())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["linked"], true);
        assert_eq!(value["blocks"].as_array().unwrap().len(), 3);
        assert_eq!(value["stats"]["total_blocks"], 12543);
    }
}
