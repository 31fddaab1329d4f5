//! AI analysis panel: detector stats, severity breakdown and detections.

use ratatui::prelude::*;
use ratatui::widgets::{Cell, Paragraph, Row, Table};

use depin_core::Severity;
use depin_core::analysis::AnalysisView;

use super::theme::AppTheme;
use super::{panel, synced_label};
use crate::tui::app::App;

pub(super) fn draw_analysis_panel(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(4)])
        .split(area);

    app.monitor.analysis.read(|view| {
        draw_summary(frame, layout[0], view, &theme);
        draw_results(frame, layout[1], view, &theme);
    });
}

fn draw_summary(frame: &mut Frame, area: Rect, view: &AnalysisView, theme: &AppTheme) {
    let stats = &view.stats;
    let counts = view.severity_counts();

    let mut severity = vec![Span::styled("Severity  ", theme.muted())];
    for level in Severity::ALL {
        let count = match level {
            Severity::Low => counts.low,
            Severity::Medium => counts.medium,
            Severity::High => counts.high,
        };
        severity.push(Span::styled(
            format!("{} {}  ", level.as_str(), count),
            Style::default().fg(theme.severity_color(level)),
        ));
    }

    let lines = vec![
        Line::from(vec![
            Span::styled("Analyses ", theme.muted()),
            Span::raw(format!("{}   ", stats.total_analyses)),
            Span::styled("Anomalies ", theme.muted()),
            Span::raw(format!("{}   ", stats.anomalies_detected)),
            Span::styled("Accuracy ", theme.muted()),
            Span::raw(format!("{:.1}%   ", stats.accuracy)),
            Span::styled("Models ", theme.muted()),
            Span::raw(stats.models_active.to_string()),
        ]),
        Line::from(severity),
        Line::from(vec![
            Span::styled("Model     ", theme.muted()),
            Span::styled(
                view.model_filter().unwrap_or("all models").to_string(),
                Style::default().fg(theme.primary),
            ),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(panel("Detector", theme)),
        area,
    );
}

fn draw_results(frame: &mut Frame, area: Rect, view: &AnalysisView, theme: &AppTheme) {
    let results = view.filtered();

    if results.is_empty() {
        frame.render_widget(
            Paragraph::new("No detections yet")
                .style(theme.muted())
                .block(panel("Detections", theme)),
            area,
        );
        return;
    }

    let header = Row::new(["Device", "Detection", "Severity", "Conf", "Model", "Recommendation"])
        .style(Style::default().fg(theme.text_muted).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = results
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.device.clone()),
                Cell::from(r.detection_type.clone()),
                Cell::from(r.severity.as_str())
                    .style(Style::default().fg(theme.severity_color(r.severity))),
                Cell::from(format!("{}%", r.confidence)),
                Cell::from(r.model.clone()),
                Cell::from(r.recommendation.clone()),
            ])
        })
        .collect();

    let title = format!("Detections ({})", results.len());
    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(22),
            Constraint::Length(9),
            Constraint::Length(5),
            Constraint::Length(20),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        panel(&title, theme).title_bottom(
            Line::from(Span::styled(synced_label(view.last_synced()), theme.muted()))
                .right_aligned(),
        ),
    );

    frame.render_widget(table, area);
}
