//! Dashboard panel: network stats, latest readings and the activity chart.

use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::{Axis, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table};

use depin_core::chart::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use depin_core::dashboard::DashboardView;

use super::theme::AppTheme;
use super::{panel, synced_label};
use crate::tui::app::App;

pub(super) fn draw_dashboard_panel(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(9),
            Constraint::Min(6),
        ])
        .split(area);

    app.monitor.dashboard.read(|view| {
        draw_stats(frame, layout[0], view, &theme);
        draw_readings(frame, layout[1], view, &theme);
        draw_activity_chart(frame, layout[2], view, &theme);
    });
}

fn draw_stats(frame: &mut Frame, area: Rect, view: &DashboardView, theme: &AppTheme) {
    let stats = &view.stats;
    let cards = [
        ("Active Devices", stats.active_devices.to_string(), theme.primary),
        ("Total Data", stats.total_data.to_string(), theme.info),
        (
            "Alerts",
            stats.alerts.to_string(),
            if stats.alerts > 0 {
                theme.warning
            } else {
                theme.success
            },
        ),
        ("Uptime", format!("{:.1}%", stats.uptime), theme.success),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for ((label, value, color), column) in cards.into_iter().zip(columns.iter()) {
        let body = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(panel(label, theme));
        frame.render_widget(body, *column);
    }
}

fn draw_readings(frame: &mut Frame, area: Rect, view: &DashboardView, theme: &AppTheme) {
    let (normal, warning, critical) = view.status_counts();
    let title = format!(
        "Sensor Readings ({} ok, {} warn, {} crit)",
        normal, warning, critical
    );

    let header = Row::new(["Device", "Value", "Status", "Time"])
        .style(Style::default().fg(theme.text_muted).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = view
        .readings()
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(r.device.clone()),
                Cell::from(r.display_value()),
                Cell::from(r.status.as_str())
                    .style(Style::default().fg(theme.reading_color(r.status))),
                Cell::from(format!(
                    "{:02}:{:02}:{:02}",
                    r.timestamp.hour(),
                    r.timestamp.minute(),
                    r.timestamp.second()
                )),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(35),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(25),
        ],
    )
    .header(header)
    .block(panel(&title, theme).title_bottom(
        Line::from(Span::styled(synced_label(view.last_synced()), theme.muted())).right_aligned(),
    ));

    frame.render_widget(table, area);
}

fn draw_activity_chart(frame: &mut Frame, area: Rect, view: &DashboardView, theme: &AppTheme) {
    let chart = view.chart();
    // Projected y grows downward; flip it for the terminal's y-up axis.
    let points: Vec<(f64, f64)> = chart
        .project(DEFAULT_WIDTH, DEFAULT_HEIGHT)
        .into_iter()
        .map(|p| (p.x, DEFAULT_HEIGHT - p.y))
        .collect();

    let title = format!("Network Activity ({}, p to change)", chart.period());
    let block = panel(&title, theme);

    if points.is_empty() {
        frame.render_widget(
            Paragraph::new("No activity yet")
                .style(theme.muted())
                .block(block),
            area,
        );
        return;
    }

    let first = chart.points().first().map(|p| p.label.clone()).unwrap_or_default();
    let last = chart.points().last().map(|p| p.label.clone()).unwrap_or_default();
    let values = chart.values();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(theme.primary))
        .data(&points);

    let widget = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(theme.muted())
                .bounds([0.0, DEFAULT_WIDTH])
                .labels([first, last]),
        )
        .y_axis(
            Axis::default()
                .style(theme.muted())
                .bounds([0.0, DEFAULT_HEIGHT])
                .labels([format!("{:.0}", min), format!("{:.0}", max)]),
        );

    frame.render_widget(widget, area);
}
