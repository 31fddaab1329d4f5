//! History panel: search box, status filter, paged verification log.

use ratatui::prelude::*;
use ratatui::widgets::{Cell, Paragraph, Row, Table};

use depin_core::history::{HistoryView, StatusFilter};
use depin_types::format_timestamp;

use super::theme::AppTheme;
use super::{panel, synced_label};
use crate::tui::app::{App, TextTarget};

pub(super) fn draw_history_panel(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(area);

    let editing = app.editing == Some(TextTarget::Search);
    app.monitor.history.read(|view| {
        draw_query_bar(frame, layout[0], view, editing, &theme);
        draw_entries(frame, layout[1], view, &theme);
    });
}

fn draw_query_bar(
    frame: &mut Frame,
    area: Rect,
    view: &HistoryView,
    editing: bool,
    theme: &AppTheme,
) {
    let search = view.query.search();
    let mut spans = vec![Span::styled(" Search: ", theme.muted())];
    if editing {
        spans.push(Span::styled(
            format!("{}_", search),
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));
    } else if search.is_empty() {
        spans.push(Span::styled("(press /)", theme.muted()));
    } else {
        spans.push(Span::raw(search.to_string()));
    }

    spans.push(Span::raw("   "));
    for (i, filter) in StatusFilter::ALL.iter().enumerate() {
        let style = if *filter == view.query.status() {
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            theme.muted()
        };
        spans.push(Span::styled(format!("[{}] {} ", i, filter), style));
    }

    let summary = view.summary();
    spans.push(Span::styled(
        format!("  {:.1}% verified", summary.verification_rate()),
        Style::default().fg(theme.success),
    ));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(panel("Filter", theme)),
        area,
    );
}

fn draw_entries(frame: &mut Frame, area: Rect, view: &HistoryView, theme: &AppTheme) {
    view.with_page(|page| {
        let footer = format!(
            " Page {} of {} ({} matches) ",
            page.page, page.total_pages, page.matches
        );
        let block = panel("Verification History", theme)
            .title_bottom(Line::from(Span::styled(footer, theme.muted())))
            .title_bottom(
                Line::from(Span::styled(synced_label(view.last_synced()), theme.muted()))
                    .right_aligned(),
            );

        if page.entries.is_empty() {
            frame.render_widget(
                Paragraph::new("No matching records")
                    .style(theme.muted())
                    .block(block),
                area,
            );
            return;
        }

        let header = Row::new(["ID", "Device", "Hash", "Value", "Timestamp", "Status"])
            .style(Style::default().fg(theme.text_muted).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = page
            .entries
            .iter()
            .map(|entry| {
                Row::new(vec![
                    Cell::from(entry.id.to_string()),
                    Cell::from(entry.device.clone()),
                    Cell::from(depin_types::shorten_hash(&entry.hash, 12)),
                    Cell::from(entry.value.clone()),
                    Cell::from(format_timestamp(entry.timestamp)),
                    Cell::from(entry.status.as_str())
                        .style(Style::default().fg(theme.history_color(entry.status))),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Length(12),
                Constraint::Length(16),
                Constraint::Length(12),
                Constraint::Length(20),
                Constraint::Min(8),
            ],
        )
        .header(header)
        .block(block);

        frame.render_widget(table, area);
    });
}
