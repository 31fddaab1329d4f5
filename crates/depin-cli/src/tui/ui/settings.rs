//! Settings panel: the editable settings form.

use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Row, Table};

use crate::tui::app::{App, SETTING_ROWS, TextTarget, is_text_setting, setting_label, setting_value};

use super::panel;

pub(super) fn draw_settings_panel(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(3)])
        .split(area);

    let form = &app.settings;
    let rows: Vec<Row> = SETTING_ROWS
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let selected = i == app.selected_setting;
            let editing = app.editing == Some(TextTarget::Setting(*key));
            let value = if editing {
                format!("{}_", app.input_buffer)
            } else {
                setting_value(form.draft(), *key)
            };
            let changed = setting_value(form.draft(), *key) != setting_value(form.saved(), *key);
            let hint = if is_text_setting(*key) { "edit" } else { "change" };

            let row = Row::new(vec![
                Span::raw(if changed { "*" } else { " " }),
                Span::raw(setting_label(*key)),
                Span::raw(value),
                Span::styled(if selected { hint } else { "" }, theme.muted()),
            ]);
            if selected {
                row.style(theme.selected_style())
            } else {
                row
            }
        })
        .collect();

    let title = if form.is_dirty() {
        "Settings (unsaved)"
    } else {
        "Settings"
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(22),
            Constraint::Min(20),
            Constraint::Length(8),
        ],
    )
    .block(panel(title, &theme));
    frame.render_widget(table, layout[0]);

    let help = Line::from(vec![
        Span::styled(" Enter", Style::default().fg(theme.primary)),
        Span::styled(" edit  ", theme.muted()),
        Span::styled("s", Style::default().fg(theme.primary)),
        Span::styled(" save  ", theme.muted()),
        Span::styled("x", Style::default().fg(theme.primary)),
        Span::styled(" discard  ", theme.muted()),
        Span::styled("R", Style::default().fg(theme.primary)),
        Span::styled(" reset  ", theme.muted()),
        Span::styled("E/I", Style::default().fg(theme.primary)),
        Span::styled(" export/import", theme.muted()),
    ]);
    frame.render_widget(Paragraph::new(help).block(panel("Actions", &theme)), layout[1]);
}
