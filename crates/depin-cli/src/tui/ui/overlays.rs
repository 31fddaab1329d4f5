//! Overlays drawn on top of the active tab: help, notifications and the
//! confirmation dialog.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use time::OffsetDateTime;

use super::theme::{AppTheme, BORDER_TYPE};
use crate::tui::app::{App, PendingAction};

/// A rectangle of `width` x `height` centered in `area`, clipped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

fn overlay_block<'a>(title: &'a str, theme: &AppTheme) -> Block<'a> {
    Block::default()
        .title(Span::styled(title, theme.title_style()))
        .borders(Borders::ALL)
        .border_type(BORDER_TYPE)
        .border_style(Style::default().fg(theme.border_active))
}

fn shortcut_line<'a>(key: &str, desc: &str, theme: &AppTheme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:>12} ", key), Style::default().fg(theme.warning)),
        Span::styled(desc.to_string(), Style::default().fg(theme.text_secondary)),
    ])
}

pub(super) fn draw_help_overlay(frame: &mut Frame, app: &App) {
    let theme = app.app_theme();
    let area = centered(frame.area(), 64, 24);
    frame.render_widget(Clear, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        ))
    };

    let left = vec![
        section("--- General ---"),
        shortcut_line("Tab/S-Tab", "Next/Prev tab", &theme),
        shortcut_line("r", "Refresh now", &theme),
        shortcut_line("t", "Toggle theme", &theme),
        shortcut_line("n", "Notifications", &theme),
        shortcut_line("m", "Mark all read", &theme),
        shortcut_line("C", "Clear notifications", &theme),
        shortcut_line("?", "Toggle help", &theme),
        shortcut_line("q", "Quit", &theme),
        Line::from(""),
        section("--- Dashboard ---"),
        shortcut_line("p", "Chart period", &theme),
        Line::from(""),
        section("--- AI Analysis ---"),
        shortcut_line("c", "Cycle model", &theme),
    ];
    let right = vec![
        section("--- History ---"),
        shortcut_line("/", "Search", &theme),
        shortcut_line("0-3", "Status filter", &theme),
        shortcut_line("[ ]", "Prev/Next page", &theme),
        shortcut_line("e", "Export CSV", &theme),
        Line::from(""),
        section("--- Settings ---"),
        shortcut_line("j/k", "Select", &theme),
        shortcut_line("Enter", "Edit/Change", &theme),
        shortcut_line("s", "Save", &theme),
        shortcut_line("x", "Discard", &theme),
        shortcut_line("R", "Reset", &theme),
        shortcut_line("E/I", "Export/Import", &theme),
    ];

    frame.render_widget(overlay_block(" Help ", &theme), area);
    frame.render_widget(Paragraph::new(left), columns[0]);
    frame.render_widget(Paragraph::new(right), columns[1]);
}

pub(super) fn draw_notifications(frame: &mut Frame, app: &App) {
    let theme = app.app_theme();
    let area = centered(frame.area(), 60, 26);
    frame.render_widget(Clear, area);

    let now = OffsetDateTime::now_utc();
    let unread = app.unread_count();
    let lines: Vec<Line> = app.monitor.notifications.read(|feed| {
        let mut lines = Vec::new();
        if feed.is_empty() {
            lines.push(Line::from(Span::styled("No notifications", theme.muted())));
        }
        for (i, n) in feed.items().iter().enumerate() {
            let marker = if n.read { "  " } else { "* " };
            let mut title_style = Style::default().fg(theme.notification_color(n.kind));
            if !n.read {
                title_style = title_style.add_modifier(Modifier::BOLD);
            }
            if i == app.selected_notification {
                title_style = title_style.bg(theme.bg_selected);
            }
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(theme.warning)),
                Span::styled(n.title.clone(), title_style),
                Span::styled(format!("  {}", n.relative_time(now)), theme.muted()),
            ]));
            lines.push(Line::from(Span::styled(
                format!("  {}", n.message),
                Style::default().fg(theme.text_secondary),
            )));
        }
        lines
    });

    let title = format!(" Notifications ({} unread) ", unread);
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            overlay_block(&title, &theme).title_bottom(Line::from(Span::styled(
                " Enter read | m all read | C clear | n close ",
                theme.muted(),
            ))),
        );
    frame.render_widget(paragraph, area);
}

pub(super) fn draw_confirmation_dialog(frame: &mut Frame, app: &App) {
    let Some(action) = app.pending_confirmation else {
        return;
    };
    let theme = app.app_theme();

    let message = match action {
        PendingAction::ResetSettings => "Reset all settings to defaults?",
    };

    let area = centered(frame.area(), 40, 5);
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(message, Style::default().fg(theme.text_primary))),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                " [Y]es ",
                Style::default()
                    .fg(theme.success)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                " [N]o ",
                Style::default()
                    .fg(theme.danger)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(overlay_block(" Confirm ", &theme)),
        area,
    );
}
