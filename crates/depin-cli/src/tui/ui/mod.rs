//! Layout and rendering for the TUI.
//!
//! The screen is split into:
//!
//! - **Header**: title, source, theme and unread notifications
//! - **Tab bar**: one tab per console view
//! - **Content**: the active tab's panel
//! - **Status bar**: key hints or status messages, sync state and clock

pub mod theme;

mod analysis;
mod blockchain;
mod dashboard;
mod history;
mod overlays;
mod settings;

use chrono::Local;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use depin_core::Theme;

use super::app::{App, Tab};
use theme::BORDER_TYPE;

/// Draw the complete TUI interface.
pub fn draw(frame: &mut Frame, app: &App) {
    let theme = app.app_theme();
    if app.ctx.theme() == Theme::Light {
        frame.render_widget(
            Block::default().style(Style::default().bg(theme.bg)),
            frame.area(),
        );
    }

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header bar
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, main_layout[0], app);
    draw_tab_bar(frame, main_layout[1], app);

    let area = main_layout[2];
    match app.active_tab {
        Tab::Dashboard => dashboard::draw_dashboard_panel(frame, area, app),
        Tab::Blockchain => blockchain::draw_blockchain_panel(frame, area, app),
        Tab::Analysis => analysis::draw_analysis_panel(frame, area, app),
        Tab::History => history::draw_history_panel(frame, area, app),
        Tab::Settings => settings::draw_settings_panel(frame, area, app),
    }

    draw_status_bar(frame, main_layout[3], app);

    if app.show_notifications {
        overlays::draw_notifications(frame, app);
    }
    if app.show_help {
        overlays::draw_help_overlay(frame, app);
    }
    overlays::draw_confirmation_dialog(frame, app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();

    let mut spans = vec![
        Span::styled(
            " DePIN Monitor ",
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(theme.text_muted),
        ),
        Span::styled(
            format!(" {} ", app.monitor.kind()),
            Style::default().fg(theme.info),
        ),
    ];

    if app.ctx.is_online() {
        spans.push(Span::styled(" ONLINE ", Style::default().fg(theme.success)));
    } else {
        spans.push(Span::styled(
            " OFFLINE ",
            Style::default()
                .fg(theme.danger)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let unread = app.unread_count();
    if unread > 0 {
        spans.push(Span::styled(
            format!(" *{} ", unread),
            Style::default()
                .fg(theme.warning)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let theme_label = match app.ctx.theme() {
        Theme::Dark => Span::styled(" DARK ", Style::default().fg(theme.info)),
        Theme::Light => Span::styled(" LIGHT ", Style::default().fg(theme.warning)),
    };
    spans.push(theme_label);

    if !app.ctx.is_authenticated() {
        spans.push(Span::styled(" GUEST ", Style::default().fg(theme.text_muted)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(theme.header_style()),
        area,
    );
}

fn draw_tab_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|tab| {
            let style = if *tab == app.active_tab {
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(theme.text_muted)
            };
            Line::from(Span::styled(format!(" {} ", tab.title()), style))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_type(BORDER_TYPE)
                .border_style(theme.border_style()),
        )
        .highlight_style(Style::default().fg(theme.primary))
        .divider(Span::styled(" | ", Style::default().fg(theme.text_muted)))
        .select(app.active_tab.index());

    frame.render_widget(tabs, area);
}

/// Key hints for the active tab.
fn context_hints(app: &App) -> Vec<(&'static str, &'static str)> {
    let mut hints = vec![("?", "help")];
    match app.active_tab {
        Tab::Dashboard => hints.push(("p", "period")),
        Tab::Blockchain => {}
        Tab::Analysis => hints.push(("c", "model")),
        Tab::History => {
            hints.push(("/", "search"));
            hints.push(("0-3", "filter"));
            hints.push(("[ ]", "page"));
            hints.push(("e", "export"));
        }
        Tab::Settings => {
            hints.push(("Enter", "edit"));
            hints.push(("s", "save"));
            hints.push(("x", "discard"));
        }
    }
    hints.push(("n", "alerts"));
    hints.push(("q", "quit"));
    hints
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();
    let time_str = Local::now().format("%H:%M:%S").to_string();

    let left_spans = if let Some(msg) = app.current_status_message() {
        vec![Span::styled(
            format!(" {}", msg),
            Style::default().fg(theme.text_secondary),
        )]
    } else if let Some(error) = app.sync_error() {
        vec![Span::styled(
            format!(" Sync error: {}", error),
            Style::default().fg(theme.danger),
        )]
    } else {
        let mut spans = vec![Span::raw(" ")];
        for (i, (key, desc)) in context_hints(app).iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", Style::default().fg(theme.text_muted)));
            }
            spans.push(Span::styled(
                *key,
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" {}", desc),
                Style::default().fg(theme.text_muted),
            ));
        }
        spans
    };

    let status_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(10)])
        .split(area);

    frame.render_widget(Paragraph::new(Line::from(left_spans)), status_layout[0]);
    frame.render_widget(
        Paragraph::new(time_str)
            .style(Style::default().fg(theme.text_muted))
            .alignment(Alignment::Right),
        status_layout[1],
    );
}

/// "Updated HH:MM:SS" or "Waiting for data" for a panel title.
pub(super) fn synced_label(last: Option<time::OffsetDateTime>) -> String {
    match last {
        Some(ts) => format!(
            " Updated {:02}:{:02}:{:02} ",
            ts.hour(),
            ts.minute(),
            ts.second()
        ),
        None => " Waiting for data ".to_string(),
    }
}

/// A bordered block with a styled title.
pub(super) fn panel(title: &str, theme: &theme::AppTheme) -> Block<'static> {
    Block::default()
        .title(Span::styled(format!(" {} ", title), theme.title_style()))
        .borders(Borders::ALL)
        .border_type(BORDER_TYPE)
        .border_style(theme.border_style())
}
