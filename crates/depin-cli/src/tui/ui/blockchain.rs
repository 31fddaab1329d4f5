//! Blockchain panel: chain stats and the recent block list.

use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Row, Table};

use depin_core::blockchain::BlockchainView;

use super::theme::AppTheme;
use super::{panel, synced_label};
use crate::tui::app::App;

pub(super) fn draw_blockchain_panel(frame: &mut Frame, area: Rect, app: &App) {
    let theme = app.app_theme();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(area);

    app.monitor.blockchain.read(|view| {
        draw_chain_stats(frame, layout[0], view, &theme);
        draw_blocks(frame, layout[1], view, &theme);
    });
}

fn draw_chain_stats(frame: &mut Frame, area: Rect, view: &BlockchainView, theme: &AppTheme) {
    let stats = &view.stats;
    let label = |text: &'static str| Span::styled(format!("{:<18}", text), theme.muted());
    let value = |text: String| {
        Span::styled(
            text,
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        )
    };

    let (link_text, link_color) = if view.is_linked() {
        ("linked", theme.success)
    } else {
        ("broken", theme.danger)
    };

    let lines = vec![
        Line::from(vec![
            label("Total blocks"),
            value(stats.total_blocks.to_string()),
        ]),
        Line::from(vec![
            label("Transactions"),
            value(stats.total_transactions.to_string()),
        ]),
        Line::from(vec![
            label("Avg block time"),
            value(format!("{:.1} s", stats.average_block_time)),
            Span::raw("   "),
            label("Hash rate"),
            value(format!("{:.1} TH/s", stats.network_hash_rate)),
        ]),
        Line::from(vec![
            label("Chain"),
            Span::styled(link_text, Style::default().fg(link_color)),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(panel("Chain", theme)),
        area,
    );
}

fn draw_blocks(frame: &mut Frame, area: Rect, view: &BlockchainView, theme: &AppTheme) {
    let header = Row::new(["Height", "Hash", "Previous", "Txs", "Miner", "Status"])
        .style(Style::default().fg(theme.text_muted).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = view
        .blocks()
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let row = Row::new(vec![
                format!("#{}", block.height),
                block.short_hash(),
                depin_types::shorten_hash(&block.previous_hash, 10),
                block.transactions.to_string(),
                block.miner.clone(),
                block.status.to_string(),
            ]);
            if i == 0 {
                row.style(Style::default().fg(theme.primary))
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(6),
            Constraint::Min(10),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        panel("Recent Blocks", theme).title_bottom(
            Line::from(Span::styled(synced_label(view.last_synced()), theme.muted()))
                .right_aligned(),
        ),
    );

    frame.render_widget(table, area);
}
