//! Color palette and shared styles for the TUI.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

use depin_core::{HistoryStatus, NotificationKind, ReadingStatus, Severity, Theme};

/// Application theme with all UI colors.
#[derive(Debug, Clone, Copy)]
pub struct AppTheme {
    pub primary: Color,

    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub info: Color,

    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    pub border_active: Color,
    pub border_inactive: Color,

    pub bg: Color,
    pub bg_selected: Color,
    pub bg_header: Color,
}

impl Default for AppTheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl AppTheme {
    #[must_use]
    pub const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    #[must_use]
    pub const fn dark() -> Self {
        Self {
            primary: Color::Rgb(129, 140, 248), // indigo-400

            success: Color::Rgb(74, 222, 128), // green-400
            warning: Color::Rgb(251, 191, 36), // amber-400
            danger: Color::Rgb(248, 113, 113), // red-400
            info: Color::Rgb(96, 165, 250),    // blue-400

            text_primary: Color::Rgb(243, 244, 246), // gray-100
            text_secondary: Color::Rgb(156, 163, 175), // gray-400
            text_muted: Color::Rgb(107, 114, 128),   // gray-500

            border_active: Color::Rgb(129, 140, 248),
            border_inactive: Color::Rgb(55, 65, 81), // gray-700

            bg: Color::Reset,
            bg_selected: Color::Rgb(55, 65, 81),
            bg_header: Color::Rgb(31, 41, 55), // gray-800
        }
    }

    #[must_use]
    pub const fn light() -> Self {
        Self {
            primary: Color::Rgb(79, 70, 229), // indigo-600

            success: Color::Rgb(22, 163, 74), // green-600
            warning: Color::Rgb(217, 119, 6), // amber-600
            danger: Color::Rgb(220, 38, 38),  // red-600
            info: Color::Rgb(37, 99, 235),    // blue-600

            text_primary: Color::Rgb(17, 24, 39),    // gray-900
            text_secondary: Color::Rgb(75, 85, 99),  // gray-600
            text_muted: Color::Rgb(156, 163, 175),   // gray-400

            border_active: Color::Rgb(79, 70, 229),
            border_inactive: Color::Rgb(209, 213, 219), // gray-300

            bg: Color::Rgb(249, 250, 251), // gray-50
            bg_selected: Color::Rgb(229, 231, 235),
            bg_header: Color::Rgb(243, 244, 246),
        }
    }

    #[inline]
    #[must_use]
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border_inactive)
    }

    #[inline]
    #[must_use]
    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.bg_selected)
            .fg(self.text_primary)
            .add_modifier(Modifier::BOLD)
    }

    #[inline]
    #[must_use]
    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    #[inline]
    #[must_use]
    pub fn header_style(&self) -> Style {
        Style::default().bg(self.bg_header)
    }

    #[inline]
    #[must_use]
    pub fn muted(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn reading_color(&self, status: ReadingStatus) -> Color {
        match status {
            ReadingStatus::Normal => self.success,
            ReadingStatus::Warning => self.warning,
            ReadingStatus::Critical => self.danger,
        }
    }

    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Low => self.info,
            Severity::Medium => self.warning,
            Severity::High => self.danger,
        }
    }

    pub fn history_color(&self, status: HistoryStatus) -> Color {
        match status {
            HistoryStatus::Verified => self.success,
            HistoryStatus::Pending => self.warning,
            HistoryStatus::Failed => self.danger,
        }
    }

    pub fn notification_color(&self, kind: NotificationKind) -> Color {
        match kind {
            NotificationKind::Success => self.success,
            NotificationKind::Warning => self.warning,
            NotificationKind::Error => self.danger,
            NotificationKind::Info => self.info,
        }
    }
}

/// Default border type for all blocks.
pub const BORDER_TYPE: BorderType = BorderType::Rounded;
