//! Application state for the TUI.
//!
//! [`App`] owns the [`Monitor`] whose views the UI renders, the shell-wide
//! [`AppContext`], and the subscriptions that keep the visible tab fresh.
//! Only the active tab's view is synced; the notification feed is synced
//! for the whole session.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, warn};

use depin_core::chart::ChartPeriod;
use depin_core::export::{history_file_name, settings_file_name};
use depin_core::history::StatusFilter;
use depin_core::notifications::NotificationFeed;
use depin_core::{AppContext, Intervals, Monitor, Settings, SettingsForm, Subscription};
use depin_types::settings::{DATA_RETENTION_CHOICES, LANGUAGE_CHOICES, REFRESH_INTERVAL_CHOICES};

use crate::cli::SettingKey;
use crate::commands::{apply_setting, save_form};
use crate::util::{today, write_export};

use super::ui::theme::AppTheme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 5;

/// Maximum number of queued status messages.
const MAX_STATUS_MESSAGES: usize = 5;

/// Rows of the settings tab, in display order.
pub const SETTING_ROWS: [SettingKey; 11] = [
    SettingKey::FullName,
    SettingKey::Email,
    SettingKey::Phone,
    SettingKey::EmailNotifications,
    SettingKey::SmsNotifications,
    SettingKey::AlertNotifications,
    SettingKey::AutoRefresh,
    SettingKey::RefreshInterval,
    SettingKey::DataRetention,
    SettingKey::Theme,
    SettingKey::Language,
];

/// Tabs of the shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Dashboard,
    Blockchain,
    Analysis,
    History,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Dashboard,
        Tab::Blockchain,
        Tab::Analysis,
        Tab::History,
        Tab::Settings,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Blockchain => "Blockchain",
            Tab::Analysis => "AI Analysis",
            Tab::History => "History",
            Tab::Settings => "Settings",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Action waiting for a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    ResetSettings,
}

/// What the text field is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    Search,
    Setting(SettingKey),
}

/// Label shown for a settings row.
pub fn setting_label(key: SettingKey) -> &'static str {
    match key {
        SettingKey::FullName => "Full name",
        SettingKey::Email => "Email",
        SettingKey::Phone => "Phone",
        SettingKey::EmailNotifications => "Email notifications",
        SettingKey::SmsNotifications => "SMS notifications",
        SettingKey::AlertNotifications => "Alert notifications",
        SettingKey::AutoRefresh => "Auto refresh",
        SettingKey::RefreshInterval => "Refresh interval",
        SettingKey::DataRetention => "Data retention",
        SettingKey::Theme => "Theme",
        SettingKey::Language => "Language",
    }
}

/// Current value of a settings row as shown in the form.
pub fn setting_value(settings: &Settings, key: SettingKey) -> String {
    let on_off = |b: bool| (if b { "on" } else { "off" }).to_string();
    match key {
        SettingKey::FullName => settings.full_name.clone(),
        SettingKey::Email => settings.email.clone(),
        SettingKey::Phone => settings.phone.clone(),
        SettingKey::EmailNotifications => on_off(settings.email_notifications),
        SettingKey::SmsNotifications => on_off(settings.sms_notifications),
        SettingKey::AlertNotifications => on_off(settings.alert_notifications),
        SettingKey::AutoRefresh => on_off(settings.auto_refresh),
        SettingKey::RefreshInterval => format!("{} s", settings.refresh_interval),
        SettingKey::DataRetention => format!("{} days", settings.data_retention),
        SettingKey::Theme => settings.theme.to_string(),
        SettingKey::Language => settings.language.clone(),
    }
}

/// Whether a settings row is edited as free text.
pub fn is_text_setting(key: SettingKey) -> bool {
    matches!(
        key,
        SettingKey::FullName | SettingKey::Email | SettingKey::Phone
    )
}

fn next_choice<T: Copy + PartialEq>(choices: &[T], current: T) -> T {
    let next = choices
        .iter()
        .position(|c| *c == current)
        .map_or(0, |i| (i + 1) % choices.len());
    choices[next]
}

/// Toggle or step a non-text setting to its next value.
fn cycle_setting(settings: &mut Settings, key: SettingKey) {
    match key {
        SettingKey::EmailNotifications => {
            settings.email_notifications = !settings.email_notifications
        }
        SettingKey::SmsNotifications => settings.sms_notifications = !settings.sms_notifications,
        SettingKey::AlertNotifications => {
            settings.alert_notifications = !settings.alert_notifications
        }
        SettingKey::AutoRefresh => settings.auto_refresh = !settings.auto_refresh,
        SettingKey::RefreshInterval => {
            settings.refresh_interval =
                next_choice(&REFRESH_INTERVAL_CHOICES, settings.refresh_interval)
        }
        SettingKey::DataRetention => {
            settings.data_retention = next_choice(&DATA_RETENTION_CHOICES, settings.data_retention)
        }
        SettingKey::Theme => settings.theme = settings.theme.toggle(),
        SettingKey::Language => {
            settings.language =
                next_choice(&LANGUAGE_CHOICES, settings.language.as_str()).to_string()
        }
        SettingKey::FullName | SettingKey::Email | SettingKey::Phone => {}
    }
}

/// Main application state for the TUI.
pub struct App {
    pub monitor: Monitor,
    pub ctx: AppContext,
    intervals: Intervals,
    export_dir: PathBuf,
    /// Sync of the active tab's view. Settings has none.
    subscription: Option<Subscription>,
    notification_subscription: Option<Subscription>,
    pub active_tab: Tab,
    pub should_quit: bool,
    pub show_help: bool,
    pub show_notifications: bool,
    pub selected_notification: usize,
    pub settings: SettingsForm,
    pub selected_setting: usize,
    /// Text field target, if the user is typing.
    pub editing: Option<TextTarget>,
    pub input_buffer: String,
    pub pending_confirmation: Option<PendingAction>,
    status_messages: Vec<(String, Instant)>,
}

impl App {
    pub fn new(monitor: Monitor, ctx: AppContext, intervals: Intervals, export_dir: PathBuf) -> Self {
        let settings = SettingsForm::load(ctx.store());
        Self {
            monitor,
            ctx,
            intervals,
            export_dir,
            subscription: None,
            notification_subscription: None,
            active_tab: Tab::default(),
            should_quit: false,
            show_help: false,
            show_notifications: false,
            selected_notification: 0,
            settings,
            selected_setting: 0,
            editing: None,
            input_buffer: String::new(),
            pending_confirmation: None,
            status_messages: Vec::new(),
        }
    }

    /// Start the notification feed and the active tab's sync.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        let notifications = self.monitor.watch_notifications(&self.intervals)?;
        self.notification_subscription = Some(notifications);
        self.resubscribe()
    }

    /// Stop every subscription.
    pub fn stop(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.stop();
        }
        if let Some(sub) = self.notification_subscription.take() {
            sub.stop();
        }
    }

    /// Replace the active tab's subscription with a fresh one.
    fn resubscribe(&mut self) -> Result<()> {
        if let Some(old) = self.subscription.take() {
            old.stop();
        }
        let monitor = &self.monitor;
        let intervals = &self.intervals;
        self.subscription = match self.active_tab {
            Tab::Dashboard => Some(monitor.watch(&monitor.dashboard, intervals)?),
            Tab::Blockchain => Some(monitor.watch(&monitor.blockchain, intervals)?),
            Tab::Analysis => Some(monitor.watch(&monitor.analysis, intervals)?),
            Tab::History => Some(monitor.watch(&monitor.history, intervals)?),
            Tab::Settings => None,
        };
        debug!("Active tab is now {}", self.active_tab.title());
        Ok(())
    }

    /// Name of the view currently being synced, if any.
    pub fn synced_view(&self) -> Option<&'static str> {
        self.subscription.as_ref().map(Subscription::name)
    }

    pub fn set_tab(&mut self, tab: Tab) {
        if tab == self.active_tab {
            return;
        }
        self.active_tab = tab;
        if let Err(e) = self.resubscribe() {
            warn!("Failed to start sync for {}: {}", tab.title(), e);
            self.push_status_message(format!("Sync failed to start: {}", e));
        }
    }

    /// Restart the active tab's sync so it fetches right away.
    pub fn refresh(&mut self) {
        match self.resubscribe() {
            Ok(()) if self.subscription.is_some() => {
                self.push_status_message(format!("Refreshing {}...", self.active_tab.title()))
            }
            Ok(()) => {}
            Err(e) => self.push_status_message(format!("Refresh failed: {}", e)),
        }
    }

    /// Propagate the active sync's health to the shell's online flag.
    pub fn update_online(&self) {
        if let Some(sub) = &self.subscription {
            self.ctx.set_online(!sub.stats().is_failing());
        }
    }

    /// Last error of the active sync, if it is currently failing.
    pub fn sync_error(&self) -> Option<String> {
        self.subscription
            .as_ref()
            .map(Subscription::stats)
            .filter(|s| s.is_failing())
            .and_then(|s| s.last_error)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn app_theme(&self) -> AppTheme {
        AppTheme::for_theme(self.ctx.theme())
    }

    pub fn toggle_theme(&mut self) {
        match self.ctx.toggle_theme() {
            Ok(theme) => self.push_status_message(format!("Theme: {}", theme)),
            Err(e) => self.push_status_message(format!("Failed to save theme: {}", e)),
        }
    }

    /// Add a status message to the queue.
    pub fn push_status_message(&mut self, message: String) {
        self.status_messages.push((message, Instant::now()));
        while self.status_messages.len() > MAX_STATUS_MESSAGES {
            self.status_messages.remove(0);
        }
    }

    /// Remove expired status messages.
    pub fn clean_expired_messages(&mut self) {
        let timeout = std::time::Duration::from_secs(STATUS_MESSAGE_TIMEOUT_SECS);
        self.status_messages
            .retain(|(_, created)| created.elapsed() < timeout);
    }

    /// Get the current status message to display.
    pub fn current_status_message(&self) -> Option<&str> {
        self.status_messages.last().map(|(msg, _)| msg.as_str())
    }

    // Notifications

    pub fn unread_count(&self) -> usize {
        self.monitor.notifications.read(NotificationFeed::unread_count)
    }

    pub fn mark_all_read(&mut self) {
        self.monitor.notifications.update(NotificationFeed::mark_all_read);
    }

    pub fn clear_notifications(&mut self) {
        self.monitor.notifications.update(NotificationFeed::clear);
        self.selected_notification = 0;
        self.push_status_message("Notifications cleared".to_string());
    }

    pub fn select_next_notification(&mut self) {
        let len = self.monitor.notifications.read(NotificationFeed::len);
        if len > 0 {
            self.selected_notification = (self.selected_notification + 1) % len;
        }
    }

    pub fn select_previous_notification(&mut self) {
        let len = self.monitor.notifications.read(NotificationFeed::len);
        if len > 0 {
            self.selected_notification = (self.selected_notification + len - 1) % len;
        }
    }

    pub fn mark_selected_notification_read(&mut self) {
        let index = self.selected_notification;
        self.monitor.notifications.update(|feed| {
            if let Some(id) = feed.items().get(index).map(|n| n.id) {
                feed.mark_read(id);
            }
        });
    }

    // Dashboard and analysis

    pub fn cycle_period(&mut self) {
        let period: ChartPeriod = self.monitor.dashboard.update(|v| {
            let next = v.chart().period().cycle();
            v.set_period(next);
            next
        });
        self.push_status_message(format!("Chart period: {}", period));
    }

    pub fn cycle_model(&mut self) {
        let model = self.monitor.analysis.update(|v| {
            v.cycle_model_filter();
            v.model_filter().map(str::to_string)
        });
        self.push_status_message(format!(
            "Model filter: {}",
            model.as_deref().unwrap_or("all models")
        ));
    }

    // History

    pub fn start_search(&mut self) {
        self.input_buffer = self.monitor.history.read(|v| v.query.search().to_string());
        self.editing = Some(TextTarget::Search);
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.monitor.history.update(|v| v.query.set_status(filter));
    }

    /// Write the filtered history to the export directory.
    pub fn export_history(&mut self) {
        let (csv, rows) = self
            .monitor
            .history
            .read(|v| (v.export_csv(), v.filtered().len()));
        let path = self.export_dir.join(history_file_name(today()));
        match write_export(&path, &csv) {
            Ok(()) => {
                self.push_status_message(format!("Exported {} rows to {}", rows, path.display()))
            }
            Err(e) => self.push_status_message(format!("Export failed: {:#}", e)),
        }
    }

    // Text field

    pub fn text_input(&mut self, c: char) {
        self.input_buffer.push(c);
        self.sync_search_input();
    }

    pub fn text_backspace(&mut self) {
        self.input_buffer.pop();
        self.sync_search_input();
    }

    /// Search filters as the user types.
    fn sync_search_input(&mut self) {
        if self.editing == Some(TextTarget::Search) {
            let search = self.input_buffer.clone();
            self.monitor.history.update(|v| v.query.set_search(search));
        }
    }

    pub fn text_submit(&mut self) {
        let value = std::mem::take(&mut self.input_buffer);
        match self.editing.take() {
            Some(TextTarget::Setting(key)) => {
                if let Err(e) = apply_setting(self.settings.draft_mut(), key, &value) {
                    self.push_status_message(format!("{:#}", e));
                }
            }
            Some(TextTarget::Search) | None => {}
        }
    }

    pub fn text_cancel(&mut self) {
        if self.editing.take() == Some(TextTarget::Search) {
            self.monitor.history.update(|v| v.query.set_search(""));
        }
        self.input_buffer.clear();
    }

    // Settings

    pub fn selected_setting_key(&self) -> SettingKey {
        SETTING_ROWS[self.selected_setting.min(SETTING_ROWS.len() - 1)]
    }

    pub fn select_next_setting(&mut self) {
        self.selected_setting = (self.selected_setting + 1) % SETTING_ROWS.len();
    }

    pub fn select_previous_setting(&mut self) {
        self.selected_setting = (self.selected_setting + SETTING_ROWS.len() - 1) % SETTING_ROWS.len();
    }

    /// Edit a text row, or step any other row to its next value.
    pub fn activate_setting(&mut self) {
        let key = self.selected_setting_key();
        if is_text_setting(key) {
            self.input_buffer = setting_value(self.settings.draft(), key);
            self.editing = Some(TextTarget::Setting(key));
        } else {
            cycle_setting(self.settings.draft_mut(), key);
        }
    }

    pub fn save_settings(&mut self) {
        if !self.settings.is_dirty() {
            self.push_status_message("No changes to save".to_string());
            return;
        }
        match save_form(&mut self.settings, &self.ctx) {
            Ok(()) => self.push_status_message("Settings saved".to_string()),
            Err(e) => self.push_status_message(format!("{:#}", e)),
        }
    }

    pub fn discard_settings(&mut self) {
        self.settings.discard();
        self.push_status_message("Changes discarded".to_string());
    }

    pub fn request_confirmation(&mut self, action: PendingAction) {
        self.pending_confirmation = Some(action);
    }

    pub fn cancel_confirmation(&mut self) {
        self.pending_confirmation = None;
    }

    /// Run the pending action.
    pub fn confirm_action(&mut self) {
        match self.pending_confirmation.take() {
            Some(PendingAction::ResetSettings) => self.reset_settings(),
            None => {}
        }
    }

    fn reset_settings(&mut self) {
        let result = self
            .settings
            .reset_to_defaults(self.ctx.store())
            .map_err(anyhow::Error::new)
            .and_then(|()| {
                self.ctx
                    .set_theme(self.settings.saved().theme)
                    .map_err(anyhow::Error::new)
            });
        match result {
            Ok(()) => self.push_status_message("Settings reset to defaults".to_string()),
            Err(e) => self.push_status_message(format!("Reset failed: {}", e)),
        }
    }

    fn settings_path(&self) -> PathBuf {
        self.export_dir.join(settings_file_name(today()))
    }

    pub fn export_settings(&mut self) {
        let path = self.settings_path();
        let result = self
            .settings
            .export_json()
            .map_err(anyhow::Error::new)
            .and_then(|json| write_export(&path, &json));
        match result {
            Ok(()) => self.push_status_message(format!("Exported settings to {}", path.display())),
            Err(e) => self.push_status_message(format!("Export failed: {:#}", e)),
        }
    }

    /// Load today's settings export into the draft. The user saves it.
    pub fn import_settings(&mut self) {
        let path = self.settings_path();
        let result = std::fs::read_to_string(&path)
            .map_err(anyhow::Error::new)
            .and_then(|json| self.settings.import_json(&json).map_err(anyhow::Error::new));
        match result {
            Ok(()) => self.push_status_message(format!(
                "Imported {}, press s to save",
                path.display()
            )),
            Err(e) => self.push_status_message(format!("Import failed: {}", e)),
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use depin_core::{HistoryStatus, Simulator, SettingsStore, Theme};

    fn app(export_dir: PathBuf) -> App {
        App::new(
            Monitor::new(Arc::new(Simulator::with_seed(11))),
            AppContext::new(SettingsStore::in_memory()),
            Intervals::default(),
            export_dir,
        )
    }

    #[test]
    fn test_tab_cycle_wraps() {
        assert_eq!(Tab::Dashboard.previous(), Tab::Settings);
        assert_eq!(Tab::Settings.next(), Tab::Dashboard);
        assert_eq!(Tab::Analysis.next(), Tab::History);
        assert_eq!(Tab::History.index(), 3);
    }

    #[test]
    fn test_status_messages_are_capped() {
        let mut app = app(PathBuf::from("."));
        for i in 0..8 {
            app.push_status_message(format!("message {i}"));
        }
        assert_eq!(app.status_messages.len(), MAX_STATUS_MESSAGES);
        assert_eq!(app.current_status_message(), Some("message 7"));
    }

    #[tokio::test]
    async fn test_tab_switch_replaces_subscription() {
        let mut app = app(PathBuf::from("."));
        app.start().unwrap();
        assert_eq!(app.synced_view(), Some("dashboard"));

        app.set_tab(Tab::History);
        assert_eq!(app.synced_view(), Some("history"));

        app.set_tab(Tab::Settings);
        assert_eq!(app.synced_view(), None);
        assert!(app.notification_subscription.as_ref().unwrap().is_active());
        app.stop();
    }

    #[test]
    fn test_search_filters_while_typing() {
        let mut app = app(PathBuf::from("."));
        app.monitor.history.update(|v| v.set_page(3));
        app.start_search();
        for c in "sensor".chars() {
            app.text_input(c);
        }
        app.monitor.history.read(|v| {
            assert_eq!(v.query.search(), "sensor");
            assert_eq!(v.query.page(), 1);
        });

        app.text_cancel();
        assert_eq!(app.editing, None);
        assert_eq!(app.monitor.history.read(|v| v.query.search().to_string()), "");
    }

    #[test]
    fn test_status_filter_applies_to_history() {
        let mut app = app(PathBuf::from("."));
        app.set_status_filter(StatusFilter::Only(HistoryStatus::Pending));
        assert_eq!(
            app.monitor.history.read(|v| v.query.status()),
            StatusFilter::Only(HistoryStatus::Pending)
        );
    }

    #[test]
    fn test_cycle_settings_values() {
        let mut settings = Settings::default();
        cycle_setting(&mut settings, SettingKey::RefreshInterval);
        assert_eq!(settings.refresh_interval, 60);
        cycle_setting(&mut settings, SettingKey::DataRetention);
        assert_eq!(settings.data_retention, 180);
        cycle_setting(&mut settings, SettingKey::Language);
        assert_eq!(settings.language, "hi");
        cycle_setting(&mut settings, SettingKey::SmsNotifications);
        assert!(settings.sms_notifications);

        settings.refresh_interval = 300;
        cycle_setting(&mut settings, SettingKey::RefreshInterval);
        assert_eq!(settings.refresh_interval, 10);
    }

    #[test]
    fn test_edit_and_save_text_setting() {
        let mut app = app(PathBuf::from("."));
        app.activate_setting();
        assert_eq!(app.editing, Some(TextTarget::Setting(SettingKey::FullName)));
        app.input_buffer.clear();
        for c in "Field Operator".chars() {
            app.text_input(c);
        }
        app.text_submit();
        assert!(app.settings.is_dirty());

        app.save_settings();
        assert_eq!(app.ctx.store().load_settings().full_name, "Field Operator");
        assert!(!app.settings.is_dirty());
    }

    #[test]
    fn test_invalid_draft_is_not_saved() {
        let mut app = app(PathBuf::from("."));
        app.settings.draft_mut().email = "not-an-email".to_string();
        app.save_settings();
        assert!(app.settings.is_dirty());
        assert_eq!(app.ctx.store().load_settings().email, "admin@iot.com");
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let mut app = app(PathBuf::from("."));
        app.settings.draft_mut().theme = Theme::Light;
        app.save_settings();
        assert_eq!(app.ctx.theme(), Theme::Light);

        app.request_confirmation(PendingAction::ResetSettings);
        app.cancel_confirmation();
        assert_eq!(app.ctx.store().load_settings().theme, Theme::Light);

        app.request_confirmation(PendingAction::ResetSettings);
        app.confirm_action();
        assert_eq!(app.ctx.store().load_settings(), Settings::default());
        assert_eq!(app.ctx.theme(), Theme::Dark);
    }

    #[test]
    fn test_export_files_land_in_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path().to_path_buf());

        app.export_history();
        let csv = std::fs::read_to_string(dir.path().join(history_file_name(today()))).unwrap();
        assert!(csv.starts_with(depin_core::export::CSV_HEADER));

        app.settings.draft_mut().phone = "+1 555 0100".to_string();
        app.save_settings();
        app.export_settings();
        app.reset_settings();
        app.import_settings();
        assert_eq!(app.settings.draft().phone, "+1 555 0100");
        assert!(app.settings.is_dirty());
    }

    #[test]
    fn test_notification_selection_and_read() {
        let mut app = app(PathBuf::from("."));
        let unread = app.unread_count();
        assert!(unread > 0);

        // The newest seeded notification is unread.
        app.mark_selected_notification_read();
        assert_eq!(app.unread_count(), unread - 1);

        app.select_previous_notification();
        assert_eq!(app.selected_notification, 4);
        app.mark_all_read();
        assert_eq!(app.unread_count(), 0);
    }

    #[test]
    fn test_clear_notifications_only_with_panel_open() {
        use crate::tui::input::{Action, apply_action};

        let mut app = app(PathBuf::from("."));
        apply_action(&mut app, Action::ClearNotifications);
        assert_eq!(app.monitor.notifications.read(NotificationFeed::len), 5);

        apply_action(&mut app, Action::ToggleNotifications);
        apply_action(&mut app, Action::SelectNext);
        apply_action(&mut app, Action::ClearNotifications);
        assert_eq!(app.monitor.notifications.read(NotificationFeed::len), 0);
        assert_eq!(app.unread_count(), 0);
        assert_eq!(app.selected_notification, 0);

        // Selection keys on an empty feed are harmless.
        apply_action(&mut app, Action::SelectNext);
        apply_action(&mut app, Action::Activate);
        assert_eq!(app.selected_notification, 0);
    }
}
