//! Keyboard input handling for the TUI.
//!
//! Keys are mapped to [`Action`]s without looking at application state;
//! [`apply_action`] then decides what each action means on the active tab.
//!
//! # Key Bindings
//!
//! | Key       | Action            |
//! |-----------|-------------------|
//! | `q`       | Quit              |
//! | `r`       | Refresh now       |
//! | `Tab` / `l` | Next tab        |
//! | `BackTab` / `h` | Previous tab |
//! | `↓` / `j` | Select next       |
//! | `↑` / `k` | Select previous   |
//! | `t`       | Toggle theme      |
//! | `n`       | Notifications     |
//! | `m`       | Mark all read     |
//! | `C`       | Clear notifications |
//! | `/`       | Search history    |
//! | `0`-`3`   | Status filter     |
//! | `[` / `]` | Previous/next page |
//! | `e`       | Export CSV        |
//! | `p`       | Chart period      |
//! | `c`       | Cycle model filter |
//! | `Enter`   | Edit setting      |
//! | `s` / `x` | Save/discard settings |
//! | `R`       | Reset settings    |
//! | `E` / `I` | Export/import settings |
//! | `?`       | Toggle help       |

use crossterm::event::KeyCode;
use depin_core::history::StatusFilter;

use super::app::{App, PendingAction, Tab};

/// User actions that can be triggered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application.
    Quit,
    /// Restart the active tab's sync with an immediate fetch.
    Refresh,
    /// Switch to the next tab.
    NextTab,
    /// Switch to the previous tab.
    PreviousTab,
    /// Select the next item in the list.
    SelectNext,
    /// Select the previous item in the list.
    SelectPrevious,
    /// Toggle the help overlay.
    ToggleHelp,
    /// Switch between dark and light theme.
    ToggleTheme,
    /// Show or hide the notification panel.
    ToggleNotifications,
    /// Mark every notification as read.
    MarkAllRead,
    /// Remove every notification (panel open only).
    ClearNotifications,
    /// Start typing a history search.
    StartSearch,
    /// Filter history by status.
    SetStatusFilter(StatusFilter),
    /// Go to the next history page.
    NextPage,
    /// Go to the previous history page.
    PreviousPage,
    /// Export the filtered history as CSV.
    Export,
    /// Cycle the activity chart period.
    CyclePeriod,
    /// Cycle the detection model filter.
    CycleModel,
    /// Edit, toggle or cycle the selected item.
    Activate,
    /// Save the settings draft.
    SaveSettings,
    /// Discard unsaved settings changes.
    DiscardSettings,
    /// Reset settings to defaults (asks first).
    ResetSettings,
    /// Write settings to a JSON file.
    ExportSettings,
    /// Load settings from a JSON file.
    ImportSettings,
    /// Close the topmost overlay.
    Dismiss,
    /// Confirm the pending action.
    Confirm,
    /// Cancel the pending action.
    Cancel,
    /// Type a character into the text field.
    TextInput(char),
    /// Delete the last character of the text field.
    TextBackspace,
    /// Accept the text field.
    TextSubmit,
    /// Abandon the text field.
    TextCancel,
    /// No action.
    None,
}

/// Map a key to an action.
///
/// Text editing captures every key; a pending confirmation only accepts
/// yes or no.
pub fn handle_key(key: KeyCode, editing_text: bool, has_pending_confirmation: bool) -> Action {
    if editing_text {
        return match key {
            KeyCode::Enter => Action::TextSubmit,
            KeyCode::Esc => Action::TextCancel,
            KeyCode::Backspace => Action::TextBackspace,
            KeyCode::Char(c) => Action::TextInput(c),
            _ => Action::None,
        };
    }

    if has_pending_confirmation {
        return match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => Action::Confirm,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Action::Cancel,
            _ => Action::None,
        };
    }

    match key {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Tab | KeyCode::Char('l') => Action::NextTab,
        KeyCode::BackTab | KeyCode::Char('h') => Action::PreviousTab,
        KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
        KeyCode::Up | KeyCode::Char('k') => Action::SelectPrevious,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('t') => Action::ToggleTheme,
        KeyCode::Char('n') => Action::ToggleNotifications,
        KeyCode::Char('m') => Action::MarkAllRead,
        KeyCode::Char('C') => Action::ClearNotifications,
        KeyCode::Char('/') => Action::StartSearch,
        KeyCode::Char(c @ '0'..='3') => {
            Action::SetStatusFilter(StatusFilter::ALL[usize::from(c as u8 - b'0')])
        }
        KeyCode::Char('[') | KeyCode::Left => Action::PreviousPage,
        KeyCode::Char(']') | KeyCode::Right => Action::NextPage,
        KeyCode::Char('e') => Action::Export,
        KeyCode::Char('p') => Action::CyclePeriod,
        KeyCode::Char('c') => Action::CycleModel,
        KeyCode::Enter => Action::Activate,
        KeyCode::Char('s') => Action::SaveSettings,
        KeyCode::Char('x') => Action::DiscardSettings,
        KeyCode::Char('R') => Action::ResetSettings,
        KeyCode::Char('E') => Action::ExportSettings,
        KeyCode::Char('I') => Action::ImportSettings,
        KeyCode::Esc => Action::Dismiss,
        _ => Action::None,
    }
}

/// Apply an action to the application state.
pub fn apply_action(app: &mut App, action: Action) {
    match action {
        Action::Quit => app.should_quit = true,
        Action::Refresh => app.refresh(),
        Action::NextTab => app.set_tab(app.active_tab.next()),
        Action::PreviousTab => app.set_tab(app.active_tab.previous()),
        Action::SelectNext => {
            if app.show_notifications {
                app.select_next_notification();
            } else if app.active_tab == Tab::Settings {
                app.select_next_setting();
            }
        }
        Action::SelectPrevious => {
            if app.show_notifications {
                app.select_previous_notification();
            } else if app.active_tab == Tab::Settings {
                app.select_previous_setting();
            }
        }
        Action::ToggleHelp => app.show_help = !app.show_help,
        Action::ToggleTheme => app.toggle_theme(),
        Action::ToggleNotifications => {
            app.show_notifications = !app.show_notifications;
            app.selected_notification = 0;
        }
        Action::MarkAllRead => app.mark_all_read(),
        Action::ClearNotifications => {
            if app.show_notifications {
                app.clear_notifications();
            }
        }
        Action::StartSearch => {
            if app.active_tab == Tab::History {
                app.start_search();
            }
        }
        Action::SetStatusFilter(filter) => {
            if app.active_tab == Tab::History {
                app.set_status_filter(filter);
            }
        }
        Action::NextPage => {
            if app.active_tab == Tab::History {
                app.monitor.history.update(|v| v.next_page());
            }
        }
        Action::PreviousPage => {
            if app.active_tab == Tab::History {
                app.monitor.history.update(|v| v.prev_page());
            }
        }
        Action::Export => {
            if app.active_tab == Tab::History {
                app.export_history();
            }
        }
        Action::CyclePeriod => {
            if app.active_tab == Tab::Dashboard {
                app.cycle_period();
            }
        }
        Action::CycleModel => {
            if app.active_tab == Tab::Analysis {
                app.cycle_model();
            }
        }
        Action::Activate => {
            if app.show_notifications {
                app.mark_selected_notification_read();
            } else if app.active_tab == Tab::Settings {
                app.activate_setting();
            }
        }
        Action::SaveSettings => {
            if app.active_tab == Tab::Settings {
                app.save_settings();
            }
        }
        Action::DiscardSettings => {
            if app.active_tab == Tab::Settings {
                app.discard_settings();
            }
        }
        Action::ResetSettings => {
            if app.active_tab == Tab::Settings {
                app.request_confirmation(PendingAction::ResetSettings);
            }
        }
        Action::ExportSettings => {
            if app.active_tab == Tab::Settings {
                app.export_settings();
            }
        }
        Action::ImportSettings => {
            if app.active_tab == Tab::Settings {
                app.import_settings();
            }
        }
        Action::Dismiss => {
            if app.show_help {
                app.show_help = false;
            } else if app.show_notifications {
                app.show_notifications = false;
            }
        }
        Action::Confirm => app.confirm_action(),
        Action::Cancel => app.cancel_confirmation(),
        Action::TextInput(c) => app.text_input(c),
        Action::TextBackspace => app.text_backspace(),
        Action::TextSubmit => app.text_submit(),
        Action::TextCancel => app.text_cancel(),
        Action::None => {}
    }
}
