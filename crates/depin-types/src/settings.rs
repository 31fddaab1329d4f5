//! Persisted user settings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::Theme;

/// Refresh interval choices offered in the settings form, in seconds.
pub const REFRESH_INTERVAL_CHOICES: [u32; 4] = [10, 30, 60, 300];

/// Data retention choices offered in the settings form, in days.
pub const DATA_RETENTION_CHOICES: [u32; 4] = [30, 90, 180, 365];

/// Language codes offered in the settings form.
pub const LANGUAGE_CHOICES: [&str; 3] = ["en", "hi", "es"];

/// User settings as stored under the `iot-settings` key.
///
/// Field names serialize in camelCase. Numeric fields also accept their
/// string form (`"30"`) so older stored blobs still load.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Settings {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub alert_notifications: bool,
    pub auto_refresh: bool,
    /// Seconds between automatic refreshes.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "number_or_string"))]
    pub refresh_interval: u32,
    /// Days of history to keep.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "number_or_string"))]
    pub data_retention: u32,
    pub theme: Theme,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            full_name: String::from("Admin User"),
            email: String::from("admin@iot.com"),
            phone: String::from("+91 98765 43210"),
            email_notifications: true,
            sms_notifications: false,
            alert_notifications: true,
            auto_refresh: true,
            refresh_interval: 30,
            data_retention: 90,
            theme: Theme::Dark,
            language: String::from("en"),
        }
    }
}

#[cfg(feature = "serde")]
fn number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
