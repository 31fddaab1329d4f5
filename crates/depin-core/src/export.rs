//! CSV and file-name helpers for exports.
//!
//! Rows are joined with commas and no quoting is applied, so a field that
//! itself contains a comma shifts the columns of its row.

use std::fmt::Write as _;

use time::Date;
use time::macros::format_description;

use depin_types::{HistoryEntry, format_timestamp};

/// Header line of a history export.
pub const CSV_HEADER: &str = "ID,Device,Hash,Value,Timestamp,Status";

/// Render entries as CSV, one line per entry after the header.
///
/// Lines are separated by `\n` with no trailing newline.
pub fn history_csv<'a>(entries: impl IntoIterator<Item = &'a HistoryEntry>) -> String {
    let mut out = String::from(CSV_HEADER);
    for entry in entries {
        let _ = write!(
            out,
            "\n{},{},{},{},{},{}",
            entry.id,
            entry.device,
            entry.hash,
            entry.value,
            format_timestamp(entry.timestamp),
            entry.status
        );
    }
    out
}

fn iso_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

/// File name of a history export made on `date`: `iot-history-YYYY-MM-DD.csv`.
pub fn history_file_name(date: Date) -> String {
    format!("iot-history-{}.csv", iso_date(date))
}

/// File name of a settings export made on `date`: `iot-settings-YYYY-MM-DD.json`.
pub fn settings_file_name(date: Date) -> String {
    format!("iot-settings-{}.json", iso_date(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use depin_types::HistoryStatus;
    use time::macros::{date, datetime};

    fn entry(id: u64, device: &str, status: HistoryStatus) -> HistoryEntry {
        HistoryEntry {
            id,
            device: device.into(),
            hash: format!("0x{:08x}", id),
            value: "23.5°C".into(),
            timestamp: datetime!(2025-01-02 03:04:05 UTC),
            status,
        }
    }

    #[test]
    fn test_two_entries_three_lines() {
        let entries = [
            entry(1, "Sensor-01", HistoryStatus::Verified),
            entry(2, "Sensor-02", HistoryStatus::Failed),
        ];
        let csv = history_csv(&entries);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "1,Sensor-01,0x00000001,23.5°C,2025-01-02 03:04:05,verified"
        );
        assert_eq!(
            lines[2].split(',').collect::<Vec<_>>(),
            vec!["2", "Sensor-02", "0x00000002", "23.5°C", "2025-01-02 03:04:05", "failed"]
        );
    }

    #[test]
    fn test_empty_export_is_header_only() {
        let none: [HistoryEntry; 0] = [];
        assert_eq!(history_csv(&none), CSV_HEADER);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(history_file_name(date!(2025 - 03 - 07)), "iot-history-2025-03-07.csv");
        assert_eq!(
            settings_file_name(date!(2025 - 12 - 31)),
            "iot-settings-2025-12-31.json"
        );
    }
}
