//! Platform-agnostic types for the DePIN monitoring console.
//!
//! This crate holds the entities shared by the sync engine (`depin-core`)
//! and the terminal front end (`depin-cli`).
//!
//! # Features
//!
//! - Sensor readings, blocks, analysis results, history entries
//! - Notification and theme types
//! - Persisted user settings with defaults
//! - Timestamp helpers in the console's display format
//!
//! # Example
//!
//! ```
//! use depin_types::{ReadingStatus, SensorReading, Unit};
//! use time::OffsetDateTime;
//!
//! let reading = SensorReading::new(1, "Sensor-01", 23.5, Unit::Celsius, OffsetDateTime::UNIX_EPOCH);
//! assert_eq!(reading.status, ReadingStatus::Normal);
//! assert_eq!(reading.display_value(), "23.5°C");
//! ```

pub mod error;
pub mod settings;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use settings::Settings;
pub use types::{
    AiStats, AnalysisResult, Block, BlockStatus, ChainStats, DashboardStats,
    GENESIS_PREVIOUS_HASH, HistoryEntry, HistoryStatus, Notification, NotificationKind,
    ReadingStatus, SensorReading, Severity, Theme, Unit, format_timestamp, parse_timestamp,
    relative_time, shorten_hash, verify_linkage,
};

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    fn now() -> OffsetDateTime {
        datetime!(2025-06-01 12:00:00 UTC)
    }

    fn chain(len: usize) -> Vec<Block> {
        let mut blocks = vec![Block::genesis(12541, "0x01".into(), now())];
        for i in 1..len {
            let next = blocks[0].next(format!("0x{:02x}", i + 1), 10, "Peer-01", now());
            blocks.insert(0, next);
        }
        blocks
    }

    // --- Block linkage ---

    #[test]
    fn test_genesis_has_zero_previous_hash() {
        let genesis = Block::genesis(12541, "0xabc".into(), now());
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert_eq!(genesis.status, BlockStatus::Confirmed);
    }

    #[test]
    fn test_next_links_to_parent() {
        let parent = Block::genesis(7, "0xparent".into(), now());
        let child = parent.next("0xchild".into(), 25, "Peer-03", now());
        assert_eq!(child.height, 8);
        assert_eq!(child.previous_hash, "0xparent");
        assert_eq!(child.miner, "Peer-03");
        assert_eq!(child.transactions, 25);
    }

    #[test]
    fn test_verify_linkage_accepts_built_chain() {
        let blocks = chain(5);
        assert_eq!(blocks[0].height, 12545);
        assert!(verify_linkage(&blocks));
    }

    #[test]
    fn test_verify_linkage_trivial_slices() {
        assert!(verify_linkage(&[]));
        assert!(verify_linkage(&chain(1)));
    }

    #[test]
    fn test_verify_linkage_detects_broken_hash() {
        let mut blocks = chain(4);
        blocks[1].previous_hash = "0xdead".into();
        assert!(!verify_linkage(&blocks));
    }

    #[test]
    fn test_verify_linkage_detects_height_gap() {
        let mut blocks = chain(3);
        blocks[0].height += 1;
        assert!(!verify_linkage(&blocks));
    }

    #[test]
    fn test_short_hash() {
        assert_eq!(shorten_hash("0x1234567890abcdef", 10), "0x12345678...");
        assert_eq!(shorten_hash("0x12", 10), "0x12");
    }

    // --- Status parsing ---

    #[test]
    fn test_history_status_aliases() {
        assert_eq!("Confirmed".parse::<HistoryStatus>(), Ok(HistoryStatus::Verified));
        assert_eq!(" pending ".parse::<HistoryStatus>(), Ok(HistoryStatus::Pending));
        assert_eq!("failed".parse::<HistoryStatus>(), Ok(HistoryStatus::Failed));

        let err = "lost".parse::<HistoryStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown history status: 'lost'");
    }

    #[test]
    fn test_severity_parse_and_order() {
        assert_eq!("HIGH".parse::<Severity>(), Ok(Severity::High));
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_theme_toggle_and_parse() {
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!("light".parse::<Theme>(), Ok(Theme::Light));
        assert_eq!(Theme::default(), Theme::Dark);
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!("°C".parse::<Unit>(), Ok(Unit::Celsius));
        assert_eq!("kPa".parse::<Unit>(), Ok(Unit::Kilopascal));
        assert!("mph".parse::<Unit>().is_err());
    }

    // --- Reading classification ---

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(ReadingStatus::classify(Unit::Celsius, 30.0), ReadingStatus::Normal);
        assert_eq!(ReadingStatus::classify(Unit::Celsius, 30.1), ReadingStatus::Warning);
        assert_eq!(ReadingStatus::classify(Unit::Celsius, 40.0), ReadingStatus::Warning);
        assert_eq!(ReadingStatus::classify(Unit::Percent, 65.2), ReadingStatus::Normal);
        assert_eq!(ReadingStatus::classify(Unit::Kilopascal, 98.7), ReadingStatus::Warning);
        assert_eq!(ReadingStatus::classify(Unit::Kilopascal, 101.0), ReadingStatus::Critical);
    }

    // --- Time helpers ---

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(now()), "2025-06-01 12:00:00");
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = parse_timestamp("2025-06-01T10:00:00Z", now()).unwrap();
        assert_eq!(ts, datetime!(2025-06-01 10:00:00 UTC));
    }

    #[test]
    fn test_relative_time_edges() {
        let n = now();
        assert_eq!(relative_time(n - Duration::seconds(59), n), "Just now");
        assert_eq!(relative_time(n - Duration::minutes(59), n), "59 min ago");
        assert_eq!(relative_time(n - Duration::hours(23), n), "23 h ago");
        // Clock skew into the future still reads as fresh.
        assert_eq!(relative_time(n + Duration::minutes(2), n), "Just now");
    }

    #[test]
    fn test_notification_relative_time() {
        let n = Notification {
            id: 1,
            kind: NotificationKind::Info,
            title: "System Info".into(),
            message: "Scheduled maintenance tonight".into(),
            read: false,
            created_at: now() - Duration::minutes(12),
        };
        assert_eq!(n.relative_time(now()), "12 min ago");
    }

    // --- Settings ---

    #[test]
    fn test_settings_defaults() {
        let s = Settings::default();
        assert_eq!(s.full_name, "Admin User");
        assert_eq!(s.email, "admin@iot.com");
        assert!(s.email_notifications);
        assert!(!s.sms_notifications);
        assert_eq!(s.refresh_interval, 30);
        assert_eq!(s.data_retention, 90);
        assert_eq!(s.theme, Theme::Dark);
        assert_eq!(s.language, "en");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_settings_camel_case_with_string_numbers() {
        let json = r#"{"fullName":"Ops","refreshInterval":"60","dataRetention":180,"theme":"light"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.full_name, "Ops");
        assert_eq!(s.refresh_interval, 60);
        assert_eq!(s.data_retention, 180);
        assert_eq!(s.theme, Theme::Light);
        // Missing fields fall back to defaults.
        assert_eq!(s.email, "admin@iot.com");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_settings_serialize_camel_case() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(value["fullName"], "Admin User");
        assert_eq!(value["autoRefresh"], true);
        assert_eq!(value["refreshInterval"], 30);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_history_entry_json_shape() {
        let entry = HistoryEntry {
            id: 3,
            device: "Sensor-02".into(),
            hash: "0x1a2b3c4d".into(),
            value: "65.2%".into(),
            timestamp: now(),
            status: HistoryStatus::Pending,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["timestamp"], "2025-06-01T12:00:00Z");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn classify_is_monotonic_in_value(a in -50.0f64..150.0, b in -50.0f64..150.0) {
            for unit in Unit::ALL {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(ReadingStatus::classify(unit, lo) <= ReadingStatus::classify(unit, hi));
            }
        }

        #[test]
        fn theme_toggle_is_involution(dark in any::<bool>()) {
            let theme = if dark { Theme::Dark } else { Theme::Light };
            prop_assert_eq!(theme.toggle().toggle(), theme);
        }
    }
}
