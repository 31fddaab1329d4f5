//! Core entity types for the monitoring console.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, Time};

use crate::error::{ParseError, ParseResult};

/// Number of hex digits in a simulated block hash (after the `0x` prefix).
pub const BLOCK_HASH_HEX_LEN: usize = 64;

/// Previous-hash value carried by the first block of a chain.
pub const GENESIS_PREVIOUS_HASH: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

/// Measurement unit of a sensor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Unit {
    /// Degrees Celsius.
    #[cfg_attr(feature = "serde", serde(rename = "°C"))]
    Celsius,
    /// Relative percentage (humidity).
    #[cfg_attr(feature = "serde", serde(rename = "%"))]
    Percent,
    /// Kilopascal (pressure).
    #[cfg_attr(feature = "serde", serde(rename = "kPa"))]
    Kilopascal,
}

impl Unit {
    /// All units, in display order.
    pub const ALL: [Unit; 3] = [Unit::Celsius, Unit::Percent, Unit::Kilopascal];

    /// The unit symbol as shown next to a value.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Percent => "%",
            Unit::Kilopascal => "kPa",
        }
    }

    /// Format a value with this unit, one decimal place.
    ///
    /// ```
    /// use depin_types::Unit;
    ///
    /// assert_eq!(Unit::Celsius.format_value(23.54), "23.5°C");
    /// assert_eq!(Unit::Kilopascal.format_value(98.7), "98.7 kPa");
    /// ```
    #[must_use]
    pub fn format_value(self, value: f64) -> String {
        match self {
            Unit::Kilopascal => format!("{:.1} {}", value, self.symbol()),
            _ => format!("{:.1}{}", value, self.symbol()),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        match s.trim() {
            "°C" | "C" | "c" | "celsius" => Ok(Unit::Celsius),
            "%" | "percent" => Ok(Unit::Percent),
            "kPa" | "kpa" => Ok(Unit::Kilopascal),
            other => Err(ParseError::unknown("unit", other)),
        }
    }
}

/// Health status of a live sensor reading.
///
/// Ordered by urgency: `Normal < Warning < Critical`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ReadingStatus {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl ReadingStatus {
    /// Classify a value by the thresholds of its unit.
    ///
    /// ```
    /// use depin_types::{ReadingStatus, Unit};
    ///
    /// assert_eq!(ReadingStatus::classify(Unit::Celsius, 25.0), ReadingStatus::Normal);
    /// assert_eq!(ReadingStatus::classify(Unit::Celsius, 35.0), ReadingStatus::Warning);
    /// assert_eq!(ReadingStatus::classify(Unit::Celsius, 41.0), ReadingStatus::Critical);
    /// assert_eq!(ReadingStatus::classify(Unit::Percent, 95.0), ReadingStatus::Critical);
    /// ```
    #[must_use]
    pub fn classify(unit: Unit, value: f64) -> Self {
        let (warning, critical) = match unit {
            Unit::Celsius => (30.0, 40.0),
            Unit::Percent => (80.0, 90.0),
            Unit::Kilopascal => (95.0, 100.0),
        };
        if value > critical {
            ReadingStatus::Critical
        } else if value > warning {
            ReadingStatus::Warning
        } else {
            ReadingStatus::Normal
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReadingStatus::Normal => "normal",
            ReadingStatus::Warning => "warning",
            ReadingStatus::Critical => "critical",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "ok" => Ok(ReadingStatus::Normal),
            "warning" => Ok(ReadingStatus::Warning),
            "critical" => Ok(ReadingStatus::Critical),
            other => Err(ParseError::unknown("reading status", other)),
        }
    }
}

/// A single device measurement shown on the dashboard.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorReading {
    pub id: u64,
    /// Device identifier (e.g. `Sensor-01`).
    pub device: String,
    pub value: f64,
    pub unit: Unit,
    pub status: ReadingStatus,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
}

impl SensorReading {
    /// Create a reading, classifying its status from the value.
    #[must_use]
    pub fn new(id: u64, device: &str, value: f64, unit: Unit, timestamp: OffsetDateTime) -> Self {
        Self {
            id,
            device: device.to_string(),
            value,
            unit,
            status: ReadingStatus::classify(unit, value),
            timestamp,
        }
    }

    /// Value and unit as displayed, e.g. `23.5°C`.
    #[must_use]
    pub fn display_value(&self) -> String {
        self.unit.format_value(self.value)
    }
}

/// Confirmation state of a block. Blocks are only ever recorded as confirmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[non_exhaustive]
pub enum BlockStatus {
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "Confirmed"))]
    Confirmed,
}

impl fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockStatus::Confirmed => f.write_str("confirmed"),
        }
    }
}

/// A block in the (cosmetic) ledger.
///
/// Blocks are linked only by construction: [`Block::next`] copies the parent's
/// hash into `previous_hash` and bumps the height. No content hash is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Block {
    pub height: u64,
    pub hash: String,
    pub previous_hash: String,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    pub transactions: u32,
    pub miner: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: BlockStatus,
}

impl Block {
    /// Create the first block of a chain at an arbitrary seed height.
    #[must_use]
    pub fn genesis(height: u64, hash: String, timestamp: OffsetDateTime) -> Self {
        Self {
            height,
            hash,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            timestamp,
            transactions: 0,
            miner: String::from("genesis"),
            status: BlockStatus::Confirmed,
        }
    }

    /// Create the successor of this block.
    ///
    /// ```
    /// use depin_types::Block;
    /// use time::OffsetDateTime;
    ///
    /// let now = OffsetDateTime::UNIX_EPOCH;
    /// let parent = Block::genesis(100, "0xabc".into(), now);
    /// let child = parent.next("0xdef".into(), 12, "Peer-01", now);
    /// assert_eq!(child.height, 101);
    /// assert_eq!(child.previous_hash, "0xabc");
    /// ```
    #[must_use]
    pub fn next(
        &self,
        hash: String,
        transactions: u32,
        miner: &str,
        timestamp: OffsetDateTime,
    ) -> Self {
        Self {
            height: self.height + 1,
            hash,
            previous_hash: self.hash.clone(),
            timestamp,
            transactions,
            miner: miner.to_string(),
            status: BlockStatus::Confirmed,
        }
    }

    /// Abbreviated hash for narrow displays (`0x7a8f3e2d...`).
    #[must_use]
    pub fn short_hash(&self) -> String {
        shorten_hash(&self.hash, 10)
    }
}

/// Check the linkage invariant over a newest-first slice of blocks.
///
/// Every block must point at the hash of the block after it in the slice and
/// sit exactly one height above it. Empty and single-block slices are linked.
#[must_use]
pub fn verify_linkage(blocks: &[Block]) -> bool {
    blocks.windows(2).all(|pair| {
        let (newer, older) = (&pair[0], &pair[1]);
        newer.previous_hash == older.hash && newer.height == older.height + 1
    })
}

/// Truncate a hash to `len` characters followed by an ellipsis.
#[must_use]
pub fn shorten_hash(hash: &str, len: usize) -> String {
    if hash.chars().count() <= len {
        hash.to_string()
    } else {
        let prefix: String = hash.chars().take(len).collect();
        format!("{}...", prefix)
    }
}

/// Urgency of a detection result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(ParseError::unknown("severity", other)),
        }
    }
}

/// A detection reported by the anomaly analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisResult {
    pub id: u64,
    pub device: String,
    /// Kind of detection (e.g. `Temperature Anomaly`).
    pub detection_type: String,
    pub severity: Severity,
    /// Confidence percentage, 0-100.
    pub confidence: u8,
    pub description: String,
    pub recommendation: String,
    /// Name of the model that produced the result.
    pub model: String,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub detected_at: OffsetDateTime,
}

/// Verification state of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HistoryStatus {
    Verified,
    Pending,
    Failed,
}

impl HistoryStatus {
    pub const ALL: [HistoryStatus; 3] = [
        HistoryStatus::Verified,
        HistoryStatus::Pending,
        HistoryStatus::Failed,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryStatus::Verified => "verified",
            HistoryStatus::Pending => "pending",
            HistoryStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryStatus {
    type Err = ParseError;

    /// Parse a status word, accepting the backend's vocabulary as well.
    ///
    /// ```
    /// use depin_types::HistoryStatus;
    ///
    /// assert_eq!("verified".parse::<HistoryStatus>(), Ok(HistoryStatus::Verified));
    /// assert_eq!("normal".parse::<HistoryStatus>(), Ok(HistoryStatus::Verified));
    /// assert_eq!("CRITICAL".parse::<HistoryStatus>(), Ok(HistoryStatus::Failed));
    /// assert!("bogus".parse::<HistoryStatus>().is_err());
    /// ```
    fn from_str(s: &str) -> ParseResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verified" | "normal" | "confirmed" => Ok(HistoryStatus::Verified),
            "pending" => Ok(HistoryStatus::Pending),
            "failed" | "critical" => Ok(HistoryStatus::Failed),
            other => Err(ParseError::unknown("history status", other)),
        }
    }
}

/// One row of the verified-data log.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistoryEntry {
    pub id: u64,
    pub device: String,
    pub hash: String,
    /// Value with unit, as recorded (e.g. `23.5°C`).
    pub value: String,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    pub status: HistoryStatus,
}

/// Category of a shell notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NotificationKind {
    Info,
    Warning,
    Success,
    Error,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::Info,
        NotificationKind::Warning,
        NotificationKind::Success,
        NotificationKind::Error,
    ];
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Info => write!(f, "info"),
            NotificationKind::Warning => write!(f, "warning"),
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Error => write!(f, "error"),
        }
    }
}

/// A message in the shell's notification feed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub created_at: OffsetDateTime,
}

impl Notification {
    /// Creation time relative to `now` (`Just now`, `5 min ago`, ...).
    #[must_use]
    pub fn relative_time(&self, now: OffsetDateTime) -> String {
        relative_time(self.created_at, now)
    }
}

/// Describe how long ago `then` was, relative to `now`.
///
/// ```
/// use depin_types::relative_time;
/// use time::{Duration, OffsetDateTime};
///
/// let now = OffsetDateTime::UNIX_EPOCH + Duration::days(10);
/// assert_eq!(relative_time(now, now), "Just now");
/// assert_eq!(relative_time(now - Duration::minutes(5), now), "5 min ago");
/// assert_eq!(relative_time(now - Duration::hours(3), now), "3 h ago");
/// assert_eq!(relative_time(now - Duration::days(2), now), "2 d ago");
/// ```
#[must_use]
pub fn relative_time(then: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed = now - then;
    if elapsed.whole_minutes() < 1 {
        "Just now".to_string()
    } else if elapsed.whole_hours() < 1 {
        format!("{} min ago", elapsed.whole_minutes())
    } else if elapsed.whole_days() < 1 {
        format!("{} h ago", elapsed.whole_hours())
    } else {
        format!("{} d ago", elapsed.whole_days())
    }
}

/// Dashboard aggregate figures.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DashboardStats {
    pub active_devices: u32,
    pub total_data: u64,
    pub alerts: u32,
    /// Uptime percentage.
    pub uptime: f64,
}

impl Default for DashboardStats {
    fn default() -> Self {
        Self {
            active_devices: 0,
            total_data: 0,
            alerts: 0,
            uptime: 100.0,
        }
    }
}

/// Ledger aggregate figures.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChainStats {
    pub total_blocks: u64,
    pub total_transactions: u64,
    /// Average block time in seconds.
    pub average_block_time: f64,
    /// Network hash rate in TH/s.
    pub network_hash_rate: f64,
}

/// Analysis aggregate figures.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AiStats {
    pub total_analyses: u64,
    pub anomalies_detected: u64,
    /// Rolling accuracy percentage.
    pub accuracy: f64,
    pub models_active: u32,
}

impl Default for AiStats {
    fn default() -> Self {
        Self {
            total_analyses: 0,
            anomalies_detected: 0,
            accuracy: 94.2,
            models_active: 1,
        }
    }
}

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(ParseError::unknown("theme", other)),
        }
    }
}

/// Format a timestamp the way the console shows it: `YYYY-MM-DD HH:MM:SS`.
#[must_use]
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_default()
}

/// Parse a backend timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, RFC 3339, or a bare `HH:MM:SS` which is
/// placed on the date of `today`. Naive values are taken as UTC.
///
/// ```
/// use depin_types::parse_timestamp;
/// use time::macros::datetime;
///
/// let today = datetime!(2025-03-01 08:00 UTC);
/// assert_eq!(
///     parse_timestamp("2025-02-28 23:59:01", today).unwrap(),
///     datetime!(2025-02-28 23:59:01 UTC)
/// );
/// assert_eq!(
///     parse_timestamp("12:30:00", today).unwrap(),
///     datetime!(2025-03-01 12:30:00 UTC)
/// );
/// assert!(parse_timestamp("yesterday", today).is_err());
/// ```
pub fn parse_timestamp(s: &str, today: OffsetDateTime) -> ParseResult<OffsetDateTime> {
    let s = s.trim();
    if let Ok(dt) = PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(dt.assume_utc());
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339) {
        return Ok(dt);
    }
    if let Ok(t) = Time::parse(s, format_description!("[hour]:[minute]:[second]")) {
        return Ok(today.replace_time(t));
    }
    Err(ParseError::InvalidTimestamp(s.to_string()))
}
