//! Synthetic data source.
//!
//! [`Simulator`] stands in for the backend: every request produces plausible
//! random data derived from the view's current state. It is also the test
//! double for the poller.
//!
//! # Features
//!
//! - **Seedable**: [`Simulator::with_seed`] gives reproducible output
//! - **Failure injection**: fail every request, or only the next `n`
//! - **Latency simulation**: delay every request by a fixed duration
//!
//! The first request for a view that holds no data answers with a seed
//! snapshot; later requests produce one new record each.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::OffsetDateTime;
use tracing::debug;

use depin_types::{
    AiStats, AnalysisResult, Block, ChainStats, DashboardStats, HistoryEntry,
    HistoryStatus, Notification, NotificationKind, SensorReading, Severity, Unit,
    types::BLOCK_HASH_HEX_LEN,
};

use crate::analysis::{AnalysisContext, AnalysisUpdate, MODELS};
use crate::blockchain::{ChainContext, ChainUpdate};
use crate::chart::{ACTIVITY_MAX, ACTIVITY_MIN};
use crate::dashboard::{DashboardContext, DashboardUpdate};
use crate::error::{Error, Result};
use crate::history::{HistoryContext, HistoryUpdate};
use crate::source::{DataSource, SourceKind};
use crate::stats::{drift_accuracy, drift_uptime};

/// Device identifiers the simulator reports.
pub const DEVICES: [&str; 5] = ["Sensor-01", "Sensor-02", "Sensor-03", "Sensor-04", "Sensor-05"];

/// Miner labels for simulated blocks.
pub const MINERS: [&str; 5] = ["Peer-01", "Peer-02", "Peer-03", "Peer-04", "Peer-05"];

/// Detection types for simulated analysis results.
pub const DETECTION_TYPES: [&str; 7] = [
    "Temperature Anomaly",
    "Pattern Recognition",
    "Predictive Alert",
    "Pressure Deviation",
    "Humidity Warning",
    "Vibration Alert",
    "Network Anomaly",
];

/// Height of the first simulated block.
pub const SEED_HEIGHT: u64 = 12541;

/// Number of hex digits in a simulated history hash.
const HISTORY_HASH_HEX_LEN: usize = 8;

/// Chance that a pending history entry is verified on a given cycle.
const CONFIRM_PROBABILITY: f64 = 0.3;

const HEX: &[u8; 16] = b"0123456789abcdef";

fn recommendations(severity: Severity) -> &'static [&'static str] {
    match severity {
        Severity::High => &[
            "Immediate inspection recommended. Check cooling system.",
            "Critical alert - shutdown may be required.",
            "Emergency maintenance needed within 2 hours.",
            "Inspect hardware immediately for damage.",
        ],
        Severity::Medium => &[
            "Monitor for next 24 hours. May indicate valve issue.",
            "Schedule maintenance check within 48 hours.",
            "Investigate sensor calibration.",
            "Review system logs for patterns.",
        ],
        Severity::Low => &[
            "No immediate action required. Continue monitoring.",
            "Normal fluctuation - no concern.",
            "Track trend over next week.",
            "Update baseline parameters if consistent.",
        ],
    }
}

fn notification_text(kind: NotificationKind) -> (&'static [&'static str], &'static [&'static str]) {
    match kind {
        NotificationKind::Info => (
            &["Device Update", "System Info", "New Feature"],
            &["System updated successfully", "New device detected", "Cache cleared"],
        ),
        NotificationKind::Warning => (
            &["Temperature Warning", "Low Battery", "Memory Alert"],
            &[
                "Temperature rising above threshold",
                "Battery below 20%",
                "Memory usage high",
            ],
        ),
        NotificationKind::Success => (
            &["Task Complete", "Backup Success", "Update Installed"],
            &["All systems operational", "Data synced", "Configuration saved"],
        ),
        NotificationKind::Error => (
            &["Connection Lost", "Sensor Failure", "Error Detected"],
            &[
                "Network timeout",
                "Sensor not responding",
                "Failed to authenticate",
            ],
        ),
    }
}

fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn random_hash<R: Rng + ?Sized>(rng: &mut R, hex_len: usize) -> String {
    let mut hash = String::with_capacity(hex_len + 2);
    hash.push_str("0x");
    for _ in 0..hex_len {
        hash.push(HEX[rng.random_range(0..HEX.len())] as char);
    }
    hash
}

/// Random data source with failure and latency injection.
pub struct Simulator {
    rng: Mutex<StdRng>,
    next_id: AtomicU64,
    request_count: AtomicU32,
    should_fail: AtomicBool,
    remaining_failures: AtomicU32,
    /// Simulated request latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .field("requests", &self.request_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    /// Create a simulator seeded from the operating system.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Create a simulator with reproducible output.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            next_id: AtomicU64::new(1),
            request_count: AtomicU32::new(0),
            should_fail: AtomicBool::new(false),
            remaining_failures: AtomicU32::new(0),
            latency_ms: AtomicU64::new(0),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Make every request fail (or succeed again).
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::Relaxed);
    }

    /// Fail the next `count` requests, then succeed.
    pub fn set_transient_failures(&self, count: u32) {
        self.remaining_failures.store(count, Ordering::Relaxed);
    }

    /// Delay every request by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of requests served or failed so far.
    pub fn request_count(&self) -> u32 {
        self.request_count.load(Ordering::Relaxed)
    }

    async fn begin_request(&self, what: &str) -> Result<()> {
        self.request_count.fetch_add(1, Ordering::Relaxed);

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let transient = self
            .remaining_failures
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if transient || self.should_fail.load(Ordering::Relaxed) {
            return Err(Error::Unavailable(format!("simulated {what} failure")));
        }

        debug!("Simulating {} request", what);
        Ok(())
    }

    // --- Generators ---

    /// The four dashboard readings shown before the first update.
    pub fn seed_readings(&self, now: OffsetDateTime) -> Vec<SensorReading> {
        [
            ("Sensor-01", 23.5, Unit::Celsius, 2),
            ("Sensor-02", 65.2, Unit::Percent, 3),
            ("Sensor-03", 98.7, Unit::Kilopascal, 5),
            ("Sensor-04", 45.1, Unit::Celsius, 7),
        ]
        .into_iter()
        .map(|(device, value, unit, minutes_ago)| {
            SensorReading::new(
                self.next_id(),
                device,
                value,
                unit,
                now - time::Duration::minutes(minutes_ago),
            )
        })
        .collect()
    }

    /// Random-walk a reading by up to ±2 and reclassify it.
    pub fn jitter_reading(&self, reading: &SensorReading, now: OffsetDateTime) -> SensorReading {
        let delta = self.with_rng(|rng| rng.random_range(-2.0..2.0));
        let value = round1(reading.value + delta);
        SensorReading::new(reading.id, &reading.device, value, reading.unit, now)
    }

    fn drift_dashboard_stats(&self, stats: DashboardStats) -> DashboardStats {
        self.with_rng(|rng| DashboardStats {
            active_devices: stats
                .active_devices
                .saturating_add_signed(rng.random_range(-1..=1)),
            total_data: stats.total_data + rng.random_range(0..10),
            alerts: stats.alerts.saturating_add_signed(rng.random_range(-1..=1)),
            uptime: drift_uptime(stats.uptime, rng.random_range(-0.1..0.1)),
        })
    }

    /// The three blocks a fresh chain starts with, newest first.
    pub fn seed_chain(&self, now: OffsetDateTime) -> Vec<Block> {
        let genesis_hash = self.with_rng(|rng| random_hash(rng, BLOCK_HASH_HEX_LEN));
        let mut genesis = Block::genesis(SEED_HEIGHT, genesis_hash, now - time::Duration::minutes(10));
        genesis.transactions = 32;
        genesis.miner = MINERS[0].to_string();

        let second = genesis.next(
            self.with_rng(|rng| random_hash(rng, BLOCK_HASH_HEX_LEN)),
            18,
            MINERS[1],
            now - time::Duration::minutes(5),
        );
        let third = second.next(
            self.with_rng(|rng| random_hash(rng, BLOCK_HASH_HEX_LEN)),
            24,
            MINERS[0],
            now,
        );
        vec![third, second, genesis]
    }

    /// Produce the successor of `parent` with random contents.
    pub fn mine_block(&self, parent: &Block, now: OffsetDateTime) -> Block {
        self.with_rng(|rng| {
            let hash = random_hash(rng, BLOCK_HASH_HEX_LEN);
            let transactions = rng.random_range(10..40);
            let miner = *pick(rng, &MINERS);
            parent.next(hash, transactions, miner, now)
        })
    }

    fn chain_rates(&self) -> (f64, f64) {
        self.with_rng(|rng| {
            (
                round1(rng.random_range(4.0..6.0)),
                round1(rng.random_range(13.0..18.0)),
            )
        })
    }

    /// Build one analysis result with random contents.
    pub fn generate_analysis(&self, now: OffsetDateTime) -> AnalysisResult {
        let id = self.next_id();
        self.with_rng(|rng| {
            let severity = *pick(rng, &Severity::ALL);
            let device = *pick(rng, &DEVICES);
            let detection_type = *pick(rng, &DETECTION_TYPES);
            let model = *pick(rng, &MODELS);
            let confidence = match severity {
                Severity::High => rng.random_range(80..100),
                Severity::Medium => rng.random_range(60..80),
                Severity::Low => rng.random_range(50..70),
            };
            let high = severity == Severity::High;
            let description = match detection_type {
                "Temperature Anomaly" => format!(
                    "{} showing {}°C {}",
                    device,
                    rng.random_range(10..30),
                    if high { "spike" } else { "variation" }
                ),
                "Pattern Recognition" => format!(
                    "Recurring pattern detected every {} minutes",
                    rng.random_range(15..75)
                ),
                "Predictive Alert" => format!(
                    "Readings trending {} {}",
                    if high { "rapidly" } else { "gradually" },
                    if rng.random_bool(0.5) { "upward" } else { "downward" }
                ),
                "Pressure Deviation" => format!(
                    "Pressure reading {:.1}% {} normal range",
                    rng.random_range(5.0..25.0),
                    if high { "above" } else { "outside" }
                ),
                "Humidity Warning" => format!(
                    "Humidity at {}% - {} level",
                    rng.random_range(60..90),
                    if high { "critical" } else { "elevated" }
                ),
                "Vibration Alert" => format!(
                    "Abnormal vibration frequency detected at {}Hz",
                    rng.random_range(50..150)
                ),
                "Network Anomaly" => format!(
                    "Unusual {} in network traffic detected",
                    if high { "spike" } else { "pattern" }
                ),
                other => format!("{} detected on {}", other, device),
            };
            AnalysisResult {
                id,
                device: device.to_string(),
                detection_type: detection_type.to_string(),
                severity,
                confidence,
                description,
                recommendation: pick(rng, recommendations(severity)).to_string(),
                model: model.to_string(),
                detected_at: now,
            }
        })
    }

    /// The three results a fresh analysis view starts with, newest first.
    pub fn seed_analysis(&self, now: OffsetDateTime) -> Vec<AnalysisResult> {
        [
            (
                "Sensor-01",
                "Temperature Anomaly",
                Severity::High,
                92,
                "Unusual temperature spike detected - 15°C above normal range",
                "Immediate inspection recommended. Check cooling system.",
                "Isolation Forest",
                0,
            ),
            (
                "Sensor-03",
                "Pattern Recognition",
                Severity::Medium,
                78,
                "Recurring pressure fluctuations every 30 minutes",
                "Monitor for next 24 hours. May indicate valve issue.",
                "LSTM Neural Network",
                5,
            ),
            (
                "Sensor-02",
                "Predictive Alert",
                Severity::Low,
                65,
                "Humidity levels trending upward gradually",
                "No immediate action required. Continue monitoring.",
                "Random Forest",
                10,
            ),
        ]
        .into_iter()
        .map(
            |(device, kind, severity, confidence, description, recommendation, model, ago)| {
                AnalysisResult {
                    id: self.next_id(),
                    device: device.to_string(),
                    detection_type: kind.to_string(),
                    severity,
                    confidence,
                    description: description.to_string(),
                    recommendation: recommendation.to_string(),
                    model: model.to_string(),
                    detected_at: now - time::Duration::minutes(ago),
                }
            },
        )
        .collect()
    }

    /// Build one history entry with random contents.
    pub fn generate_history_entry(&self, now: OffsetDateTime) -> HistoryEntry {
        let id = self.next_id();
        self.with_rng(|rng| {
            let device = *pick(rng, &DEVICES);
            let unit = *pick(rng, &Unit::ALL);
            let value = match unit {
                Unit::Celsius => rng.random_range(20.0..50.0),
                Unit::Percent => rng.random_range(50.0..90.0),
                Unit::Kilopascal => rng.random_range(85.0..105.0),
            };
            let status = if rng.random_bool(0.7) {
                HistoryStatus::Verified
            } else if rng.random_bool(0.8) {
                HistoryStatus::Pending
            } else {
                HistoryStatus::Failed
            };
            HistoryEntry {
                id,
                device: device.to_string(),
                hash: random_hash(rng, HISTORY_HASH_HEX_LEN),
                value: unit.format_value(value),
                timestamp: now,
                status,
            }
        })
    }

    /// The eight entries a fresh history log starts with, newest first.
    pub fn seed_history(&self, now: OffsetDateTime) -> Vec<HistoryEntry> {
        use HistoryStatus::{Failed, Pending, Verified};
        [
            ("Sensor-01", "0x7a8f3e2d", Verified, "23.5°C", 5),
            ("Sensor-02", "0x9b4c7f1a", Verified, "65.2%", 7),
            ("Sensor-03", "0x2d6e4b8c", Pending, "98.7 kPa", 10),
            ("Sensor-04", "0x5c1a9e3f", Verified, "45.1°C", 12),
            ("Sensor-01", "0x8e7d2a4b", Verified, "22.8°C", 15),
            ("Sensor-02", "0x3f9b6c5d", Verified, "64.9%", 18),
            ("Sensor-03", "0x4a2c8e1f", Failed, "97.3 kPa", 20),
            ("Sensor-04", "0x6d8f3b7a", Verified, "44.5°C", 23),
        ]
        .into_iter()
        .map(|(device, hash, status, value, ago)| HistoryEntry {
            id: self.next_id(),
            device: device.to_string(),
            hash: hash.to_string(),
            value: value.to_string(),
            timestamp: now - time::Duration::minutes(ago),
            status,
        })
        .collect()
    }

    /// Pick which pending ids get verified this cycle.
    pub fn confirm_pending(&self, pending: &[u64]) -> Vec<u64> {
        self.with_rng(|rng| {
            pending
                .iter()
                .copied()
                .filter(|_| rng.random_bool(CONFIRM_PROBABILITY))
                .collect()
        })
    }

    /// Build one shell notification with random contents.
    pub fn generate_notification(&self, now: OffsetDateTime) -> Notification {
        let id = self.next_id();
        self.with_rng(|rng| {
            let kind = *pick(rng, &NotificationKind::ALL);
            let (titles, messages) = notification_text(kind);
            Notification {
                id,
                kind,
                title: pick(rng, titles).to_string(),
                message: pick(rng, messages).to_string(),
                read: false,
                created_at: now,
            }
        })
    }
}

#[async_trait]
impl DataSource for Simulator {
    fn kind(&self) -> SourceKind {
        SourceKind::Simulated
    }

    async fn dashboard(&self, ctx: &DashboardContext) -> Result<DashboardUpdate> {
        self.begin_request("dashboard").await?;
        let now = OffsetDateTime::now_utc();

        if ctx.readings.is_empty() {
            return Ok(DashboardUpdate {
                stats: DashboardStats {
                    active_devices: 24,
                    total_data: 1543,
                    alerts: 3,
                    uptime: 99.9,
                },
                readings: self.seed_readings(now),
                activity: None,
            });
        }

        let readings = ctx
            .readings
            .iter()
            .map(|r| self.jitter_reading(r, now))
            .collect();
        let activity = self.with_rng(|rng| rng.random_range(ACTIVITY_MIN..ACTIVITY_MAX));
        Ok(DashboardUpdate {
            stats: self.drift_dashboard_stats(ctx.stats),
            readings,
            activity: Some(activity),
        })
    }

    async fn blockchain(&self, ctx: &ChainContext) -> Result<ChainUpdate> {
        self.begin_request("blockchain").await?;
        let now = OffsetDateTime::now_utc();

        let Some(head) = &ctx.head else {
            return Ok(ChainUpdate::Snapshot {
                stats: ChainStats {
                    total_blocks: SEED_HEIGHT + 2,
                    total_transactions: 302_156,
                    average_block_time: 5.2,
                    network_hash_rate: 15.3,
                },
                blocks: self.seed_chain(now),
            });
        };

        let block = self.mine_block(head, now);
        let (average_block_time, network_hash_rate) = self.chain_rates();
        let stats = ChainStats {
            total_blocks: ctx.stats.total_blocks + 1,
            total_transactions: ctx.stats.total_transactions + u64::from(block.transactions),
            average_block_time,
            network_hash_rate,
        };
        Ok(ChainUpdate::Mined { block, stats })
    }

    async fn analysis(&self, ctx: &AnalysisContext) -> Result<AnalysisUpdate> {
        self.begin_request("analysis").await?;
        let now = OffsetDateTime::now_utc();

        if ctx.empty {
            return Ok(AnalysisUpdate::Snapshot {
                stats: AiStats {
                    total_analyses: 15_234,
                    anomalies_detected: 342,
                    accuracy: 94.2,
                    models_active: MODELS.len() as u32,
                },
                results: self.seed_analysis(now),
            });
        }

        let result = self.generate_analysis(now);
        let delta = self.with_rng(|rng| rng.random_range(-0.2..0.2));
        let stats = AiStats {
            total_analyses: ctx.stats.total_analyses + 1,
            anomalies_detected: ctx.stats.anomalies_detected
                + u64::from(result.severity == Severity::High),
            accuracy: drift_accuracy(ctx.stats.accuracy, delta),
            models_active: ctx.stats.models_active,
        };
        Ok(AnalysisUpdate::Detected { result, stats })
    }

    async fn history(&self, ctx: &HistoryContext) -> Result<HistoryUpdate> {
        self.begin_request("history").await?;
        let now = OffsetDateTime::now_utc();

        if ctx.empty {
            return Ok(HistoryUpdate::Snapshot(self.seed_history(now)));
        }

        Ok(HistoryUpdate::Recorded {
            entry: Some(self.generate_history_entry(now)),
            confirmed: self.confirm_pending(&ctx.pending),
        })
    }

    async fn notification(&self) -> Result<Option<Notification>> {
        self.begin_request("notification").await?;
        Ok(Some(self.generate_notification(OffsetDateTime::now_utc())))
    }
}
