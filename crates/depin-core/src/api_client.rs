//! HTTP client for the monitoring backend.
//!
//! [`ApiClient`] implements [`DataSource`] against the backend's REST API.
//! Each view maps to one `GET` endpoint; responses are translated into the
//! same update types the simulator produces.
//!
//! # Example
//!
//! ```no_run
//! use depin_core::{ApiClient, DataSource};
//! use depin_core::dashboard::DashboardContext;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new("http://localhost:8000", Some("secret-key"))?;
//! let update = client.dashboard(&DashboardContext::default()).await?;
//! println!("Active devices: {}", update.stats.active_devices);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::debug;

use depin_types::{
    AiStats, AnalysisResult, Block, BlockStatus, ChainStats, DashboardStats, HistoryEntry,
    HistoryStatus, ReadingStatus, SensorReading, Severity, Unit, parse_timestamp,
};

use crate::analysis::{AnalysisContext, AnalysisUpdate};
use crate::blockchain::{ChainContext, ChainUpdate};
use crate::dashboard::{DashboardContext, DashboardUpdate};
use crate::error::{Error, Result};
use crate::history::{HistoryContext, HistoryUpdate};
use crate::source::{DataSource, SourceKind};

/// Header carrying the API credential.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Miner label given to blocks reported by the backend.
pub const LIVE_MINER: &str = "DePIN-Node-01";

/// Model name given to results reported by the backend.
pub const LIVE_MODEL: &str = "LSTM Neural Network";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ==========================================================================
// Wire Types
// ==========================================================================

/// `GET /api/dashboard` response.
#[derive(Debug, Clone, Deserialize)]
pub struct WireDashboard {
    pub stats: WireDashboardStats,
    #[serde(default)]
    pub recent_data: Vec<WireHistoryRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireDashboardStats {
    pub active: u32,
    pub scans: u64,
    pub anomalies: u32,
    pub uptime: f64,
}

/// One record of `GET /api/history` (also embedded in the dashboard).
#[derive(Debug, Clone, Deserialize)]
pub struct WireHistoryRecord {
    pub id: u64,
    pub device: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub temp: Option<f64>,
}

/// `GET /api/blockchain` response.
#[derive(Debug, Clone, Deserialize)]
pub struct WireBlockchain {
    #[serde(default)]
    pub total_blocks: u64,
    #[serde(default)]
    pub transactions: u64,
    #[serde(default)]
    pub recent_blocks: Vec<WireBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireBlock {
    pub id: u64,
    pub hash: String,
    #[serde(default)]
    pub prev_hash: String,
    #[serde(default)]
    pub timestamp: String,
}

/// `GET /api/ai-analysis` response.
#[derive(Debug, Clone, Deserialize)]
pub struct WireAnalysis {
    #[serde(default)]
    pub total_analyses: u64,
    #[serde(default)]
    pub anomalies_found: u64,
    #[serde(default)]
    pub recent_results: Vec<WireAnalysisResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireAnalysisResult {
    pub device: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub severity: Option<String>,
}

// ==========================================================================
// Mapping
// ==========================================================================

fn timestamp_or(raw: &str, now: OffsetDateTime) -> OffsetDateTime {
    parse_timestamp(raw, now).unwrap_or_else(|e| {
        debug!("Using receive time: {}", e);
        now
    })
}

/// Leading numeric part of a value string such as `23.5C`.
fn leading_number(raw: &str) -> Option<f64> {
    let end = raw
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
        .map_or(raw.len(), |(i, _)| i);
    raw[..end].parse().ok()
}

fn history_status(raw: &str) -> HistoryStatus {
    raw.parse().unwrap_or_else(|_| {
        debug!("Unknown history status '{}', treating as pending", raw);
        HistoryStatus::Pending
    })
}

/// Translate a history record into an entry.
pub fn map_history_record(record: &WireHistoryRecord, now: OffsetDateTime) -> HistoryEntry {
    HistoryEntry {
        id: record.id,
        device: record.device.clone(),
        hash: record.hash.clone(),
        value: record.value.clone(),
        timestamp: timestamp_or(&record.timestamp, now),
        status: history_status(&record.status),
    }
}

/// Translate an oldest-first history list into newest-first entries.
pub fn map_history(records: &[WireHistoryRecord], now: OffsetDateTime) -> Vec<HistoryEntry> {
    records
        .iter()
        .rev()
        .map(|r| map_history_record(r, now))
        .collect()
}

/// Translate a dashboard response; recent records become temperature readings.
pub fn map_dashboard(wire: &WireDashboard, now: OffsetDateTime) -> DashboardUpdate {
    let readings = wire
        .recent_data
        .iter()
        .rev()
        .map(|record| {
            let value = record
                .temp
                .or_else(|| leading_number(&record.value))
                .unwrap_or_default();
            let status = record
                .status
                .parse::<ReadingStatus>()
                .unwrap_or_else(|_| ReadingStatus::classify(Unit::Celsius, value));
            SensorReading {
                id: record.id,
                device: record.device.clone(),
                value,
                unit: Unit::Celsius,
                status,
                timestamp: timestamp_or(&record.timestamp, now),
            }
        })
        .collect();

    DashboardUpdate {
        stats: DashboardStats {
            active_devices: wire.stats.active,
            total_data: wire.stats.scans,
            alerts: wire.stats.anomalies,
            uptime: wire.stats.uptime,
        },
        readings,
        activity: None,
    }
}

/// Translate a chain response. Block time and hash rate are not reported
/// by the backend and keep their previous values.
pub fn map_blockchain(wire: &WireBlockchain, previous: &ChainStats, now: OffsetDateTime) -> ChainUpdate {
    let blocks = wire
        .recent_blocks
        .iter()
        .map(|b| Block {
            height: b.id,
            hash: b.hash.clone(),
            previous_hash: b.prev_hash.clone(),
            timestamp: timestamp_or(&b.timestamp, now),
            transactions: 1,
            miner: LIVE_MINER.to_string(),
            status: BlockStatus::Confirmed,
        })
        .collect();

    ChainUpdate::Snapshot {
        stats: ChainStats {
            total_blocks: wire.total_blocks,
            total_transactions: wire.transactions,
            average_block_time: previous.average_block_time,
            network_hash_rate: previous.network_hash_rate,
        },
        blocks,
    }
}

/// Translate an analysis response. Accuracy is not reported and is kept.
pub fn map_analysis(wire: &WireAnalysis, previous: &AiStats, now: OffsetDateTime) -> AnalysisUpdate {
    let results = wire
        .recent_results
        .iter()
        .enumerate()
        .map(|(index, r)| {
            let severity = r
                .severity
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Severity::Medium);
            AnalysisResult {
                id: index as u64,
                device: r.device.clone(),
                detection_type: if severity == Severity::High {
                    "Critical Anomaly".to_string()
                } else {
                    "Pattern Alert".to_string()
                },
                severity,
                confidence: r.confidence.round().clamp(0.0, 100.0) as u8,
                description: format!(
                    "Abnormal sensor behavior detected on {}. Value deviation observed.",
                    r.device
                ),
                recommendation: r.recommendation.clone(),
                model: LIVE_MODEL.to_string(),
                detected_at: timestamp_or(&r.timestamp, now),
            }
        })
        .collect();

    AnalysisUpdate::Snapshot {
        stats: AiStats {
            total_analyses: wire.total_analyses,
            anomalies_detected: wire.anomalies_found,
            accuracy: previous.accuracy,
            models_active: 1,
        },
        results,
    }
}

// ==========================================================================
// ApiClient Implementation
// ==========================================================================

/// Health check response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// HTTP client for the monitoring backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The backend base URL (e.g., "http://localhost:8000")
    /// * `api_key` - Credential sent as `X-API-Key` on every request
    pub fn new(base_url: &str, api_key: Option<&str>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key)
                .map_err(|_| Error::InvalidConfig("API key is not a valid header value".into()))?;
            headers.insert(HeaderName::from_static("x-api-key"), value);
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(Error::Request)?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get backend health.
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/health").await
    }

    pub async fn fetch_dashboard(&self) -> Result<WireDashboard> {
        self.get("/api/dashboard").await
    }

    pub async fn fetch_blockchain(&self) -> Result<WireBlockchain> {
        self.get("/api/blockchain").await
    }

    pub async fn fetch_analysis(&self) -> Result<WireAnalysis> {
        self.get("/api/ai-analysis").await
    }

    pub async fn fetch_history(&self) -> Result<Vec<WireHistoryRecord>> {
        self.get("/api/history").await
    }

    // ======================================================================
    // Internal HTTP helpers
    // ======================================================================

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(Error::Request)
        } else {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|v| {
                    v.get("detail")
                        .or_else(|| v.get("error"))
                        .and_then(|e| e.as_str())
                        .map(String::from)
                })
                .unwrap_or_else(|| status.to_string());

            Err(Error::ApiStatus {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    let base_url = base_url.trim().trim_end_matches('/').to_string();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(Error::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            base_url
        )));
    }
    Ok(base_url)
}

#[async_trait]
impl DataSource for ApiClient {
    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    async fn dashboard(&self, _ctx: &DashboardContext) -> Result<DashboardUpdate> {
        let wire = self.fetch_dashboard().await?;
        Ok(map_dashboard(&wire, OffsetDateTime::now_utc()))
    }

    async fn blockchain(&self, ctx: &ChainContext) -> Result<ChainUpdate> {
        let wire = self.fetch_blockchain().await?;
        Ok(map_blockchain(&wire, &ctx.stats, OffsetDateTime::now_utc()))
    }

    async fn analysis(&self, ctx: &AnalysisContext) -> Result<AnalysisUpdate> {
        let wire = self.fetch_analysis().await?;
        Ok(map_analysis(&wire, &ctx.stats, OffsetDateTime::now_utc()))
    }

    async fn history(&self, _ctx: &HistoryContext) -> Result<HistoryUpdate> {
        let records = self.fetch_history().await?;
        Ok(HistoryUpdate::Snapshot(map_history(
            &records,
            OffsetDateTime::now_utc(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn now() -> OffsetDateTime {
        datetime!(2025-04-10 09:30:00 UTC)
    }

    const HISTORY_JSON: &str = r#"[
        {"id": 1, "device": "Sensor-01", "hash": "---", "value": "23.5C",
         "timestamp": "2025-04-10 09:00:00", "status": "normal", "temp": 23.5, "vib": 1.2, "pwr": 40.0},
        {"id": 2, "device": "Sensor-02", "hash": "ab12cd", "value": "104.2C",
         "timestamp": "2025-04-10 09:01:00", "status": "critical", "temp": 104.2, "vib": 12.0, "pwr": 55.1}
    ]"#;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new("http://localhost:8000", Some("key")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_client_normalizes_url() {
        let client = ApiClient::new("https://backend.example/", None).unwrap();
        assert_eq!(client.base_url(), "https://backend.example");
    }

    #[test]
    fn test_client_invalid_url() {
        let result = ApiClient::new("localhost:8000", None);
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_client_rejects_bad_key() {
        let result = ApiClient::new("http://localhost:8000", Some("bad\nkey"));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_history_reversed_and_mapped() {
        let records: Vec<WireHistoryRecord> = serde_json::from_str(HISTORY_JSON).unwrap();
        let entries = map_history(&records, now());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, 2);
        assert_eq!(entries[0].status, HistoryStatus::Failed);
        assert_eq!(entries[1].status, HistoryStatus::Verified);
        assert_eq!(entries[1].hash, "---");
        assert_eq!(entries[1].timestamp, datetime!(2025-04-10 09:00:00 UTC));
    }

    #[test]
    fn test_dashboard_mapping() {
        let json = format!(
            r#"{{"stats": {{"active": 3, "scans": 120, "anomalies": 4, "uptime": 100.0}},
                "recent_data": {HISTORY_JSON}}}"#
        );
        let wire: WireDashboard = serde_json::from_str(&json).unwrap();
        let update = map_dashboard(&wire, now());
        assert_eq!(update.stats.active_devices, 3);
        assert_eq!(update.stats.total_data, 120);
        assert_eq!(update.stats.alerts, 4);
        assert_eq!(update.readings[0].device, "Sensor-02");
        assert_eq!(update.readings[0].status, ReadingStatus::Critical);
        assert_eq!(update.readings[1].value, 23.5);
        assert_eq!(update.readings[1].unit, Unit::Celsius);
        assert!(update.activity.is_none());
    }

    #[test]
    fn test_dashboard_value_fallback() {
        let json = r#"{"stats": {}, "recent_data": [
            {"id": 9, "device": "Sensor-05", "value": "41.0C", "status": "weird"}]}"#;
        let wire: WireDashboard = serde_json::from_str(json).unwrap();
        let update = map_dashboard(&wire, now());
        assert_eq!(update.readings[0].value, 41.0);
        assert_eq!(update.readings[0].status, ReadingStatus::Critical);
        assert_eq!(update.readings[0].timestamp, now());
    }

    #[test]
    fn test_blockchain_mapping_keeps_rates() {
        let json = r#"{"total_blocks": 2, "transactions": 2, "recent_blocks": [
            {"id": 2, "hash": "bbb", "prev_hash": "aaa", "timestamp": "2025-04-10 09:10:00", "status": "Confirmed"},
            {"id": 1, "hash": "aaa", "prev_hash": "0000000000000000", "timestamp": "2025-04-10 09:05:00", "status": "Confirmed"}
        ]}"#;
        let wire: WireBlockchain = serde_json::from_str(json).unwrap();
        let previous = ChainStats {
            average_block_time: 5.2,
            network_hash_rate: 15.3,
            ..ChainStats::default()
        };
        match map_blockchain(&wire, &previous, now()) {
            ChainUpdate::Snapshot { stats, blocks } => {
                assert_eq!(stats.total_blocks, 2);
                assert_eq!(stats.average_block_time, 5.2);
                assert_eq!(stats.network_hash_rate, 15.3);
                assert_eq!(blocks[0].height, 2);
                assert_eq!(blocks[0].miner, LIVE_MINER);
                assert_eq!(blocks[0].transactions, 1);
                assert!(depin_types::verify_linkage(&blocks));
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_analysis_mapping() {
        let json = r#"{"total_analyses": 10, "anomalies_found": 2, "recent_results": [
            {"device": "Sensor-04", "confidence": 95.0, "recommendation": "CRITICAL: Overheating Detected.",
             "timestamp": "09:20:00", "severity": "high"},
            {"device": "Sensor-01", "confidence": 61.4, "recommendation": "Check", "timestamp": "09:10:00"}
        ]}"#;
        let wire: WireAnalysis = serde_json::from_str(json).unwrap();
        let previous = AiStats {
            accuracy: 96.1,
            ..AiStats::default()
        };
        match map_analysis(&wire, &previous, now()) {
            AnalysisUpdate::Snapshot { stats, results } => {
                assert_eq!(stats.total_analyses, 10);
                assert_eq!(stats.anomalies_detected, 2);
                assert_eq!(stats.accuracy, 96.1);
                assert_eq!(stats.models_active, 1);
                assert_eq!(results[0].id, 0);
                assert_eq!(results[0].detection_type, "Critical Anomaly");
                assert_eq!(results[0].confidence, 95);
                assert_eq!(results[0].model, LIVE_MODEL);
                assert_eq!(results[0].detected_at, datetime!(2025-04-10 09:20:00 UTC));
                assert_eq!(results[1].severity, Severity::Medium);
                assert_eq!(results[1].detection_type, "Pattern Alert");
                assert_eq!(results[1].confidence, 61);
            }
            other => panic!("expected snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("23.5C"), Some(23.5));
        assert_eq!(leading_number("-4.0°C"), Some(-4.0));
        assert_eq!(leading_number("n/a"), None);
    }
}
