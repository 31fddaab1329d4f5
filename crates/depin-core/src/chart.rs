//! Chart projection and the dashboard activity series.

use core::fmt;
use core::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use depin_types::ParseError;

/// Default canvas width used by [`project`] callers.
pub const DEFAULT_WIDTH: f64 = 200.0;
/// Default canvas height used by [`project`] callers.
pub const DEFAULT_HEIGHT: f64 = 100.0;

/// Vertical padding kept free above and below the plotted band.
const PADDING: f64 = 10.0;

/// A projected point in canvas coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Project `values` onto a `width` x `height` canvas.
///
/// Values are min/max normalized into `[10, height - 10]` with larger values
/// higher on the canvas; x is spread evenly over `[0, width]`. A flat series
/// uses a range of 1 and a single value sits at the horizontal middle.
///
/// ```
/// use depin_core::chart::project;
///
/// let points = project(&[10.0, 10.0, 10.0], 200.0, 100.0);
/// assert_eq!(points.len(), 3);
/// assert!(points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
/// assert_eq!(points[2].x, 200.0);
/// ```
pub fn project(values: &[f64], width: f64, height: f64) -> Vec<Point> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    let band = height - 2.0 * PADDING;

    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = if n == 1 {
                width / 2.0
            } else {
                i as f64 / (n - 1) as f64 * width
            };
            let y = height - ((v - min) / range) * band - PADDING;
            Point { x, y }
        })
        .collect()
}

/// Time window shown by the activity chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartPeriod {
    #[default]
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
}

impl ChartPeriod {
    /// Number of points in the series for this period.
    pub fn points(self) -> usize {
        match self {
            ChartPeriod::Day => 24,
            ChartPeriod::Week => 7,
            ChartPeriod::Month => 30,
        }
    }

    /// Label of the `index`-th point.
    pub fn label(self, index: usize) -> String {
        match self {
            ChartPeriod::Day => format!("{}:00", index % 24),
            ChartPeriod::Week | ChartPeriod::Month => format!("Day {}", index + 1),
        }
    }

    /// The next period in display order.
    pub fn cycle(self) -> Self {
        match self {
            ChartPeriod::Day => ChartPeriod::Week,
            ChartPeriod::Week => ChartPeriod::Month,
            ChartPeriod::Month => ChartPeriod::Day,
        }
    }
}

impl fmt::Display for ChartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartPeriod::Day => write!(f, "24h"),
            ChartPeriod::Week => write!(f, "7d"),
            ChartPeriod::Month => write!(f, "30d"),
        }
    }
}

impl FromStr for ChartPeriod {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "24h" | "day" => Ok(ChartPeriod::Day),
            "7d" | "week" => Ok(ChartPeriod::Week),
            "30d" | "month" => Ok(ChartPeriod::Month),
            other => Err(ParseError::UnknownValue {
                kind: "chart period",
                value: other.to_string(),
            }),
        }
    }
}

/// Lower bound of synthetic activity values.
pub const ACTIVITY_MIN: f64 = 30.0;
/// Upper bound (exclusive) of synthetic activity values.
pub const ACTIVITY_MAX: f64 = 80.0;

/// A labelled activity point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPoint {
    pub label: String,
    pub value: f64,
}

/// The dashboard's rolling activity series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityChart {
    period: ChartPeriod,
    points: Vec<ActivityPoint>,
    /// Index of the next point to be appended, for labels.
    next_index: usize,
}

impl ActivityChart {
    /// Generate a fresh series for `period`.
    pub fn generate<R: Rng + ?Sized>(period: ChartPeriod, rng: &mut R) -> Self {
        let n = period.points();
        let points = (0..n)
            .map(|i| ActivityPoint {
                label: period.label(i),
                value: rng.random_range(ACTIVITY_MIN..ACTIVITY_MAX),
            })
            .collect();
        Self {
            period,
            points,
            next_index: n,
        }
    }

    pub fn period(&self) -> ChartPeriod {
        self.period
    }

    pub fn points(&self) -> &[ActivityPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Drop the oldest point and append `value`, keeping the length fixed.
    pub fn shift(&mut self, value: f64) {
        if !self.points.is_empty() {
            self.points.remove(0);
        }
        self.points.push(ActivityPoint {
            label: self.period.label(self.next_index),
            value,
        });
        self.next_index += 1;
    }

    /// Project the series onto a canvas.
    pub fn project(&self, width: f64, height: f64) -> Vec<Point> {
        project(&self.values(), width, height)
    }
}
