//! InfluxDB line protocol rendering of a cycle's readings.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::devices::{ReadOutcome, Reading};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A measured value, written with a fixed number of decimals.
    Fixed { value: f64, decimals: u32 },
    /// Stand-in for a failed read, written as `0`.
    Missing,
}

impl FieldValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Fixed { value, .. } => *value,
            FieldValue::Missing => 0.0,
        }
    }
}

impl From<&Reading> for FieldValue {
    fn from(reading: &Reading) -> Self {
        match reading.outcome {
            ReadOutcome::Valid(value) => FieldValue::Fixed {
                value,
                decimals: reading.decimals,
            },
            ReadOutcome::Failed(_) => FieldValue::Missing,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Fixed { value, decimals } => write!(f, "{:.*}", *decimals as usize, value),
            FieldValue::Missing => f.write_str("0"),
        }
    }
}

/// One field of one measurement.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    /// Pre-formatted tag set, written verbatim after the measurement.
    pub tags: String,
    pub field: String,
    pub value: FieldValue,
    /// Nanoseconds since the epoch. `None` lets the server stamp the point.
    pub timestamp: Option<i64>,
}

impl Point {
    pub fn to_line(&self) -> String {
        let mut line = escape_measurement(&self.measurement);
        if !self.tags.is_empty() {
            line.push(',');
            line.push_str(&self.tags);
        }
        line.push(' ');
        line.push_str(&escape_key(&self.field));
        line.push('=');
        line.push_str(&self.value.to_string());
        if let Some(ts) = self.timestamp {
            line.push(' ');
            line.push_str(&ts.to_string());
        }
        line
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

/// The points of one cycle, in profile order.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub created_at: DateTime<Utc>,
    pub points: Vec<Point>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn lines(&self) -> Vec<String> {
        self.points.iter().map(Point::to_line).collect()
    }

    /// Request body: one line per point.
    pub fn to_line_protocol(&self) -> String {
        self.lines().join("\n")
    }
}

/// Turns readings into points sharing one measurement and tag set.
#[derive(Debug, Clone)]
pub struct BatchBuilder {
    measurement: String,
    tags: String,
    stamp_points: bool,
}

impl BatchBuilder {
    pub fn new(measurement: impl Into<String>, tags: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: tags.into().trim().trim_start_matches(',').to_string(),
            stamp_points: false,
        }
    }

    #[must_use]
    pub fn with_point_timestamps(mut self, enabled: bool) -> Self {
        self.stamp_points = enabled;
        self
    }

    pub fn build(&self, readings: &[Reading], created_at: DateTime<Utc>) -> Batch {
        let timestamp = if self.stamp_points {
            created_at.timestamp_nanos_opt()
        } else {
            None
        };

        let points = readings
            .iter()
            .map(|reading| Point {
                measurement: self.measurement.clone(),
                tags: self.tags.clone(),
                field: reading.parameter.clone(),
                value: FieldValue::from(reading),
                timestamp,
            })
            .collect();

        Batch { created_at, points }
    }
}
