//! Glucose reading model and trend decoding
//!
//! The provider's estimated-glucose-value records carry a mg/dL value, a
//! textual trend code, and an ISO-8601 timestamp. This module owns the wire
//! shape, the conversion into the immutable [`GlucoseReading`] value object,
//! and the trend-to-arrow mapping the calling layer renders.

use chrono::{DateTime, Utc};
use dexcom_auth::error::{Error, Result};
use serde::Deserialize;

/// Glucose rate-of-change direction, as reported by the provider.
///
/// The ten codes are fixed by the provider's API. Records without a trend
/// field decode as `None`; so do unrecognized codes, which render as the
/// same `"?"` glyph either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    None,
    DoubleUp,
    SingleUp,
    FortyFiveUp,
    Flat,
    FortyFiveDown,
    SingleDown,
    DoubleDown,
    NotComputable,
    RateOutOfRange,
}

impl Trend {
    /// Parse a provider trend code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        let trend = match code.to_ascii_uppercase().as_str() {
            "NONE" => Trend::None,
            "DOUBLE_UP" => Trend::DoubleUp,
            "SINGLE_UP" => Trend::SingleUp,
            "FORTY_FIVE_UP" => Trend::FortyFiveUp,
            "FLAT" => Trend::Flat,
            "FORTY_FIVE_DOWN" => Trend::FortyFiveDown,
            "SINGLE_DOWN" => Trend::SingleDown,
            "DOUBLE_DOWN" => Trend::DoubleDown,
            "NOT_COMPUTABLE" => Trend::NotComputable,
            "RATE_OUT_OF_RANGE" => Trend::RateOutOfRange,
            _ => return Option::None,
        };
        Some(trend)
    }

    /// Arrow glyph for display.
    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::None => "?",
            Trend::DoubleUp => "↑↑",
            Trend::SingleUp => "↑",
            Trend::FortyFiveUp => "↗",
            Trend::Flat => "→",
            Trend::FortyFiveDown => "↘",
            Trend::SingleDown => "↓",
            Trend::DoubleDown => "↓↓",
            Trend::NotComputable => "?",
            Trend::RateOutOfRange => "?",
        }
    }
}

/// Map a raw trend code to its arrow glyph.
///
/// Total over arbitrary input: empty, mixed-case, and unrecognized codes
/// all map to `"?"` rather than failing.
pub fn trend_to_arrow(code: &str) -> &'static str {
    Trend::from_code(code).map_or("?", |trend| trend.arrow())
}

/// A single sensor reading, produced fresh on every successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlucoseReading {
    /// Glucose value in mg/dL, always positive.
    pub value: u32,
    /// Rate-of-change direction.
    pub trend: Trend,
    /// When the sensor recorded the value, in UTC.
    pub timestamp: DateTime<Utc>,
}

impl GlucoseReading {
    /// Arrow glyph for this reading's trend.
    pub fn arrow(&self) -> &'static str {
        self.trend.arrow()
    }

    /// Whole minutes elapsed since the reading was recorded.
    pub fn minutes_ago(&self) -> i64 {
        (Utc::now() - self.timestamp).num_minutes()
    }
}

/// Response body of the egvs endpoint. A missing or empty list is a normal
/// outcome — the sandbox environment may return it indefinitely.
#[derive(Debug, Deserialize)]
pub(crate) struct EgvsResponse {
    #[serde(default)]
    pub egvs: Vec<EgvRecord>,
}

/// One wire record, ordered oldest-to-newest by the provider.
#[derive(Debug, Deserialize)]
pub(crate) struct EgvRecord {
    pub value: i64,
    #[serde(default)]
    pub trend: Option<String>,
    pub timestamp: String,
}

impl TryFrom<EgvRecord> for GlucoseReading {
    type Error = Error;

    fn try_from(record: EgvRecord) -> Result<Self> {
        let value = u32::try_from(record.value)
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| {
                Error::InvalidResponse(format!("glucose value {} out of range", record.value))
            })?;
        let timestamp = DateTime::parse_from_rfc3339(&record.timestamp)
            .map_err(|e| {
                Error::InvalidResponse(format!("timestamp {:?}: {e}", record.timestamp))
            })?
            .with_timezone(&Utc);
        let trend = record
            .trend
            .as_deref()
            .and_then(Trend::from_code)
            .unwrap_or(Trend::None);

        Ok(Self {
            value,
            trend,
            timestamp,
        })
    }
}
