//! Wire and storage types shared by the services, the HTTP layer and the
//! dashboard client.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Partition key shared by every record. All records live in a single
/// logical stream, so writes and reads are bounded to one shard.
pub const LOG_PARTITION: &str = "LOGS";

/// Number of records the read path returns.
pub const RECENT_LIMIT: usize = 100;

/// Closed set of record severities.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    /// The next severity in declaration order, wrapping around.
    pub fn next(&self) -> Self {
        match self {
            Severity::Info => Severity::Warning,
            Severity::Warning => Severity::Error,
            Severity::Error => Severity::Info,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A severity string outside `info | warning | error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown severity '{0}'")]
pub struct UnknownSeverity(pub String);

impl FromStr for Severity {
    type Err = UnknownSeverity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            other => Err(UnknownSeverity(other.to_string())),
        }
    }
}

/// A persisted log entry. Immutable once written.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LogRecord {
    #[serde(rename = "logPartition")]
    pub partition: String,
    #[serde(rename = "dateTime", with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub id: Uuid,
    pub severity: Severity,
    pub message: String,
}

/// Body sent to the ingest endpoint.
///
/// Both fields are optional at the wire level so that missing fields surface
/// as validation errors rather than deserialization failures. The endpoint
/// itself reads the body loosely, see `web::api`.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct IngestRequest {
    pub severity: Option<String>,
    pub message: Option<String>,
}

/// Successful ingest response.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct IngestResponse {
    pub success: bool,
    pub id: Uuid,
    #[serde(rename = "dateTime", with = "iso_millis")]
    pub date_time: DateTime<Utc>,
}

/// Query endpoint response.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LogsResponse {
    pub count: usize,
    pub logs: Vec<LogRecord>,
}

/// Error body returned by both endpoints. `message` is only set for
/// internal failures.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
