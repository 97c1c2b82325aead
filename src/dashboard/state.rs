//! Client-side dashboard state: the fetched record list and everything
//! derived from it.
use crate::types::{IngestRequest, LogRecord, Severity};
use chrono::{DateTime, DurationRound, TimeDelta, Timelike, Utc};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// How long a success or error notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Number of hourly buckets kept for the timeline chart.
pub const TIMELINE_BUCKETS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeverityFilter {
    #[default]
    All,
    Only(Severity),
}

impl SeverityFilter {
    pub fn matches(&self, severity: Severity) -> bool {
        match self {
            SeverityFilter::All => true,
            SeverityFilter::Only(s) => *s == severity,
        }
    }

    /// All → info → warning → error → All.
    pub fn next(&self) -> Self {
        match self {
            SeverityFilter::All => SeverityFilter::Only(Severity::Info),
            SeverityFilter::Only(Severity::Error) => SeverityFilter::All,
            SeverityFilter::Only(s) => SeverityFilter::Only(s.next()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SeverityFilter::All => "all",
            SeverityFilter::Only(s) => s.as_str(),
        }
    }
}

/// Severity counts over the full fetched set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogStats {
    pub total: usize,
    pub info: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl LogStats {
    pub fn from_logs(logs: &[LogRecord]) -> Self {
        logs.iter().fold(
            LogStats {
                total: logs.len(),
                ..Default::default()
            },
            |mut stats, log| {
                match log.severity {
                    Severity::Info => stats.info += 1,
                    Severity::Warning => stats.warnings += 1,
                    Severity::Error => stats.errors += 1,
                }
                stats
            },
        )
    }

    /// Fraction of all records carrying `severity`, 0.0 when there are none.
    pub fn share(&self, severity: Severity) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(SeverityFilter::Only(severity)) as f64 / self.total as f64
    }

    pub fn count(&self, filter: SeverityFilter) -> usize {
        match filter {
            SeverityFilter::All => self.total,
            SeverityFilter::Only(Severity::Info) => self.info,
            SeverityFilter::Only(Severity::Warning) => self.warnings,
            SeverityFilter::Only(Severity::Error) => self.errors,
        }
    }
}

/// Per-severity counts for one hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourBucket {
    pub start: DateTime<Utc>,
    pub info: usize,
    pub warning: usize,
    pub error: usize,
}

impl HourBucket {
    pub fn label(&self) -> String {
        format!("{:02}:00", self.start.hour())
    }

    pub fn total(&self) -> usize {
        self.info + self.warning + self.error
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    raised_at: Instant,
}

/// The submission form.
#[derive(Debug, Clone)]
pub struct SubmitForm {
    pub severity: Severity,
    pub message: String,
    pub submitting: bool,
}

impl Default for SubmitForm {
    fn default() -> Self {
        Self {
            severity: Severity::Info,
            message: String::new(),
            submitting: false,
        }
    }
}

pub struct DashboardState {
    pub phase: Phase,
    pub logs: Vec<LogRecord>,
    pub stats: LogStats,
    pub filter: SeverityFilter,
    pub auto_refresh: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub notice: Option<Notice>,
    pub form: SubmitForm,
    pub closing: bool,
    next_seq: u64,
    applied_seq: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Loading,
            logs: Vec::new(),
            stats: LogStats::default(),
            filter: SeverityFilter::All,
            auto_refresh: true,
            last_update: None,
            last_error: None,
            notice: None,
            form: SubmitForm::default(),
            closing: false,
            next_seq: 0,
            applied_seq: 0,
        }
    }

    /// Issues the sequence number for a new fetch. Numbers start at 1 and
    /// strictly increase.
    pub fn begin_fetch(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Applies a fetch result unless a later-issued fetch was already applied.
    ///
    /// Returns whether the result was applied.
    pub fn apply_fetch(&mut self, seq: u64, logs: Vec<LogRecord>, now: DateTime<Utc>) -> bool {
        if seq <= self.applied_seq {
            debug!(
                "Dropping stale fetch #{} (already applied #{})",
                seq, self.applied_seq
            );
            return false;
        }

        self.applied_seq = seq;
        self.stats = LogStats::from_logs(&logs);
        self.logs = logs;
        self.last_update = Some(now);
        self.last_error = None;
        self.phase = Phase::Ready;
        true
    }

    /// Records a failed fetch. The previously fetched list stays displayed.
    ///
    /// A failure of a fetch issued before the last applied one is ignored,
    /// since newer data is already on screen.
    pub fn fetch_failed(&mut self, seq: u64, error: String) {
        if seq <= self.applied_seq {
            debug!(
                "Ignoring stale failure of fetch #{} (already applied #{}): {}",
                seq, self.applied_seq, error
            );
            return;
        }
        warn!("Failed to load logs (fetch #{}): {}", seq, error);
        self.last_error = Some(error);
    }

    /// Marks the start of teardown. No further fetches are scheduled.
    pub fn close(&mut self) {
        self.closing = true;
    }

    pub fn visible_logs(&self) -> impl Iterator<Item = &LogRecord> + '_ {
        let filter = self.filter;
        self.logs.iter().filter(move |log| filter.matches(log.severity))
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
    }

    pub fn toggle_auto_refresh(&mut self) {
        self.auto_refresh = !self.auto_refresh;
    }

    /// Records grouped by hour, the most recent `TIMELINE_BUCKETS` hours that
    /// hold any record, oldest first.
    pub fn timeline(&self) -> Vec<HourBucket> {
        let mut buckets: BTreeMap<DateTime<Utc>, HourBucket> = BTreeMap::new();
        for log in &self.logs {
            let start = log
                .timestamp
                .duration_trunc(TimeDelta::hours(1))
                .unwrap_or(log.timestamp);
            let bucket = buckets.entry(start).or_insert_with(|| HourBucket {
                start,
                info: 0,
                warning: 0,
                error: 0,
            });
            match log.severity {
                Severity::Info => bucket.info += 1,
                Severity::Warning => bucket.warning += 1,
                Severity::Error => bucket.error += 1,
            }
        }

        let skip = buckets.len().saturating_sub(TIMELINE_BUCKETS);
        buckets.into_values().skip(skip).collect()
    }

    /// Client-side check mirroring the server's required-field rule.
    pub fn validate_form(&self) -> Result<IngestRequest, String> {
        if self.form.message.trim().is_empty() {
            return Err("Message is required".to_string());
        }
        Ok(IngestRequest {
            severity: Some(self.form.severity.to_string()),
            message: Some(self.form.message.clone()),
        })
    }

    pub fn submit_succeeded(&mut self, id: Uuid, now: Instant) {
        self.form = SubmitForm::default();
        self.raise_notice(
            NoticeKind::Success,
            format!("Log submitted successfully! ID: {}", id),
            now,
        );
    }

    pub fn submit_failed(&mut self, error: String, now: Instant) {
        self.form.submitting = false;
        self.raise_notice(NoticeKind::Error, error, now);
    }

    pub fn raise_notice(&mut self, kind: NoticeKind, text: String, now: Instant) {
        self.notice = Some(Notice {
            kind,
            text,
            raised_at: now,
        });
    }

    /// Clears the notice once it has been visible for `NOTICE_TTL`.
    pub fn expire_notice(&mut self, now: Instant) {
        if let Some(notice) = &self.notice {
            if now.saturating_duration_since(notice.raised_at) >= NOTICE_TTL {
                self.notice = None;
            }
        }
    }
}

/// Compact relative age: `42s ago`, `5m ago`, `3h ago`, `2d ago`.
pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds().max(0);
    if seconds < 60 {
        format!("{}s ago", seconds)
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{}h ago", seconds / 3600)
    } else {
        format!("{}d ago", seconds / 86400)
    }
}
