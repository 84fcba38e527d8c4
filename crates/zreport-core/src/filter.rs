//! # Report Filter
//!
//! Which orders a sale details report covers.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  session_ids non-empty?                                                 │
//! │     yes → OrderQuery::Sessions(session_ids)   (dates ignored)           │
//! │     no  → OrderQuery::Range                                             │
//! │             start = date_start  | local midnight today                  │
//! │             end   = date_stop + 1 s | start + 1 day                     │
//! │             stop < start        → start + 1 day                         │
//! │             config_ids (empty = every register)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `start` is inclusive and `end` exclusive. A caller's `date_stop` is
//! inclusive to the second, so orders stamped anywhere inside that second
//! (e.g. `23:59:59.500`) still count. Consecutive default days tile without
//! a gap. The same resolved query drives the report engine call and the
//! hourly histogram fetch, so the two always agree.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Caller-supplied report parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    pub date_start: Option<DateTime<Utc>>,
    pub date_stop: Option<DateTime<Utc>>,
    #[serde(default)]
    pub config_ids: Vec<String>,
    #[serde(default)]
    pub session_ids: Vec<String>,
}

/// A resolved order selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderQuery {
    Sessions(Vec<String>),
    /// `start <= date_order < end`.
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        config_ids: Vec<String>,
    },
}

impl ReportFilter {
    pub fn for_sessions<I, S>(session_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ReportFilter {
            session_ids: session_ids.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn for_range(start: DateTime<Utc>, stop: DateTime<Utc>) -> Self {
        ReportFilter {
            date_start: Some(start),
            date_stop: Some(stop),
            ..Default::default()
        }
    }

    pub fn with_configs<I, S>(mut self, config_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_ids = config_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Resolves defaults against `now` in the report time zone.
    pub fn resolve(&self, now: DateTime<Utc>, tz: Tz) -> OrderQuery {
        if !self.session_ids.is_empty() {
            return OrderQuery::Sessions(self.session_ids.clone());
        }

        let start = self.date_start.unwrap_or_else(|| local_midnight(now, tz));
        let end = match self.date_stop {
            Some(stop) if stop >= start => stop + Duration::seconds(1),
            _ => start + Duration::days(1),
        };

        OrderQuery::Range {
            start,
            end,
            config_ids: self.config_ids.clone(),
        }
    }
}

/// Start of today in `tz`, as UTC.
///
/// DST gap fallback: if local midnight does not exist, fall back to UTC midnight.
fn local_midnight(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let midnight = now.with_timezone(&tz).date_naive().and_time(chrono::NaiveTime::MIN);
    midnight
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

// =============================================================================
// Unit Tests
// =============================================================================
