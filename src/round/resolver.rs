//! Round window resolution

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single round of an up/down market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRef {
    /// Asset symbol, lowercase (e.g., "btc")
    pub asset: String,
    /// Round length in seconds
    pub duration_secs: u64,
    /// Aligned start time
    pub start: DateTime<Utc>,
}

impl RoundRef {
    /// Epoch seconds of the round start
    pub fn start_ts(&self) -> i64 {
        self.start.timestamp()
    }

    /// Round end (start of the following round)
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::seconds(self.duration_secs as i64)
    }

    /// Deterministic round identifier, e.g. `btc-updown-15m-1705312800`
    ///
    /// This is the market slug used by the quote provider.
    pub fn id(&self) -> String {
        format!(
            "{}-updown-{}-{}",
            self.asset,
            duration_label(self.duration_secs),
            self.start_ts()
        )
    }

    /// Time until the round ends, `None` once it has ended
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let remaining = self.end() - now;
        (remaining > Duration::zero()).then_some(remaining)
    }

    /// Whether the round has ended
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.time_remaining(now).is_none()
    }

    /// The round immediately after this one
    pub fn following(&self) -> RoundRef {
        RoundRef {
            asset: self.asset.clone(),
            duration_secs: self.duration_secs,
            start: self.end(),
        }
    }
}

impl std::fmt::Display for RoundRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id())
    }
}

/// Stateless resolver for the current and next round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundWindowResolver {
    duration_secs: u64,
}

impl RoundWindowResolver {
    /// Create a resolver for rounds of `duration_secs` (must be non-zero)
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration_secs: duration_secs.max(1),
        }
    }

    /// Round length in seconds
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    /// Start of the round containing `now`
    ///
    /// The largest multiple of the duration not exceeding `now`; a time
    /// exactly on a boundary belongs to the round starting there.
    pub fn current_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let secs = now.timestamp();
        let offset = secs.rem_euclid(self.duration_secs as i64);
        now - Duration::seconds(offset) - Duration::nanoseconds(now.timestamp_subsec_nanos() as i64)
    }

    /// Round containing `now`
    pub fn current(&self, asset: &str, now: DateTime<Utc>) -> RoundRef {
        RoundRef {
            asset: asset.to_lowercase(),
            duration_secs: self.duration_secs,
            start: self.current_start(now),
        }
    }

    /// Round starting right after the current one
    pub fn next(&self, asset: &str, now: DateTime<Utc>) -> RoundRef {
        self.current(asset, now).following()
    }
}

/// Short label for a round length: `15m`, `5m`, `1h`, `4h`, `90s`
pub fn duration_label(duration_secs: u64) -> String {
    if duration_secs > 0 && duration_secs % 3600 == 0 {
        format!("{}h", duration_secs / 3600)
    } else if duration_secs > 0 && duration_secs % 60 == 0 {
        format!("{}m", duration_secs / 60)
    } else {
        format!("{}s", duration_secs)
    }
}

/// Extract the start epoch from a round slug
pub fn parse_slug_start(slug: &str) -> Option<i64> {
    let (_, tail) = slug.rsplit_once('-')?;
    if tail.len() != 10 {
        return None;
    }
    tail.parse().ok()
}

/// Human-readable time left, e.g. `7m 48s`, or `expired`
pub fn format_time_left(remaining: Option<Duration>) -> String {
    match remaining {
        Some(d) => {
            let secs = d.num_seconds();
            format!("{}m {}s", secs / 60, secs % 60)
        }
        None => "expired".to_string(),
    }
}
