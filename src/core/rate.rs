//! Derives normalized intake rates from cumulative observations.
//!
//! Every pairing strategy shares the same pipeline: sort a copy of the
//! entries chronologically, pick an earlier partner for each later entry,
//! scale the amount delta to the normalization window, then optionally drop
//! the points that fall inside the start-up span.
use crate::core::observation::Observation;
use chrono::{Duration, NaiveDateTime};
use std::fmt::Display;
use tracing::debug;

pub const DAY_HOURS: f64 = 24.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// How each observation is matched with an earlier one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairingMode {
    /// Entry `i` against entry `i - 1`, scaled to 24 hours.
    Adjacent,
    /// Entry `i` against entry `i - 2`, scaled to 24 hours.
    AdjacentLag2,
    /// Entry `i` against the earliest entry at most `window_hours` before
    /// it, scaled to `window_hours`.
    SlidingWindow { window_hours: f64 },
}

impl PairingMode {
    /// Fewest observations that can produce a rate point.
    pub fn minimum_entries(&self) -> usize {
        match self {
            PairingMode::Adjacent | PairingMode::SlidingWindow { .. } => 2,
            PairingMode::AdjacentLag2 => 3,
        }
    }

    pub fn normalization_hours(&self) -> f64 {
        match self {
            PairingMode::Adjacent | PairingMode::AdjacentLag2 => DAY_HOURS,
            PairingMode::SlidingWindow { window_hours } => *window_hours,
        }
    }
}

impl Display for PairingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairingMode::Adjacent => write!(f, "adjacent"),
            PairingMode::AdjacentLag2 => write!(f, "adjacent-lag2"),
            PairingMode::SlidingWindow { window_hours } => {
                write!(f, "sliding-window ({window_hours}h)")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePolicy {
    pub mode: PairingMode,
    /// Points earlier than the first entry plus this many hours are dropped.
    pub suppress_hours: Option<f64>,
}

impl RatePolicy {
    pub fn adjacent() -> Self {
        Self {
            mode: PairingMode::Adjacent,
            suppress_hours: None,
        }
    }

    pub fn adjacent_lag2() -> Self {
        Self {
            mode: PairingMode::AdjacentLag2,
            suppress_hours: None,
        }
    }

    pub fn sliding_window(window_hours: f64) -> Self {
        Self {
            mode: PairingMode::SlidingWindow { window_hours },
            suppress_hours: None,
        }
    }

    pub fn with_suppression(mut self, hours: f64) -> Self {
        self.suppress_hours = Some(hours);
        self
    }
}

/// A normalized rate, stamped with the later observation of its pair.
///
/// `rate` is `None` when both observations share a timestamp, since no time
/// elapsed to divide by. A malformed amount yields `Some(NaN)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatePoint {
    pub timestamp: NaiveDateTime,
    pub rate: Option<f64>,
}

/// Returns a chronologically ordered copy. Ties keep their input order.
pub fn sorted_chronologically(entries: &[Observation]) -> Vec<Observation> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|entry| entry.timestamp);
    sorted
}

/// Computes the rate series for `entries` under `policy`.
///
/// The input slice is never reordered; fewer entries than the mode needs
/// simply produce an empty series.
pub fn compute_rate_series(entries: &[Observation], policy: &RatePolicy) -> Vec<RatePoint> {
    if entries.len() < policy.mode.minimum_entries() {
        debug!(
            "Not enough entries for {}: {} < {}",
            policy.mode,
            entries.len(),
            policy.mode.minimum_entries()
        );
        return Vec::new();
    }

    let sorted = sorted_chronologically(entries);
    let normalization_hours = policy.mode.normalization_hours();

    let points: Vec<RatePoint> = (0..sorted.len())
        .filter_map(|i| {
            let partner = earlier_partner(&sorted, i, &policy.mode)?;
            Some(rate_point(&sorted[partner], &sorted[i], normalization_hours))
        })
        .collect();
    debug!("Computed {} rate points with {}", points.len(), policy.mode);

    match policy.suppress_hours {
        Some(hours) => suppress_startup(points, sorted[0].timestamp, hours),
        None => points,
    }
}

/// Drops points stamped before `first_timestamp + hours`.
///
/// A cut-off past the last representable date drops every point; one before
/// the first representable date keeps every point.
pub fn suppress_startup(
    points: Vec<RatePoint>,
    first_timestamp: NaiveDateTime,
    hours: f64,
) -> Vec<RatePoint> {
    let Some(cutoff) =
        hours_to_duration(hours).and_then(|offset| first_timestamp.checked_add_signed(offset))
    else {
        debug!("Start-up suppression of {hours}h is out of date range");
        return if hours > 0.0 { Vec::new() } else { points };
    };

    let before = points.len();
    let kept: Vec<RatePoint> = points
        .into_iter()
        .filter(|point| point.timestamp >= cutoff)
        .collect();
    debug!(
        "Start-up suppression before {cutoff} dropped {} points",
        before - kept.len()
    );
    kept
}

fn earlier_partner(sorted: &[Observation], i: usize, mode: &PairingMode) -> Option<usize> {
    match mode {
        PairingMode::Adjacent => i.checked_sub(1),
        PairingMode::AdjacentLag2 => i.checked_sub(2),
        PairingMode::SlidingWindow { window_hours } => {
            // Gaps only grow walking backwards, so stop at the first miss
            let later = &sorted[i];
            (0..i)
                .rev()
                .take_while(|&j| hours_between(&sorted[j], later) <= *window_hours)
                .last()
        }
    }
}

fn rate_point(earlier: &Observation, later: &Observation, normalization_hours: f64) -> RatePoint {
    let hours_elapsed = hours_between(earlier, later);
    let rate = if hours_elapsed == 0.0 {
        None
    } else {
        let amount_delta = later.amount - earlier.amount;
        Some(normalize(amount_delta / hours_elapsed, normalization_hours))
    };

    RatePoint {
        timestamp: later.timestamp,
        rate,
    }
}

/// Scales an hourly rate and rounds half away from zero.
pub fn normalize(hourly_rate: f64, normalization_hours: f64) -> f64 {
    (hourly_rate * normalization_hours).round()
}

fn hours_between(earlier: &Observation, later: &Observation) -> f64 {
    (later.timestamp - earlier.timestamp).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

fn hours_to_duration(hours: f64) -> Option<Duration> {
    let millis = (hours * MILLIS_PER_HOUR).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    Duration::try_milliseconds(millis as i64)
}
