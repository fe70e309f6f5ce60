// =============================================================================
// Health Gate — global data confidence from signal staleness
// =============================================================================
//
// penalty    = min(average age / horizon, 1) × max penalty
// confidence = 1 − penalty
//
// With the defaults (1 h horizon, 0.5 max penalty) data that is an hour old
// on average already sits on the 0.5 floor.
//
// An empty signal set carries no information and takes the full penalty.
// The gate fails once confidence has fallen to the configured floor.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Signal;
use crate::config::ArbiterConfig;

/// Outcome of the staleness check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// `None` when no signal survived validation.
    pub average_age_secs: Option<f64>,
    pub freshness_penalty: f64,
    pub confidence: f64,
    pub passed: bool,
}

/// Age of a signal in seconds, floored at zero for future timestamps.
pub fn age_secs(signal: &Signal, now: DateTime<Utc>) -> f64 {
    let ms = (now - signal.timestamp).num_milliseconds();
    (ms as f64 / 1000.0).max(0.0)
}

/// Freshness penalty for a given average age.
pub fn freshness_penalty(average_age_secs: f64, config: &ArbiterConfig) -> f64 {
    let horizon = config.freshness_horizon_secs as f64;
    (average_age_secs / horizon).clamp(0.0, 1.0) * config.max_freshness_penalty
}

/// Compute global confidence for a validated signal set.
pub fn assess(signals: &[Signal], now: DateTime<Utc>, config: &ArbiterConfig) -> HealthReport {
    let (average_age_secs, penalty) = if signals.is_empty() {
        (None, config.max_freshness_penalty)
    } else {
        let total: f64 = signals.iter().map(|s| age_secs(s, now)).sum();
        let avg = total / signals.len() as f64;
        (Some(avg), freshness_penalty(avg, config))
    };

    let confidence = (1.0 - penalty).max(0.0);
    let passed = confidence > config.min_data_confidence;

    debug!(
        signals = signals.len(),
        average_age_secs = ?average_age_secs,
        penalty,
        confidence,
        passed,
        "health gate evaluated"
    );

    HealthReport {
        average_age_secs,
        freshness_penalty: penalty,
        confidence,
        passed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Module, SignalAction};
    use chrono::Duration;

    fn aged(now: DateTime<Utc>, secs: i64) -> Signal {
        Signal::new(
            Module::Trend,
            SignalAction::Buy,
            1,
            0.5,
            0.5,
            now - Duration::seconds(secs),
        )
    }

    #[test]
    fn brand_new_signals_have_full_confidence() {
        let cfg = ArbiterConfig::default();
        let now = Utc::now();
        let r = assess(&[aged(now, 0), aged(now, 0)], now, &cfg);
        assert!((r.confidence - 1.0).abs() < f64::EPSILON);
        assert!(r.passed);
    }

    #[test]
    fn half_hour_old_data_has_three_quarter_confidence() {
        let cfg = ArbiterConfig::default();
        let now = Utc::now();
        let r = assess(&[aged(now, 1_800)], now, &cfg);
        assert!((r.freshness_penalty - 0.25).abs() < 1e-12);
        assert!((r.confidence - 0.75).abs() < 1e-12);
        assert!(r.passed);
    }

    #[test]
    fn future_timestamps_count_as_zero_age() {
        let now = Utc::now();
        assert_eq!(age_secs(&aged(now, -600), now), 0.0);
    }

    #[test]
    fn penalty_reaches_half_after_one_hour() {
        let cfg = ArbiterConfig::default();
        assert_eq!(freshness_penalty(0.0, &cfg), 0.0);
        assert!((freshness_penalty(360.0, &cfg) - 0.05).abs() < 1e-12);
        assert!((freshness_penalty(3_600.0, &cfg) - 0.5).abs() < 1e-12);
        assert!((freshness_penalty(86_400.0, &cfg) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn hour_old_data_sits_on_the_floor_and_fails() {
        let cfg = ArbiterConfig::default();
        let now = Utc::now();
        let r = assess(&[aged(now, 3_600)], now, &cfg);
        assert!((r.confidence - 0.5).abs() < 1e-12);
        assert!(!r.passed);
    }

    #[test]
    fn day_old_data_fails_the_gate() {
        let cfg = ArbiterConfig::default();
        let now = Utc::now();
        let r = assess(&[aged(now, 86_400), aged(now, 90_000)], now, &cfg);
        assert!(r.confidence <= 0.5);
        assert!(!r.passed);
    }

    #[test]
    fn slightly_stale_data_still_passes() {
        let cfg = ArbiterConfig::default();
        let now = Utc::now();
        let r = assess(&[aged(now, 600), aged(now, 1_200)], now, &cfg);
        assert!((r.confidence - 0.875).abs() < 1e-12);
        assert!(r.passed);
    }

    #[test]
    fn empty_set_fails_the_gate() {
        let cfg = ArbiterConfig::default();
        let r = assess(&[], Utc::now(), &cfg);
        assert!((r.confidence - 0.5).abs() < f64::EPSILON);
        assert!(r.average_age_secs.is_none());
        assert!(!r.passed);
    }
}
