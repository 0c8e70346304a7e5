//! Cosmetic spin timing
//!
//! Stop order, start stagger, animation durations and autoplay pauses. All of
//! it comes from [`CosmeticRng`] and none of it can change an outcome.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ConfigError;
use crate::rng::CosmeticRng;

/// Default ceiling for any single timing value (one minute)
pub const MAX_TIMING_MS: f64 = 60_000.0;

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimingProfile {
    /// Normal gameplay timing
    #[default]
    Normal,
    /// Fast mode
    Turbo,
    /// Zero delays (headless runs)
    Instant,
    /// Custom scaling
    Custom,
}

/// Timing parameters (milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub profile: TimingProfile,
    /// Animation length of the first reel to stop
    pub base_duration_ms: f64,
    /// Added per stop-order position, to both start delay and duration
    pub stagger_ms: f64,
    /// Start delay jitter range
    pub start_jitter_ms: (f64, f64),
    /// Upper bound of extra duration jitter
    pub duration_jitter_ms: f64,
    /// Pause range between autoplay spins
    pub autoplay_delay_ms: (f64, f64),
}

impl TimingConfig {
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            base_duration_ms: 780.0,
            stagger_ms: 120.0,
            start_jitter_ms: (-40.0, 60.0),
            duration_jitter_ms: 180.0,
            autoplay_delay_ms: (160.0, 360.0),
        }
    }

    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            ..Self::normal().scaled(0.4)
        }
    }

    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            ..Self::normal().scaled(0.0)
        }
    }

    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Instant => Self::instant(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale every duration by `factor` (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            base_duration_ms: self.base_duration_ms * factor,
            stagger_ms: self.stagger_ms * factor,
            start_jitter_ms: (self.start_jitter_ms.0 * factor, self.start_jitter_ms.1 * factor),
            duration_jitter_ms: self.duration_jitter_ms * factor,
            autoplay_delay_ms: (
                self.autoplay_delay_ms.0 * factor,
                self.autoplay_delay_ms.1 * factor,
            ),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_within(MAX_TIMING_MS)
    }

    /// Validate, allowing no value larger than `max_ms` in magnitude
    pub fn validate_within(&self, max_ms: f64) -> Result<(), ConfigError> {
        let values = [
            self.base_duration_ms,
            self.stagger_ms,
            self.start_jitter_ms.0,
            self.start_jitter_ms.1,
            self.duration_jitter_ms,
            self.autoplay_delay_ms.0,
            self.autoplay_delay_ms.1,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Validation("timing values must be finite".into()));
        }
        if values.iter().any(|v| v.abs() > max_ms) {
            return Err(ConfigError::Validation(format!(
                "timing values must be within ±{max_ms} ms"
            )));
        }
        if self.base_duration_ms < 0.0 || self.stagger_ms < 0.0 || self.duration_jitter_ms < 0.0 {
            return Err(ConfigError::Validation("timing durations must be >= 0".into()));
        }
        if self.start_jitter_ms.0 > self.start_jitter_ms.1
            || self.autoplay_delay_ms.0 > self.autoplay_delay_ms.1
            || self.autoplay_delay_ms.0 < 0.0
        {
            return Err(ConfigError::Validation("timing ranges must be ordered".into()));
        }
        Ok(())
    }

    /// Time until the last reel stops, ignoring jitter
    pub fn nominal_spin_duration_ms(&self, reels: usize) -> f64 {
        let last = reels.saturating_sub(1) as f64;
        // start delay + duration of the last reel in stop order
        last * self.stagger_ms + self.base_duration_ms + last * self.stagger_ms
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}

/// Per-reel animation schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelTiming {
    pub reel: usize,
    /// Position in the stop sequence (0 = first)
    pub stop_order: usize,
    pub start_delay_ms: f64,
    pub duration_ms: f64,
}

impl ReelTiming {
    /// When this reel reports settled, relative to spin start
    pub fn settle_at_ms(&self) -> f64 {
        self.start_delay_ms + self.duration_ms
    }
}

/// Random stop order plus staggered, jittered timings, indexed by reel
pub fn plan_reel_timings(
    config: &TimingConfig,
    reels: usize,
    rng: &mut CosmeticRng,
) -> Vec<ReelTiming> {
    let mut order: Vec<usize> = (0..reels).collect();
    rng.shuffle(&mut order);

    let mut timings: Vec<ReelTiming> = order
        .iter()
        .enumerate()
        .map(|(stop_order, &reel)| {
            let k = stop_order as f64;
            let jitter = rng.range_f64(config.start_jitter_ms.0, config.start_jitter_ms.1);
            ReelTiming {
                reel,
                stop_order,
                start_delay_ms: (k * config.stagger_ms + jitter).max(0.0),
                duration_ms: config.base_duration_ms
                    + k * config.stagger_ms
                    + rng.range_f64(0.0, config.duration_jitter_ms),
            }
        })
        .collect();

    timings.sort_by_key(|t| t.reel);
    timings
}

/// Pause before the next autoplay spin
pub fn autoplay_delay(config: &TimingConfig, rng: &mut CosmeticRng) -> Duration {
    let ms = rng.range_f64(config.autoplay_delay_ms.0, config.autoplay_delay_ms.1);
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles() {
        let normal = TimingConfig::normal();
        let turbo = TimingConfig::turbo();
        let instant = TimingConfig::instant();

        assert!(turbo.base_duration_ms < normal.base_duration_ms);
        assert_eq!(turbo.profile, TimingProfile::Turbo);
        assert_eq!(instant.base_duration_ms, 0.0);
        assert_eq!(instant.autoplay_delay_ms, (0.0, 0.0));
        normal.validate().unwrap();
        turbo.validate().unwrap();
        instant.validate().unwrap();
    }

    #[test]
    fn test_reel_timings_cover_every_reel_once() {
        let mut rng = CosmeticRng::new();
        let timings = plan_reel_timings(&TimingConfig::normal(), 5, &mut rng);

        assert_eq!(timings.len(), 5);
        for (i, t) in timings.iter().enumerate() {
            assert_eq!(t.reel, i);
            assert!(t.start_delay_ms >= 0.0);
            assert!(t.duration_ms >= 780.0 + t.stop_order as f64 * 120.0);
            assert!(t.duration_ms < 780.0 + t.stop_order as f64 * 120.0 + 180.0);
        }

        let mut orders: Vec<usize> = timings.iter().map(|t| t.stop_order).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_instant_timings_are_zero() {
        let mut rng = CosmeticRng::new();
        let timings = plan_reel_timings(&TimingConfig::instant(), 5, &mut rng);
        assert!(timings.iter().all(|t| t.settle_at_ms() == 0.0));
        assert_eq!(autoplay_delay(&TimingConfig::instant(), &mut rng), Duration::ZERO);
    }

    #[test]
    fn test_autoplay_delay_range() {
        let mut rng = CosmeticRng::new();
        for _ in 0..50 {
            let d = autoplay_delay(&TimingConfig::normal(), &mut rng);
            assert!(d >= Duration::from_millis(160));
            assert!(d < Duration::from_millis(361));
        }
    }

    #[test]
    fn test_validate_rejects_huge_values() {
        let mut config = TimingConfig::normal();
        config.start_jitter_ms = (-1e308, 1e308);
        assert!(config.validate().is_err());

        let mut config = TimingConfig::normal();
        config.autoplay_delay_ms = (1e300, 1e300);
        assert!(config.validate().is_err());

        let mut config = TimingConfig::normal();
        config.autoplay_delay_ms = (0.0, MAX_TIMING_MS);
        config.validate().unwrap();
        let mut rng = CosmeticRng::new();
        assert!(autoplay_delay(&config, &mut rng) <= Duration::from_secs(60));
    }

    #[test]
    fn test_validate_rejects_inverted_ranges() {
        let mut config = TimingConfig::normal();
        config.autoplay_delay_ms = (400.0, 100.0);
        assert!(config.validate().is_err());

        let mut config = TimingConfig::normal();
        config.base_duration_ms = f64::NAN;
        assert!(config.validate().is_err());
    }
}
