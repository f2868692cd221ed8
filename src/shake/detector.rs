use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{CompletionRecord, PrayerName};
use crate::shake::sensor::AccelSample;

fn default_threshold() -> f64 {
    1.5
}
fn default_required_shakes() -> u32 {
    3
}
fn default_timeout_ms() -> u64 {
    2000
}
fn default_sample_interval_ms() -> u64 {
    100
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShakeConfig {
    /// Magnitude (in g) a sample must exceed to count as a shake.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Shakes needed inside one burst. 1 means any single jolt logs.
    #[serde(default = "default_required_shakes")]
    pub required_shakes: u32,
    /// Max gap between shakes of the same burst.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// How often the accelerometer is read.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            required_shakes: default_required_shakes(),
            timeout_ms: default_timeout_ms(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShakeEvent {
    /// A shake counted toward the burst; good for haptics, nothing else.
    Progress { count: u32, required: u32 },
    Completed(PrayerName),
    /// The burst finished but the prayer was already logged today.
    AlreadyCompleted(PrayerName),
}

/// Turns accelerometer samples into completion events.
///
/// Knows nothing about storage: the caller decides what a
/// [`ShakeEvent::Completed`] does.
#[derive(Debug, Clone)]
pub struct ShakeDetector {
    config: ShakeConfig,
    count: u32,
    last_shake_ms: Option<u64>,
}

impl ShakeDetector {
    pub fn new(config: ShakeConfig) -> Self {
        Self {
            config,
            count: 0,
            last_shake_ms: None,
        }
    }

    pub fn config(&self) -> &ShakeConfig {
        &self.config
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    fn required(&self) -> u32 {
        self.config.required_shakes.max(1)
    }

    pub fn on_sample(
        &mut self,
        sample: &AccelSample,
        target: Option<PrayerName>,
        completed: &CompletionRecord,
    ) -> Option<ShakeEvent> {
        if sample.magnitude() <= self.config.threshold {
            return None;
        }

        let now = sample.timestamp_ms;
        let in_burst = self
            .last_shake_ms
            .is_some_and(|last| now.saturating_sub(last) <= self.config.timeout_ms);
        self.count = if in_burst { self.count + 1 } else { 1 };
        self.last_shake_ms = Some(now);

        let required = self.required();
        if self.count < required {
            debug!("Shake {}/{}", self.count, required);
            return Some(ShakeEvent::Progress {
                count: self.count,
                required,
            });
        }

        self.count = 0;
        let prayer = target?;
        if completed.contains(prayer) {
            Some(ShakeEvent::AlreadyCompleted(prayer))
        } else {
            Some(ShakeEvent::Completed(prayer))
        }
    }

    /// Drop a burst that has gone quiet for longer than the timeout.
    pub fn expire(&mut self, now_ms: u64) {
        if let Some(last) = self.last_shake_ms {
            if self.count > 0 && now_ms.saturating_sub(last) > self.config.timeout_ms {
                self.count = 0;
            }
        }
    }
}
