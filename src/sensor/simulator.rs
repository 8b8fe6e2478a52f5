//! Simulated temperature/humidity sensor

use rand::Rng;

use crate::data::Reading;

/// Centre values a simulated device fluctuates around
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub temperature: f64,
    pub humidity: f64,
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            temperature: 22.0,
            humidity: 50.0,
        }
    }
}

/// Half-width of the uniform noise added to each baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variation {
    pub temperature: f64,
    pub humidity: f64,
}

impl Default for Variation {
    fn default() -> Self {
        Self {
            temperature: 2.0,
            humidity: 5.0,
        }
    }
}

impl Variation {
    /// No noise: every sample equals the baseline
    pub const fn none() -> Self {
        Self {
            temperature: 0.0,
            humidity: 0.0,
        }
    }
}

/// Produces readings for one registered device.
///
/// Sampling is stateless: each reading is drawn independently from the fixed
/// baseline, nothing carries over between calls.
#[derive(Debug, Clone)]
pub struct SensorSimulator {
    device_id: String,
    location: String,
    baseline: Baseline,
    variation: Variation,
}

impl SensorSimulator {
    pub fn new(device_id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            location: location.into(),
            baseline: Baseline::default(),
            variation: Variation::default(),
        }
    }

    pub fn with_baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_variation(mut self, variation: Variation) -> Self {
        self.variation = variation;
        self
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    /// Take a reading using the thread-local RNG
    pub fn sample(&self) -> Reading {
        self.sample_with(&mut rand::thread_rng())
    }

    /// Take a reading drawing noise from `rng`
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Reading {
        let temperature =
            round2(self.baseline.temperature + jitter(rng, self.variation.temperature));
        let humidity = round2(self.baseline.humidity + jitter(rng, self.variation.humidity));

        Reading::new(
            self.device_id.clone(),
            self.location.clone(),
            temperature,
            humidity,
        )
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    if spread > 0.0 {
        rng.gen_range(-spread..=spread)
    } else {
        0.0
    }
}

/// Round to two decimal places
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
