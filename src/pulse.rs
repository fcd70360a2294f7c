//! Heartbeat scale animation for attention-grabbing content.

use std::time::Duration;

use crate::config::PulseConfig;

/// Triangle wave over `[0, length]`.
pub fn ping_pong(t: f64, length: f64) -> f64 {
    let period = length * 2.0;
    let phase = t.rem_euclid(period);
    length - (phase - length).abs()
}

/// Smoothstep.
pub fn ease_in_out(x: f64) -> f64 {
    x * x * (3.0 - 2.0 * x)
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn pulse_scale(t: f64, min: f64, max: f64) -> f64 {
    lerp(min, max, ease_in_out(ping_pong(t, 1.0)))
}

pub struct Pulse {
    t: f64,
    speed: f64,
    min: f64,
    max: f64,
}

impl Pulse {
    pub fn new(config: &PulseConfig) -> Self {
        Self {
            t: 0.0,
            speed: config.speed,
            min: config.min_scale,
            max: config.max_scale,
        }
    }

    /// Advances the animation and returns the uniform scale to apply.
    pub fn advance(&mut self, dt: Duration) -> f64 {
        self.t += dt.as_secs_f64() * self.speed;
        self.scale()
    }

    pub fn scale(&self) -> f64 {
        pulse_scale(self.t, self.min, self.max)
    }
}
