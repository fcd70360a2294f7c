//! Periodic frame-rate and memory sampling.

use std::time::Duration;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::config::PerformanceConfig;

/// Fraction of the target frame rate below which a warning is logged.
const LOW_FPS_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    FrameRate { fps: f64, low: bool },
    Memory { megabytes: f64, over_threshold: bool },
}

/// Reads this process's resident memory in bytes.
pub trait MemoryProbe {
    fn resident_bytes(&mut self) -> Option<u64>;
}

pub struct SysinfoProbe {
    system: System,
    pid: Pid,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: Pid::from_u32(std::process::id()),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SysinfoProbe {
    fn resident_bytes(&mut self) -> Option<u64> {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        self.system.process(self.pid).map(|p| p.memory())
    }
}

pub struct PerformanceMonitor {
    config: PerformanceConfig,
    probe: Box<dyn MemoryProbe>,
    ticks: u64,
}

impl PerformanceMonitor {
    pub fn new(config: PerformanceConfig, probe: Box<dyn MemoryProbe>) -> Self {
        Self {
            config,
            probe,
            ticks: 0,
        }
    }

    /// Counts one tick and samples whatever is due. `dt` is the duration of
    /// the tick that just finished.
    pub fn on_tick(&mut self, dt: Duration) -> Vec<Sample> {
        let mut samples = Vec::new();
        if !self.config.enabled {
            return samples;
        }
        self.ticks += 1;

        if due(self.ticks, self.config.fps_sample_interval_ticks) && !dt.is_zero() {
            let fps = 1.0 / dt.as_secs_f64();
            let target = f64::from(self.config.target_frame_rate);
            let low = fps < target * LOW_FPS_RATIO;
            if low {
                log::warn!("Low frame rate: {:.1} fps (target {})", fps, target);
            } else {
                log::debug!("Frame rate: {:.1} fps", fps);
            }
            samples.push(Sample::FrameRate { fps, low });
        }

        if due(self.ticks, self.config.memory_sample_interval_ticks) {
            match self.probe.resident_bytes() {
                Some(bytes) => {
                    let megabytes = bytes as f64 / (1024.0 * 1024.0);
                    let over_threshold = megabytes > self.config.memory_threshold_mb;
                    if over_threshold {
                        log::warn!(
                            "High memory usage: {:.1} MB (threshold {:.1} MB)",
                            megabytes,
                            self.config.memory_threshold_mb
                        );
                    } else {
                        log::info!("Memory usage: {:.1} MB", megabytes);
                    }
                    samples.push(Sample::Memory {
                        megabytes,
                        over_threshold,
                    });
                }
                None => log::debug!("Process memory unavailable"),
            }
        }

        samples
    }
}

fn due(ticks: u64, every: u64) -> bool {
    every > 0 && ticks % every == 0
}
