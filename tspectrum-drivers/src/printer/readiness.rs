//! Printer readiness from the analog sense input
//!
//! The printer supply is divided down onto an ADC pin. Readings are averaged
//! over the last few samples, and the ready state only flips after
//! `confirm_samples` consecutive averages agree. Dropping back to not ready
//! needs the average to fall `hysteresis` counts below the threshold.

use heapless::HistoryBuffer;
use tspectrum_core::config::SenseConfig;

/// Samples in the moving average
pub const AVERAGE_WINDOW: usize = 4;

/// Debounced printer readiness
pub struct ReadinessMonitor {
    config: SenseConfig,
    samples: HistoryBuffer<u16, AVERAGE_WINDOW>,
    ready: bool,
    streak: u8,
}

impl ReadinessMonitor {
    /// Start in the not-ready state
    pub fn new(config: SenseConfig) -> Self {
        Self {
            config,
            samples: HistoryBuffer::new(),
            ready: false,
            streak: 0,
        }
    }

    /// Feed one raw ADC reading
    ///
    /// Returns the new state when it changed.
    pub fn on_sample(&mut self, raw: u16) -> Option<bool> {
        self.samples.write(raw);
        let average = self.average();

        let crossing = if self.ready {
            average < self.config.ready_threshold.saturating_sub(self.config.hysteresis)
        } else {
            average >= self.config.ready_threshold
        };

        if !crossing {
            self.streak = 0;
            return None;
        }

        self.streak = self.streak.saturating_add(1);
        if self.streak < self.config.confirm_samples.max(1) {
            return None;
        }

        self.streak = 0;
        self.ready = !self.ready;
        Some(self.ready)
    }

    /// Check if the printer is considered ready
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Average of the buffered readings, zero before the first sample
    pub fn average(&self) -> u16 {
        let samples = self.samples.as_slice();
        if samples.is_empty() {
            return 0;
        }
        let sum: u32 = samples.iter().map(|&s| s as u32).sum();
        (sum / samples.len() as u32) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tspectrum_core::config::DeviceConfig;

    fn monitor() -> ReadinessMonitor {
        ReadinessMonitor::new(DeviceConfig::DEFAULT.sense)
    }

    #[test]
    fn test_needs_confirming_samples() {
        let mut m = monitor();
        assert_eq!(m.on_sample(4000), None);
        assert_eq!(m.on_sample(4000), None);
        assert!(!m.is_ready());
        assert_eq!(m.on_sample(4000), Some(true));
        assert!(m.is_ready());

        // Steady state reports nothing
        assert_eq!(m.on_sample(4000), None);
    }

    #[test]
    fn test_average_smooths_spike() {
        let mut m = monitor();
        // One spike lifts the average to 1000, under the threshold
        for raw in [0, 0, 0, 4000, 0, 0, 0] {
            assert_eq!(m.on_sample(raw), None);
        }
        assert!(!m.is_ready());
    }

    #[test]
    fn test_hysteresis() {
        let mut m = monitor();
        for _ in 0..3 {
            m.on_sample(2000);
        }
        assert!(m.is_ready());

        // Inside the hysteresis band stays ready
        for _ in 0..10 {
            assert_eq!(m.on_sample(1950), None);
        }
        assert!(m.is_ready());

        // Below the band; the window needs to fill with low readings
        let mut changed = None;
        for _ in 0..10 {
            if let Some(state) = m.on_sample(1000) {
                changed = Some(state);
                break;
            }
        }
        assert_eq!(changed, Some(false));
        assert!(!m.is_ready());
    }

    #[test]
    fn test_interrupted_streak_restarts() {
        let mut m = monitor();
        assert_eq!(m.on_sample(2100), None);
        assert_eq!(m.on_sample(2100), None);

        // Average 1900 breaks the streak; it stays broken until the low
        // reading leaves the window
        assert_eq!(m.on_sample(1500), None);
        for _ in 0..3 {
            assert_eq!(m.on_sample(2100), None);
        }
        assert_eq!(m.average(), 1950);
        assert!(!m.is_ready());

        assert_eq!(m.on_sample(2100), None);
        assert_eq!(m.on_sample(2100), None);
        assert_eq!(m.on_sample(2100), Some(true));
    }

    #[test]
    fn test_average_before_samples() {
        let m = monitor();
        assert_eq!(m.average(), 0);
        assert!(!m.is_ready());
    }
}
