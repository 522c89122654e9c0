//! Monotonic process uptime

use std::time::{Duration, Instant};

/// Clock started when the owning context is created
#[derive(Debug, Clone, Copy)]
pub struct UptimeClock {
    started: Instant,
}

impl UptimeClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}

impl Default for UptimeClock {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_advances() {
        let clock = UptimeClock::start();
        std::thread::sleep(Duration::from_millis(5));
        assert!(clock.elapsed() >= Duration::from_millis(5));
    }
}
