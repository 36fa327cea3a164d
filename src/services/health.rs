use log::{error, info};
use std::time::Duration;

use super::accounting::ErrorCounters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupState {
    Starting,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthVerdict {
    /// First cycle was clean, the service keeps running.
    Passed,
    /// First cycle saw at least one error, the service must stop.
    Failed,
    /// Already running, nothing to check.
    Skipped,
}

/// Gate applied once, after the first complete cycle.
#[derive(Debug, Clone)]
pub struct StartupCheck {
    state: StartupState,
}

impl StartupCheck {
    pub fn new() -> Self {
        Self {
            state: StartupState::Starting,
        }
    }

    pub fn state(&self) -> StartupState {
        self.state
    }

    pub fn evaluate(&mut self, counters: &ErrorCounters, interval: Duration) -> HealthVerdict {
        if self.state == StartupState::Running {
            return HealthVerdict::Skipped;
        }

        let session = counters.session();
        if session.read > 0 || session.write > 0 {
            error!("💥 Error upon first loop ({}), quitting", session);
            return HealthVerdict::Failed;
        }

        info!("✅ Service started and successfully sent first payload");
        info!("⏱️  Sending data every {} seconds", interval.as_secs());
        self.state = StartupState::Running;
        HealthVerdict::Passed
    }
}

impl Default for StartupCheck {
    fn default() -> Self {
        Self::new()
    }
}
