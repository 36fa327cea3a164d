pub mod accounting;
pub mod stats;
pub mod health;
pub mod bridge_service;

pub use accounting::{ErrorCount, ErrorCounters};
pub use bridge_service::{BridgeService, CycleOutcome, Termination};
pub use health::{HealthVerdict, StartupCheck, StartupState};
pub use stats::{StatsGate, StatsReport, StatsReporter};
