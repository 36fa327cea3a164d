use chrono::{Datelike, Local, Utc, Weekday};
use log::{error, info};
use std::time::Duration;
use tokio::time::sleep;

use super::accounting::ErrorCounters;
use super::health::{HealthVerdict, StartupCheck, StartupState};
use super::stats::{StatsGate, StatsReporter};
use crate::devices::{read_profile, Device};
use crate::modbus::ModbusClientTrait;
use crate::output::{Batch, BatchBuilder, BatchPublisher};
use crate::registry::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Continue,
    /// Dry-run printed its batch; the process should exit cleanly.
    DryRunComplete,
    /// The first cycle saw errors; the process should exit with failure.
    StartupFailed,
}

/// Why [`BridgeService::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    DryRunComplete,
    StartupFailed,
}

/// Read, publish and account, once per interval.
pub struct BridgeService {
    profile: Profile,
    device: Box<dyn Device>,
    client: Box<dyn ModbusClientTrait>,
    publisher: Box<dyn BatchPublisher>,
    builder: BatchBuilder,
    counters: ErrorCounters,
    stats: StatsReporter,
    startup: StartupCheck,
    interval: Duration,
    dry_run: bool,
}

impl BridgeService {
    pub fn new(
        profile: Profile,
        device: Box<dyn Device>,
        client: Box<dyn ModbusClientTrait>,
        publisher: Box<dyn BatchPublisher>,
        builder: BatchBuilder,
        interval: Duration,
    ) -> Self {
        info!("🚀 Initializing bridge service");
        info!(
            "📡 Device: {} [{}] at address {}",
            device.name(),
            device.device_type(),
            device.address()
        );
        info!("📋 Profile: {}", profile);
        info!(
            "📤 Output: {} ({})",
            publisher.sender_type(),
            publisher.destination()
        );

        Self {
            profile,
            device,
            client,
            publisher,
            builder,
            counters: ErrorCounters::new(),
            stats: StatsReporter::new(),
            startup: StartupCheck::new(),
            interval,
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn counters(&self) -> &ErrorCounters {
        &self.counters
    }

    pub fn stats_gate(&self) -> StatsGate {
        self.stats.gate()
    }

    pub fn startup_state(&self) -> StartupState {
        self.startup.state()
    }

    /// Read every parameter and assemble this cycle's batch.
    pub async fn collect_batch(&mut self) -> Batch {
        let readings = read_profile(
            self.device.as_ref(),
            self.client.as_ref(),
            &self.profile,
            &mut self.counters,
        )
        .await;
        self.builder.build(&readings, Utc::now())
    }

    async fn publish(&mut self, batch: &Batch) {
        if let Err(e) = self.publisher.publish(batch).await {
            error!(
                "❌ Error writing {} points to {} ({}): {}",
                batch.len(),
                self.publisher.sender_type(),
                self.publisher.destination(),
                e
            );
            self.counters.record_write_error();
        }
    }

    /// One full pass. `today` drives the weekly stats rule.
    pub async fn run_cycle(&mut self, today: Weekday) -> CycleOutcome {
        let batch = self.collect_batch().await;

        if self.dry_run {
            info!("🧪 Dry run, batch of {} points:", batch.len());
            for line in batch.lines() {
                println!("{}", line);
            }
            return CycleOutcome::DryRunComplete;
        }

        self.publish(&batch).await;

        if let Some(report) = self.stats.evaluate(today, &mut self.counters) {
            report.log();
        }

        match self.startup.evaluate(&self.counters, self.interval) {
            HealthVerdict::Failed => CycleOutcome::StartupFailed,
            HealthVerdict::Passed | HealthVerdict::Skipped => CycleOutcome::Continue,
        }
    }

    /// Loop until a cycle asks to stop. The pause is fixed, so the real period
    /// is the interval plus the time a cycle takes.
    pub async fn run(&mut self) -> Termination {
        loop {
            let today = Local::now().weekday();
            match self.run_cycle(today).await {
                CycleOutcome::Continue => sleep(self.interval).await,
                CycleOutcome::DryRunComplete => return Termination::DryRunComplete,
                CycleOutcome::StartupFailed => return Termination::StartupFailed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::MeterDevice;
    use crate::registry::ParameterSpec;
    use crate::utils::error::BridgeError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct TableClient {
        values: Arc<Mutex<HashMap<u16, f32>>>,
    }

    #[async_trait]
    impl ModbusClientTrait for TableClient {
        async fn read_holding_registers(
            &self,
            _slave_id: u8,
            start_addr: u16,
            _count: u16,
        ) -> Result<Vec<u8>, BridgeError> {
            self.values
                .lock()
                .unwrap()
                .get(&start_addr)
                .map(|v| v.to_be_bytes().to_vec())
                .ok_or_else(|| BridgeError::CommunicationError("no reply".to_string()))
        }
    }

    struct RecordingPublisher {
        sent: Arc<Mutex<Vec<String>>>,
        fail: Arc<Mutex<bool>>,
    }

    #[async_trait]
    impl BatchPublisher for RecordingPublisher {
        async fn publish(&self, batch: &Batch) -> Result<(), BridgeError> {
            if *self.fail.lock().unwrap() {
                return Err(BridgeError::PublishError("unauthorized".to_string()));
            }
            self.sent.lock().unwrap().push(batch.to_line_protocol());
            Ok(())
        }

        fn sender_type(&self) -> &str {
            "recording"
        }

        fn destination(&self) -> &str {
            "memory"
        }
    }

    struct Harness {
        values: Arc<Mutex<HashMap<u16, f32>>>,
        sent: Arc<Mutex<Vec<String>>>,
        fail: Arc<Mutex<bool>>,
        service: BridgeService,
    }

    fn harness(values: &[(u16, f32)], fail_publish: bool) -> Harness {
        let values = Arc::new(Mutex::new(values.iter().copied().collect::<HashMap<_, _>>()));
        let sent = Arc::new(Mutex::new(Vec::new()));
        let fail = Arc::new(Mutex::new(fail_publish));

        let profile = Profile::new(
            "test",
            vec![
                ("V", ParameterSpec::new(0, 1.0, 1)),
                ("I", ParameterSpec::new(2, 0.1, 2)),
            ],
        )
        .unwrap();

        let service = BridgeService::new(
            profile,
            Box::new(MeterDevice::new(1, "meter")),
            Box::new(TableClient {
                values: values.clone(),
            }),
            Box::new(RecordingPublisher {
                sent: sent.clone(),
                fail: fail.clone(),
            }),
            BatchBuilder::new("measurement", "tags"),
            Duration::from_secs(10),
        );

        Harness {
            values,
            sent,
            fail,
            service,
        }
    }

    const GOOD: [(u16, f32); 2] = [(0, 230.03), (2, 124.0)];

    #[tokio::test]
    async fn clean_first_cycle_publishes_and_starts() {
        let mut h = harness(&GOOD, false);

        assert_eq!(h.service.run_cycle(Weekday::Wed).await, CycleOutcome::Continue);
        assert_eq!(h.service.startup_state(), StartupState::Running);
        assert_eq!(
            *h.sent.lock().unwrap(),
            vec!["measurement,tags V=230.0\nmeasurement,tags I=12.40".to_string()]
        );
    }

    #[tokio::test]
    async fn read_error_on_first_cycle_is_fatal_but_still_published() {
        let mut h = harness(&[(2, 124.0)], false);

        assert_eq!(h.service.run_cycle(Weekday::Wed).await, CycleOutcome::StartupFailed);
        assert_eq!(
            *h.sent.lock().unwrap(),
            vec!["measurement,tags V=0\nmeasurement,tags I=12.40".to_string()]
        );
        assert_eq!(h.service.counters().session().read, 1);
    }

    #[tokio::test]
    async fn write_error_on_first_cycle_is_fatal() {
        let mut h = harness(&GOOD, true);

        assert_eq!(h.service.run_cycle(Weekday::Wed).await, CycleOutcome::StartupFailed);
        assert_eq!(h.service.counters().session().write, 1);
        assert_eq!(h.service.counters().weekly().write, 1);
    }

    #[tokio::test]
    async fn later_errors_are_counted_not_fatal() {
        let mut h = harness(&GOOD, false);
        assert_eq!(h.service.run_cycle(Weekday::Wed).await, CycleOutcome::Continue);

        h.values.lock().unwrap().clear();
        *h.fail.lock().unwrap() = true;

        assert_eq!(h.service.run_cycle(Weekday::Wed).await, CycleOutcome::Continue);
        assert_eq!(h.service.counters().session().read, 2);
        assert_eq!(h.service.counters().session().write, 1);

        assert_eq!(h.service.run_cycle(Weekday::Thu).await, CycleOutcome::Continue);
        assert_eq!(h.service.counters().session().read, 4);
        assert_eq!(h.service.counters().session().write, 2);
        assert_eq!(h.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dry_run_prints_without_publishing() {
        let mut h = harness(&GOOD, false);
        h.service = h.service.with_dry_run(true);

        assert_eq!(h.service.run_cycle(Weekday::Mon).await, CycleOutcome::DryRunComplete);
        assert!(h.sent.lock().unwrap().is_empty());
        assert_eq!(h.service.stats_gate(), StatsGate::Armed);
    }

    #[tokio::test]
    async fn run_stops_after_dry_run_batch() {
        let mut h = harness(&GOOD, true);
        h.service = h.service.with_dry_run(true);

        assert_eq!(h.service.run().await, Termination::DryRunComplete);
        assert!(h.sent.lock().unwrap().is_empty());
        assert_eq!(h.service.counters().session().write, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_before_sleeping_on_startup_failure() {
        let mut h = harness(&GOOD, true);
        let started = tokio::time::Instant::now();

        assert_eq!(h.service.run().await, Termination::StartupFailed);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn monday_cycle_reports_and_resets_weekly_counts() {
        let mut h = harness(&GOOD, false);
        assert_eq!(h.service.run_cycle(Weekday::Sun).await, CycleOutcome::Continue);

        *h.fail.lock().unwrap() = true;
        h.service.run_cycle(Weekday::Sun).await;
        assert_eq!(h.service.counters().weekly().write, 1);

        h.service.run_cycle(Weekday::Mon).await;
        assert_eq!(h.service.stats_gate(), StatsGate::Reported);
        assert_eq!(h.service.counters().weekly().write, 0);
        assert_eq!(h.service.counters().session().write, 2);

        h.service.run_cycle(Weekday::Mon).await;
        assert_eq!(h.service.counters().weekly().write, 1);

        h.service.run_cycle(Weekday::Tue).await;
        assert_eq!(h.service.stats_gate(), StatsGate::Armed);
    }
}
