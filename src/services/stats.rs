use chrono::Weekday;
use log::info;

use super::accounting::{ErrorCount, ErrorCounters};

/// Weekly report gate.
///
/// | day     | gate     | effect                                   |
/// |---------|----------|------------------------------------------|
/// | Tuesday | any      | -> `Armed`                               |
/// | Monday  | Armed    | report, reset weekly counts, -> `Reported` |
/// | Monday  | Reported | none                                     |
/// | other   | any      | none                                     |
///
/// A process that never sees a Tuesday stays `Reported` and skips the
/// following Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsGate {
    Armed,
    Reported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsReport {
    pub weekly: ErrorCount,
    pub session: ErrorCount,
}

impl StatsReport {
    pub fn log(&self) {
        info!("📈 Stats");
        info!("Errors last 7 days:");
        info!("read: {}", self.weekly.read);
        info!("write: {}", self.weekly.write);
        info!("Errors this session (total):");
        info!("read: {}", self.session.read);
        info!("write: {}", self.session.write);
    }
}

#[derive(Debug, Clone)]
pub struct StatsReporter {
    gate: StatsGate,
}

impl StatsReporter {
    pub fn new() -> Self {
        Self {
            gate: StatsGate::Armed,
        }
    }

    pub fn gate(&self) -> StatsGate {
        self.gate
    }

    /// Apply the weekly rule for `today`. Returns the report when one is due,
    /// after the weekly counters have been cleared.
    pub fn evaluate(&mut self, today: Weekday, counters: &mut ErrorCounters) -> Option<StatsReport> {
        match (today, self.gate) {
            (Weekday::Tue, _) => {
                self.gate = StatsGate::Armed;
                None
            }
            (Weekday::Mon, StatsGate::Armed) => {
                let report = StatsReport {
                    weekly: counters.weekly(),
                    session: counters.session(),
                };
                counters.reset_weekly();
                self.gate = StatsGate::Reported;
                Some(report)
            }
            _ => None,
        }
    }
}

impl Default for StatsReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters_with(read: u64, write: u64) -> ErrorCounters {
        let mut counters = ErrorCounters::new();
        (0..read).for_each(|_| counters.record_read_error());
        (0..write).for_each(|_| counters.record_write_error());
        counters
    }

    #[test]
    fn monday_reports_once_and_resets_weekly() {
        let mut reporter = StatsReporter::new();
        let mut counters = counters_with(3, 1);

        let report = reporter.evaluate(Weekday::Mon, &mut counters).unwrap();
        assert_eq!(report.weekly, ErrorCount { read: 3, write: 1 });
        assert_eq!(report.session, ErrorCount { read: 3, write: 1 });
        assert_eq!(counters.weekly(), ErrorCount::default());
        assert_eq!(counters.session().total(), 4);
        assert_eq!(reporter.gate(), StatsGate::Reported);

        counters.record_read_error();
        assert!(reporter.evaluate(Weekday::Mon, &mut counters).is_none());
        assert_eq!(counters.weekly().read, 1);
    }

    #[test]
    fn tuesday_rearms_the_gate() {
        let mut reporter = StatsReporter::new();
        let mut counters = counters_with(1, 0);
        reporter.evaluate(Weekday::Mon, &mut counters);

        assert!(reporter.evaluate(Weekday::Tue, &mut counters).is_none());
        assert_eq!(reporter.gate(), StatsGate::Armed);
        assert!(reporter.evaluate(Weekday::Tue, &mut counters).is_none());
        assert_eq!(reporter.gate(), StatsGate::Armed);

        assert!(reporter.evaluate(Weekday::Mon, &mut counters).is_some());
    }

    #[test]
    fn other_days_change_nothing() {
        let mut reporter = StatsReporter::new();
        let mut counters = counters_with(2, 2);

        for day in [Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat, Weekday::Sun] {
            assert!(reporter.evaluate(day, &mut counters).is_none());
        }
        assert_eq!(reporter.gate(), StatsGate::Armed);
        assert_eq!(counters.weekly(), ErrorCount { read: 2, write: 2 });
    }

    #[test]
    fn missed_tuesday_suppresses_next_monday() {
        let mut reporter = StatsReporter::new();
        let mut counters = counters_with(0, 0);
        assert!(reporter.evaluate(Weekday::Mon, &mut counters).is_some());

        for day in [Weekday::Wed, Weekday::Sun] {
            reporter.evaluate(day, &mut counters);
        }
        assert!(reporter.evaluate(Weekday::Mon, &mut counters).is_none());
    }
}
