use std::fmt;

/// A read/write error pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorCount {
    pub read: u64,
    pub write: u64,
}

impl ErrorCount {
    pub fn total(&self) -> u64 {
        self.read + self.write
    }
}

impl fmt::Display for ErrorCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "read: {}, write: {}", self.read, self.write)
    }
}

/// Error counters for the process lifetime and for the current reporting week.
///
/// Session counts only grow. Weekly counts are cleared by the stats reporter.
#[derive(Debug, Clone, Default)]
pub struct ErrorCounters {
    session: ErrorCount,
    weekly: ErrorCount,
}

impl ErrorCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_read_error(&mut self) {
        self.session.read += 1;
        self.weekly.read += 1;
    }

    pub fn record_write_error(&mut self) {
        self.session.write += 1;
        self.weekly.write += 1;
    }

    pub fn session(&self) -> ErrorCount {
        self.session
    }

    pub fn weekly(&self) -> ErrorCount {
        self.weekly
    }

    pub(crate) fn reset_weekly(&mut self) {
        self.weekly = ErrorCount::default();
    }
}
