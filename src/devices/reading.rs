use std::fmt;

/// Result of reading one parameter in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Valid(f64),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub parameter: String,
    pub decimals: u32,
    pub outcome: ReadOutcome,
}

impl Reading {
    pub fn valid(parameter: impl Into<String>, value: f64, decimals: u32) -> Self {
        Self {
            parameter: parameter.into(),
            decimals,
            outcome: ReadOutcome::Valid(value),
        }
    }

    pub fn failed(parameter: impl Into<String>, cause: impl Into<String>, decimals: u32) -> Self {
        Self {
            parameter: parameter.into(),
            decimals,
            outcome: ReadOutcome::Failed(cause.into()),
        }
    }

    /// Published value. A failed read is published as `0`, which downstream
    /// cannot tell apart from a genuine zero.
    pub fn value(&self) -> f64 {
        match self.outcome {
            ReadOutcome::Valid(value) => value,
            ReadOutcome::Failed(_) => 0.0,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, ReadOutcome::Valid(_))
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.outcome {
            ReadOutcome::Failed(cause) => Some(cause),
            ReadOutcome::Valid(_) => None,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            ReadOutcome::Valid(value) => write!(f, "{:.*}", self.decimals as usize, value),
            ReadOutcome::Failed(_) => f.write_str("0"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_reading_renders_with_precision() {
        assert_eq!(Reading::valid("I", 12.4, 2).to_string(), "12.40");
        assert_eq!(Reading::valid("V", 230.0, 1).to_string(), "230.0");
        assert_eq!(Reading::valid("E", 1234.0, 0).to_string(), "1234");
    }

    #[test]
    fn failed_reading_is_zero() {
        let reading = Reading::failed("P1", "timeout", 2);
        assert_eq!(reading.value(), 0.0);
        assert!(!reading.is_valid());
        assert_eq!(reading.failure(), Some("timeout"));
        assert_eq!(reading.to_string(), "0");
    }
}
