use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SECONDS_PER_DAY: u64 = 86400;

/// Lookback window used to filter transactions by recency
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Last7,
    Last30,
    /// Looks back a full 90 days
    Last90,
    Last365,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Last7, Period::Last30, Period::Last90, Period::Last365];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Last7 => "last7",
            Period::Last30 => "last30",
            Period::Last90 => "last90",
            Period::Last365 => "last365",
        }
    }

    pub fn lookback_days(&self) -> u64 {
        match self {
            Period::Last7 => 7,
            Period::Last30 => 30,
            Period::Last90 => 90,
            Period::Last365 => 365,
        }
    }

    pub fn lookback(&self) -> Duration {
        Duration::from_secs(self.lookback_days() * SECONDS_PER_DAY)
    }

    /// Earliest creation time (inclusive) of a transaction that falls in this period
    pub fn window_start(&self, now: SystemTime) -> SystemTime {
        now.checked_sub(self.lookback()).unwrap_or(UNIX_EPOCH)
    }
}

impl FromStr for Period {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last7" => Ok(Period::Last7),
            "last30" => Ok(Period::Last30),
            "last90" => Ok(Period::Last90),
            "last365" => Ok(Period::Last365),
            _ => Err(PeriodError::Invalid(String::from(s))),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeriodError {
    Invalid(String),
}

impl std::error::Error for PeriodError {}

impl fmt::Display for PeriodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodError::Invalid(token) => write!(
                f,
                "Invalid period '{token}'. Expected one of: last7, last30, last90, last365"
            ),
        }
    }
}
