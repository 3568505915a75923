use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Forecast lookahead window measured in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Horizon(u32);

impl Horizon {
    pub const TEN_DAYS: Self = Self(10);
    pub const HUNDRED_DAYS: Self = Self(100);
    pub const ONE_YEAR: Self = Self(365);
    pub const EIGHTEEN_MONTHS: Self = Self(547);
    pub const TWO_YEARS: Self = Self(730);

    /// Horizons the forecasting service publishes, shortest first.
    pub const STANDARD: [Self; 5] = [
        Self::TEN_DAYS,
        Self::HUNDRED_DAYS,
        Self::ONE_YEAR,
        Self::EIGHTEEN_MONTHS,
        Self::TWO_YEARS,
    ];

    pub const fn from_days(days: u32) -> Self {
        Self(days)
    }

    pub const fn days(self) -> u32 {
        self.0
    }

    /// Wire key, e.g. `10d`.
    pub fn key(self) -> String {
        format!("{}d", self.0)
    }

    /// Parse a wire key such as `10d` (a bare day count is accepted too).
    pub fn parse_key(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let digits = trimmed.strip_suffix('d').unwrap_or(trimmed);
        if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u32>().ok().map(Self)
    }

    /// Short column label used in overview tables.
    pub fn label(self) -> String {
        match self.0 {
            365 => String::from("1yr"),
            547 => String::from("1.5yr"),
            730 => String::from("2yr"),
            days => format!("{days}d"),
        }
    }
}

impl Display for Horizon {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d", self.0)
    }
}

impl TryFrom<String> for Horizon {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_key(&value).ok_or_else(|| format!("invalid horizon key '{value}'"))
    }
}

impl From<Horizon> for String {
    fn from(value: Horizon) -> Self {
        value.key()
    }
}
