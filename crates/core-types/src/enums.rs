use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The look-back window requested from the price provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 7] = [
        Period::OneMonth,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::Max,
    ];

    /// The provider-facing code ("1mo", "1y", ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::Max => "max",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::InvalidInput("period".to_string(), s.to_string()))
    }
}

/// Bar size of the requested observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1h")]
    Hourly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Hourly => "1h",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1d" => Ok(Interval::Daily),
            "1h" => Ok(Interval::Hourly),
            other => Err(CoreError::InvalidInput("interval".to_string(), other.to_string())),
        }
    }
}

/// Either a named look-back period or an explicit inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceRange {
    Period(Period),
    Dates { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceRange::Period(p) => write!(f, "{}", p),
            PriceRange::Dates { start, end } => write!(f, "{}..{}", start, end),
        }
    }
}

/// How often the portfolio weights are reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceFrequency {
    None,
    Weekly,
    #[default]
    Monthly,
}

impl fmt::Display for RebalanceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RebalanceFrequency::None => "none",
            RebalanceFrequency::Weekly => "weekly",
            RebalanceFrequency::Monthly => "monthly",
        };
        f.write_str(s)
    }
}

impl FromStr for RebalanceFrequency {
    type Err = CoreError;

    /// Accepts the long names as well as the pandas-style "W" / "M" codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(RebalanceFrequency::None),
            "weekly" | "w" => Ok(RebalanceFrequency::Weekly),
            "monthly" | "m" => Ok(RebalanceFrequency::Monthly),
            other => Err(CoreError::InvalidInput("rebalance".to_string(), other.to_string())),
        }
    }
}

/// How the portfolio weights are assigned at each rebalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightMode {
    #[default]
    Equal,
    Custom,
}

impl FromStr for WeightMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal" => Ok(WeightMode::Equal),
            "custom" => Ok(WeightMode::Custom),
            other => Err(CoreError::InvalidInput("weight_mode".to_string(), other.to_string())),
        }
    }
}

/// Identifies one of the single-asset strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    /// Simple moving average crossover (trend following).
    Momentum,
    /// DI+/DI- crossover filtered by ADX trend strength.
    Adx,
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyId::Momentum => f.write_str("Momentum (Moving Avg Crossover)"),
            StrategyId::Adx => f.write_str("ADX (Directional Crossover)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_codes_round_trip_through_from_str() {
        for period in Period::ALL {
            assert_eq!(period.as_str().parse::<Period>().unwrap(), period);
        }
        assert!("3y".parse::<Period>().is_err());
    }

    #[test]
    fn rebalance_accepts_pandas_codes() {
        assert_eq!("W".parse::<RebalanceFrequency>().unwrap(), RebalanceFrequency::Weekly);
        assert_eq!("M".parse::<RebalanceFrequency>().unwrap(), RebalanceFrequency::Monthly);
        assert_eq!("none".parse::<RebalanceFrequency>().unwrap(), RebalanceFrequency::None);
    }
}
