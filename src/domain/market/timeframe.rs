use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported candle timeframe, expressed internally as a 1-minute count.
///
/// The set mirrors spec.md's fixed configured table: 1m, 3m, 5m, 15m, 30m,
/// 1h, 2h, 3h, 4h, 6h, 8h, 1d.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    OneMin,
    ThreeMin,
    FiveMin,
    FifteenMin,
    ThirtyMin,
    OneHour,
    TwoHour,
    ThreeHour,
    FourHour,
    SixHour,
    EightHour,
    OneDay,
}

impl Timeframe {
    /// Duration of this timeframe in whole 1-minute candles.
    pub fn to_minutes(&self) -> usize {
        match self {
            Timeframe::OneMin => 1,
            Timeframe::ThreeMin => 3,
            Timeframe::FiveMin => 5,
            Timeframe::FifteenMin => 15,
            Timeframe::ThirtyMin => 30,
            Timeframe::OneHour => 60,
            Timeframe::TwoHour => 120,
            Timeframe::ThreeHour => 180,
            Timeframe::FourHour => 240,
            Timeframe::SixHour => 360,
            Timeframe::EightHour => 480,
            Timeframe::OneDay => 1440,
        }
    }

    pub fn to_seconds(&self) -> i64 {
        (self.to_minutes() * 60) as i64
    }

    /// All timeframes the engine knows how to aggregate, in ascending order.
    pub fn all() -> Vec<Timeframe> {
        vec![
            Timeframe::OneMin,
            Timeframe::ThreeMin,
            Timeframe::FiveMin,
            Timeframe::FifteenMin,
            Timeframe::ThirtyMin,
            Timeframe::OneHour,
            Timeframe::TwoHour,
            Timeframe::ThreeHour,
            Timeframe::FourHour,
            Timeframe::SixHour,
            Timeframe::EightHour,
            Timeframe::OneDay,
        ]
    }

    /// True when `(index + 1)` completes a period of this timeframe, i.e. the
    /// 1-minute candle at `index` (zero-based within the run) is the last
    /// minute of its window.
    pub fn closes_at(&self, index: usize) -> bool {
        (index + 1) % self.to_minutes() == 0
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "1m" | "1min" => Ok(Timeframe::OneMin),
            "3m" | "3min" => Ok(Timeframe::ThreeMin),
            "5m" | "5min" => Ok(Timeframe::FiveMin),
            "15m" | "15min" => Ok(Timeframe::FifteenMin),
            "30m" | "30min" => Ok(Timeframe::ThirtyMin),
            "1h" | "1hour" => Ok(Timeframe::OneHour),
            "2h" | "2hour" => Ok(Timeframe::TwoHour),
            "3h" | "3hour" => Ok(Timeframe::ThreeHour),
            "4h" | "4hour" => Ok(Timeframe::FourHour),
            "6h" | "6hour" => Ok(Timeframe::SixHour),
            "8h" | "8hour" => Ok(Timeframe::EightHour),
            "1d" | "1day" => Ok(Timeframe::OneDay),
            _ => Err(anyhow!(
                "Invalid timeframe: '{}'. Valid options: 1m,3m,5m,15m,30m,1h,2h,3h,4h,6h,8h,1d",
                s
            )),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::OneMin => "1m",
            Timeframe::ThreeMin => "3m",
            Timeframe::FiveMin => "5m",
            Timeframe::FifteenMin => "15m",
            Timeframe::ThirtyMin => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::TwoHour => "2h",
            Timeframe::ThreeHour => "3h",
            Timeframe::FourHour => "4h",
            Timeframe::SixHour => "6h",
            Timeframe::EightHour => "8h",
            Timeframe::OneDay => "1d",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minutes() {
        assert_eq!(Timeframe::OneMin.to_minutes(), 1);
        assert_eq!(Timeframe::FiveMin.to_minutes(), 5);
        assert_eq!(Timeframe::FifteenMin.to_minutes(), 15);
        assert_eq!(Timeframe::OneHour.to_minutes(), 60);
        assert_eq!(Timeframe::FourHour.to_minutes(), 240);
        assert_eq!(Timeframe::OneDay.to_minutes(), 1440);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Timeframe::from_str("1m").unwrap(), Timeframe::OneMin);
        assert_eq!(Timeframe::from_str("15m").unwrap(), Timeframe::FifteenMin);
        assert_eq!(Timeframe::from_str("4h").unwrap(), Timeframe::FourHour);
        assert_eq!(Timeframe::from_str("1d").unwrap(), Timeframe::OneDay);
        assert!(Timeframe::from_str("invalid").is_err());
    }

    #[test]
    fn closes_at_matches_boundary() {
        let tf = Timeframe::FiveMin;
        for i in 0..4 {
            assert!(!tf.closes_at(i));
        }
        assert!(tf.closes_at(4));
        assert!(tf.closes_at(9));
    }

    #[test]
    fn one_minute_closes_every_index() {
        for i in 0..10 {
            assert!(Timeframe::OneMin.closes_at(i));
        }
    }
}
