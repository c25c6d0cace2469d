use crate::domain::market::candle::Candle;
use crate::domain::market::timeframe::Timeframe;

/// An in-progress aggregation of 1-minute candles into a higher timeframe.
///
/// Open is fixed from the first 1-minute candle merged in; high/low track
/// the running extremes; close tracks the latest; volume accumulates.
#[derive(Debug, Clone)]
pub struct TimeframeCandle {
    pub timeframe: Timeframe,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub timestamp_ms: i64,
    pub candle_count: usize,
}

impl TimeframeCandle {
    pub fn start(timeframe: Timeframe, first: &Candle) -> Self {
        Self {
            timeframe,
            open: first.open,
            high: first.high,
            low: first.low,
            close: first.close,
            volume: first.volume,
            timestamp_ms: first.timestamp_ms,
            candle_count: 1,
        }
    }

    pub fn merge(&mut self, next: &Candle) {
        self.high = self.high.max(next.high);
        self.low = self.low.min(next.low);
        self.close = next.close;
        self.volume += next.volume;
        self.candle_count += 1;
    }

    pub fn is_complete(&self) -> bool {
        self.candle_count >= self.timeframe.to_minutes()
    }

    pub fn to_candle(&self) -> Candle {
        Candle::new(
            self.timestamp_ms,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
        )
    }
}
