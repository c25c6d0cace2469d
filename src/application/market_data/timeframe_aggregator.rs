use std::collections::HashMap;

use crate::domain::market::candle::Candle;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::market::timeframe_candle::TimeframeCandle;

type SeriesKey = (String, String, Timeframe);

/// Synthesizes higher-timeframe candles from the trailing window of 1m
/// candles for every `(exchange, symbol, timeframe)` the run tracks
/// (spec.md C2).
///
/// Each timeframe accumulates independently and non-overlapping: once a
/// window of `k` 1-minute candles completes, the accumulator resets and
/// starts fresh on the next candle.
#[derive(Debug, Default)]
pub struct TimeframeAggregator {
    active: HashMap<SeriesKey, TimeframeCandle>,
}

impl TimeframeAggregator {
    pub fn new() -> Self {
        Self {
            active: HashMap::new(),
        }
    }

    /// Feed one 1-minute candle into the accumulator for `timeframe`.
    /// Returns the completed higher-timeframe candle when this candle
    /// finishes its window, `None` otherwise. For `Timeframe::OneMin` this
    /// always returns the candle itself unchanged.
    pub fn ingest(
        &mut self,
        exchange: &str,
        symbol: &str,
        timeframe: Timeframe,
        candle: &Candle,
    ) -> Option<Candle> {
        if timeframe == Timeframe::OneMin {
            return Some(*candle);
        }

        let key = (exchange.to_string(), symbol.to_string(), timeframe);
        match self.active.get_mut(&key) {
            Some(running) => {
                running.merge(candle);
                if running.is_complete() {
                    let done = self.active.remove(&key).expect("key verified present above");
                    Some(done.to_candle())
                } else {
                    None
                }
            }
            None => {
                let started = TimeframeCandle::start(timeframe, candle);
                if started.is_complete() {
                    Some(started.to_candle())
                } else {
                    self.active.insert(key, started);
                    None
                }
            }
        }
    }
}
