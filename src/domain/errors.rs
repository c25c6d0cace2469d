use thiserror::Error;

/// Top-level error taxonomy for the simulation engine (spec.md §6/§7).
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid date range: start {start_date} is not before finish {finish_date}")]
    InvalidDateRange { start_date: String, finish_date: String },

    #[error("requested finish date {finish_date} is in the future")]
    FutureDateRequested { finish_date: String },

    #[error("no candles available for {exchange}/{symbol} in the requested range")]
    CandleMissing { exchange: String, symbol: String },

    #[error(
        "candle gap for {exchange}/{symbol}: expected timestamp {expected_ts}, found {found_ts}"
    )]
    CandleGap {
        exchange: String,
        symbol: String,
        expected_ts: i64,
        found_ts: i64,
    },

    #[error("candle at {timestamp_ms} failed OHLCV validation: {reason}")]
    InvalidCandle { timestamp_ms: i64, reason: String },

    #[error("route validation failed: {0}")]
    RouteValidation(String),

    #[error("strategy runtime error on route {route}: {source}")]
    StrategyRuntime {
        route: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("matching engine invariant violated: {0}")]
    MatchingInvariant(String),

    #[error("order not found: {0}")]
    OrderNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candle_gap_message_includes_timestamps() {
        let err = SimulationError::CandleGap {
            exchange: "binance".into(),
            symbol: "BTC-USDT".into(),
            expected_ts: 60_000,
            found_ts: 120_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("60000"));
        assert!(msg.contains("120000"));
    }

    #[test]
    fn strategy_runtime_wraps_source() {
        let err = SimulationError::StrategyRuntime {
            route: "binance/BTC-USDT/1h/dual_sma".into(),
            source: anyhow::anyhow!("division by zero in indicator"),
        };
        assert!(err.to_string().contains("dual_sma"));
    }
}
