//! Run-level defaults read from the environment, in the style of the
//! source's `config::simulation_config::SimulationEnvConfig`: `env::var`
//! with `.ok().and_then(parse)` and an `unwrap_or` default per field.
//!
//! Per-run parameters (`start_date`, `finish_date`, routes) are not here;
//! they're explicit arguments to `application::simulator::run`.

use std::env;

use crate::domain::market::timeframe::Timeframe;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Default taker fee rate applied when a route doesn't override it.
    pub fee_rate: f64,
    /// Balance/position rounding tick (spec.md §9).
    pub tick: f64,
    /// Timeframes the aggregator tracks in addition to the route's own
    /// (spec.md §4.2's fixed table; overridable for tests).
    pub aggregation_timeframes: Vec<Timeframe>,
}

impl SimulationConfig {
    pub fn from_env() -> Self {
        let fee_rate = env::var("RUSTRADE_FEE_RATE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.001);

        let tick = env::var("RUSTRADE_TICK")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1e-8);

        Self {
            fee_rate,
            tick,
            aggregation_timeframes: Timeframe::all(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fee_rate: 0.001,
            tick: 1e-8,
            aggregation_timeframes: Timeframe::all(),
        }
    }
}
