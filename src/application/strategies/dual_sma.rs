use crate::application::context::SimulationContext;
use crate::application::strategy::{HyperParameter, Strategy};
use crate::domain::trading::types::{OrderSide, OrderType, Route};

fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period || period == 0 {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Dual simple-moving-average crossover: goes long on a golden cross, flat
/// on a death cross. A direct adaptation of the teacher's `DualSMAStrategy`
/// to the `Strategy` capability set (spec.md §9).
#[derive(Debug, Clone)]
pub struct DualSma {
    pub fast_period: usize,
    pub slow_period: usize,
    pub qty: f64,
}

impl DualSma {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            qty: 1.0,
        }
    }
}

impl Strategy for DualSma {
    fn init_objects(&mut self, _ctx: &mut SimulationContext, route: &Route) {
        tracing::debug!(route = %route.key(), "DualSma initialized");
    }

    fn execute(&mut self, ctx: &mut SimulationContext, route: &Route) -> anyhow::Result<()> {
        let closes: Vec<f64> = ctx
            .candle_store
            .candles(&route.exchange, &route.symbol, route.timeframe)
            .iter()
            .map(|c| c.close)
            .collect();

        let (Some(fast), Some(slow)) = (
            sma(&closes, self.fast_period),
            sma(&closes, self.slow_period),
        ) else {
            return Ok(());
        };

        let has_position = ctx
            .position(&route.exchange, &route.symbol)
            .map(|p| p.is_open())
            .unwrap_or(false);

        if fast > slow && !has_position {
            tracing::debug!(route = %route.key(), fast, slow, "golden cross, going long");
            ctx.submit_order(
                &route.exchange,
                &route.symbol,
                OrderSide::Buy,
                OrderType::Market,
                None,
                self.qty,
            );
        } else if fast < slow && has_position {
            tracing::debug!(route = %route.key(), fast, slow, "death cross, flattening");
            ctx.submit_order(
                &route.exchange,
                &route.symbol,
                OrderSide::Sell,
                OrderType::Market,
                None,
                self.qty,
            );
        }

        Ok(())
    }

    fn terminate(&mut self, _ctx: &mut SimulationContext, route: &Route) {
        tracing::debug!(route = %route.key(), "DualSma terminated");
    }

    fn hyper_parameters(&self) -> Vec<HyperParameter> {
        vec![
            HyperParameter::new("fast_period", 2.0, 100.0, self.fast_period as f64),
            HyperParameter::new("slow_period", 5.0, 400.0, self.slow_period as f64),
        ]
    }

    fn apply_hyper_parameters(&mut self, values: &std::collections::HashMap<String, f64>) {
        if let Some(&fast) = values.get("fast_period") {
            self.fast_period = (fast.round() as usize).max(1);
        }
        if let Some(&slow) = values.get("slow_period") {
            self.slow_period = (slow.round() as usize).max(1);
        }
    }
}
