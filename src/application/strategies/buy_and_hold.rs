use crate::application::context::SimulationContext;
use crate::application::strategy::Strategy;
use crate::domain::trading::types::{OrderSide, OrderType, Route};

/// Buys once on the first candle and never trades again. Used as the
/// baseline strategy in scenario tests and as a minimal reference
/// implementation of the `Strategy` capability set.
#[derive(Debug, Clone, Default)]
pub struct BuyAndHold {
    bought: bool,
    pub qty: f64,
}

impl BuyAndHold {
    pub fn new() -> Self {
        Self {
            bought: false,
            qty: 1.0,
        }
    }
}

impl Strategy for BuyAndHold {
    fn init_objects(&mut self, _ctx: &mut SimulationContext, _route: &Route) {}

    fn execute(&mut self, ctx: &mut SimulationContext, route: &Route) -> anyhow::Result<()> {
        if self.bought {
            return Ok(());
        }
        ctx.submit_order(
            &route.exchange,
            &route.symbol,
            OrderSide::Buy,
            OrderType::Market,
            None,
            self.qty,
        );
        self.bought = true;
        Ok(())
    }

    fn terminate(&mut self, _ctx: &mut SimulationContext, _route: &Route) {}
}
