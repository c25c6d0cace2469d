use crate::application::context::SimulationContext;
use crate::application::strategy::Strategy;
use crate::domain::trading::types::Route;

/// Never submits an order. Used as the baseline strategy in scenarios that
/// exercise the driver loop without any trading activity (spec.md §8 S1).
#[derive(Debug, Clone, Default)]
pub struct NoOp;

impl NoOp {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for NoOp {
    fn init_objects(&mut self, _ctx: &mut SimulationContext, _route: &Route) {}
    fn execute(&mut self, _ctx: &mut SimulationContext, _route: &Route) -> anyhow::Result<()> {
        Ok(())
    }
    fn terminate(&mut self, _ctx: &mut SimulationContext, _route: &Route) {}
}
