use crate::application::context::SimulationContext;
use crate::application::strategy::Strategy;
use crate::domain::errors::SimulationError;
use crate::domain::trading::types::Route;

struct RouteEntry {
    route: Route,
    strategy: Box<dyn Strategy>,
}

/// Holds the route table and dispatches each strategy's `execute()` at its
/// own timeframe cadence (spec.md C6). Routes are invoked in the order they
/// were registered, matching the ordering guarantee in spec.md §5.
pub struct Router {
    entries: Vec<RouteEntry>,
}

impl Router {
    pub fn new(entries: Vec<(Route, Box<dyn Strategy>)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(route, strategy)| RouteEntry { route, strategy })
                .collect(),
        }
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.entries.iter().map(|e| &e.route)
    }

    pub fn init_all(&mut self, ctx: &mut SimulationContext) {
        for entry in &mut self.entries {
            entry.strategy.init_objects(ctx, &entry.route);
        }
    }

    /// Invoke `execute()` on every route whose timeframe boundary closed at
    /// 1-minute index `i`.
    pub fn dispatch(&mut self, ctx: &mut SimulationContext, index: usize) -> Result<(), SimulationError> {
        for entry in &mut self.entries {
            if entry.route.timeframe.closes_at(index) {
                entry
                    .strategy
                    .execute(ctx, &entry.route)
                    .map_err(|source| SimulationError::StrategyRuntime {
                        route: entry.route.key(),
                        source,
                    })?;
            }
        }
        Ok(())
    }

    pub fn terminate_all(&mut self, ctx: &mut SimulationContext) {
        for entry in &mut self.entries {
            entry.strategy.terminate(ctx, &entry.route);
        }
    }
}
