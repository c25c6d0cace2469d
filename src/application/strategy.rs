use std::collections::HashMap;

use crate::application::context::SimulationContext;
use crate::domain::trading::types::Route;

/// One tunable parameter a strategy exposes for DNA decoding (spec.md
/// GLOSSARY: DNA).
#[derive(Debug, Clone)]
pub struct HyperParameter {
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl HyperParameter {
    pub fn new(name: impl Into<String>, min: f64, max: f64, default: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            default,
        }
    }
}

const DNA_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Decode a DNA string into concrete hyperparameter values, one character
/// per entry in `schema` (in schema order). Each character's position in
/// `DNA_ALPHABET` is normalized to `[0, 1]` and linearly mapped into that
/// parameter's `[min, max]` range. Characters beyond `schema`'s length, and
/// schema entries with no corresponding character, are ignored.
pub fn decode_dna(dna: &str, schema: &[HyperParameter]) -> HashMap<String, f64> {
    let mut values = HashMap::new();
    for (param, ch) in schema.iter().zip(dna.chars()) {
        let Some(index) = DNA_ALPHABET.iter().position(|&b| b == ch as u8) else {
            continue;
        };
        let fraction = index as f64 / (DNA_ALPHABET.len() - 1) as f64;
        values.insert(param.name.clone(), param.min + fraction * (param.max - param.min));
    }
    values
}

/// The capability set every strategy implements, replacing the source's
/// runtime class lookup by name with static dispatch over a trait object
/// (spec.md §9, §4.6).
pub trait Strategy: Send {
    /// Called once after construction, before the first candle.
    fn init_objects(&mut self, ctx: &mut SimulationContext, route: &Route);

    /// Called each time this route's own timeframe boundary closes.
    fn execute(&mut self, ctx: &mut SimulationContext, route: &Route) -> anyhow::Result<()>;

    /// Called once after the last candle of the run.
    fn terminate(&mut self, ctx: &mut SimulationContext, route: &Route);

    /// Schema used by DNA decoding; strategies with no tunables return an
    /// empty vector.
    fn hyper_parameters(&self) -> Vec<HyperParameter> {
        Vec::new()
    }

    /// Apply decoded DNA values (keyed by `HyperParameter::name`) before
    /// `init_objects()` runs. Strategies with no tunables accept the default
    /// no-op.
    fn apply_hyper_parameters(&mut self, _values: &HashMap<String, f64>) {}
}

type StrategyConstructor = Box<dyn Fn() -> Box<dyn Strategy> + Send + Sync>;

/// Maps a strategy identifier (as named in a `Route`) to a constructor.
/// Constructors are boxed closures rather than bare `fn` pointers so
/// callers (tests, in particular) can register strategies that capture
/// shared state, not just zero-argument built-ins.
pub struct StrategyRegistry {
    constructors: HashMap<String, StrategyConstructor>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            constructors: HashMap::new(),
        };
        registry.register("dual_sma", || {
            Box::new(crate::application::strategies::dual_sma::DualSma::new(20, 60))
        });
        registry.register("buy_and_hold", || {
            Box::new(crate::application::strategies::buy_and_hold::BuyAndHold::new())
        });
        registry.register("noop", || {
            Box::new(crate::application::strategies::noop::NoOp::new())
        });
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        constructor: impl Fn() -> Box<dyn Strategy> + Send + Sync + 'static,
    ) {
        self.constructors.insert(name.into(), Box::new(constructor));
    }

    pub fn create(&self, name: &str) -> anyhow::Result<Box<dyn Strategy>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("unknown strategy '{}'", name))?;
        Ok(constructor())
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_built_in_strategies() {
        let registry = StrategyRegistry::new();
        assert!(registry.create("dual_sma").is_ok());
        assert!(registry.create("buy_and_hold").is_ok());
        assert!(registry.create("nonexistent").is_err());
    }

    #[test]
    fn decode_dna_maps_boundary_characters_to_min_and_max() {
        let schema = vec![
            HyperParameter::new("fast_period", 2.0, 100.0, 20.0),
            HyperParameter::new("slow_period", 5.0, 400.0, 60.0),
        ];
        let values = decode_dna("0z", &schema);
        assert_eq!(values["fast_period"], 2.0);
        assert_eq!(values["slow_period"], 400.0);
    }

    #[test]
    fn decode_dna_ignores_characters_past_the_schema_length() {
        let schema = vec![HyperParameter::new("fast_period", 2.0, 100.0, 20.0)];
        let values = decode_dna("0zx", &schema);
        assert_eq!(values.len(), 1);
        assert_eq!(values["fast_period"], 2.0);
    }

    #[test]
    fn custom_strategies_can_be_registered() {
        let mut registry = StrategyRegistry::new();
        registry.register("buy_and_hold_v2", || {
            Box::new(crate::application::strategies::buy_and_hold::BuyAndHold::new())
        });
        assert!(registry.create("buy_and_hold_v2").is_ok());
    }
}
