/// Flat per-fill fee rate, expressed as a fraction of notional (e.g. `0.001`
/// for 0.1%). The engine charges the same rate on entries and exits; maker/
/// taker distinction and slippage modeling are out of scope (spec.md
/// Non-goals).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    pub rate: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self { rate: 0.001 }
    }
}

impl FeeSchedule {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    pub fn fee_for(&self, price: f64, qty: f64) -> f64 {
        price * qty * self.rate
    }
}
