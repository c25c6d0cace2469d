use crate::domain::errors::SimulationError;
use crate::domain::trading::types::{Order, OrderStatus, OrderType};

/// Pending orders for one `(exchange, symbol)` pair, held in insertion order
/// (spec.md C3). The matching engine and the market-order sweep both iterate
/// this sequence front-to-back so ties resolve by submission order.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self { orders: Vec::new() }
    }

    pub fn add(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub fn cancel(&mut self, id: &str) -> Result<(), SimulationError> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| SimulationError::OrderNotFound(id.to_string()))?;
        order.status = OrderStatus::Cancelled;
        Ok(())
    }

    pub fn activate(&mut self, id: &str) -> Result<(), SimulationError> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| SimulationError::OrderNotFound(id.to_string()))?;
        order.status = OrderStatus::Active;
        Ok(())
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn active_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.status == OrderStatus::Active)
    }

    /// First active limit/stop order (in insertion order) whose price lies
    /// inside `[low, high]`, if any.
    pub fn first_crossed(&self, low: f64, high: f64) -> Option<&Order> {
        self.active_orders().find(|o| o.is_crossed_by(low, high))
    }

    pub fn mark_filled(&mut self, id: &str) {
        if let Some(order) = self.orders.iter_mut().find(|o| o.id == id) {
            order.status = OrderStatus::Filled;
        }
    }

    /// Active market orders, in insertion order, ready for the end-of-minute
    /// sweep (spec.md §4.3, §4.7 step d).
    pub fn pending_market_orders(&self) -> impl Iterator<Item = &Order> {
        self.active_orders().filter(|o| o.order_type == OrderType::Market)
    }
}
