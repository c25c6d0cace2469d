use std::collections::HashMap;

use crate::application::candle_store::CandleStore;
use crate::application::order_book::OrderBook;
use crate::domain::errors::SimulationError;
use crate::domain::market::candle::Candle;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::trading::fees::FeeSchedule;
use crate::domain::trading::ledger::{Ledger, Position};
use crate::domain::trading::types::{Order, OrderSide, OrderType};

/// The simulation's single mutable state handle, threaded through the
/// driver and passed to every strategy callback (spec.md §9 — replaces the
/// source's process-wide `store`/`config`/`router` globals).
pub struct SimulationContext {
    pub candle_store: CandleStore,
    pub ledger: Ledger,
    pub fee_schedule: FeeSchedule,
    pub now_ms: i64,
    order_books: HashMap<(String, String), OrderBook>,
    next_order_sequence: u64,
}

impl SimulationContext {
    pub fn new(fee_schedule: FeeSchedule, tick: f64) -> Self {
        Self {
            candle_store: CandleStore::new(),
            ledger: Ledger::new(tick),
            fee_schedule,
            now_ms: 0,
            order_books: HashMap::new(),
            next_order_sequence: 0,
        }
    }

    pub fn order_book(&self, exchange: &str, symbol: &str) -> Option<&OrderBook> {
        self.order_books.get(&(exchange.to_string(), symbol.to_string()))
    }

    pub fn order_book_mut(&mut self, exchange: &str, symbol: &str) -> &mut OrderBook {
        self.order_books
            .entry((exchange.to_string(), symbol.to_string()))
            .or_default()
    }

    pub fn order_books(&self) -> &HashMap<(String, String), OrderBook> {
        &self.order_books
    }

    pub fn position(&self, exchange: &str, symbol: &str) -> Option<&Position> {
        self.ledger.position(exchange, symbol)
    }

    pub fn current_candle(&self, exchange: &str, symbol: &str, timeframe: Timeframe) -> Option<&Candle> {
        self.candle_store.current_candle(exchange, symbol, timeframe)
    }

    /// Submit a new order into the book for `(exchange, symbol)`, returning
    /// its generated id. Strategies call this from `execute()`.
    pub fn submit_order(
        &mut self,
        exchange: &str,
        symbol: &str,
        side: OrderSide,
        order_type: OrderType,
        price: Option<f64>,
        qty: f64,
    ) -> String {
        let sequence = self.next_order_sequence;
        self.next_order_sequence += 1;
        let id = format!("order-{}", sequence);
        let order = Order::new(
            id.clone(),
            exchange.to_string(),
            symbol.to_string(),
            side,
            order_type,
            price,
            qty,
            self.now_ms,
            sequence,
        );
        self.order_book_mut(exchange, symbol).add(order);
        id
    }

    pub fn cancel_order(&mut self, exchange: &str, symbol: &str, id: &str) -> Result<(), SimulationError> {
        self.order_book_mut(exchange, symbol).cancel(id)
    }

    /// Re-arm a previously cancelled resting order, putting it back in the
    /// active set the matching engine sweeps (spec.md C3).
    pub fn activate_order(&mut self, exchange: &str, symbol: &str, id: &str) -> Result<(), SimulationError> {
        self.order_book_mut(exchange, symbol).activate(id)
    }
}
