use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::market::timeframe::Timeframe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }

    /// Signed direction multiplier: +1 for Buy, -1 for Sell.
    pub fn sign(&self) -> f64 {
        match self {
            OrderSide::Buy => 1.0,
            OrderSide::Sell => -1.0,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
    Stop,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Stop => write!(f, "STOP"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Active,
    Filled,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A resting order in the matching engine's order book.
///
/// `price` is `None` only for `OrderType::Market`, which fills immediately at
/// the candle's open and never rests in the book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub exchange: String,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub price: Option<f64>,
    pub qty: f64,
    pub status: OrderStatus,
    pub submitted_at: i64,
    /// Insertion sequence within the order book; breaks ties when two orders
    /// are crossed by the same candle (spec.md §4.4 processes in order of
    /// submission).
    pub sequence: u64,
}

impl Order {
    pub fn new(
        id: String,
        exchange: String,
        symbol: String,
        side: OrderSide,
        order_type: OrderType,
        price: Option<f64>,
        qty: f64,
        submitted_at: i64,
        sequence: u64,
    ) -> Self {
        Self {
            id,
            exchange,
            symbol,
            side,
            order_type,
            price,
            qty,
            status: OrderStatus::Active,
            submitted_at,
            sequence,
        }
    }

    /// Whether this resting order's trigger price falls within `low..=high`,
    /// i.e. the candle under test would cross it.
    pub fn is_crossed_by(&self, low: f64, high: f64) -> bool {
        match self.price {
            Some(price) => price >= low && price <= high,
            None => false,
        }
    }
}

/// A completed round-trip: the full open-to-flat cycle of a position,
/// emitted by the ledger only when the closing fill returns the position to
/// zero (spec.md §3 Trade). `side` is the direction of the position that
/// closed (long/short), not the closing order's side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub exchange: String,
    pub symbol: String,
    pub side: PositionSide,
    pub qty: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub opened_at: i64,
    pub closed_at: i64,
    pub pnl: f64,
    pub fee: f64,
}

/// The directional side of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// A single `(exchange, symbol, timeframe, strategy, dna)` routing entry
/// dispatched by the router on timeframe-close boundaries (spec.md §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub exchange: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub strategy_name: String,
    pub dna: Option<String>,
}

impl Route {
    pub fn new(
        exchange: impl Into<String>,
        symbol: impl Into<String>,
        timeframe: Timeframe,
        strategy_name: impl Into<String>,
    ) -> Self {
        Self {
            exchange: exchange.into(),
            symbol: symbol.into(),
            timeframe,
            strategy_name: strategy_name.into(),
            dna: None,
        }
    }

    pub fn key(&self) -> String {
        format!("{}-{}-{}", self.exchange, self.symbol, self.timeframe)
    }

    /// Attach a DNA string, decoded into hyperparameters before the
    /// strategy's `init_objects()` is called (spec.md GLOSSARY: DNA).
    pub fn with_dna(mut self, dna: impl Into<String>) -> Self {
        self.dna = Some(dna.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_side_sign_matches_direction() {
        assert_eq!(OrderSide::Buy.sign(), 1.0);
        assert_eq!(OrderSide::Sell.sign(), -1.0);
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
    }

    #[test]
    fn market_order_is_never_crossed() {
        let order = Order::new(
            "o1".into(),
            "binance".into(),
            "BTC-USDT".into(),
            OrderSide::Buy,
            OrderType::Market,
            None,
            1.0,
            0,
            0,
        );
        assert!(!order.is_crossed_by(0.0, 1000.0));
    }

    #[test]
    fn limit_order_crossed_within_range() {
        let order = Order::new(
            "o2".into(),
            "binance".into(),
            "BTC-USDT".into(),
            OrderSide::Buy,
            OrderType::Limit,
            Some(100.0),
            1.0,
            0,
            0,
        );
        assert!(order.is_crossed_by(95.0, 105.0));
        assert!(!order.is_crossed_by(101.0, 105.0));
    }

    #[test]
    fn route_key_combines_exchange_symbol_timeframe() {
        let route = Route::new("binance", "BTC-USDT", Timeframe::OneHour, "dual_sma");
        assert_eq!(route.key(), "binance-BTC-USDT-1h");
    }
}
