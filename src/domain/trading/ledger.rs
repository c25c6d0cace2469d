use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::trading::types::{OrderSide, PositionSide, Trade};

/// An open (or just-flattened) position on one exchange/symbol pair.
///
/// `qty` is signed: positive for long, negative for short, zero when flat.
/// `entry_price` is the quantity-weighted average entry price of the
/// currently open exposure; it is undefined (left at its last value) while
/// flat. `realized_pnl`/`realized_fees`/`closed_qty` accumulate across
/// partial reduces of the current round trip and are folded into the
/// `Trade` emitted when the position finally returns to zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Position {
    pub qty: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub opened_at: i64,
    pub realized_pnl: f64,
    pub realized_fees: f64,
    pub closed_qty: f64,
}

impl Position {
    pub fn flat(current_price: f64) -> Self {
        Self {
            qty: 0.0,
            entry_price: current_price,
            current_price,
            opened_at: 0,
            realized_pnl: 0.0,
            realized_fees: 0.0,
            closed_qty: 0.0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.qty != 0.0
    }

    pub fn side(&self) -> Option<PositionSide> {
        if self.qty > 0.0 {
            Some(PositionSide::Long)
        } else if self.qty < 0.0 {
            Some(PositionSide::Short)
        } else {
            None
        }
    }

    pub fn unrealized_pnl(&self) -> f64 {
        self.qty * (self.current_price - self.entry_price)
    }

    pub fn market_value(&self) -> f64 {
        self.qty * self.current_price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeAccount {
    pub cash: f64,
    pub positions: HashMap<String, Position>,
}

impl ExchangeAccount {
    pub fn new(starting_cash: f64) -> Self {
        Self {
            cash: starting_cash,
            positions: HashMap::new(),
        }
    }
}

/// The simulation's single source of truth for cash, positions, and the
/// trade blotter. One `Ledger` tracks every exchange account in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub accounts: HashMap<String, ExchangeAccount>,
    pub trades: Vec<Trade>,
    /// Smallest unit prices/balances round to; default 1e-8 (spec.md §9).
    tick: f64,
    next_trade_id: u64,
}

impl Ledger {
    pub fn new(tick: f64) -> Self {
        Self {
            accounts: HashMap::new(),
            trades: Vec::new(),
            tick,
            next_trade_id: 0,
        }
    }

    pub fn add_account(&mut self, exchange: impl Into<String>, starting_cash: f64) {
        self.accounts
            .insert(exchange.into(), ExchangeAccount::new(starting_cash));
    }

    pub fn position(&self, exchange: &str, symbol: &str) -> Option<&Position> {
        self.accounts.get(exchange)?.positions.get(symbol)
    }

    pub fn position_mut(&mut self, exchange: &str, symbol: &str) -> &mut Position {
        let account = self
            .accounts
            .entry(exchange.to_string())
            .or_insert_with(|| ExchangeAccount::new(0.0));
        account
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| Position::flat(0.0))
    }

    fn round_tick(&self, value: f64) -> f64 {
        if self.tick <= 0.0 {
            return value;
        }
        (value / self.tick).round() * self.tick
    }

    /// Apply a fill to the ledger, updating cash and position state. A fill
    /// in the opposite direction of the open position only partially
    /// reducing it accumulates realized P&L/fees on the `Position` without
    /// emitting anything; a `Trade` is returned only once the accumulated
    /// closing quantity fully covers the round trip (an exact close or a
    /// flip-through), per spec.md's "appended when a position returns to
    /// zero" definition. Returns `None` when the fill only opens, extends,
    /// or partially reduces a position.
    #[allow(clippy::too_many_arguments)]
    pub fn on_fill(
        &mut self,
        exchange: &str,
        symbol: &str,
        side: OrderSide,
        price: f64,
        qty: f64,
        timestamp: i64,
        fee_rate: f64,
    ) -> Option<Trade> {
        let fee = price * qty * fee_rate;
        let signed_qty = qty * side.sign();

        let account = self
            .accounts
            .entry(exchange.to_string())
            .or_insert_with(|| ExchangeAccount::new(0.0));
        account.cash -= fee;
        account.cash -= signed_qty * price;

        let position = account
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| Position::flat(price));
        position.current_price = price;

        let prior_qty = position.qty;
        let new_qty = prior_qty + signed_qty;
        let same_direction = prior_qty == 0.0 || prior_qty.signum() == signed_qty.signum();

        if same_direction {
            if prior_qty == 0.0 {
                position.entry_price = price;
                position.opened_at = timestamp;
            } else {
                let notional = prior_qty.abs() * position.entry_price + qty * price;
                position.entry_price = self.round_tick(notional / new_qty.abs());
            }
            position.qty = self.round_tick(new_qty);
            return None;
        }

        // Opposite direction: this fill closes, reduces, or flips the position.
        let closing_qty = qty.min(prior_qty.abs());
        let pnl = closing_qty * (price - position.entry_price) * prior_qty.signum();
        let trade_side = if prior_qty > 0.0 {
            PositionSide::Long
        } else {
            PositionSide::Short
        };

        position.realized_pnl += pnl;
        position.realized_fees += fee;
        position.closed_qty += closing_qty;

        let round_trip_complete = closing_qty >= prior_qty.abs();
        let closed_entry_price = position.entry_price;
        let closed_opened_at = position.opened_at;

        if new_qty != 0.0 && new_qty.signum() != prior_qty.signum() {
            // Flipped through flat: the remainder opens fresh in the new direction.
            position.entry_price = price;
            position.opened_at = timestamp;
        }
        position.qty = self.round_tick(new_qty);

        if !round_trip_complete {
            return None;
        }

        let trade = Trade {
            id: {
                self.next_trade_id += 1;
                format!("trade-{}", self.next_trade_id)
            },
            exchange: exchange.to_string(),
            symbol: symbol.to_string(),
            side: trade_side,
            qty: position.closed_qty,
            entry_price: closed_entry_price,
            exit_price: price,
            opened_at: closed_opened_at,
            closed_at: timestamp,
            pnl: position.realized_pnl,
            fee: position.realized_fees,
        };
        position.realized_pnl = 0.0;
        position.realized_fees = 0.0;
        position.closed_qty = 0.0;

        self.trades.push(trade.clone());
        Some(trade)
    }

    /// Cash + position market value across every account, using `mark_prices`
    /// keyed by `(exchange, symbol)` for any position lacking a fresher
    /// `current_price` update this tick.
    pub fn equity(&self, mark_prices: &HashMap<(String, String), f64>) -> f64 {
        let mut total = 0.0;
        for (exchange, account) in &self.accounts {
            total += account.cash;
            for (symbol, position) in &account.positions {
                let price = mark_prices
                    .get(&(exchange.clone(), symbol.clone()))
                    .copied()
                    .unwrap_or(position.current_price);
                total += position.qty * price;
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_a_long_position_debits_cash() {
        let mut ledger = Ledger::new(1e-8);
        ledger.add_account("binance", 10_000.0);
        let trade = ledger.on_fill("binance", "BTC-USDT", OrderSide::Buy, 100.0, 1.0, 0, 0.0);
        assert!(trade.is_none());
        assert_eq!(ledger.accounts["binance"].cash, 9_900.0);
        let pos = ledger.position("binance", "BTC-USDT").unwrap();
        assert_eq!(pos.qty, 1.0);
        assert_eq!(pos.entry_price, 100.0);
    }

    #[test]
    fn closing_a_long_position_realizes_pnl() {
        let mut ledger = Ledger::new(1e-8);
        ledger.add_account("binance", 10_000.0);
        ledger.on_fill("binance", "BTC-USDT", OrderSide::Buy, 100.0, 1.0, 0, 0.0);
        let trade = ledger
            .on_fill("binance", "BTC-USDT", OrderSide::Sell, 110.0, 1.0, 60_000, 0.0)
            .expect("closing fill must emit a trade");
        assert_eq!(trade.pnl, 10.0);
        let pos = ledger.position("binance", "BTC-USDT").unwrap();
        assert_eq!(pos.qty, 0.0);
    }

    #[test]
    fn flipping_a_position_opens_the_remainder_in_new_direction() {
        let mut ledger = Ledger::new(1e-8);
        ledger.add_account("binance", 10_000.0);
        ledger.on_fill("binance", "BTC-USDT", OrderSide::Buy, 100.0, 1.0, 0, 0.0);
        let trade = ledger
            .on_fill("binance", "BTC-USDT", OrderSide::Sell, 110.0, 2.0, 60_000, 0.0)
            .expect("flip must emit a close trade for the original leg");
        assert_eq!(trade.qty, 1.0);
        let pos = ledger.position("binance", "BTC-USDT").unwrap();
        assert_eq!(pos.qty, -1.0);
        assert_eq!(pos.entry_price, 110.0);
    }

    #[test]
    fn averaging_into_a_position_updates_weighted_entry_price() {
        let mut ledger = Ledger::new(1e-8);
        ledger.add_account("binance", 10_000.0);
        ledger.on_fill("binance", "BTC-USDT", OrderSide::Buy, 100.0, 1.0, 0, 0.0);
        ledger.on_fill("binance", "BTC-USDT", OrderSide::Buy, 120.0, 1.0, 60_000, 0.0);
        let pos = ledger.position("binance", "BTC-USDT").unwrap();
        assert_eq!(pos.qty, 2.0);
        assert_eq!(pos.entry_price, 110.0);
    }

    #[test]
    fn partially_reducing_a_position_does_not_emit_a_trade_yet() {
        let mut ledger = Ledger::new(1e-8);
        ledger.add_account("binance", 10_000.0);
        ledger.on_fill("binance", "BTC-USDT", OrderSide::Buy, 100.0, 2.0, 0, 0.0);
        let trade = ledger.on_fill("binance", "BTC-USDT", OrderSide::Sell, 110.0, 1.0, 60_000, 0.0);
        assert!(trade.is_none(), "a partial reduce must not close the round trip");
        let pos = ledger.position("binance", "BTC-USDT").unwrap();
        assert_eq!(pos.qty, 1.0);
        assert_eq!(pos.realized_pnl, 10.0);
        assert_eq!(pos.closed_qty, 1.0);

        let trade = ledger
            .on_fill("binance", "BTC-USDT", OrderSide::Sell, 130.0, 1.0, 120_000, 0.0)
            .expect("the final reduce completes the round trip and must emit a trade");
        assert_eq!(trade.qty, 2.0, "trade quantity sums the whole round trip");
        assert_eq!(trade.pnl, 40.0, "pnl sums both partial legs: 10 + 30");
        let pos = ledger.position("binance", "BTC-USDT").unwrap();
        assert_eq!(pos.qty, 0.0);
        assert_eq!(pos.realized_pnl, 0.0);
        assert_eq!(pos.closed_qty, 0.0);
    }
}
