use crate::application::context::SimulationContext;
use crate::domain::errors::SimulationError;
use crate::domain::market::candle::Candle;
use crate::domain::market::timeframe::Timeframe;

/// Splits `candle` into `(storable, remainder)` at `price`, conserving the
/// original candle's extremes and volume exactly across however many times
/// a single minute gets split (spec.md §4.4 step 3, Open Question (a)).
///
/// `storable` runs from the candle's open to the touch of `price`; its
/// close is `price`. `remainder` continues from `price` to the original
/// close. High/low are assigned so that `max(storable.high, remainder.high)
/// == candle.high` and `min(storable.low, remainder.low) == candle.low`
/// hold for every split, which is what testable property 3 requires.
/// Volume is allocated proportionally to each piece's share of the original
/// price range, with the remainder taking the residual so the two volumes
/// sum exactly to the original.
fn split(candle: &Candle, price: f64) -> (Candle, Candle) {
    let storable_high = candle.open.max(price);
    let storable_low = candle.open.min(price);

    let remainder_high = if storable_high < candle.high {
        candle.high
    } else {
        price.max(candle.close)
    };
    let remainder_low = if storable_low > candle.low {
        candle.low
    } else {
        price.min(candle.close)
    };

    let total_range = candle.high - candle.low;
    let storable_range = storable_high - storable_low;
    let storable_fraction = if total_range > 0.0 {
        (storable_range / total_range).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let storable_volume = candle.volume * storable_fraction;
    let remainder_volume = candle.volume - storable_volume;

    let storable = Candle::new(
        candle.timestamp_ms,
        candle.open,
        storable_high,
        storable_low,
        price,
        storable_volume,
    );
    let remainder = Candle::new(
        candle.timestamp_ms,
        price,
        remainder_high,
        remainder_low,
        candle.close,
        remainder_volume,
    );
    (storable, remainder)
}

/// Given a newly arrived real 1-minute candle, iteratively splits it at
/// every crossed active order's price and fires the corresponding fills,
/// in insertion order, until no remaining active order intersects the
/// candle still being processed (spec.md C4).
pub fn process_candle(
    ctx: &mut SimulationContext,
    exchange: &str,
    symbol: &str,
    real_candle: Candle,
) -> Result<(), SimulationError> {
    let mut current = real_candle;

    loop {
        let crossed = ctx
            .order_book(exchange, symbol)
            .and_then(|book| book.first_crossed(current.low, current.high))
            .cloned();

        let Some(order) = crossed else {
            ctx.candle_store
                .add_candle(exchange, symbol, Timeframe::OneMin, current)?;
            ctx.ledger.position_mut(exchange, symbol).current_price = current.close;
            return Ok(());
        };

        let price = order.price.ok_or_else(|| {
            SimulationError::MatchingInvariant(format!(
                "order {} matched without a price",
                order.id
            ))
        })?;
        if price < current.low || price > current.high {
            return Err(SimulationError::MatchingInvariant(format!(
                "order {} matched at price {} outside current candle [{}, {}]",
                order.id, price, current.low, current.high
            )));
        }

        let (storable, remainder) = split(&current, price);
        ctx.candle_store
            .add_candle(exchange, symbol, Timeframe::OneMin, storable)?;
        ctx.ledger.position_mut(exchange, symbol).current_price = storable.close;

        ctx.order_book_mut(exchange, symbol).mark_filled(&order.id);
        ctx.ledger.on_fill(
            exchange,
            symbol,
            order.side,
            price,
            order.qty,
            ctx.now_ms,
            ctx.fee_schedule.rate,
        );

        current = remainder;
    }
}
