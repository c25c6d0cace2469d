pub mod buy_and_hold;
pub mod dual_sma;
pub mod noop;
