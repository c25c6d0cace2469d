pub mod candle;
pub mod timeframe;
pub mod timeframe_candle;

pub use candle::Candle;
pub use timeframe::Timeframe;
pub use timeframe_candle::TimeframeCandle;
