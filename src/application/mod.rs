// Candle storage and multi-timeframe aggregation
pub mod candle_store;
pub mod market_data;

// Order book and intracandle matching
pub mod matching_engine;
pub mod order_book;

// Mutable simulation state threaded through the driver and strategies
pub mod context;

// Strategy capability set and registry
pub mod strategy;
pub mod strategies;

// Route table and strategy dispatch
pub mod router;

// The outer per-minute driver loop
pub mod simulator;
