pub mod timeframe_aggregator;
