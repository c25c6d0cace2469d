//! In-memory `CandleCache`, mirroring the source's in-memory repositories
//! (`infrastructure::repositories::in_memory`): an `Arc<RwLock<_>>` guarding a
//! plain map, async-ready but with no persistence across restarts. A
//! `std::sync::RwLock` is enough here — no await point is ever held across
//! the lock, so there is no need to pull `tokio` in as a non-dev dependency
//! for it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::market::candle::Candle;
use crate::domain::ports::CandleCache;

type CacheKey = (String, String, i64, i64);

#[derive(Default)]
pub struct InMemoryCandleCache {
    entries: Arc<RwLock<HashMap<CacheKey, Vec<Candle>>>>,
}

impl InMemoryCandleCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CandleCache for InMemoryCandleCache {
    async fn get(&self, exchange: &str, symbol: &str, start_ms: i64, finish_ms: i64) -> Result<Option<Vec<Candle>>> {
        let key = (exchange.to_string(), symbol.to_string(), start_ms, finish_ms);
        Ok(self.entries.read().unwrap().get(&key).cloned())
    }

    async fn put(&self, exchange: &str, symbol: &str, start_ms: i64, finish_ms: i64, candles: Vec<Candle>) -> Result<()> {
        let key = (exchange.to_string(), symbol.to_string(), start_ms, finish_ms);
        self.entries.write().unwrap().insert(key, candles);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let cache = InMemoryCandleCache::new();
        let candles = vec![Candle::new(0, 1.0, 2.0, 0.5, 1.5, 10.0)];
        cache.put("binance", "BTC-USDT", 0, 60_000, candles.clone()).await.unwrap();
        let hit = cache.get("binance", "BTC-USDT", 0, 60_000).await.unwrap();
        assert_eq!(hit, Some(candles));
    }

    #[tokio::test]
    async fn miss_returns_none() {
        let cache = InMemoryCandleCache::new();
        let hit = cache.get("binance", "BTC-USDT", 0, 60_000).await.unwrap();
        assert_eq!(hit, None);
    }
}
