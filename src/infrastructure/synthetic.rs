//! Deterministic offline price source.
//!
//! Generates a seeded random walk over the exchange calendar (weekdays only)
//! so offline runs and tests get stable history: the same ticker and range
//! always produce identical bars.

use crate::domain::ports::PriceHistorySource;
use crate::domain::series::{RawBar, Ticker};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Default)]
pub struct SyntheticDailyHistory;

impl SyntheticDailyHistory {
    pub fn new() -> Self {
        Self
    }

    /// FNV-1a over the symbol: stable across runs, unlike the std hasher.
    fn seed_for(ticker: &Ticker) -> u64 {
        ticker
            .as_str()
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
            })
    }
}

#[async_trait]
impl PriceHistorySource for SyntheticDailyHistory {
    async fn fetch_daily_history(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>> {
        let mut rng = StdRng::seed_from_u64(Self::seed_for(ticker));
        let mut price: f64 = rng.random_range(40.0..400.0);
        let mut bars = Vec::new();
        let mut date = start;
        while date <= end {
            // weekend gaps mirror a real daily feed
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                let drift = rng.random_range(-0.02..0.02);
                let open = price;
                let close = (open * (1.0 + drift)).max(0.01);
                let high = open.max(close) * (1.0 + rng.random_range(0.0..0.01));
                let low = open.min(close) * (1.0 - rng.random_range(0.0..0.01));
                let volume: f64 = rng.random_range(1.0e6_f64..5.0e7).round();
                bars.push(RawBar {
                    date,
                    open: Some(open),
                    high: Some(high),
                    low: Some(low),
                    close: Some(close),
                    adj_close: Some(close),
                    volume: Some(volume),
                });
                price = close;
            }
            date += Duration::days(1);
        }
        Ok(bars)
    }
}
