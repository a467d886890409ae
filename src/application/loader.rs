//! Fetches one ticker's raw history, cleans it into the typed schema and
//! persists the snapshot.
//!
//! Cleaning order matters: restrict to the requested window, sort and
//! de-duplicate, demote implausible cells to missing, forward-fill then
//! backward-fill each column, and only then derive returns. Returns computed
//! before the fill would leak gaps into every downstream stage.

use crate::domain::errors::AnalysisError;
use crate::domain::ports::{PriceHistorySource, SeriesStore};
use crate::domain::series::{CleanedSeries, RawBar, Ticker, TimeSeriesRecord};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, warn};

/// Fewer cleaned rows than this cannot carry a return series.
const MIN_RECORDS: usize = 2;

pub struct SeriesLoader {
    source: Arc<dyn PriceHistorySource>,
    store: Arc<dyn SeriesStore>,
}

impl SeriesLoader {
    pub fn new(source: Arc<dyn PriceHistorySource>, store: Arc<dyn SeriesStore>) -> Self {
        Self { source, store }
    }

    /// Produces the cleaned series for the closed range `[start, end]` and
    /// writes its snapshot. Re-running replaces the previous snapshot.
    pub async fn load(
        &self,
        ticker: &Ticker,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CleanedSeries, AnalysisError> {
        let bars = self
            .source
            .fetch_daily_history(ticker, start, end)
            .await
            .map_err(|e| AnalysisError::Retrieval {
                ticker: ticker.to_string(),
                reason: format!("{e:#}"),
            })?;
        if bars.is_empty() {
            return Err(AnalysisError::Retrieval {
                ticker: ticker.to_string(),
                reason: format!("no rows returned for {start}..={end}"),
            });
        }

        let records = clean_and_derive(ticker, bars, start, end)?;
        if records.len() < MIN_RECORDS {
            return Err(AnalysisError::EmptySeries {
                ticker: ticker.to_string(),
                rows: records.len(),
                min: MIN_RECORDS,
            });
        }

        let series = CleanedSeries::new(ticker.clone(), start, end, records);
        let path = self
            .store
            .save(&series)
            .map_err(|e| AnalysisError::Persistence {
                ticker: ticker.to_string(),
                reason: format!("{e:#}"),
            })?;
        info!(
            "{}: {} cleaned records, snapshot written to {}",
            ticker,
            series.len(),
            path.display()
        );
        Ok(series)
    }
}

/// Window, order, sanitize, fill, derive.
fn clean_and_derive(
    ticker: &Ticker,
    bars: Vec<RawBar>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<TimeSeriesRecord>, AnalysisError> {
    let mut bars: Vec<RawBar> = bars
        .into_iter()
        .filter(|b| b.date >= start && b.date <= end)
        .collect();
    bars.sort_by_key(|b| b.date);
    let before = bars.len();
    bars.dedup_by_key(|b| b.date);
    if bars.len() < before {
        warn!("{}: dropped {} duplicate-date bar(s)", ticker, before - bars.len());
    }

    let demoted = sanitize(&mut bars);
    if demoted > 0 {
        warn!("{}: demoted {} implausible cell(s) to missing", ticker, demoted);
    }

    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    let mut columns = [
        ("open", bars.iter().map(|b| b.open).collect::<Vec<_>>()),
        ("high", bars.iter().map(|b| b.high).collect()),
        ("low", bars.iter().map(|b| b.low).collect()),
        ("close", bars.iter().map(|b| b.close).collect()),
        ("adj_close", bars.iter().map(|b| b.adj_close).collect()),
        ("volume", bars.iter().map(|b| b.volume).collect()),
    ];
    for (name, column) in columns.iter_mut() {
        fill_gaps(column);
        // the two-pass fill only leaves holes when a column was never observed
        if column.iter().any(Option::is_none) {
            return Err(AnalysisError::Retrieval {
                ticker: ticker.to_string(),
                reason: format!("column `{name}` has no observed values in the requested range"),
            });
        }
    }
    let [(_, open), (_, high), (_, low), (_, close), (_, adj_close), (_, volume)] = columns;

    let mut records = Vec::with_capacity(dates.len());
    for (i, date) in dates.iter().enumerate() {
        let (Some(open), Some(high), Some(low), Some(close), Some(adj), Some(volume)) =
            (open[i], high[i], low[i], close[i], adj_close[i], volume[i])
        else {
            continue;
        };
        let daily_return = if i == 0 {
            None
        } else {
            match adj_close[i - 1] {
                Some(prev) if prev > 0.0 => Some((adj - prev) / prev),
                _ => None,
            }
        };
        records.push(TimeSeriesRecord {
            date: *date,
            open,
            high,
            low,
            close,
            adj_close: adj,
            volume,
            daily_return,
            z_score: None,
        });
    }
    Ok(records)
}

/// Non-positive prices and negative volumes are feed artifacts for a listed
/// equity; treat them as missing so the fill pass replaces them.
fn sanitize(bars: &mut [RawBar]) -> usize {
    let mut demoted = 0;
    for bar in bars.iter_mut() {
        for cell in [
            &mut bar.open,
            &mut bar.high,
            &mut bar.low,
            &mut bar.close,
            &mut bar.adj_close,
        ] {
            if let Some(v) = *cell
                && (v <= 0.0 || v.is_nan())
            {
                *cell = None;
                demoted += 1;
            }
        }
        if let Some(v) = bar.volume
            && (v < 0.0 || v.is_nan())
        {
            bar.volume = None;
            demoted += 1;
        }
    }
    demoted
}

/// Forward-fill then backward-fill: interior and trailing gaps take the last
/// known value, leading gaps take the first known value. A column with no
/// known values is left untouched.
fn fill_gaps(column: &mut [Option<f64>]) {
    let mut last = None;
    for cell in column.iter_mut() {
        match *cell {
            Some(v) => last = Some(v),
            None => *cell = last,
        }
    }
    let mut next = None;
    for cell in column.iter_mut().rev() {
        match *cell {
            Some(v) => next = Some(v),
            None => *cell = next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::path::PathBuf;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn bar(date: NaiveDate, price: Option<f64>) -> RawBar {
        RawBar {
            date,
            open: price,
            high: price.map(|p| p * 1.01),
            low: price.map(|p| p * 0.99),
            close: price,
            adj_close: price,
            volume: Some(1.0e6),
        }
    }

    struct FixtureSource {
        bars: Vec<RawBar>,
    }

    #[async_trait]
    impl PriceHistorySource for FixtureSource {
        async fn fetch_daily_history(
            &self,
            _ticker: &Ticker,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<RawBar>> {
            Ok(self.bars.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PriceHistorySource for FailingSource {
        async fn fetch_daily_history(
            &self,
            _ticker: &Ticker,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<RawBar>> {
            anyhow::bail!("connection reset by peer")
        }
    }

    struct NullStore;

    impl SeriesStore for NullStore {
        fn save(&self, _series: &CleanedSeries) -> Result<PathBuf> {
            Ok(PathBuf::from("unused.csv"))
        }
    }

    struct FailingStore;

    impl SeriesStore for FailingStore {
        fn save(&self, _series: &CleanedSeries) -> Result<PathBuf> {
            anyhow::bail!("disk full")
        }
    }

    fn loader(bars: Vec<RawBar>) -> SeriesLoader {
        SeriesLoader::new(Arc::new(FixtureSource { bars }), Arc::new(NullStore))
    }

    fn ticker() -> Ticker {
        "TEST".parse().unwrap()
    }

    #[tokio::test]
    async fn fills_interior_gap_and_derives_returns() {
        let bars = vec![
            bar(day(1), Some(100.0)),
            bar(day(2), Some(110.0)),
            bar(day(3), None),
            bar(day(4), Some(121.0)),
        ];
        let series = loader(bars).load(&ticker(), day(1), day(4)).await.unwrap();

        assert_eq!(series.len(), 4);
        assert_eq!(series.adjusted_closes(), vec![100.0, 110.0, 110.0, 121.0]);

        let returns: Vec<Option<f64>> =
            series.records().iter().map(|r| r.daily_return).collect();
        assert_eq!(returns[0], None);
        assert!((returns[1].unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(returns[2], Some(0.0));
        assert!((returns[3].unwrap() - 0.1).abs() < 1e-12);
    }

    #[tokio::test]
    async fn leading_gap_takes_the_first_known_value() {
        let bars = vec![
            bar(day(1), None),
            bar(day(2), Some(50.0)),
            bar(day(3), Some(55.0)),
        ];
        let series = loader(bars).load(&ticker(), day(1), day(3)).await.unwrap();

        assert_eq!(series.adjusted_closes(), vec![50.0, 50.0, 55.0]);
        // the back-filled first row still has no return
        assert!(series.records()[0].daily_return.is_none());
        assert_eq!(series.records()[1].daily_return, Some(0.0));
    }

    #[tokio::test]
    async fn zero_price_is_demoted_and_filled() {
        let bars = vec![
            bar(day(1), Some(100.0)),
            bar(day(2), Some(0.0)),
            bar(day(3), Some(120.0)),
        ];
        let series = loader(bars).load(&ticker(), day(1), day(3)).await.unwrap();

        assert_eq!(series.adjusted_closes(), vec![100.0, 100.0, 120.0]);
        assert_eq!(series.records()[1].daily_return, Some(0.0));
        assert!((series.records()[2].daily_return.unwrap() - 0.2).abs() < 1e-12);
    }

    #[tokio::test]
    async fn rows_outside_the_window_are_dropped() {
        let bars = vec![
            bar(day(1), Some(90.0)),
            bar(day(2), Some(100.0)),
            bar(day(3), Some(110.0)),
            bar(day(9), Some(500.0)),
        ];
        let series = loader(bars).load(&ticker(), day(2), day(3)).await.unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.adjusted_closes(), vec![100.0, 110.0]);
    }

    #[tokio::test]
    async fn unsorted_and_duplicated_input_is_normalized() {
        let bars = vec![
            bar(day(3), Some(30.0)),
            bar(day(1), Some(10.0)),
            bar(day(1), Some(99.0)),
            bar(day(2), Some(20.0)),
        ];
        let series = loader(bars).load(&ticker(), day(1), day(3)).await.unwrap();

        assert_eq!(series.adjusted_closes(), vec![10.0, 20.0, 30.0]);
    }

    #[tokio::test]
    async fn empty_fetch_is_a_retrieval_error() {
        let err = loader(Vec::new())
            .load(&ticker(), day(1), day(4))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Retrieval { .. }), "{err}");
    }

    #[tokio::test]
    async fn single_row_is_an_empty_series_error() {
        let err = loader(vec![bar(day(1), Some(100.0))])
            .load(&ticker(), day(1), day(4))
            .await
            .unwrap_err();
        match err {
            AnalysisError::EmptySeries { rows, min, .. } => {
                assert_eq!(rows, 1);
                assert_eq!(min, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn source_failure_carries_the_upstream_reason() {
        let loader = SeriesLoader::new(Arc::new(FailingSource), Arc::new(NullStore));
        let err = loader.load(&ticker(), day(1), day(4)).await.unwrap_err();
        match err {
            AnalysisError::Retrieval { reason, .. } => {
                assert!(reason.contains("connection reset"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn store_failure_is_a_persistence_error() {
        let bars = vec![bar(day(1), Some(100.0)), bar(day(2), Some(101.0))];
        let loader = SeriesLoader::new(
            Arc::new(FixtureSource { bars }),
            Arc::new(FailingStore),
        );
        let err = loader.load(&ticker(), day(1), day(2)).await.unwrap_err();
        match err {
            AnalysisError::Persistence { reason, .. } => {
                assert!(reason.contains("disk full"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn fully_missing_column_is_a_retrieval_error() {
        let mut bars = vec![bar(day(1), Some(10.0)), bar(day(2), Some(11.0))];
        for b in bars.iter_mut() {
            b.volume = None;
        }
        let err = loader(bars).load(&ticker(), day(1), day(2)).await.unwrap_err();
        match err {
            AnalysisError::Retrieval { reason, .. } => {
                assert!(reason.contains("volume"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fill_gaps_covers_every_gap_shape() {
        let mut interior = [Some(1.0), None, None, Some(4.0)];
        fill_gaps(&mut interior);
        assert_eq!(interior, [Some(1.0), Some(1.0), Some(1.0), Some(4.0)]);

        let mut leading = [None, None, Some(3.0)];
        fill_gaps(&mut leading);
        assert_eq!(leading, [Some(3.0), Some(3.0), Some(3.0)]);

        let mut trailing = [Some(2.0), None, None];
        fill_gaps(&mut trailing);
        assert_eq!(trailing, [Some(2.0), Some(2.0), Some(2.0)]);

        let mut hollow: [Option<f64>; 3] = [None, None, None];
        fill_gaps(&mut hollow);
        assert_eq!(hollow, [None, None, None]);
    }

    #[test]
    fn sanitize_demotes_feed_artifacts() {
        let mut bars = vec![bar(day(1), Some(100.0)), bar(day(2), Some(-5.0))];
        bars[0].volume = Some(-10.0);
        let demoted = sanitize(&mut bars);

        // five price cells on day 2 plus the negative volume on day 1
        assert_eq!(demoted, 6);
        assert!(bars[1].close.is_none());
        assert!(bars[0].volume.is_none());
        assert_eq!(bars[0].close, Some(100.0));
    }
}
