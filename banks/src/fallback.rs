//! Backward date-fallback search.
//!
//! Banks publish no observations on weekends and holidays. When a probe for
//! the requested date comes back empty, the search steps back one day at a
//! time inside a bounded window until an observation turns up.

use std::future::Future;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use tracing::debug;

use crate::fetch::FetchResult;

/// How many days before the requested date a search may reach.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 10;

/// Outcome of probing a single date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The bank published a rate. `rate_date` is the date the bank reports
    /// for the observation; some services take it from the payload rather
    /// than the probed day.
    Found { rate: Decimal, rate_date: NaiveDate },
    /// No data for the probed date.
    Missing,
}

/// Probe `requested`, then one day earlier at a time, up to `max_lookback`
/// days back.
///
/// Returns the first observation found, or `None` when the window is
/// exhausted. A probe error aborts the search immediately.
pub async fn search_backward<P, Fut>(
    requested: NaiveDate,
    max_lookback: u32,
    probe: P,
) -> FetchResult<Option<(Decimal, NaiveDate)>>
where
    P: Fn(NaiveDate) -> Fut,
    Fut: Future<Output = FetchResult<Observation>>,
{
    let mut date = requested;
    for step in 0..=max_lookback {
        match probe(date).await? {
            Observation::Found { rate, rate_date } => {
                if step > 0 {
                    debug!(%requested, %rate_date, steps = step, "observation found after fallback");
                }
                return Ok(Some((rate, rate_date)));
            }
            Observation::Missing => date -= Duration::days(1),
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use rust_decimal_macros::dec;
    use std::cell::Cell;
    use std::collections::HashMap;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[tokio::test]
    async fn test_finds_observation_on_requested_date() {
        let table = HashMap::from([(date(2020, 5, 8), dec!(1.3934))]);
        let result = search_backward(date(2020, 5, 8), DEFAULT_LOOKBACK_DAYS, |day| {
            let found = table.get(&day).copied();
            async move {
                Ok::<_, FetchError>(match found {
                    Some(rate) => Observation::Found {
                        rate,
                        rate_date: day,
                    },
                    None => Observation::Missing,
                })
            }
        })
        .await
        .unwrap();
        assert_eq!(result, Some((dec!(1.3934), date(2020, 5, 8))));
    }

    #[tokio::test]
    async fn test_steps_back_over_missing_days() {
        // Friday's observation answers a Sunday request
        let table = HashMap::from([(date(2020, 5, 8), dec!(1.3934))]);
        let result = search_backward(date(2020, 5, 10), DEFAULT_LOOKBACK_DAYS, |day| {
            let found = table.get(&day).copied();
            async move {
                Ok::<_, FetchError>(match found {
                    Some(rate) => Observation::Found {
                        rate,
                        rate_date: day,
                    },
                    None => Observation::Missing,
                })
            }
        })
        .await
        .unwrap();
        assert_eq!(result, Some((dec!(1.3934), date(2020, 5, 8))));
    }

    #[tokio::test]
    async fn test_exhausts_bounded_window() {
        let calls = Cell::new(0u32);
        let result = search_backward(date(2020, 5, 10), 3, |_| {
            calls.set(calls.get() + 1);
            async { Ok::<_, FetchError>(Observation::Missing) }
        })
        .await
        .unwrap();
        assert_eq!(result, None);
        // requested day plus three earlier days
        assert_eq!(calls.get(), 4);
    }

    #[tokio::test]
    async fn test_probe_error_aborts_search() {
        let calls = Cell::new(0u32);
        let result = search_backward(date(2020, 5, 10), DEFAULT_LOOKBACK_DAYS, |_| {
            calls.set(calls.get() + 1);
            async { Err::<Observation, _>(FetchError::Malformed("bad payload".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
