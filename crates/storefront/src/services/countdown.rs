//! Server-driven release countdown stream.
//!
//! One stream per subscriber, ticking once a second. Each tick re-samples
//! the wall clock, so drift never accumulates; the stream ends after
//! yielding its first all-zero sample, and dropping it (the client
//! disconnecting) cancels the tick loop.

use async_stream::stream;
use chrono::{DateTime, Utc};
use futures::Stream;
use tokio::time::{Duration, MissedTickBehavior, interval};

use maison_core::countdown::TimeLeft;

/// Time remaining until `release`, sampled every second.
///
/// Yields immediately, then once per second until the release time passes.
pub fn countdown_stream(release: DateTime<Utc>) -> impl Stream<Item = TimeLeft> {
    stream! {
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let left = TimeLeft::until(release, Utc::now());
            let done = left.is_zero();
            yield left;
            if done {
                break;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn test_past_release_yields_single_zero_sample() {
        let release = Utc::now() - TimeDelta::hours(1);
        let samples: Vec<TimeLeft> = countdown_stream(release).collect().await;

        assert_eq!(samples.len(), 1);
        assert!(samples[0].is_zero());
    }

    #[tokio::test]
    async fn test_future_release_starts_nonzero() {
        let release = Utc::now() + TimeDelta::days(2);
        let mut stream = std::pin::pin!(countdown_stream(release));

        let first = stream.next().await.unwrap();
        assert!(!first.is_zero());
        assert!(first.days <= 2);
    }
}
