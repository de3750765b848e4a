//! Auto-invalidate timing
//!
//! Pure functions that can be tested without a folder.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Check whether a folder's auto-invalidate interval has elapsed.
///
/// # Arguments
/// * `last_update_at` - When the last fetch completed (None if never fetched)
/// * `interval` - How long fetched data stays fresh (None = forever)
///
/// # Returns
/// `true` once at least `interval` has passed since `last_update_at`. A folder
/// that was never fetched has nothing to expire, so this returns `false`.
pub fn interval_elapsed(last_update_at: Option<DateTime<Utc>>, interval: Option<Duration>) -> bool {
    let (Some(last), Some(interval)) = (last_update_at, interval) else {
        return false;
    };
    // Negative ages (clock moved backwards) convert to an error and count as fresh
    match (Utc::now() - last).to_std() {
        Ok(age) => age >= interval,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_never_updated() {
        assert!(!interval_elapsed(None, Some(Duration::from_secs(30))));
        assert!(!interval_elapsed(None, Some(Duration::ZERO)));
    }

    #[test]
    fn test_no_interval_never_elapses() {
        let last = Utc::now() - ChronoDuration::hours(24);
        assert!(!interval_elapsed(Some(last), None));
    }

    #[test]
    fn test_recent_update() {
        let last = Utc::now() - ChronoDuration::seconds(10);
        assert!(!interval_elapsed(Some(last), Some(Duration::from_secs(30))));
    }

    #[test]
    fn test_old_update() {
        let last = Utc::now() - ChronoDuration::seconds(60);
        assert!(interval_elapsed(Some(last), Some(Duration::from_secs(30))));

        // Exactly at the boundary
        let last = Utc::now() - ChronoDuration::seconds(30);
        assert!(interval_elapsed(Some(last), Some(Duration::from_secs(30))));
    }

    #[test]
    fn test_zero_interval_always_elapsed() {
        let last = Utc::now();
        assert!(interval_elapsed(Some(last), Some(Duration::ZERO)));
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        let last = Utc::now() + ChronoDuration::minutes(5);
        assert!(!interval_elapsed(Some(last), Some(Duration::from_secs(1))));
    }
}
