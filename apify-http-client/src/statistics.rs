//! Call, request and rate-limit counters.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{HttpClientError, Result};

/// Counters shared by every request of one client.
///
/// `calls` counts public invocations, `requests` counts attempts including
/// retries, and `rate_limit_errors[i]` counts rate-limited answers to the
/// `i+1`-th attempt of a call.
#[derive(Debug, Default)]
pub struct Statistics {
    calls: AtomicU64,
    requests: AtomicU64,
    rate_limit_errors: Mutex<Vec<u64>>,
}

/// Point-in-time copy of [`Statistics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSnapshot {
    /// Public invocations.
    pub calls: u64,
    /// HTTP attempts, retries included.
    pub requests: u64,
    /// Rate-limited attempts, indexed by attempt number minus one.
    pub rate_limit_errors: Vec<u64>,
}

impl Statistics {
    /// Create empty counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a public invocation.
    pub fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an HTTP attempt.
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a rate-limited answer to the given 1-based attempt.
    pub fn add_rate_limit_error(&self, attempt: u32) -> Result<()> {
        if attempt == 0 {
            return Err(HttpClientError::Validation(
                "Attempt limit error needs to be at least 1".to_string(),
            ));
        }
        let index = (attempt - 1) as usize;
        let mut histogram = self.rate_limit_errors.lock();
        if histogram.len() <= index {
            histogram.resize(index + 1, 0);
        }
        histogram[index] += 1;
        Ok(())
    }

    /// Number of public invocations.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Number of HTTP attempts.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Copy of the rate-limit histogram.
    pub fn rate_limit_errors(&self) -> Vec<u64> {
        self.rate_limit_errors.lock().clone()
    }

    /// Copy all counters.
    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            calls: self.calls(),
            requests: self.requests(),
            rate_limit_errors: self.rate_limit_errors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_histogram() {
        let stats = Statistics::new();
        for attempt in [2, 1, 2, 1, 5, 2, 1] {
            stats.add_rate_limit_error(attempt).unwrap();
        }
        assert_eq!(stats.rate_limit_errors(), vec![3, 3, 0, 0, 1]);
    }

    #[test]
    fn test_attempt_zero_is_rejected() {
        let stats = Statistics::new();
        assert!(matches!(
            stats.add_rate_limit_error(0),
            Err(HttpClientError::Validation(_))
        ));
        assert!(stats.rate_limit_errors().is_empty());
    }

    #[test]
    fn test_counters() {
        let stats = Statistics::new();
        stats.record_call();
        stats.record_request();
        stats.record_request();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.calls, 1);
        assert_eq!(snapshot.requests, 2);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["rateLimitErrors"], serde_json::json!([]));
    }
}
