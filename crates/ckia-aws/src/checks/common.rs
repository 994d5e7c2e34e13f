//! Common helpers for evaluating CloudWatch series

use crate::connection::Datapoint;
use chrono::{DateTime, Utc};

/// Whole days between `timestamp` and `now`
pub fn days_since(timestamp: &DateTime<Utc>, now: &DateTime<Utc>) -> i64 {
    (*now - *timestamp).num_days()
}

/// True if any datapoint has a non-zero average
pub fn any_nonzero_average(datapoints: &[Datapoint]) -> bool {
    datapoints.iter().any(|d| d.average_or_zero() != 0.0)
}

/// Most recent datapoint with a non-zero average
pub fn latest_nonzero_average(datapoints: &[Datapoint]) -> Option<DateTime<Utc>> {
    datapoints
        .iter()
        .filter(|d| d.average_or_zero() != 0.0)
        .map(|d| d.timestamp)
        .max()
}

/// Sum of the `Sum` statistic across datapoints
pub fn total_sum(datapoints: &[Datapoint]) -> f64 {
    datapoints.iter().map(Datapoint::sum_or_zero).sum()
}

#[cfg(test)]
pub(crate) fn point(hours_ago: i64, average: f64, sum: f64) -> Datapoint {
    Datapoint {
        timestamp: Utc::now() - chrono::Duration::hours(hours_ago),
        average: Some(average),
        sum: Some(sum),
        unit: Some("Count".to_string()),
    }
}
