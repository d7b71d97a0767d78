//! Element types exchanged with storage collaborators.
//!
//! The engine treats these as opaque element types; they exist so document
//! scans and date-partitioned range reads have a common currency.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::stream::core::Stream;

/// A key/value entry as emitted by a document-collection scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

/// A calendar date paired with a value, as produced by a date-partitioned
/// store when iterating a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedRecord<T> {
    pub date: NaiveDate,
    pub value: T,
}

impl<T> DatedRecord<T> {
    pub fn new(date: NaiveDate, value: T) -> Self {
        Self { date, value }
    }
}

/// All dates from `from` to `to`, inclusive, in order. An inverted range
/// yields an empty stream.
pub fn dates_between(from: NaiveDate, to: NaiveDate) -> Stream<NaiveDate> {
    Stream::from_iter(std::iter::successors(
        if from <= to { Some(from) } else { None },
        move |d| {
            let next = d.checked_add_days(Days::new(1))?;
            if next <= to {
                Some(next)
            } else {
                None
            }
        },
    ))
}
