use std::fmt::Debug;

use chrono::{DateTime, Duration, Utc};
use log::debug;

/// What a page should show for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Never requested, e.g. no model selected yet.
    Idle,
    /// In flight with nothing to show.
    Loading,
    Error,
    /// Settled successfully with zero items.
    Empty,
    Ready,
}

/// Cache entry for one query: the last value, the last error and when the
/// value was fetched. Every request bumps the epoch and only the response
/// carrying the current epoch is applied, so a slow answer for an old key
/// can never overwrite a newer selection.
#[derive(Debug)]
pub struct Query<K, T> {
    key: Option<K>,
    epoch: u64,
    data: Option<T>,
    error: Option<String>,
    fetched_at: Option<DateTime<Utc>>,
    fetching: bool,
    placeholder: bool,
}

impl<K, T> Default for Query<K, T> {
    fn default() -> Self {
        Self {
            key: None,
            epoch: 0,
            data: None,
            error: None,
            fetched_at: None,
            fetching: false,
            placeholder: false,
        }
    }
}

impl<K: Clone + PartialEq + Debug, T> Query<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fetch for `key` and returns the epoch its response must
    /// carry. On a key change the previous value stays visible as a
    /// placeholder until the new key settles.
    pub fn request(&mut self, key: K) -> u64 {
        if self.key.as_ref() != Some(&key) {
            debug!("query key {:?} -> {:?}", self.key, key);
            self.placeholder = self.data.is_some();
            self.error = None;
            self.key = Some(key);
        }
        self.epoch += 1;
        self.fetching = true;
        self.epoch
    }

    /// Applies a response. Returns false when the response was superseded.
    pub fn settle(&mut self, epoch: u64, result: Result<T, String>, now: DateTime<Utc>) -> bool {
        if epoch != self.epoch {
            debug!(
                "dropping stale response for {:?} (epoch {epoch}, current {})",
                self.key, self.epoch
            );
            return false;
        }
        self.fetching = false;
        match result {
            Ok(value) => {
                self.data = Some(value);
                self.error = None;
                self.fetched_at = Some(now);
                self.placeholder = false;
            }
            Err(message) => {
                if self.placeholder {
                    self.data = None;
                    self.placeholder = false;
                }
                self.error = Some(message);
            }
        }
        true
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }

    /// Showing previous-key data while the current key loads.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn is_loading(&self) -> bool {
        self.fetching && self.data.is_none()
    }

    pub fn is_stale(&self, now: DateTime<Utc>, stale_after: Duration) -> bool {
        self.fetched_at
            .map_or(true, |fetched_at| now - fetched_at >= stale_after)
    }

    pub fn status(&self, is_empty: impl Fn(&T) -> bool) -> Status {
        if self.is_loading() {
            Status::Loading
        } else if self.error.is_some() {
            Status::Error
        } else {
            match &self.data {
                None => Status::Idle,
                Some(data) if is_empty(data) => Status::Empty,
                Some(_) => Status::Ready,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000, 0).unwrap()
    }

    #[test]
    fn loading_then_ready() {
        let mut query: Query<String, Vec<u8>> = Query::new();
        assert_eq!(query.status(Vec::is_empty), Status::Idle);

        let epoch = query.request("rf".to_string());
        assert_eq!(query.status(Vec::is_empty), Status::Loading);

        assert!(query.settle(epoch, Ok(vec![1, 2]), now()));
        assert_eq!(query.status(Vec::is_empty), Status::Ready);
        assert_eq!(query.fetched_at(), Some(now()));
    }

    #[test]
    fn zero_items_is_empty_not_loading_or_error() {
        let mut query: Query<String, Vec<u8>> = Query::new();
        let epoch = query.request("rf".to_string());
        query.settle(epoch, Ok(vec![]), now());
        assert_eq!(query.status(Vec::is_empty), Status::Empty);
    }

    #[test]
    fn refetch_keeps_the_last_value_on_screen() {
        let mut query: Query<String, Vec<u8>> = Query::new();
        let first = query.request("rf".to_string());
        query.settle(first, Ok(vec![7]), now());

        query.request("rf".to_string());
        assert!(query.is_fetching());
        assert!(!query.is_loading());
        assert_eq!(query.data(), Some(&vec![7]));
        assert_eq!(query.status(Vec::is_empty), Status::Ready);
    }

    #[test]
    fn failed_refetch_keeps_data_and_reports_error() {
        let mut query: Query<String, Vec<u8>> = Query::new();
        let first = query.request("rf".to_string());
        query.settle(first, Ok(vec![7]), now());
        let second = query.request("rf".to_string());
        query.settle(second, Err("boom".to_string()), now());

        assert_eq!(query.status(Vec::is_empty), Status::Error);
        assert_eq!(query.error(), Some("boom"));
        assert_eq!(query.data(), Some(&vec![7]));

        let third = query.request("rf".to_string());
        query.settle(third, Ok(vec![8]), now());
        assert_eq!(query.error(), None);
    }

    #[test]
    fn stale_epoch_cannot_overwrite_new_selection() {
        let mut query: Query<String, &str> = Query::new();
        let old = query.request("rf".to_string());
        let new = query.request("xgb".to_string());

        assert!(query.settle(new, Ok("xgb data"), now()));
        assert!(!query.settle(old, Ok("rf data"), now()));
        assert_eq!(query.data(), Some(&"xgb data"));
    }

    #[test]
    fn old_response_arriving_first_is_also_dropped() {
        let mut query: Query<String, &str> = Query::new();
        let old = query.request("rf".to_string());
        let new = query.request("xgb".to_string());

        assert!(!query.settle(old, Ok("rf data"), now()));
        assert!(query.is_fetching());
        assert!(query.settle(new, Ok("xgb data"), now()));
        assert_eq!(query.data(), Some(&"xgb data"));
    }

    #[test]
    fn key_change_shows_placeholder_until_settled() {
        let mut query: Query<String, &str> = Query::new();
        let first = query.request("rf".to_string());
        query.settle(first, Ok("rf data"), now());

        let second = query.request("xgb".to_string());
        assert!(query.is_placeholder());
        assert!(!query.is_loading());
        assert_eq!(query.data(), Some(&"rf data"));

        query.settle(second, Err("down".to_string()), now());
        assert!(!query.is_placeholder());
        assert_eq!(query.data(), None);
        assert_eq!(query.status(|_| false), Status::Error);
    }

    #[test]
    fn staleness_follows_fetch_time() {
        let mut query: Query<(), u8> = Query::new();
        assert!(query.is_stale(now(), Duration::seconds(60)));
        let epoch = query.request(());
        query.settle(epoch, Ok(1), now());
        assert!(!query.is_stale(now() + Duration::seconds(59), Duration::seconds(60)));
        assert!(query.is_stale(now() + Duration::seconds(60), Duration::seconds(60)));
    }
}
