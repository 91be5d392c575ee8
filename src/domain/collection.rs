use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::models::MatchRecord;

/// Append-only match log ordered and keyed by timestamp
#[derive(Debug, Clone, Default)]
pub struct MatchStore {
    matches: BTreeMap<DateTime<Utc>, MatchRecord>,
}

impl MatchStore {
    pub fn new() -> Self {
        Self {
            matches: BTreeMap::new(),
        }
    }

    /// Build a store from records in any order. The first record seen for a timestamp wins.
    pub fn from_records(records: impl IntoIterator<Item = MatchRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Insert a record unless its timestamp is already present.
    ///
    /// Returns `false` when the insert was a no-op.
    pub fn insert(&mut self, record: MatchRecord) -> bool {
        if self.matches.contains_key(&record.timestamp) {
            return false;
        }
        self.matches.insert(record.timestamp, record);
        true
    }

    pub(crate) fn remove(&mut self, timestamp: &DateTime<Utc>) -> Option<MatchRecord> {
        self.matches.remove(timestamp)
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        self.matches.contains_key(timestamp)
    }

    pub fn get(&self, timestamp: &DateTime<Utc>) -> Option<&MatchRecord> {
        self.matches.get(timestamp)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Records in increasing timestamp order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &MatchRecord> {
        self.matches.values()
    }

    pub fn latest(&self) -> Option<&MatchRecord> {
        self.matches.values().next_back()
    }

    pub fn into_vec(self) -> Vec<MatchRecord> {
        self.matches.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 19, hour, 0, 0).unwrap()
    }

    #[test]
    fn duplicate_timestamp_is_a_noop() {
        let mut store = MatchStore::new();
        assert!(store.insert(MatchRecord::ignored(at(1))));

        let mut other = MatchRecord::ignored(at(1));
        other.stage = 8;
        assert!(!store.insert(other));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&at(1)).unwrap().stage, -1);
    }

    #[test]
    fn iterates_in_timestamp_order() {
        let store = MatchStore::from_records(vec![
            MatchRecord::ignored(at(5)),
            MatchRecord::ignored(at(1)),
            MatchRecord::ignored(at(3)),
        ]);

        let hours: Vec<_> = store.iter().map(|m| m.timestamp).collect();
        assert_eq!(hours, vec![at(1), at(3), at(5)]);
        assert_eq!(store.latest().unwrap().timestamp, at(5));
    }
}
