//! Partition-scoped event merge store
//!
//! The calendar renders one unified event set fed by two independent
//! full-snapshot sources (user events, project deadlines). Each source can
//! fire at any time and always delivers its complete current state, so a
//! naive clear-and-replace of the whole set would erase the other source's
//! latest contribution. The answer is a partitioned set: every member is
//! tagged with the partition that produced it, and a snapshot replaces
//! exactly its own partition, nothing else.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::RwLock;

use crate::types::{Event, EventOrigin};

/// Members of a [`PartitionedSet`] expose the source-document key that
/// deduplicates them within their partition.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Event {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Map from partition to that partition's current members, keyed by source
/// id. Generalizes to any read model merging N independently-refreshing
/// snapshot sources.
///
/// At most one member per `(partition, key)` exists at any time: a snapshot
/// containing the same key twice collapses to the later entry.
#[derive(Debug)]
pub struct PartitionedSet<P, T> {
    partitions: HashMap<P, HashMap<String, T>>,
}

impl<P, T> PartitionedSet<P, T>
where
    P: Copy + Eq + Hash,
    T: Keyed,
{
    pub fn new() -> Self {
        Self {
            partitions: HashMap::new(),
        }
    }

    /// Replace the full contents of one partition. Members of every other
    /// partition are untouched.
    pub fn replace_partition(&mut self, partition: P, items: impl IntoIterator<Item = T>) {
        let members = items
            .into_iter()
            .map(|item| (item.key().to_string(), item))
            .collect();
        self.partitions.insert(partition, members);
    }

    pub fn get(&self, partition: P, key: &str) -> Option<&T> {
        self.partitions.get(&partition)?.get(key)
    }

    pub fn partition_len(&self, partition: P) -> usize {
        self.partitions.get(&partition).map_or(0, HashMap::len)
    }

    pub fn len(&self) -> usize {
        self.partitions.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.partitions.values().flat_map(HashMap::values)
    }
}

impl<P, T> Default for PartitionedSet<P, T>
where
    P: Copy + Eq + Hash,
    T: Keyed,
{
    fn default() -> Self {
        Self::new()
    }
}

/// The authoritative merged event set.
///
/// All mutation goes through [`EventStore::replace_partition`]; the write
/// lock makes each replacement atomic with respect to readers: no reader
/// ever observes a partition cleared but not yet refilled. Read order is
/// irrelevant (the render widget re-sorts by time).
#[derive(Debug, Default)]
pub struct EventStore {
    inner: RwLock<PartitionedSet<EventOrigin, Event>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a full snapshot for one origin. Returns the new partition size.
    pub fn replace_partition(&self, origin: EventOrigin, events: Vec<Event>) -> usize {
        let mut set = self.inner.write();
        set.replace_partition(origin, events);
        let len = set.partition_len(origin);
        log::debug!(
            "EventStore: partition {} now holds {} events ({} total)",
            origin.as_str(),
            len,
            set.len()
        );
        len
    }

    /// The full merged set, both partitions.
    pub fn current_events(&self) -> Vec<Event> {
        self.inner.read().iter().cloned().collect()
    }

    /// Look an event up by id in either partition.
    pub fn find(&self, id: &str) -> Option<Event> {
        let set = self.inner.read();
        set.get(EventOrigin::UserEvent, id)
            .or_else(|| set.get(EventOrigin::ProjectDeadline, id))
            .cloned()
    }

    pub fn origin_of(&self, id: &str) -> Option<EventOrigin> {
        let set = self.inner.read();
        if set.get(EventOrigin::UserEvent, id).is_some() {
            Some(EventOrigin::UserEvent)
        } else if set.get(EventOrigin::ProjectDeadline, id).is_some() {
            Some(EventOrigin::ProjectDeadline)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_event(id: &str, origin: EventOrigin) -> Event {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        Event {
            id: id.to_string(),
            title: format!("Event {}", id),
            start,
            end: start,
            event_type: "meeting".to_string(),
            all_day: false,
            origin,
            location: None,
            description: None,
            project_name: None,
            project_id: None,
        }
    }

    #[test]
    fn test_replace_scopes_to_own_partition() {
        let store = EventStore::new();
        store.replace_partition(
            EventOrigin::UserEvent,
            vec![make_event("e1", EventOrigin::UserEvent)],
        );
        store.replace_partition(
            EventOrigin::ProjectDeadline,
            vec![make_event("deadline-p1", EventOrigin::ProjectDeadline)],
        );
        assert_eq!(store.len(), 2);

        // A fresh user-event snapshot must not disturb the deadline partition
        store.replace_partition(
            EventOrigin::UserEvent,
            vec![
                make_event("e2", EventOrigin::UserEvent),
                make_event("e3", EventOrigin::UserEvent),
            ],
        );

        let events = store.current_events();
        assert_eq!(events.len(), 3);
        assert!(events.iter().any(|e| e.id == "deadline-p1"));
        assert!(events.iter().all(|e| e.id != "e1"));
    }

    #[test]
    fn test_empty_snapshot_clears_only_its_partition() {
        let store = EventStore::new();
        store.replace_partition(
            EventOrigin::UserEvent,
            vec![make_event("e1", EventOrigin::UserEvent)],
        );
        store.replace_partition(
            EventOrigin::ProjectDeadline,
            vec![make_event("deadline-p1", EventOrigin::ProjectDeadline)],
        );

        // Source re-delivers with e1 removed
        store.replace_partition(EventOrigin::UserEvent, vec![]);

        let events = store.current_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "deadline-p1");
    }

    #[test]
    fn test_interleaved_bursts_converge_to_latest_per_partition() {
        let store = EventStore::new();
        // Back-to-back bursts from the same source: later fully supersedes
        store.replace_partition(
            EventOrigin::UserEvent,
            vec![make_event("e1", EventOrigin::UserEvent)],
        );
        store.replace_partition(
            EventOrigin::ProjectDeadline,
            vec![make_event("deadline-p1", EventOrigin::ProjectDeadline)],
        );
        store.replace_partition(
            EventOrigin::UserEvent,
            vec![make_event("e2", EventOrigin::UserEvent)],
        );
        store.replace_partition(
            EventOrigin::ProjectDeadline,
            vec![
                make_event("deadline-p1", EventOrigin::ProjectDeadline),
                make_event("deadline-p2", EventOrigin::ProjectDeadline),
            ],
        );

        let mut ids: Vec<String> = store.current_events().into_iter().map(|e| e.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["deadline-p1", "deadline-p2", "e2"]);
    }

    #[test]
    fn test_duplicate_keys_within_snapshot_collapse() {
        let store = EventStore::new();
        store.replace_partition(
            EventOrigin::ProjectDeadline,
            vec![
                make_event("deadline-p1", EventOrigin::ProjectDeadline),
                make_event("deadline-p1", EventOrigin::ProjectDeadline),
            ],
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_find_searches_both_partitions() {
        let store = EventStore::new();
        store.replace_partition(
            EventOrigin::UserEvent,
            vec![make_event("e1", EventOrigin::UserEvent)],
        );
        store.replace_partition(
            EventOrigin::ProjectDeadline,
            vec![make_event("deadline-p1", EventOrigin::ProjectDeadline)],
        );

        assert!(store.find("e1").is_some());
        assert!(store.find("deadline-p1").is_some());
        assert!(store.find("ghost").is_none());
        assert_eq!(store.origin_of("e1"), Some(EventOrigin::UserEvent));
        assert_eq!(
            store.origin_of("deadline-p1"),
            Some(EventOrigin::ProjectDeadline)
        );
    }

    #[test]
    fn test_partitioned_set_is_reusable_beyond_events() {
        struct Row {
            id: String,
        }
        impl Keyed for Row {
            fn key(&self) -> &str {
                &self.id
            }
        }

        let mut set: PartitionedSet<u8, Row> = PartitionedSet::new();
        set.replace_partition(1, vec![Row { id: "a".into() }, Row { id: "b".into() }]);
        set.replace_partition(2, vec![Row { id: "c".into() }]);
        set.replace_partition(1, vec![Row { id: "d".into() }]);

        let mut keys: Vec<&str> = set.iter().map(|r| r.id.as_str()).collect();
        keys.sort();
        assert_eq!(keys, vec!["c", "d"]);
        assert_eq!(set.partition_len(1), 1);
        assert_eq!(set.partition_len(2), 1);
    }
}
