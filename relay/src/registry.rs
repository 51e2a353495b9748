//! Last known position of every client that has reported one.
//!
//! The registry is a plain owned value. It lives inside the moderator actor,
//! whose mailbox serializes every mutation, and readers only ever see
//! [`Snapshot`] copies.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use location_socket::message::ClientId;

use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientRecord {
    pub id: ClientId,
    pub coordinate: Coordinate,
    pub last_updated: DateTime<Utc>,
    /// Position in first-report order, kept across overwrites.
    sequence: u64,
}

#[derive(Debug, Default)]
pub struct Registry {
    records: HashMap<ClientId, ClientRecord>,
    next_sequence: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the record for `id`. Returns `true` if the
    /// record is new.
    pub fn upsert(&mut self, id: ClientId, coordinate: Coordinate) -> bool {
        let now = Utc::now();
        if let Some(record) = self.records.get_mut(&id) {
            record.coordinate = coordinate;
            record.last_updated = now;
            return false;
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.records.insert(
            id,
            ClientRecord {
                id,
                coordinate,
                last_updated: now,
                sequence,
            },
        );
        true
    }

    /// Removes the record for `id`. Absent ids are not an error.
    pub fn remove(&mut self, id: &ClientId) -> Option<ClientRecord> {
        self.records.remove(id)
    }

    pub fn get(&self, id: &ClientId) -> Option<&ClientRecord> {
        self.records.get(id)
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Point-in-time copy of all records in first-report order.
    pub fn snapshot(&self) -> Snapshot {
        let mut records: Vec<ClientRecord> = self.records.values().cloned().collect();
        records.sort_by_key(|r| r.sequence);
        Snapshot { records }
    }

    pub fn ids(&self) -> Vec<ClientId> {
        self.snapshot().records.into_iter().map(|r| r.id).collect()
    }
}

/// Immutable copy of the registry, safe to iterate and aggregate over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    records: Vec<ClientRecord>,
}

impl Snapshot {
    pub fn records(&self) -> &[ClientRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClientRecord> {
        self.records.iter()
    }
}
