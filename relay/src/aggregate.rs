//! Pairwise distances derived from a registry snapshot.
//!
//! Everything is recomputed from scratch on each call, O(n²) in the number
//! of reporting clients. That is fine for tens of clients; a deployment with
//! thousands would need incremental or spatially indexed maintenance.

use chrono::{DateTime, Utc};
use location_socket::message::{
    AggregateUpdate, ClientId, DistanceEntry, DistancesReport, PairDistance,
};

use crate::{geo::round_km, registry::Snapshot};

/// Unordered pair of distinct clients. `distance_km` is `None` when either
/// coordinate is not finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistancePair {
    pub user1: ClientId,
    pub user2: ClientId,
    pub distance_km: Option<f64>,
}

impl DistancePair {
    pub fn involves(&self, id: &ClientId) -> bool {
        self.user1 == *id || self.user2 == *id
    }

    fn presented(&self) -> PairDistance {
        PairDistance {
            user1: self.user1,
            user2: self.user2,
            distance_km: self.distance_km.map(round_km),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSnapshot {
    pub total_users: usize,
    pub has_connections: bool,
    pub pairs: Vec<DistancePair>,
}

impl AggregateSnapshot {
    /// `aggregate-update` event payload.
    pub fn to_update(&self, timestamp: DateTime<Utc>) -> AggregateUpdate {
        AggregateUpdate {
            total_users: self.total_users,
            has_connections: self.has_connections,
            pairs: self.pairs.iter().map(DistancePair::presented).collect(),
            timestamp,
        }
    }

    /// `GET /distances` body.
    pub fn to_report(&self) -> DistancesReport {
        DistancesReport {
            distances: self
                .pairs
                .iter()
                .map(|p| DistanceEntry::from(p.presented()))
                .collect(),
            total_users: self.total_users,
            has_connections: self.has_connections,
        }
    }
}

/// All `n·(n-1)/2` pairs of `snapshot`, in snapshot order with `i < j`.
pub fn compute_all(snapshot: &Snapshot) -> AggregateSnapshot {
    let records = snapshot.records();
    let mut pairs = Vec::with_capacity(records.len() * records.len().saturating_sub(1) / 2);
    for (i, a) in records.iter().enumerate() {
        for b in &records[i + 1..] {
            let km = a.coordinate.distance_km(&b.coordinate);
            pairs.push(DistancePair {
                user1: a.id,
                user2: b.id,
                distance_km: km.is_finite().then_some(km),
            });
        }
    }
    AggregateSnapshot {
        total_users: records.len(),
        has_connections: !records.is_empty(),
        pairs,
    }
}
