use chrono::{DateTime, Utc};
use uuid::Uuid;

pub type ClientId = Uuid;

/// Messages a client pushes to the relay.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    SendLocation { latitude: f64, longitude: f64 },
}

/// Events the relay pushes to clients.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum Event {
    Welcome(Welcome),
    PeerLocation(PeerLocation),
    PeerDisconnected { id: ClientId },
    AggregateUpdate(AggregateUpdate),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    /// Identifier the relay assigned to the receiving connection.
    pub id: ClientId,
    pub total_users: usize,
    pub has_connections: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PeerLocation {
    pub id: ClientId,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateUpdate {
    pub total_users: usize,
    pub has_connections: bool,
    pub pairs: Vec<PairDistance>,
    pub timestamp: DateTime<Utc>,
}

/// Distance between two clients in kilometres, `None` if it could not be
/// computed from the stored coordinates.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairDistance {
    pub user1: ClientId,
    pub user2: ClientId,
    pub distance_km: Option<f64>,
}

/// Body of `GET /distances`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistancesReport {
    pub distances: Vec<DistanceEntry>,
    pub total_users: usize,
    pub has_connections: bool,
}

impl DistancesReport {
    pub fn empty() -> Self {
        Self {
            distances: vec![],
            total_users: 0,
            has_connections: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DistanceEntry {
    pub user1: ClientId,
    pub user2: ClientId,
    pub distance: Option<f64>,
}

impl From<PairDistance> for DistanceEntry {
    fn from(pair: PairDistance) -> Self {
        Self {
            user1: pair.user1,
            user2: pair.user2,
            distance: pair.distance_km,
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub connections: usize,
    pub active_users: Vec<ClientId>,
}
