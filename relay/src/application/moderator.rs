use actix::prelude::*;
use chrono::Utc;
use location_socket::message::{ClientId, Event, PeerLocation, Welcome};
use tracing::{debug, info, warn};

use crate::{
    aggregate::{compute_all, AggregateSnapshot},
    gateway::{Gateway, Notification},
    geo::Coordinate,
    registry::Registry,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Already connected")]
    AlreadyConnected,
}

#[derive(Message)]
#[rtype(result = "Result<(), Error>")]
pub struct Connect {
    pub id: ClientId,
    pub addr: Recipient<Notification>,
}

#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct LocationUpdate {
    pub id: ClientId,
    pub coordinate: Coordinate,
}

#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: ClientId,
}

#[derive(Message)]
#[rtype(result = "AggregateSnapshot")]
pub struct GetDistances;

#[derive(Message)]
#[rtype(result = "Health")]
pub struct GetHealth;

#[derive(Debug, Clone, PartialEq)]
pub struct Health {
    /// Live websocket connections, with or without a reported location.
    pub connections: usize,
    pub active_users: Vec<ClientId>,
}

/// Owns the registry and every live connection.
///
/// All connection transitions and queries go through this actor's mailbox,
/// so each one observes and mutates a consistent registry.
#[derive(Default)]
pub struct Moderator {
    registry: Registry,
    gateway: Gateway,
}

impl Moderator {
    fn aggregate(&self) -> AggregateSnapshot {
        compute_all(&self.registry.snapshot())
    }

    fn publish_aggregate(&self) {
        let update = self.aggregate().to_update(Utc::now());
        self.gateway.broadcast(Event::AggregateUpdate(update));
    }
}

impl Actor for Moderator {
    type Context = Context<Self>;
}

impl Handler<Connect> for Moderator {
    type Result = Result<(), Error>;

    fn handle(&mut self, msg: Connect, _: &mut Self::Context) -> Self::Result {
        if !self.gateway.attach(msg.id, msg.addr) {
            return Err(Error::AlreadyConnected);
        }
        info!("Client {} connected (total: {})", msg.id, self.gateway.len());

        let total_users = self.registry.size();
        self.gateway.unicast(
            &msg.id,
            Event::Welcome(Welcome {
                id: msg.id,
                total_users,
                has_connections: total_users > 0,
                timestamp: Utc::now(),
            }),
        );

        // replay so the newcomer sees every peer without waiting for updates
        for record in self.registry.snapshot().iter() {
            if record.id == msg.id {
                continue;
            }
            self.gateway.unicast(
                &msg.id,
                Event::PeerLocation(PeerLocation {
                    id: record.id,
                    latitude: record.coordinate.latitude,
                    longitude: record.coordinate.longitude,
                }),
            );
        }
        Ok(())
    }
}

impl Handler<LocationUpdate> for Moderator {
    type Result = ();

    fn handle(&mut self, msg: LocationUpdate, _: &mut Self::Context) -> Self::Result {
        if !self.gateway.is_connected(&msg.id) {
            warn!("Location from {} after disconnect, storing anyway", msg.id);
        }
        if self.registry.upsert(msg.id, msg.coordinate) {
            info!("First location from {}", msg.id);
        }
        debug!(id = %msg.id, coordinate = ?msg.coordinate, "Location update");

        self.gateway.broadcast(Event::PeerLocation(PeerLocation {
            id: msg.id,
            latitude: msg.coordinate.latitude,
            longitude: msg.coordinate.longitude,
        }));
        self.publish_aggregate();
    }
}

impl Handler<Disconnect> for Moderator {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Self::Context) -> Self::Result {
        self.gateway.detach(&msg.id);
        if self.registry.remove(&msg.id).is_none() {
            debug!("Client {} left without reporting a location", msg.id);
        }
        info!("Client {} disconnected (total: {})", msg.id, self.gateway.len());

        self.gateway.broadcast(Event::PeerDisconnected { id: msg.id });
        self.publish_aggregate();
    }
}

impl Handler<GetDistances> for Moderator {
    type Result = MessageResult<GetDistances>;

    fn handle(&mut self, _: GetDistances, _: &mut Self::Context) -> Self::Result {
        MessageResult(self.aggregate())
    }
}

impl Handler<GetHealth> for Moderator {
    type Result = MessageResult<GetHealth>;

    fn handle(&mut self, _: GetHealth, _: &mut Self::Context) -> Self::Result {
        MessageResult(Health {
            connections: self.gateway.len(),
            active_users: self.registry.ids(),
        })
    }
}
