//! Delivery of relay events to live connections.

use std::collections::HashMap;

use actix::prelude::*;
use location_socket::message::{ClientId, Event};
use tracing::trace;

/// One event on its way to a single connection.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct Notification(pub Event);

/// Live connections and their mailboxes.
///
/// Delivery is fire-and-forget: a mailbox that closed in the meantime just
/// drops the event.
#[derive(Default)]
pub struct Gateway {
    connections: HashMap<ClientId, Recipient<Notification>>,
}

impl Gateway {
    /// Returns `false` if `id` is already attached.
    pub fn attach(&mut self, id: ClientId, recipient: Recipient<Notification>) -> bool {
        if self.connections.contains_key(&id) {
            return false;
        }
        self.connections.insert(id, recipient);
        true
    }

    pub fn detach(&mut self, id: &ClientId) -> bool {
        self.connections.remove(id).is_some()
    }

    pub fn is_connected(&self, id: &ClientId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn unicast(&self, id: &ClientId, event: Event) {
        match self.connections.get(id) {
            Some(recipient) => recipient.do_send(Notification(event)),
            None => trace!("Dropping event for closed connection {id}"),
        }
    }

    pub fn broadcast(&self, event: Event) {
        for recipient in self.connections.values() {
            recipient.do_send(Notification(event.clone()));
        }
    }
}
