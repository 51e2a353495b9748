use std::time::Instant;

use actix::prelude::*;
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use location_socket::message::{ClientId, ClientMessage};
use tracing::{debug, error, info, warn};

use super::moderator::{self, Moderator};
use crate::{gateway::Notification, geo::Coordinate, settings::WebsocketSettings};

/// One websocket connection. Translates frames into moderator messages and
/// notifications back into frames.
#[derive(Debug)]
pub struct WsClient {
    id: ClientId,
    heartbeat: Instant,
    moderator: Addr<Moderator>,
    settings: WebsocketSettings,
}

impl WsClient {
    pub fn new(moderator: Addr<Moderator>, settings: WebsocketSettings) -> Self {
        Self {
            id: ClientId::new_v4(),
            heartbeat: Instant::now(),
            moderator,
            settings,
        }
    }

    /// helper method that sends ping to client every `heartbeat_interval`.
    ///
    /// also this method checks heartbeats from client
    fn heartbeat(&self, ctx: &mut <Self as Actor>::Context) {
        let timeout = self.settings.client_timeout();
        ctx.run_interval(self.settings.heartbeat_interval(), move |act, ctx| {
            // check client heartbeats
            if Instant::now().duration_since(act.heartbeat) > timeout {
                warn!("Client {} heartbeat failed, disconnecting!", act.id);
                ctx.stop();
                return;
            }

            ctx.ping(b"");
        });
    }

    fn handle_text(&mut self, text: &str) {
        let msg = match serde_json::from_str::<ClientMessage>(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Dropping malformed message from {}: {e}", self.id);
                return;
            }
        };
        match msg {
            ClientMessage::SendLocation {
                latitude,
                longitude,
            } => {
                let coordinate = Coordinate::new(latitude, longitude);
                // serde_json already refuses NaN, Infinity and out-of-range
                // literals like 1e400, so this only guards other decoders
                if !coordinate.is_finite() {
                    warn!("Dropping non-finite location from {}", self.id);
                    return;
                }
                self.moderator.do_send(moderator::LocationUpdate {
                    id: self.id,
                    coordinate,
                });
            }
        }
    }
}

impl Handler<Notification> for WsClient {
    type Result = ();

    fn handle(&mut self, msg: Notification, ctx: &mut Self::Context) -> Self::Result {
        match serde_json::to_string(&msg.0) {
            Ok(text) => ctx.text(text),
            Err(e) => error!("Could not serialize {:?} for {}: {e}", msg.0, self.id),
        }
    }
}

impl Actor for WsClient {
    type Context = ws::WebsocketContext<Self>;

    /// Method is called on actor start. We start the heartbeat process here.
    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);

        let addr = ctx.address();
        self.moderator
            .send(moderator::Connect {
                id: self.id,
                addr: addr.recipient(),
            })
            .into_actor(self)
            .then(|res, act, ctx| {
                match res {
                    Ok(Ok(())) => info!("WsClient {} registered", act.id),
                    Ok(Err(moderator::Error::AlreadyConnected)) => {
                        error!("{} already connected. Stopping.", act.id);
                        ctx.stop();
                    }
                    Err(e) => {
                        error!(?e);
                        ctx.stop();
                    }
                }
                fut::ready(())
            })
            .wait(ctx);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        self.moderator.do_send(moderator::Disconnect { id: self.id });
        Running::Stop
    }
}

/// Handler for ws::Message message
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsClient {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        debug!(?msg);
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.heartbeat = Instant::now();
                self.handle_text(&text);
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Ignoring binary frame from {}", self.id);
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                warn!("Protocol error from {}: {e}", self.id);
                ctx.stop();
            }
        }
    }
}

pub fn start(
    client: WsClient,
    req: &HttpRequest,
    stream: web::Payload,
) -> Result<HttpResponse, actix_web::Error> {
    let max_frame_size = client.settings.max_frame_size;
    ws::WsResponseBuilder::new(client, req, stream)
        .frame_size(max_frame_size)
        .start()
}
