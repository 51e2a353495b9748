use std::time::Duration;

use anyhow::anyhow;
pub use awc::ws;
use awc::{ws::Codec, BoxedSocket, ClientResponse};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info};

use crate::message::{ClientId, ClientMessage, Event, Welcome};

pub mod message;

/// Where a [`LocationSocket`] connects to.
#[derive(Debug, Clone)]
pub struct SocketConfig {
    pub address: String,
    pub port: u16,
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl SocketConfig {
    pub fn new<S: AsRef<str>>(address: S, port: u16) -> Self {
        Self {
            address: address.as_ref().to_string(),
            port,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}:{}/ws", self.address, self.port)
    }
}

/// Websocket connection to the relay.
///
/// The relay greets every connection with a `welcome` event, so a socket is
/// only handed out once that greeting arrived and the assigned id is known.
pub struct LocationSocket {
    welcome: Welcome,
    address: String,
    ws: actix_codec::Framed<BoxedSocket, Codec>,
}

impl std::fmt::Debug for LocationSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationSocket")
            .field("id", &self.welcome.id)
            .field("address", &self.address)
            .finish()
    }
}

impl LocationSocket {
    pub async fn new(config: &SocketConfig) -> anyhow::Result<Self> {
        let address = config.url();
        let (_res, mut ws) = LocationSocket::connect(&address).await?;
        let welcome = loop {
            match ws.next().await {
                Some(Ok(ws::Frame::Text(text))) => match serde_json::from_slice::<Event>(&text)? {
                    Event::Welcome(welcome) => break welcome,
                    other => return Err(anyhow!("First event must be welcome, got {other:?}")),
                },
                Some(Ok(ws::Frame::Ping(msg))) => ws.send(ws::Message::Pong(msg)).await?,
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(anyhow!("Websocket error: {e}")),
                None => return Err(anyhow!("Connection closed before welcome")),
            }
        };
        info!("Connected to {address} as {}", welcome.id);
        Ok(Self {
            welcome,
            address,
            ws,
        })
    }

    pub async fn connect(
        address: &str,
    ) -> Result<(ClientResponse, actix_codec::Framed<BoxedSocket, Codec>), anyhow::Error> {
        awc::Client::new()
            .ws(address)
            .connect()
            .await
            .map_err(|e| anyhow::anyhow!("Client error: {}", e))
    }

    pub fn id(&self) -> ClientId {
        self.welcome.id
    }

    pub fn welcome(&self) -> &Welcome {
        &self.welcome
    }

    pub async fn send_location(&mut self, latitude: f64, longitude: f64) -> anyhow::Result<()> {
        let msg = ClientMessage::SendLocation {
            latitude,
            longitude,
        };
        self.send_text(serde_json::to_string(&msg)?).await
    }

    /// Sends a raw text frame, bypassing the typed message vocabulary.
    pub async fn send_text(&mut self, msg: String) -> anyhow::Result<()> {
        Ok(self.ws.send(ws::Message::Text(msg.into())).await?)
    }

    /// Next event from the relay. Control frames are answered and skipped;
    /// `None` means the relay closed the connection.
    pub async fn next_event(&mut self) -> anyhow::Result<Option<Event>> {
        while let Some(frame) = self.ws.next().await {
            match frame? {
                ws::Frame::Text(text) => {
                    let event = serde_json::from_slice::<Event>(&text)?;
                    debug!(?event);
                    return Ok(Some(event));
                }
                ws::Frame::Ping(msg) => self.ws.send(ws::Message::Pong(msg)).await?,
                ws::Frame::Close(_) => return Ok(None),
                ws::Frame::Pong(_) | ws::Frame::Binary(_) | ws::Frame::Continuation(_) => {}
            }
        }
        Ok(None)
    }

    /// Skips events until one matches `pred`, giving up after `timeout`.
    pub async fn wait_for<F>(&mut self, timeout: Duration, mut pred: F) -> anyhow::Result<Event>
    where
        F: FnMut(&Event) -> bool,
    {
        let search = async {
            loop {
                match self.next_event().await? {
                    Some(event) if pred(&event) => return Ok::<_, anyhow::Error>(event),
                    Some(_) => continue,
                    None => return Err(anyhow!("Connection closed while waiting")),
                }
            }
        };
        tokio::time::timeout(timeout, search)
            .await
            .map_err(|_| anyhow!("Timed out after {timeout:?}"))?
    }

    pub async fn close(mut self) -> anyhow::Result<()> {
        self.ws.send(ws::Message::Close(None)).await?;
        Ok(())
    }
}
