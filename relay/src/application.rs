use actix::*;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use std::net::TcpListener;
use tracing::info;

use crate::settings::{Settings, WebsocketSettings};

use self::moderator::Moderator;

mod client;
mod error;
pub mod moderator;
mod services;
use services::{distances, echo, health, user_distances, websocket};

pub use error::Error;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        info!("Running on port: {port}");

        let server = create_server(listener, configuration.websocket)?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn create_server(
    listener: TcpListener,
    websocket_settings: WebsocketSettings,
) -> Result<Server, anyhow::Error> {
    let moderator = web::Data::new(Moderator::default().start());
    let websocket_settings = web::Data::new(websocket_settings);
    Ok(HttpServer::new(move || {
        App::new()
            // dashboards poll from other origins
            .wrap(middleware::DefaultHeaders::new().add(("Access-Control-Allow-Origin", "*")))
            .app_data(moderator.clone())
            .app_data(websocket_settings.clone())
            .service(health)
            .service(distances)
            .service(user_distances)
            .service(echo)
            .service(websocket)
    })
    .listen(listener)?
    .run())
}
