use std::time::Duration;

use once_cell::sync::Lazy;

use location_socket::{message::Event, LocationSocket, SocketConfig};
use relay::{
    application,
    settings::{ApplicationSettings, Settings, WebsocketSettings},
};

pub const WAIT: Duration = Duration::from_secs(5);

static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "debug")
    }
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
});

pub fn enable_tracing() {
    Lazy::force(&TRACING);
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(WebsocketSettings::default()).await
    }

    pub async fn spawn_with(websocket: WebsocketSettings) -> Self {
        enable_tracing();
        let settings = Settings {
            application: ApplicationSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            websocket,
        };
        let app = application::Application::build(settings)
            .await
            .expect("Failed to build application");
        let port = app.port();
        let _ = actix_web::rt::spawn(app.run_until_stopped());
        Self {
            address: "127.0.0.1".to_string(),
            port,
        }
    }

    pub fn base_address(&self) -> String {
        format!("http://{}:{}", &self.address, self.port)
    }

    pub fn path(&self, path: &str) -> String {
        format!("{}/{}", &self.base_address(), path)
    }

    pub fn socket_config(&self) -> SocketConfig {
        SocketConfig::new(&self.address, self.port)
    }

    pub async fn connect(&self) -> LocationSocket {
        LocationSocket::new(&self.socket_config())
            .await
            .expect("Failed to connect")
    }

    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> T {
        let response = reqwest::get(self.path(path))
            .await
            .expect("Failed to execute request.");
        assert_eq!(response.status(), 200);
        response.json().await.expect("Invalid json")
    }
}

/// Waits until `socket` sees an aggregate covering `total_users` clients.
pub async fn await_total_users(socket: &mut LocationSocket, total_users: usize) -> Event {
    socket
        .wait_for(WAIT, |e| {
            matches!(e, Event::AggregateUpdate(update) if update.total_users == total_users)
        })
        .await
        .expect("No matching aggregate update")
}
