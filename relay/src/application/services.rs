use actix::*;
use actix_web::{get, web, HttpRequest, HttpResponse};
use chrono::Utc;
use location_socket::message::{DistancesReport, HealthReport};
use serde_json::json;

use super::{
    client,
    error::Error,
    moderator::{GetDistances, GetHealth, Moderator},
};
use crate::settings::WebsocketSettings;

#[get("/health")]
#[tracing::instrument(name = "Health", skip(moderator))]
async fn health(moderator: web::Data<Addr<Moderator>>) -> Result<web::Json<HealthReport>, Error> {
    let health = moderator.send(GetHealth).await.map_err(Error::Health)?;
    Ok(web::Json(HealthReport {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        connections: health.connections,
        active_users: health.active_users,
    }))
}

#[get("/distances")]
async fn distances(
    moderator: web::Data<Addr<Moderator>>,
) -> Result<web::Json<DistancesReport>, Error> {
    distances_report(&moderator).await
}

/// Path the browser dashboard polls.
#[get("/api/user-distances")]
async fn user_distances(
    moderator: web::Data<Addr<Moderator>>,
) -> Result<web::Json<DistancesReport>, Error> {
    distances_report(&moderator).await
}

#[tracing::instrument(name = "Distances", skip(moderator))]
async fn distances_report(
    moderator: &Addr<Moderator>,
) -> Result<web::Json<DistancesReport>, Error> {
    let aggregate = moderator
        .send(GetDistances)
        .await
        .map_err(Error::Distances)?;
    Ok(web::Json(aggregate.to_report()))
}

/// Echoes request headers, for checking what a proxy forwards.
#[get("/test")]
async fn echo(req: HttpRequest) -> HttpResponse {
    let headers: serde_json::Map<String, serde_json::Value> = req
        .headers()
        .iter()
        .map(|(name, value)| {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            (name.as_str().to_string(), serde_json::Value::String(value))
        })
        .collect();
    HttpResponse::Ok().json(json!({
        "message": "Backend is working!",
        "headers": headers,
        "timestamp": Utc::now(),
    }))
}

#[get("/ws")]
async fn websocket(
    req: HttpRequest,
    stream: web::Payload,
    moderator: web::Data<Addr<Moderator>>,
    settings: web::Data<WebsocketSettings>,
) -> Result<HttpResponse, actix_web::Error> {
    let websocket = client::WsClient::new(moderator.get_ref().clone(), settings.get_ref().clone());
    client::start(websocket, &req, stream)
}
