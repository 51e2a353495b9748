use actix::MailboxError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::Utc;
use location_socket::message::{DistancesReport, HealthReport};

/// Failures of the query surface. Responses always carry a well-formed,
/// empty body of the shape the endpoint normally returns.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Could not compute distances")]
    Distances(#[source] MailboxError),

    #[error("Could not collect health")]
    Health(#[source] MailboxError),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        tracing::error!("{self}: {:?}", std::error::Error::source(self));
        let mut response = HttpResponse::build(self.status_code());
        match self {
            Error::Distances(_) => response.json(DistancesReport::empty()),
            Error::Health(_) => response.json(HealthReport {
                status: "error".to_string(),
                timestamp: Utc::now(),
                connections: 0,
                active_users: vec![],
            }),
        }
    }
}
