use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use derive_more::Display;
use serde_json::json;

#[derive(Debug, Display)]
pub enum ServerError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    /// Carries the name of the malformed path parameter, e.g. "note ID".
    #[display(fmt = "Invalid {}", _0)]
    InvalidId(&'static str),
    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),
    #[display(fmt = "{}", _0)]
    Conflict(&'static str),
    #[display(fmt = "Library Error: Diesel Error: {}", _0)]
    DieselError(diesel::result::Error),
    #[display(fmt = "Server Error: Pooling Error: {}", _0)]
    R2D2Error(r2d2::Error),
    #[display(fmt = "Server Error: Blocking pool is gone")]
    BlockingError,
    #[display(fmt = "Server Error: In-memory store lock poisoned")]
    StorePoisoned,
    #[display(fmt = "Server Error: Environment Error: {}", _0)]
    EnvironmentError(String),
    #[display(fmt = "Server Error: Migration Error: {}", _0)]
    MigrationError(String),
}

impl ServerError {
    pub fn validation(messages: Vec<String>) -> Self {
        ServerError::Validation(messages.join(", "))
    }

    fn is_internal(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl From<r2d2::Error> for ServerError {
    fn from(e: r2d2::Error) -> ServerError {
        ServerError::R2D2Error(e)
    }
}

impl From<std::env::VarError> for ServerError {
    fn from(e: std::env::VarError) -> ServerError {
        ServerError::EnvironmentError(e.to_string())
    }
}

impl From<diesel::result::Error> for ServerError {
    fn from(e: diesel::result::Error) -> ServerError {
        ServerError::DieselError(e)
    }
}

impl From<actix_web::error::BlockingError> for ServerError {
    fn from(_: actix_web::error::BlockingError) -> ServerError {
        ServerError::BlockingError
    }
}

impl<T> From<std::sync::PoisonError<T>> for ServerError {
    fn from(_: std::sync::PoisonError<T>) -> ServerError {
        ServerError::StorePoisoned
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) | ServerError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::DieselError(_)
            | ServerError::R2D2Error(_)
            | ServerError::BlockingError
            | ServerError::StorePoisoned
            | ServerError::EnvironmentError(_)
            | ServerError::MigrationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if self.is_internal() {
            log::error!("{self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
