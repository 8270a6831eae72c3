use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::directory::DirectoryError;
use crate::form::ValidationError;

/// Errors returned by the web layer. Every variant renders as
/// `{"success": false, "error": "..."}` with a matching status code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not signed in")]
    NotSignedIn,
    #[error("No team selected")]
    NoTeamSelected,
    #[error("You do not have access to this team")]
    Forbidden,
    #[error("Team {0} not found")]
    TeamNotFound(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Team directory unavailable: {0}")]
    Directory(#[from] DirectoryError),
    #[error("Session error: {0}")]
    Session(String),
    #[error("Team changed while the request was running, try again")]
    TeamChanged,
    #[error("Could not render page: {0}")]
    Render(#[from] askama::Error),
}

impl From<actix_session::SessionGetError> for AppError {
    fn from(e: actix_session::SessionGetError) -> Self {
        AppError::Session(e.to_string())
    }
}

impl From<actix_session::SessionInsertError> for AppError {
    fn from(e: actix_session::SessionInsertError) -> Self {
        AppError::Session(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotSignedIn => StatusCode::UNAUTHORIZED,
            AppError::NoTeamSelected | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::TeamNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Directory(_) => StatusCode::BAD_GATEWAY,
            AppError::TeamChanged => StatusCode::CONFLICT,
            AppError::Session(_) | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({"success": false, "error": self.to_string()}))
    }
}
