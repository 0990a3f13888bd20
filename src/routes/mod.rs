use actix_web::HttpResponse;
use serde_json::json;

use crate::services::ServiceError;

pub mod api;

/// Maps a service failure to the HTTP response sent to the caller.
pub fn error_response(err: &ServiceError) -> HttpResponse {
    let mut builder = match err {
        ServiceError::Validation(_) => HttpResponse::BadRequest(),
        ServiceError::StoreQuery(_) => HttpResponse::InternalServerError(),
        ServiceError::StoreUnavailable(_) | ServiceError::Cancelled => {
            HttpResponse::ServiceUnavailable()
        }
    };
    builder.json(json!({ "error": err.to_string() }))
}
