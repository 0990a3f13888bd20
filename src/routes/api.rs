//! JSON/XML API routes.

use actix_web::error::InternalError;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpResponse, Responder, web};
use tokio_util::sync::CancellationToken;

use crate::dto::employees::SearchEmployeesQuery;
use crate::repository::EmployeeReader;
use crate::routes::error_response;
use crate::services::ServiceError;
use crate::services::employees::SearchGateway;

/// Total number of rows matching the filters, sent when the store reports it.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Registers the API routes for a gateway backed by `R`.
pub fn configure<R>(cfg: &mut web::ServiceConfig)
where
    R: EmployeeReader + Send + Sync + 'static,
{
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = error_response(&ServiceError::Validation(err.to_string()));
        InternalError::from_response(err, response).into()
    }))
    .service(web::resource("/employee/search").route(web::get().to(search_employees::<R>)));
}

/// `GET /api/employee/search`: paged employee search rendered as JSON or XML.
pub async fn search_employees<R>(
    params: web::Query<SearchEmployeesQuery>,
    gateway: web::Data<SearchGateway<R>>,
) -> impl Responder
where
    R: EmployeeReader + Send + Sync + 'static,
{
    // Fires when actix drops this future, e.g. after the client disconnects.
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    match gateway.search(params.into_inner(), &cancel).await {
        Ok(rendered) => {
            let mut builder = HttpResponse::Ok();
            builder.insert_header((CONTENT_TYPE, rendered.content_type()));
            if let Some(total) = rendered.total {
                builder.insert_header((TOTAL_COUNT_HEADER, total.to_string()));
            }
            builder.body(rendered.body)
        }
        Err(err) => error_response(&err),
    }
}
