use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::web::*;
use actix_web::HttpRequest;
use std::borrow::Cow;

use crate::handlers::error::HttpErrorResponse;

mod budget;
mod dashboard;
mod health;
mod transaction;
mod user;

const MAX_JSON_PAYLOAD_BYTES: usize = 16 * 1024;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/api")
            .app_data(
                JsonConfig::default()
                    .limit(MAX_JSON_PAYLOAD_BYTES)
                    .error_handler(json_error),
            )
            .app_data(PathConfig::default().error_handler(path_error))
            .app_data(QueryConfig::default().error_handler(query_error))
            .configure(budget::configure)
            .configure(dashboard::configure)
            .configure(health::configure)
            .configure(transaction::configure)
            .configure(user::configure),
    );
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let resp = match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            HttpErrorResponse::InputTooLarge(Cow::Borrowed("Request body is too large"))
        }
        e => HttpErrorResponse::IncorrectlyFormed(Cow::Owned(e.to_string())),
    };

    resp.into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    HttpErrorResponse::IncorrectlyFormed(Cow::Owned(err.to_string())).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    HttpErrorResponse::IncorrectlyFormed(Cow::Owned(err.to_string())).into()
}
