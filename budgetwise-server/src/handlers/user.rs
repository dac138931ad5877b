use budgetwise_common::db::{self, DbAsyncPool};

use actix_web::{web, HttpResponse};
use std::borrow::Cow;

use crate::handlers::error::HttpErrorResponse;
use crate::middleware::identity::OptionalIdentity;

/// Called by the client after every sign-in. Requests without an identity are ignored.
pub async fn ensure(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: OptionalIdentity,
) -> Result<HttpResponse, HttpErrorResponse> {
    let Some(identity) = identity.0 else {
        return Ok(HttpResponse::NoContent().finish());
    };

    let user_dao = db::user::Dao::new(&db_async_pool);
    let ensured = match user_dao.ensure_user(&identity.email).await {
        Ok(u) => u,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to create user",
            )));
        }
    };

    if ensured.created {
        log::info!("Created user {}", ensured.user_id);
        Ok(HttpResponse::Created().json(ensured))
    } else {
        Ok(HttpResponse::Ok().json(ensured))
    }
}
