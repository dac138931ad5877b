use budgetwise_common::db::{self, DaoError, DbAsyncPool};
use budgetwise_common::messages::{PeriodQuery, TransactionList};
use budgetwise_common::period::Period;

use actix_web::{web, HttpResponse};
use std::borrow::Cow;
use uuid::Uuid;

use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};
use crate::middleware::identity::Identity;

/// Transactions across every budget the user owns, newest first. Without a `period`
/// parameter the last 30 days are returned.
pub async fn get_by_period(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let period = match query.period.as_deref() {
        Some(p) => p
            .parse::<Period>()
            .map_err(|e| HttpErrorResponse::InvalidPeriod(Cow::Owned(e.to_string())))?,
        None => Period::Last30,
    };

    let budget_dao = db::budget::Dao::new(&db_async_pool);
    let transactions = match budget_dao
        .get_transactions_for_period(&identity.email, period)
        .await
    {
        Ok(t) => t,
        Err(DaoError::UserNotFound) => {
            return Err(HttpErrorResponse::DoesNotExist(
                Cow::Borrowed("No user with the signed-in email"),
                DoesNotExistType::User,
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to get transactions",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(TransactionList { transactions }))
}

pub async fn delete(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
    transaction_id: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budget_dao = db::budget::Dao::new(&db_async_pool);
    match budget_dao
        .delete_transaction(&identity.email, *transaction_id)
        .await
    {
        Ok(_) => (),
        Err(DaoError::UserNotFound) => {
            return Err(HttpErrorResponse::DoesNotExist(
                Cow::Borrowed("No user with the signed-in email"),
                DoesNotExistType::User,
            ));
        }
        Err(DaoError::QueryFailure(diesel::result::Error::NotFound)) => {
            return Err(HttpErrorResponse::DoesNotExist(
                Cow::Borrowed("No transaction with ID matching the request"),
                DoesNotExistType::Transaction,
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to delete transaction",
            )));
        }
    }

    Ok(HttpResponse::Ok().finish())
}
