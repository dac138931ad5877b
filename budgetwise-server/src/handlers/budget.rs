use budgetwise_common::db::{self, DaoError, DbAsyncPool};
use budgetwise_common::messages::{
    Budget, BudgetId, BudgetList, NewBudget, NewTransaction, TransactionId,
};
use budgetwise_common::validators::{self, Validity};

use actix_web::{web, HttpResponse};
use std::borrow::Cow;
use uuid::Uuid;

use crate::env;
use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};
use crate::middleware::identity::Identity;

const USER_NOT_FOUND_MSG: &str = "No user with the signed-in email. Sign in again to create one";
const BUDGET_NOT_FOUND_MSG: &str = "No budget with ID matching the request";

pub async fn get_all(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budget_dao = db::budget::Dao::new(&db_async_pool);
    let budgets = match budget_dao.get_budgets_for_user(&identity.email).await {
        Ok(b) => b,
        Err(DaoError::UserNotFound) => {
            return Err(HttpErrorResponse::DoesNotExist(
                Cow::Borrowed(USER_NOT_FOUND_MSG),
                DoesNotExistType::User,
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to get budgets",
            )));
        }
    };

    Ok(HttpResponse::Ok().json(BudgetList::from(budgets)))
}

pub async fn get(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
    budget_id: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budget_dao = db::budget::Dao::new(&db_async_pool);
    let budget = match budget_dao.get_budget(&identity.email, *budget_id).await {
        Ok(b) => b,
        Err(e) => return Err(budget_lookup_error(e, "Failed to get budget")),
    };

    Ok(HttpResponse::Ok().json(Budget::from(budget)))
}

pub async fn create(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
    budget_data: web::Json<NewBudget>,
) -> Result<HttpResponse, HttpErrorResponse> {
    validate_text(&budget_data.name, "Budget name", env::CONF.max_name_length)?;

    if let Validity::Invalid(msg) = validators::validate_amount(budget_data.amount, "Amount") {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg));
    }

    let emoji = budget_data
        .emoji
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    if let Some(emoji) = emoji {
        if let Validity::Invalid(msg) = validators::validate_emoji(emoji) {
            return Err(HttpErrorResponse::InputTooLarge(msg));
        }
    }

    let budget_dao = db::budget::Dao::new(&db_async_pool);
    let budget_id = match budget_dao
        .create_budget(
            &identity.email,
            budget_data.name.trim(),
            budget_data.amount,
            emoji,
        )
        .await
    {
        Ok(id) => id,
        Err(DaoError::UserNotFound) => {
            return Err(HttpErrorResponse::DoesNotExist(
                Cow::Borrowed(USER_NOT_FOUND_MSG),
                DoesNotExistType::User,
            ));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to create budget",
            )));
        }
    };

    Ok(HttpResponse::Created().json(BudgetId { id: budget_id }))
}

pub async fn delete(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
    budget_id: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budget_dao = db::budget::Dao::new(&db_async_pool);
    let deleted_transaction_count = match budget_dao
        .delete_budget(&identity.email, *budget_id)
        .await
    {
        Ok(count) => count,
        Err(e) => return Err(budget_lookup_error(e, "Failed to delete budget")),
    };

    log::debug!(
        "Deleted budget {} along with {} transaction(s)",
        budget_id,
        deleted_transaction_count,
    );

    Ok(HttpResponse::Ok().finish())
}

pub async fn create_transaction(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
    budget_id: web::Path<Uuid>,
    transaction_data: web::Json<NewTransaction>,
) -> Result<HttpResponse, HttpErrorResponse> {
    validate_text(
        &transaction_data.description,
        "Description",
        env::CONF.max_description_length,
    )?;

    if let Validity::Invalid(msg) = validators::validate_amount(transaction_data.amount, "Amount")
    {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg));
    }

    let budget_dao = db::budget::Dao::new(&db_async_pool);
    let transaction_id = match budget_dao
        .create_transaction(
            &identity.email,
            *budget_id,
            transaction_data.amount,
            transaction_data.description.trim(),
        )
        .await
    {
        Ok(id) => id,
        Err(DaoError::SpendLimitExceeded(e)) => {
            log::warn!("Rejected transaction against budget {}: {e}", budget_id);
            return Err(HttpErrorResponse::SpendLimitExceeded(Cow::Owned(
                e.to_string(),
            )));
        }
        Err(e) => return Err(budget_lookup_error(e, "Failed to create transaction")),
    };

    Ok(HttpResponse::Created().json(TransactionId { id: transaction_id }))
}

fn budget_lookup_error(error: DaoError, internal_error_msg: &'static str) -> HttpErrorResponse {
    match error {
        DaoError::UserNotFound => HttpErrorResponse::DoesNotExist(
            Cow::Borrowed(USER_NOT_FOUND_MSG),
            DoesNotExistType::User,
        ),
        DaoError::QueryFailure(diesel::result::Error::NotFound) => {
            HttpErrorResponse::DoesNotExist(
                Cow::Borrowed(BUDGET_NOT_FOUND_MSG),
                DoesNotExistType::Budget,
            )
        }
        e => {
            log::error!("{e}");
            HttpErrorResponse::InternalError(Cow::Borrowed(internal_error_msg))
        }
    }
}

fn validate_text(
    value: &str,
    field_name: &'static str,
    max_chars: usize,
) -> Result<(), HttpErrorResponse> {
    if let Validity::Invalid(msg) = validators::validate_not_blank(value, field_name) {
        return Err(HttpErrorResponse::IncorrectlyFormed(msg));
    }

    if let Validity::Invalid(msg) = validators::validate_max_length(value.trim(), field_name, max_chars)
    {
        return Err(HttpErrorResponse::InputTooLarge(msg));
    }

    Ok(())
}
