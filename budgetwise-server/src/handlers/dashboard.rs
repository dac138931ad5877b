use budgetwise_common::aggregate::{self, LoadedBudget};
use budgetwise_common::db::{self, DaoError, DbAsyncPool};
use budgetwise_common::messages::{
    Budget, BudgetList, BudgetStatsList, ReachedBudgets, TotalSpent, TransactionCount,
    TransactionList,
};

use actix_web::{web, HttpResponse};
use std::borrow::Cow;

use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};
use crate::middleware::identity::Identity;

// Every dashboard figure is reduced from one snapshot of the user's budgets
async fn load_budgets(
    db_async_pool: &DbAsyncPool,
    email: &str,
) -> Result<Vec<LoadedBudget>, HttpErrorResponse> {
    let budget_dao = db::budget::Dao::new(db_async_pool);

    match budget_dao.get_budgets_for_user(email).await {
        Ok(b) => Ok(b),
        Err(DaoError::UserNotFound) => Err(HttpErrorResponse::DoesNotExist(
            Cow::Borrowed("No user with the signed-in email"),
            DoesNotExistType::User,
        )),
        Err(e) => {
            log::error!("{e}");
            Err(HttpErrorResponse::InternalError(Cow::Borrowed(
                "Failed to load dashboard data",
            )))
        }
    }
}

pub async fn summary(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budgets = load_budgets(&db_async_pool, &identity.email).await?;
    Ok(HttpResponse::Ok().json(aggregate::dashboard_summary(budgets)))
}

pub async fn total_spent(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budgets = load_budgets(&db_async_pool, &identity.email).await?;

    Ok(HttpResponse::Ok().json(TotalSpent {
        total_spent: aggregate::total_spent(&budgets),
    }))
}

pub async fn transaction_count(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budgets = load_budgets(&db_async_pool, &identity.email).await?;

    Ok(HttpResponse::Ok().json(TransactionCount {
        count: aggregate::transaction_count(&budgets),
    }))
}

pub async fn reached_budgets(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budgets = load_budgets(&db_async_pool, &identity.email).await?;
    Ok(HttpResponse::Ok().json(ReachedBudgets::from(aggregate::reached_ratio(&budgets))))
}

pub async fn budget_stats(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budgets = load_budgets(&db_async_pool, &identity.email).await?;

    Ok(HttpResponse::Ok().json(BudgetStatsList {
        stats: aggregate::budget_stats(&budgets),
    }))
}

pub async fn recent_transactions(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budgets = load_budgets(&db_async_pool, &identity.email).await?;

    Ok(HttpResponse::Ok().json(TransactionList {
        transactions: aggregate::recent_transactions(
            &budgets,
            aggregate::RECENT_TRANSACTIONS_LIMIT,
        ),
    }))
}

pub async fn recent_budgets(
    db_async_pool: web::Data<DbAsyncPool>,
    identity: Identity,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budgets = load_budgets(&db_async_pool, &identity.email).await?;
    let recent = aggregate::recent_budgets(budgets, aggregate::RECENT_BUDGETS_LIMIT);

    Ok(HttpResponse::Ok().json(BudgetList {
        budgets: recent.into_iter().map(Budget::from).collect(),
    }))
}
