use diesel::{ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::pooled_connection::bb8::Pool as AsyncPool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::aggregate::SpendLimitError;
use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;

pub mod budget;
pub mod user;

pub type DbAsyncPool = AsyncPool<AsyncPgConnection>;
pub type DbAsyncConnection =
    bb8::PooledConnection<'static, AsyncDieselConnectionManager<AsyncPgConnection>>;

pub async fn create_db_async_pool(
    database_uri: &str,
    max_db_connections: u32,
    idle_timeout: Duration,
) -> Result<DbAsyncPool, DaoError> {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_uri);
    AsyncPool::builder()
        .max_size(max_db_connections)
        .idle_timeout(Some(idle_timeout))
        .build(config)
        .await
        .map_err(|e| DaoError::DbAsyncPoolFailure(e.to_string()))
}

/// Emails are the tenant key, so they are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) async fn find_user_id(
    conn: &mut AsyncPgConnection,
    user_email: &str,
) -> Result<Uuid, DaoError> {
    let email = normalize_email(user_email);

    users
        .select(user_fields::id)
        .filter(user_fields::email.eq(&email))
        .first::<Uuid>(conn)
        .await
        .optional()?
        .ok_or(DaoError::UserNotFound)
}

#[derive(Debug)]
pub enum DaoError {
    DbAsyncPoolFailure(String),
    QueryFailure(diesel::result::Error),
    UserNotFound,
    SpendLimitExceeded(SpendLimitError),
}

impl std::error::Error for DaoError {}

impl fmt::Display for DaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoError::DbAsyncPoolFailure(e) => {
                write!(f, "DaoError: Failed to obtain async DB connection: {e}")
            }
            DaoError::QueryFailure(e) => {
                write!(f, "DaoError: Query failed: {e}")
            }
            DaoError::UserNotFound => {
                write!(f, "DaoError: No user with the given email")
            }
            DaoError::SpendLimitExceeded(e) => {
                write!(f, "DaoError: {e}")
            }
        }
    }
}

impl<E: std::error::Error + Send + Sync + 'static> From<bb8::RunError<E>> for DaoError {
    fn from(error: bb8::RunError<E>) -> Self {
        DaoError::DbAsyncPoolFailure(error.to_string())
    }
}

impl From<diesel::result::Error> for DaoError {
    fn from(error: diesel::result::Error) -> Self {
        DaoError::QueryFailure(error)
    }
}

impl From<SpendLimitError> for DaoError {
    fn from(error: SpendLimitError) -> Self {
        DaoError::SpendLimitExceeded(error)
    }
}
