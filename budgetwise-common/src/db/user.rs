use diesel::{dsl, ExpressionMethods, QueryDsl};
use diesel_async::RunQueryDsl;
use std::time::SystemTime;
use uuid::Uuid;

use crate::db::{normalize_email, DaoError, DbAsyncPool};
use crate::messages::UserEnsured;
use crate::models::user::NewUser;

use crate::schema::users as user_fields;
use crate::schema::users::dsl::users;

pub struct Dao {
    db_async_pool: DbAsyncPool,
}

impl Dao {
    pub fn new(db_async_pool: &DbAsyncPool) -> Self {
        Self {
            db_async_pool: db_async_pool.clone(),
        }
    }

    /// Creates the user on first sign-in. Calling this again with the same email (in any
    /// letter case) leaves the existing row untouched.
    pub async fn ensure_user(&self, email: &str) -> Result<UserEnsured, DaoError> {
        let email_lowercase = normalize_email(email);

        let new_user = NewUser {
            id: Uuid::now_v7(),
            email: &email_lowercase,
            created_timestamp: SystemTime::now(),
        };

        let mut conn = self.db_async_pool.get().await?;

        let inserted_count = dsl::insert_into(users)
            .values(&new_user)
            .on_conflict(user_fields::email)
            .do_nothing()
            .execute(&mut conn)
            .await?;

        if inserted_count == 1 {
            return Ok(UserEnsured {
                user_id: new_user.id,
                created: true,
            });
        }

        let existing_user_id = users
            .select(user_fields::id)
            .filter(user_fields::email.eq(&email_lowercase))
            .first::<Uuid>(&mut conn)
            .await?;

        Ok(UserEnsured {
            user_id: existing_user_id,
            created: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils;
    use crate::models::user::User;

    #[tokio::test]
    #[ignore = "requires PostgreSQL configured through BUDGETWISE_DB_* variables"]
    async fn ensure_user_creates_missing_user() {
        let pool = test_utils::db_async_pool().await;
        let dao = Dao::new(&pool);
        let email = test_utils::unique_email();

        let before = SystemTime::now();
        let ensured = dao.ensure_user(&email).await.unwrap();

        assert!(ensured.created);

        let mut conn = test_utils::db_async_conn(&pool).await;
        let user = users
            .find(ensured.user_id)
            .first::<User>(&mut conn)
            .await
            .unwrap();

        assert_eq!(user.email, email);
        assert!(user.created_timestamp.duration_since(before).is_ok());

        test_utils::delete_user(&pool, ensured.user_id).await;
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL configured through BUDGETWISE_DB_* variables"]
    async fn ensure_user_is_idempotent() {
        let pool = test_utils::db_async_pool().await;
        let dao = Dao::new(&pool);
        let email = test_utils::unique_email();

        let first = dao.ensure_user(&email).await.unwrap();
        let second = dao.ensure_user(&email).await.unwrap();
        let third = dao.ensure_user(&email.to_uppercase()).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert!(!third.created);
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(first.user_id, third.user_id);

        let mut conn = test_utils::db_async_conn(&pool).await;
        let row_count = users
            .filter(user_fields::email.eq(&email))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .unwrap();

        assert_eq!(row_count, 1);

        test_utils::delete_user(&pool, first.user_id).await;
    }
}
