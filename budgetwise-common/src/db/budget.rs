use diesel::associations::GroupedBy;
use diesel::{dsl, BelongingToDsl, ExpressionMethods, QueryDsl};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use std::time::SystemTime;
use uuid::Uuid;

use crate::aggregate::{self, LoadedBudget};
use crate::db::{find_user_id, DaoError, DbAsyncPool};
use crate::messages::{Transaction as TransactionMessage, TransactionWithBudget};
use crate::models::budget::{Budget, NewBudget};
use crate::models::transaction::{NewTransaction, Transaction};
use crate::money::Money;
use crate::period::Period;
use crate::schema::budgets as budget_fields;
use crate::schema::budgets::dsl::budgets;
use crate::schema::transactions as transaction_fields;
use crate::schema::transactions::dsl::transactions;

pub struct Dao {
    db_async_pool: DbAsyncPool,
}

impl Dao {
    pub fn new(db_async_pool: &DbAsyncPool) -> Self {
        Self {
            db_async_pool: db_async_pool.clone(),
        }
    }

    pub async fn create_budget(
        &self,
        user_email: &str,
        name: &str,
        amount: Money,
        emoji: Option<&str>,
    ) -> Result<Uuid, DaoError> {
        let mut conn = self.db_async_pool.get().await?;
        let user_id = find_user_id(&mut conn, user_email).await?;

        let budget_id = Uuid::now_v7();
        let new_budget = NewBudget {
            id: budget_id,
            user_id,
            name,
            amount_cents: amount.cents(),
            emoji,
            created_timestamp: SystemTime::now(),
        };

        dsl::insert_into(budgets)
            .values(&new_budget)
            .execute(&mut conn)
            .await?;

        Ok(budget_id)
    }

    /// All of the user's budgets, newest first, each with its transactions attached
    pub async fn get_budgets_for_user(
        &self,
        user_email: &str,
    ) -> Result<Vec<LoadedBudget>, DaoError> {
        let mut db_connection = self.db_async_pool.get().await?;

        db_connection
            .build_transaction()
            .read_only()
            .run::<_, DaoError, _>(|conn| {
                Box::pin(async move {
                    let user_id = find_user_id(conn, user_email).await?;

                    let loaded_budgets = budgets
                        .filter(budget_fields::user_id.eq(user_id))
                        .order(budget_fields::created_timestamp.desc())
                        .load::<Budget>(conn)
                        .await?;

                    Ok(attach_transactions(conn, loaded_budgets).await?)
                })
            })
            .await
    }

    pub async fn get_budget(
        &self,
        user_email: &str,
        budget_id: Uuid,
    ) -> Result<LoadedBudget, DaoError> {
        let mut db_connection = self.db_async_pool.get().await?;

        db_connection
            .build_transaction()
            .read_only()
            .run::<_, DaoError, _>(|conn| {
                Box::pin(async move {
                    let user_id = find_user_id(conn, user_email).await?;

                    let budget = budgets
                        .filter(budget_fields::id.eq(budget_id))
                        .filter(budget_fields::user_id.eq(user_id))
                        .get_result::<Budget>(conn)
                        .await?;

                    let budget_transactions = Transaction::belonging_to(&budget)
                        .order(transaction_fields::created_timestamp.desc())
                        .load::<Transaction>(conn)
                        .await?;

                    Ok(LoadedBudget {
                        budget,
                        transactions: budget_transactions,
                    })
                })
            })
            .await
    }

    /// Records a transaction against a budget unless doing so would take the budget's total
    /// spend past its target.
    ///
    /// The budget row is locked for the duration of the check and insert, so concurrent
    /// inserts against the same budget are serialized and cannot jointly overshoot the target.
    pub async fn create_transaction(
        &self,
        user_email: &str,
        budget_id: Uuid,
        amount: Money,
        description: &str,
    ) -> Result<Uuid, DaoError> {
        let transaction_id = Uuid::now_v7();
        let mut db_connection = self.db_async_pool.get().await?;

        db_connection
            .build_transaction()
            .run::<_, DaoError, _>(|conn| {
                Box::pin(async move {
                    let user_id = find_user_id(conn, user_email).await?;

                    let budget = budgets
                        .filter(budget_fields::id.eq(budget_id))
                        .filter(budget_fields::user_id.eq(user_id))
                        .for_update()
                        .get_result::<Budget>(conn)
                        .await?;

                    let current_spent = transactions
                        .select(transaction_fields::amount_cents)
                        .filter(transaction_fields::budget_id.eq(budget.id))
                        .load::<i64>(conn)
                        .await?
                        .into_iter()
                        .map(Money::from_cents)
                        .sum::<Money>();

                    aggregate::check_spend_limit(
                        Money::from_cents(budget.amount_cents),
                        current_spent,
                        amount,
                    )?;

                    let new_transaction = NewTransaction {
                        id: transaction_id,
                        budget_id: budget.id,
                        amount_cents: amount.cents(),
                        description,
                        emoji: budget.emoji.as_deref(),
                        created_timestamp: SystemTime::now(),
                    };

                    dsl::insert_into(transactions)
                        .values(&new_transaction)
                        .execute(conn)
                        .await?;

                    Ok(())
                })
            })
            .await?;

        Ok(transaction_id)
    }

    /// Deletes a budget along with all of its transactions. Returns the number of
    /// transactions that were removed.
    pub async fn delete_budget(&self, user_email: &str, budget_id: Uuid) -> Result<usize, DaoError> {
        let mut db_connection = self.db_async_pool.get().await?;

        db_connection
            .build_transaction()
            .run::<_, DaoError, _>(|conn| {
                Box::pin(async move {
                    let user_id = find_user_id(conn, user_email).await?;

                    let budget_id = budgets
                        .select(budget_fields::id)
                        .filter(budget_fields::id.eq(budget_id))
                        .filter(budget_fields::user_id.eq(user_id))
                        .for_update()
                        .get_result::<Uuid>(conn)
                        .await?;

                    let deleted_transaction_count = diesel::delete(
                        transactions.filter(transaction_fields::budget_id.eq(budget_id)),
                    )
                    .execute(conn)
                    .await?;

                    diesel::delete(budgets.find(budget_id))
                        .execute(conn)
                        .await?;

                    Ok(deleted_transaction_count)
                })
            })
            .await
    }

    pub async fn delete_transaction(
        &self,
        user_email: &str,
        transaction_id: Uuid,
    ) -> Result<(), DaoError> {
        let mut conn = self.db_async_pool.get().await?;
        let user_id = find_user_id(&mut conn, user_email).await?;

        let owned_budget_ids = budgets
            .select(budget_fields::id)
            .filter(budget_fields::user_id.eq(user_id));

        let deleted_count = diesel::delete(
            transactions
                .filter(transaction_fields::id.eq(transaction_id))
                .filter(transaction_fields::budget_id.eq_any(owned_budget_ids)),
        )
        .execute(&mut conn)
        .await?;

        if deleted_count == 0 {
            return Err(DaoError::QueryFailure(diesel::result::Error::NotFound));
        }

        Ok(())
    }

    /// Transactions across all of the user's budgets created within the period, newest first
    pub async fn get_transactions_for_period(
        &self,
        user_email: &str,
        period: Period,
    ) -> Result<Vec<TransactionWithBudget>, DaoError> {
        let window_start = period.window_start(SystemTime::now());

        let mut conn = self.db_async_pool.get().await?;
        let user_id = find_user_id(&mut conn, user_email).await?;

        let rows = transactions
            .inner_join(budgets)
            .filter(budget_fields::user_id.eq(user_id))
            .filter(transaction_fields::created_timestamp.ge(window_start))
            .order(transaction_fields::created_timestamp.desc())
            .select((transaction_fields::all_columns, budget_fields::name))
            .load::<(Transaction, String)>(&mut conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(transaction, budget_name)| TransactionWithBudget {
                transaction: TransactionMessage::from(transaction),
                budget_name,
            })
            .collect())
    }
}

async fn attach_transactions(
    conn: &mut AsyncPgConnection,
    loaded_budgets: Vec<Budget>,
) -> Result<Vec<LoadedBudget>, diesel::result::Error> {
    let loaded_transactions = Transaction::belonging_to(&loaded_budgets)
        .order(transaction_fields::created_timestamp.desc())
        .load::<Transaction>(conn)
        .await?
        .grouped_by(&loaded_budgets);

    Ok(loaded_budgets
        .into_iter()
        .zip(loaded_transactions)
        .map(|(budget, transactions_for_budget)| LoadedBudget {
            budget,
            transactions: transactions_for_budget,
        })
        .collect())
}
