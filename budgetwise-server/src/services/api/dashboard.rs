use actix_web::web::*;

use crate::handlers::dashboard;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/dashboard")
            .route("", get().to(dashboard::summary))
            .route("/total_spent", get().to(dashboard::total_spent))
            .route("/transaction_count", get().to(dashboard::transaction_count))
            .route("/reached_budgets", get().to(dashboard::reached_budgets))
            .route("/budget_stats", get().to(dashboard::budget_stats))
            .route(
                "/recent_transactions",
                get().to(dashboard::recent_transactions),
            )
            .route("/recent_budgets", get().to(dashboard::recent_budgets)),
    );
}
