use actix_web::web::*;

use crate::handlers::transaction;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/transaction")
            .route("", get().to(transaction::get_by_period))
            .route("/{transaction_id}", delete().to(transaction::delete)),
    );
}
