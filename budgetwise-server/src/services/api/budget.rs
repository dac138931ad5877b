use actix_web::web::*;

use crate::handlers::budget;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/budget")
            .route("", get().to(budget::get_all))
            .route("", post().to(budget::create))
            .route("/{budget_id}", get().to(budget::get))
            .route("/{budget_id}", delete().to(budget::delete))
            .route(
                "/{budget_id}/transaction",
                post().to(budget::create_transaction),
            ),
    );
}
