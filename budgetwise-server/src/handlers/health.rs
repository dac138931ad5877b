use budgetwise_common::db::DbAsyncPool;

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::env;

#[derive(Deserialize)]
pub struct HealthKeyQuery {
    pub key: Option<String>,
}

pub async fn heartbeat() -> impl Responder {
    HttpResponse::Ok()
}

pub async fn health(
    db_async_pool: web::Data<DbAsyncPool>,
    query: web::Query<HealthKeyQuery>,
) -> impl Responder {
    if !is_health_key_correct(query.key.as_deref()) {
        log::warn!("Rejected health check with missing or incorrect key");
        return HttpResponse::Unauthorized().finish();
    }

    let async_pool_state = db_async_pool.state();
    let resp_body = json!({
        "db_async_pool_state": {
            "connections": async_pool_state.connections,
            "idle_connections": async_pool_state.idle_connections
        }
    });

    HttpResponse::Ok().json(resp_body)
}

#[inline]
fn is_health_key_correct(key: Option<&str>) -> bool {
    let Some(key) = key else {
        return false;
    };

    let correct_key = env::CONF.health_endpoint_key.as_bytes();
    let key = key.as_bytes();

    if correct_key.len() != key.len() || key.is_empty() {
        return false;
    }

    // Compare every byte so the time taken doesn't depend on where the keys differ
    let keys_dont_match = correct_key
        .iter()
        .zip(key)
        .fold(0u8, |acc, (correct, given)| acc | (correct ^ given));

    keys_dont_match == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::web::Data;
    use actix_web::App;

    #[actix_web::test]
    async fn test_heartbeat() {
        let app =
            test::init_service(App::new().route("/heartbeat", web::get().to(heartbeat))).await;

        let req = TestRequest::get().uri("/heartbeat").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_health_with_valid_key() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(env::testing::db_async_pool()))
                .route("/health", web::get().to(health)),
        )
        .await;

        let req = TestRequest::get()
            .uri(&format!("/health?key={}", env::TEST_HEALTH_ENDPOINT_KEY))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);

        let resp_body = test::read_body(resp).await;
        let resp_json: serde_json::Value = serde_json::from_slice(&resp_body).unwrap();

        let db_state = resp_json.get("db_async_pool_state").unwrap();
        assert!(db_state.get("connections").is_some());
        assert!(db_state.get("idle_connections").is_some());
    }

    #[actix_web::test]
    async fn test_health_rejects_bad_keys() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(env::testing::db_async_pool()))
                .route("/health", web::get().to(health)),
        )
        .await;

        let wrong_same_length = "x".repeat(env::TEST_HEALTH_ENDPOINT_KEY.len());

        for uri in [
            String::from("/health"),
            String::from("/health?key="),
            String::from("/health?key=short"),
            format!("/health?key={wrong_same_length}"),
        ] {
            let req = TestRequest::get().uri(&uri).to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[actix_web::test]
    async fn test_health_route_is_mounted_under_api() {
        let app = crate::test_app!().await;

        let req = TestRequest::get().uri("/api/heartbeat").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }
}
