pub mod budget;
pub mod dashboard;
pub mod health;
pub mod transaction;
pub mod user;

pub mod error {
    use budgetwise_common::messages::{ErrorType, ServerErrorResponse};

    use actix_web::http::StatusCode;
    use actix_web::{HttpResponse, HttpResponseBuilder};
    use std::borrow::Cow;
    use std::fmt;

    #[derive(Debug)]
    pub enum DoesNotExistType {
        User,
        Budget,
        Transaction,
    }

    #[derive(Debug)]
    pub enum HttpErrorResponse {
        // 400
        IncorrectlyFormed(Cow<'static, str>),
        InvalidPeriod(Cow<'static, str>),
        InputTooLarge(Cow<'static, str>),
        SpendLimitExceeded(Cow<'static, str>),

        // 401
        IdentityMissing(Cow<'static, str>),

        // 404
        DoesNotExist(Cow<'static, str>, DoesNotExistType),

        // 500
        InternalError(Cow<'static, str>),
    }

    impl std::error::Error for HttpErrorResponse {}

    impl fmt::Display for HttpErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let server_error: ServerErrorResponse = self.into();
            write!(f, "{:?}", server_error)
        }
    }

    impl From<HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: HttpErrorResponse) -> Self {
            (&resp).into()
        }
    }

    impl From<&HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: &HttpErrorResponse) -> Self {
            match resp {
                // 400
                HttpErrorResponse::IncorrectlyFormed(msg) => ServerErrorResponse {
                    err_type: ErrorType::IncorrectlyFormed,
                    err_message: format!("Incorrectly formed request: {msg}"),
                },
                HttpErrorResponse::InvalidPeriod(msg) => ServerErrorResponse {
                    err_type: ErrorType::InvalidPeriod,
                    err_message: format!("Invalid period: {msg}"),
                },
                HttpErrorResponse::InputTooLarge(msg) => ServerErrorResponse {
                    err_type: ErrorType::InputTooLarge,
                    err_message: format!("Input is too long: {msg}"),
                },
                HttpErrorResponse::SpendLimitExceeded(msg) => ServerErrorResponse {
                    err_type: ErrorType::SpendLimitExceeded,
                    err_message: format!("Spend limit exceeded: {msg}"),
                },

                // 401
                HttpErrorResponse::IdentityMissing(msg) => ServerErrorResponse {
                    err_type: ErrorType::IdentityMissing,
                    err_message: format!("Identity missing: {msg}"),
                },

                // 404
                HttpErrorResponse::DoesNotExist(msg, dne_type) => ServerErrorResponse {
                    err_type: match dne_type {
                        DoesNotExistType::User => ErrorType::UserDoesNotExist,
                        DoesNotExistType::Budget => ErrorType::BudgetDoesNotExist,
                        DoesNotExistType::Transaction => ErrorType::TransactionDoesNotExist,
                    },
                    err_message: format!("Does not exist: {msg}"),
                },

                // 500
                HttpErrorResponse::InternalError(msg) => ServerErrorResponse {
                    err_type: ErrorType::InternalError,
                    err_message: format!("Internal error: {msg}"),
                },
            }
        }
    }

    impl actix_web::error::ResponseError for HttpErrorResponse {
        fn error_response(&self) -> HttpResponse {
            HttpResponseBuilder::new(self.status_code()).json(ServerErrorResponse::from(self))
        }

        fn status_code(&self) -> StatusCode {
            match *self {
                HttpErrorResponse::IncorrectlyFormed(_)
                | HttpErrorResponse::InvalidPeriod(_)
                | HttpErrorResponse::InputTooLarge(_)
                | HttpErrorResponse::SpendLimitExceeded(_) => StatusCode::BAD_REQUEST,
                HttpErrorResponse::IdentityMissing(_) => StatusCode::UNAUTHORIZED,
                HttpErrorResponse::DoesNotExist(_, _) => StatusCode::NOT_FOUND,
                HttpErrorResponse::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        use actix_web::body::to_bytes;
        use actix_web::ResponseError;

        #[actix_web::test]
        async fn test_error_response_is_json() {
            let err = HttpErrorResponse::DoesNotExist(
                Cow::Borrowed("No budget with ID"),
                DoesNotExistType::Budget,
            );

            let resp = err.error_response();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);

            let resp_body = to_bytes(resp.into_body()).await.unwrap();
            let resp_body: ServerErrorResponse = serde_json::from_slice(&resp_body).unwrap();

            assert_eq!(resp_body.err_type, ErrorType::BudgetDoesNotExist);
            assert_eq!(resp_body.err_message, "Does not exist: No budget with ID");
        }

        #[test]
        fn test_status_codes() {
            assert_eq!(
                HttpErrorResponse::SpendLimitExceeded(Cow::Borrowed("")).status_code(),
                StatusCode::BAD_REQUEST
            );
            assert_eq!(
                HttpErrorResponse::InputTooLarge(Cow::Borrowed("")).status_code(),
                StatusCode::BAD_REQUEST
            );
            assert_eq!(
                HttpErrorResponse::IdentityMissing(Cow::Borrowed("")).status_code(),
                StatusCode::UNAUTHORIZED
            );
            assert_eq!(
                HttpErrorResponse::InternalError(Cow::Borrowed("")).status_code(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    use budgetwise_common::messages::{ErrorType, ServerErrorResponse};

    use actix_http::Request;
    use actix_web::body::to_bytes;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use uuid::Uuid;

    use crate::env;

    /// Used by tests that are rejected before the database is reached
    pub const TEST_EMAIL: &str = "handler-test@budgetwise.test";

    pub fn unique_email() -> String {
        format!("handler-test-{}@budgetwise.test", Uuid::now_v7())
    }

    /// Signs a fresh user in through the API and returns their email
    pub async fn create_user<S, B>(app: &S) -> String
    where
        S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    {
        let email = unique_email();

        let req = TestRequest::post()
            .uri("/api/user")
            .insert_header((env::CONF.identity_header.as_str(), email.as_str()))
            .to_request();
        let resp = test::call_service(app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);

        email
    }

    pub async fn assert_error(resp: ServiceResponse, status: StatusCode, err_type: ErrorType) {
        assert_eq!(resp.status(), status);

        let resp_body = to_bytes(resp.into_body()).await.unwrap();
        let resp_body: ServerErrorResponse = serde_json::from_slice(&resp_body).unwrap();

        assert_eq!(resp_body.err_type, err_type);
    }

    /// Builds the full API service backed by a pool that never connects unless asked to
    #[macro_export]
    macro_rules! test_app {
        () => {
            actix_web::test::init_service(
                actix_web::App::new()
                    .app_data(actix_web::web::Data::new(
                        $crate::env::testing::db_async_pool(),
                    ))
                    .configure($crate::services::api::configure),
            )
        };
    }
}
