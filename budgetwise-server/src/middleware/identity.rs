use budgetwise_common::db::normalize_email;
use budgetwise_common::validators::{self, Validity};

use actix_web::dev::Payload;
use actix_web::http::header::HeaderValue;
use actix_web::{FromRequest, HttpRequest};
use futures::future;
use std::borrow::Cow;

use crate::env;
use crate::handlers::error::HttpErrorResponse;

/// The signed-in user, as vouched for by the identity provider in front of this server
#[derive(Debug)]
pub struct Identity {
    pub email: String,
}

impl FromRequest for Identity {
    type Error = HttpErrorResponse;
    type Future = future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = req.headers().get(env::CONF.identity_header.as_str());

        match parse_identity_header(header) {
            Ok(Some(email)) => future::ok(Identity { email }),
            Ok(None) => future::err(HttpErrorResponse::IdentityMissing(Cow::Owned(format!(
                "{} header is missing",
                env::CONF.identity_header,
            )))),
            Err(e) => future::err(e),
        }
    }
}

/// Like `Identity`, but an absent or blank header is not an error. A header that is present
/// but malformed is still rejected.
#[derive(Debug)]
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = HttpErrorResponse;
    type Future = future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = req.headers().get(env::CONF.identity_header.as_str());

        match parse_identity_header(header) {
            Ok(email) => future::ok(OptionalIdentity(email.map(|email| Identity { email }))),
            Err(e) => future::err(e),
        }
    }
}

fn parse_identity_header(header: Option<&HeaderValue>) -> Result<Option<String>, HttpErrorResponse> {
    let Some(header) = header else {
        return Ok(None);
    };

    let email = header.to_str().map_err(|_| {
        HttpErrorResponse::IdentityMissing(Cow::Borrowed("Identity header is not valid text"))
    })?;

    let email = email.trim();
    if email.is_empty() {
        return Ok(None);
    }

    if let Validity::Invalid(msg) = validators::validate_email_address(email) {
        return Err(HttpErrorResponse::IdentityMissing(msg));
    }

    Ok(Some(normalize_email(email)))
}
