//! Request identity supplied by the external authentication collaborator.
//!
//! Session and credential handling live outside this service; by the time a
//! request reaches these handlers the auth layer has resolved the caller and
//! forwards their id in a header. The extractor only parses it.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use super::error::ApiError;
use crate::domain::UserId;

/// Header carrying the authenticated caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub UserId);

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let parsed = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<UserId>().ok())
            .map(Identity)
            .ok_or_else(|| ApiError::unauthorized("you must be logged in"));
        ready(parsed)
    }
}
