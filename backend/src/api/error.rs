//! HTTP error envelope and mapping from domain errors.
//!
//! The domain stays transport agnostic; every typed failure is translated
//! here, exhaustively, into a stable machine-readable code and an HTTP
//! status. Nothing is swallowed: partial vote failures keep their 500 and
//! their reconciliation log entry rather than passing as plain rejections.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::ingestion::IngestError;
use crate::domain::posts::{DeleteError, QueryError, SubmitError};
use crate::domain::voting::VoteError;

/// Stable machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or references an unusable image.
    InvalidRequest,
    /// No identity was supplied or it could not be parsed.
    Unauthorized,
    /// Authenticated but not permitted: self-votes, foreign deletions.
    Forbidden,
    /// The requested post or user does not exist.
    NotFound,
    /// The vote was already cast.
    Conflict,
    /// An unexpected failure, including partially applied votes.
    InternalError,
}

impl ErrorCode {
    const fn status(self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error envelope returned by every endpoint.
///
/// Internal failures keep their detail out of the serialised body: the raw
/// adapter message (filesystem paths, store errors) goes to the log only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    #[serde(skip)]
    detail: Option<String>,
}

impl ApiError {
    /// Build an envelope from a code and a human-readable message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
        }
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InternalError,
            message: "internal error".to_owned(),
            detail: Some(detail.into()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.code.status()
    }

    fn error_response(&self) -> HttpResponse {
        if self.code == ErrorCode::InternalError {
            let detail = self.detail.as_deref().unwrap_or(self.message.as_str());
            error!(detail, "request failed");
        }
        HttpResponse::build(self.status_code()).json(self)
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match &err {
            IngestError::FetchFailed { .. }
            | IngestError::UnsupportedFormat { .. }
            | IngestError::DecodeFailed { .. } => Self::new(ErrorCode::InvalidRequest, err.to_string()),
            IngestError::StorageFailed { .. } => Self::internal(err.to_string()),
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(err: SubmitError) -> Self {
        match &err {
            SubmitError::Ingest(inner) => inner.clone().into(),
            SubmitError::Repository { .. } | SubmitError::Partial { .. } => {
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<VoteError> for ApiError {
    fn from(err: VoteError) -> Self {
        match &err {
            VoteError::NotFound { .. } => Self::new(ErrorCode::NotFound, err.to_string()),
            VoteError::SelfVote => Self::new(ErrorCode::Forbidden, err.to_string()),
            VoteError::AlreadyVoted { .. } => Self::new(ErrorCode::Conflict, err.to_string()),
            VoteError::Partial { .. } | VoteError::Repository { .. } => {
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<DeleteError> for ApiError {
    fn from(err: DeleteError) -> Self {
        match &err {
            DeleteError::NotFound { .. } => Self::new(ErrorCode::NotFound, err.to_string()),
            DeleteError::NotOwner { .. } => Self::new(ErrorCode::Forbidden, err.to_string()),
            DeleteError::Asset { .. } | DeleteError::Repository { .. } => {
                Self::internal(err.to_string())
            }
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match &err {
            QueryError::UnknownUser { .. } => Self::new(ErrorCode::NotFound, err.to_string()),
            QueryError::Window(_) => Self::new(ErrorCode::InvalidRequest, err.to_string()),
            QueryError::Repository { .. } => Self::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::FetchError;
    use crate::domain::{PostId, UserId};

    #[rstest]
    #[case(ErrorCode::InvalidRequest, 400)]
    #[case(ErrorCode::Unauthorized, 401)]
    #[case(ErrorCode::Forbidden, 403)]
    #[case(ErrorCode::NotFound, 404)]
    #[case(ErrorCode::Conflict, 409)]
    #[case(ErrorCode::InternalError, 500)]
    fn codes_map_to_statuses(#[case] code: ErrorCode, #[case] status: u16) {
        let err = ApiError::new(code, "boom");
        assert_eq!(err.status_code().as_u16(), status);
    }

    #[rstest]
    fn vote_errors_keep_their_distinctions() {
        let voter = UserId::generate();
        let post = PostId::generate();

        let conflict: ApiError = VoteError::AlreadyVoted { voter, post }.into();
        assert_eq!(conflict.code(), ErrorCode::Conflict);

        let forbidden: ApiError = VoteError::SelfVote.into();
        assert_eq!(forbidden.code(), ErrorCode::Forbidden);

        let partial: ApiError = VoteError::Partial {
            voter,
            post,
            message: "post score not adjusted".to_owned(),
        }
        .into();
        assert_eq!(partial.code(), ErrorCode::InternalError);
    }

    #[rstest]
    fn ingest_failures_are_client_errors_except_storage() {
        let bad: ApiError = IngestError::UnsupportedFormat {
            url: "https://example.test/x.gif".to_owned(),
        }
        .into();
        assert_eq!(bad.code(), ErrorCode::InvalidRequest);

        let fetch: ApiError = IngestError::FetchFailed {
            source: FetchError::Status { status: 502 },
        }
        .into();
        assert_eq!(fetch.code(), ErrorCode::InvalidRequest);

        let storage: ApiError = IngestError::StorageFailed {
            message: "disk full".to_owned(),
        }
        .into();
        assert_eq!(storage.code(), ErrorCode::InternalError);
    }

    #[rstest]
    fn internal_errors_keep_adapter_detail_out_of_the_body() {
        let storage: ApiError = IngestError::StorageFailed {
            message: "/srv/uploads/cafe.jpg: disk full".to_owned(),
        }
        .into();
        assert_eq!(storage.code(), ErrorCode::InternalError);

        let json = serde_json::to_value(&storage).expect("serialise");
        assert_eq!(json["message"], "internal error");
        assert!(!json.to_string().contains("/srv/uploads"));
    }

    #[rstest]
    fn envelope_serialises_snake_case_codes() {
        let err = ApiError::new(ErrorCode::NotFound, "post gone");
        let json = serde_json::to_value(&err).expect("serialise");
        assert_eq!(json["code"], "not_found");
        assert_eq!(json["message"], "post gone");
    }
}
