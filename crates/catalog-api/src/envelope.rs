//! # Response Envelopes
//!
//! Every JSON response has one of two shapes:
//!
//! ```text
//! { "status": "success", "data": ..., "message"?: ..., "meta"?: {...} }
//! { "status": "error", "error": { "message": ..., "details"?: [...] }, "meta"?: {...} }
//! ```
//!
//! Handlers build the first with [`Reply`]; only the error translator
//! builds the second. Absent optional members are omitted, never `null`.
//!
//! ## Request Meta
//!
//! When response meta is enabled the translator scopes a [`Meta`] holding
//! the request id and a timestamp around the rest of the request. [`Reply`]
//! reads it from that scope when it is turned into a response, so handlers
//! never pass it around.

use std::future::Future;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog_core::{AppError, PaginationMeta, StatusPhrases, Violation};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

tokio::task_local! {
    static REQUEST_META: Option<Meta>;
}

/// Discriminator shared by both envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Envelope metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339, UTC, second precision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Meta {
    /// Request-level meta stamped now.
    pub fn for_request(request_id: Option<String>) -> Self {
        Self {
            pagination: None,
            request_id,
            timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pagination.is_none() && self.request_id.is_none() && self.timestamp.is_none()
    }

    fn non_empty(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

/// Run `fut` with `meta` as the request meta seen by [`Reply`].
pub async fn with_request_meta<F: Future>(meta: Option<Meta>, fut: F) -> F::Output {
    REQUEST_META.scope(meta, fut).await
}

fn current_request_meta() -> Option<Meta> {
    REQUEST_META.try_with(Clone::clone).ok().flatten()
}

/// `{ status: "success", ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    pub status: EnvelopeStatus,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// `{ status: "error", ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub status: EnvelopeStatus,
    pub error: ErrorBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// Client-facing error detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    /// Present only for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<Violation>>,
}

impl ErrorEnvelope {
    /// Build the wire form of `err`. Private messages are replaced by the
    /// phrase for the status.
    pub fn new(err: &AppError, phrases: &StatusPhrases, meta: Option<Meta>) -> Self {
        let details = (!err.violations().is_empty()).then(|| err.violations().to_vec());
        Self {
            status: EnvelopeStatus::Error,
            error: ErrorBody {
                message: err.client_message(phrases).to_string(),
                details,
            },
            meta: meta.and_then(Meta::non_empty),
        }
    }
}

/// Successful handler result.
#[derive(Debug, Clone)]
pub struct Reply<T> {
    status: StatusCode,
    data: T,
    message: Option<String>,
    pagination: Option<PaginationMeta>,
}

impl<T: Serialize> Reply<T> {
    /// 200 OK.
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            data,
            message: None,
            pagination: None,
        }
    }

    /// 201 Created.
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach `meta.pagination`.
    pub fn paginated(mut self, pagination: PaginationMeta) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn into_envelope(self, request_meta: Option<Meta>) -> (StatusCode, SuccessEnvelope<T>) {
        let meta = Meta {
            pagination: self.pagination,
            ..request_meta.unwrap_or_default()
        };
        let envelope = SuccessEnvelope {
            status: EnvelopeStatus::Success,
            data: self.data,
            message: self.message,
            meta: meta.non_empty(),
        };
        (self.status, envelope)
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let (status, envelope) = self.into_envelope(current_request_meta());
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_reply_omits_optional_members() {
        let (status, envelope) = Reply::ok(json!({ "id": 1 })).into_envelope(None);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::to_value(envelope).unwrap(),
            json!({ "status": "success", "data": { "id": 1 } })
        );
    }

    #[test]
    fn created_reply_with_message_and_pagination() {
        let pagination = PaginationMeta {
            page: 2,
            limit: 5,
            total: 15,
        };
        let (status, envelope) = Reply::created(Vec::<u8>::new())
            .message("Created")
            .paginated(pagination)
            .into_envelope(None);
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            serde_json::to_value(envelope).unwrap(),
            json!({
                "status": "success",
                "data": [],
                "message": "Created",
                "meta": { "pagination": { "page": 2, "limit": 5, "total": 15 } }
            })
        );
    }

    #[test]
    fn request_meta_is_merged_with_pagination() {
        let request = Meta {
            pagination: None,
            request_id: Some("req-1".into()),
            timestamp: Some("2025-05-25T10:22:00Z".into()),
        };
        let (_, envelope) = Reply::ok(1)
            .paginated(PaginationMeta {
                page: 1,
                limit: 10,
                total: 0,
            })
            .into_envelope(Some(request));
        assert_eq!(
            serde_json::to_value(envelope.meta).unwrap(),
            json!({
                "pagination": { "page": 1, "limit": 10, "total": 0 },
                "requestId": "req-1",
                "timestamp": "2025-05-25T10:22:00Z"
            })
        );
    }

    #[test]
    fn validation_error_envelope_carries_details() {
        let err = AppError::validation(vec![Violation::at("name", "Required")]);
        let envelope = ErrorEnvelope::new(&err, &StatusPhrases::new(), None);
        assert_eq!(
            serde_json::to_value(envelope).unwrap(),
            json!({
                "status": "error",
                "error": {
                    "message": "Validation failed",
                    "details": [{ "field": "name", "reason": "Required" }]
                }
            })
        );
    }

    #[test]
    fn private_error_envelope_uses_the_phrase() {
        let err = AppError::internal("db password rejected");
        let envelope = ErrorEnvelope::new(&err, &StatusPhrases::new(), Some(Meta::default()));
        assert_eq!(envelope.error.message, "Internal Server Error");
        assert_eq!(envelope.error.details, None);
        assert_eq!(envelope.meta, None);
    }

    #[test]
    fn request_meta_has_a_second_precision_utc_timestamp() {
        let meta = Meta::for_request(Some("abc".into()));
        let timestamp = meta.timestamp.unwrap();
        assert!(timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&timestamp).is_ok());
        assert!(!timestamp.contains('.'));
    }

    #[tokio::test]
    async fn scoped_meta_is_visible_to_replies() {
        let meta = Meta::for_request(Some("scoped".into()));
        let seen = with_request_meta(Some(meta.clone()), async { current_request_meta() }).await;
        assert_eq!(seen, Some(meta));
        assert_eq!(current_request_meta(), None);
    }
}
