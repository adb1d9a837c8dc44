//! # Validated Request Extractor
//!
//! [`Validated<P, B, Q>`] runs schema validation over path params, body and
//! query before a handler is called. The shapes come from the [`Schema`]
//! impls of the three type parameters; `()` leaves a part undeclared.
//!
//! ```ignore
//! async fn get_product(
//!     State(state): State<AppState>,
//!     req: Validated<ProductParams>,
//! ) -> Result<Reply<Product>, Failure> {
//!     let id = req.params.id;
//!     // ...
//! }
//! ```
//!
//! On any violation the extractor rejects with a single
//! `ValidationFailed` error carrying every violation from every declared
//! part, and the handler is never invoked.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Query, RawPathParams, Request};
use catalog_core::{AppError, Violation};
use catalog_schema::{Part, RawBody, RawParts, RequestContract, Schema, SchemaValidator};
use serde_json::{Map, Value};

use crate::invoke::Failure;

/// Typed, validated view of a request.
#[derive(Debug, Clone)]
pub struct Validated<P = (), B = (), Q = ()> {
    pub params: P,
    pub body: B,
    pub query: Q,
}

impl<S, P, B, Q> FromRequest<S> for Validated<P, B, Q>
where
    S: Send + Sync,
    P: Schema + Send,
    B: Schema + Send,
    Q: Schema + Send,
{
    type Rejection = Failure;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let contract = RequestContract::of::<P, B, Q>();
        let (mut parts, body) = req.into_parts();

        let params = if contract.declares(Part::Params) {
            let raw = RawPathParams::from_request_parts(&mut parts, state)
                .await
                .map_err(|rejection| malformed("Malformed path parameters", rejection.body_text()))?;
            RawParts::string_map(raw.iter().map(|(k, v)| (k.to_string(), v.to_string())))
        } else {
            empty_object()
        };

        let query = if contract.declares(Part::Query) {
            let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
                .map_err(|rejection| malformed("Malformed query string", rejection.body_text()))?;
            RawParts::string_map(pairs)
        } else {
            empty_object()
        };

        let body = if contract.declares(Part::Body) {
            let bytes = Bytes::from_request(axum::http::Request::from_parts(parts, body), state)
                .await
                .map_err(|rejection| malformed("Unreadable body", rejection.body_text()))?;
            RawParts::body_from_bytes(&bytes)
        } else {
            RawBody::Empty
        };

        let raw = RawParts {
            params,
            body,
            query,
        };
        let validated = SchemaValidator::new().validate_request(&contract, &raw)?;
        let (params, body, query) = validated.decode::<P, B, Q>()?;
        Ok(Self {
            params,
            body,
            query,
        })
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn malformed(what: &str, reason: String) -> Failure {
    AppError::validation(vec![Violation::root(format!("{what}: {reason}"))]).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use catalog_schema::{Field, Shape};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Page {
        page: u32,
    }

    impl Schema for Page {
        fn shape() -> Option<Shape> {
            Some(Shape::new().field("page", Field::number().coerce().int().min(1.0).default(1)))
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    impl Schema for Named {
        fn shape() -> Option<Shape> {
            Some(Shape::new().field("name", Field::string()))
        }
    }

    fn request(uri: &str, body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn violations(failure: Failure) -> Vec<Violation> {
        match failure {
            Failure::App(err) => err.violations().to_vec(),
            Failure::Unknown(unknown) => panic!("unexpected unknown failure: {}", unknown.message()),
        }
    }

    #[tokio::test]
    async fn query_is_coerced_and_defaulted() {
        let ok = Validated::<(), (), Page>::from_request(request("/?page=3", ""), &()).await.unwrap();
        assert_eq!(ok.query, Page { page: 3 });

        let ok = Validated::<(), (), Page>::from_request(request("/", ""), &()).await.unwrap();
        assert_eq!(ok.query, Page { page: 1 });
    }

    #[tokio::test]
    async fn repeated_query_keys_keep_the_last_value() {
        let ok = Validated::<(), (), Page>::from_request(request("/?page=2&page=4", ""), &())
            .await
            .unwrap();
        assert_eq!(ok.query, Page { page: 4 });
    }

    #[tokio::test]
    async fn body_violations_reject_before_the_handler() {
        let failure = Validated::<(), Named, Page>::from_request(request("/?page=0", "{}"), &())
            .await
            .unwrap_err();
        assert_eq!(
            violations(failure),
            vec![
                Violation::at("name", "Required"),
                Violation::at("page", "Number must be greater than or equal to 1"),
            ]
        );
    }

    #[tokio::test]
    async fn malformed_json_is_a_root_violation() {
        let failure = Validated::<(), Named>::from_request(request("/", "{\"name\":"), &())
            .await
            .unwrap_err();
        let found = violations(failure);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].field, None);
    }

    #[tokio::test]
    async fn undeclared_body_is_never_read() {
        let ok = Validated::<(), (), ()>::from_request(request("/", "not json"), &()).await;
        assert!(ok.is_ok());
    }
}
