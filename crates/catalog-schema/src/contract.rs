//! # Request Contracts
//!
//! Which request parts an endpoint validates and how. A part with no
//! declared shape is undeclared: the validator never reads it and the
//! handler receives `()` for it.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::shape::Shape;

/// One of the three validated request parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Params,
    Body,
    Query,
}

impl Part {
    /// Parts in validation and reporting order.
    pub const ALL: [Part; 3] = [Part::Params, Part::Body, Part::Query];
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Params => "params",
            Self::Body => "body",
            Self::Query => "query",
        })
    }
}

/// A typed request part that declares its own shape.
///
/// Implemented by the structs handlers receive. The validated JSON is
/// deserialized into `Self` with serde, so field names in the shape must
/// match the serde names of the struct.
pub trait Schema: DeserializeOwned {
    /// The declared shape, or `None` to leave the part undeclared.
    fn shape() -> Option<Shape>;
}

/// The undeclared part.
impl Schema for () {
    fn shape() -> Option<Shape> {
        None
    }
}

/// Declared shapes for one endpoint.
#[derive(Debug, Clone, Default)]
pub struct RequestContract {
    params: Option<Shape>,
    body: Option<Shape>,
    query: Option<Shape>,
}

impl RequestContract {
    /// Contract that validates nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Contract assembled from the [`Schema`] impls of the three part types.
    pub fn of<P: Schema, B: Schema, Q: Schema>() -> Self {
        Self {
            params: P::shape(),
            body: B::shape(),
            query: Q::shape(),
        }
    }

    pub fn params(mut self, shape: Shape) -> Self {
        self.params = Some(shape);
        self
    }

    pub fn body(mut self, shape: Shape) -> Self {
        self.body = Some(shape);
        self
    }

    pub fn query(mut self, shape: Shape) -> Self {
        self.query = Some(shape);
        self
    }

    /// Shape declared for `part`.
    pub fn shape(&self, part: Part) -> Option<&Shape> {
        match part {
            Part::Params => self.params.as_ref(),
            Part::Body => self.body.as_ref(),
            Part::Query => self.query.as_ref(),
        }
    }

    /// Whether `part` is validated.
    pub fn declares(&self, part: Part) -> bool {
        self.shape(part).is_some()
    }
}

/// The request body as received.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    /// No bytes. Validated as an empty object.
    Empty,
    /// Parsed JSON.
    Json(Value),
    /// Bytes that are not JSON, with the parser's reason.
    Malformed(String),
}

/// Untyped view of a request, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawParts {
    /// Path parameters as a JSON object of strings.
    pub params: Value,
    pub body: RawBody,
    /// Query pairs as a JSON object of strings. The last occurrence of a
    /// repeated key wins.
    pub query: Value,
}

impl Default for RawParts {
    fn default() -> Self {
        Self {
            params: Value::Object(Map::new()),
            body: RawBody::Empty,
            query: Value::Object(Map::new()),
        }
    }
}

impl RawParts {
    /// Build the string object used for path and query parts.
    pub fn string_map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Value
    where
        K: Into<String>,
        V: Into<String>,
    {
        Value::Object(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }

    /// Parse body bytes.
    pub fn body_from_bytes(bytes: &[u8]) -> RawBody {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return RawBody::Empty;
        }
        match serde_json::from_slice(bytes) {
            Ok(value) => RawBody::Json(value),
            Err(err) => RawBody::Malformed(err.to_string()),
        }
    }
}

/// Validated JSON for each declared part. Undeclared parts stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedParts {
    params: Option<Value>,
    body: Option<Value>,
    query: Option<Value>,
}

/// A validated part did not deserialize into its declared type.
///
/// This means the shape and the struct disagree, which is a programming
/// error rather than bad client input.
#[derive(Error, Debug)]
#[error("validated {part} does not match its declared type: {source}")]
pub struct DecodeError {
    pub part: Part,
    #[source]
    pub source: serde_json::Error,
}

impl ValidatedParts {
    pub(crate) fn set(&mut self, part: Part, value: Value) {
        let slot = match part {
            Part::Params => &mut self.params,
            Part::Body => &mut self.body,
            Part::Query => &mut self.query,
        };
        *slot = Some(value);
    }

    /// Validated JSON for `part`.
    pub fn get(&self, part: Part) -> Option<&Value> {
        match part {
            Part::Params => self.params.as_ref(),
            Part::Body => self.body.as_ref(),
            Part::Query => self.query.as_ref(),
        }
    }

    /// Deserialize the three parts into their typed form.
    pub fn decode<P: Schema, B: Schema, Q: Schema>(self) -> Result<(P, B, Q), DecodeError> {
        Ok((
            take(Part::Params, self.params)?,
            take(Part::Body, self.body)?,
            take(Part::Query, self.query)?,
        ))
    }
}

fn take<T: Schema>(part: Part, slot: Option<Value>) -> Result<T, DecodeError> {
    serde_json::from_value(slot.unwrap_or(Value::Null)).map_err(|source| DecodeError { part, source })
}
