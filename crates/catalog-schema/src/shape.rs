//! # Shapes
//!
//! Declarative description of one request part: an ordered list of named
//! [`Field`]s. Declaration order is significant, it is the order in which
//! violations are reported.
//!
//! ```ignore
//! let query = Shape::new()
//!     .field("page", Field::number().coerce().int().min(1.0).default(1))
//!     .field("limit", Field::number().coerce().int().min(1.0).max(50.0).default(10));
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Ordered set of named fields describing one JSON object.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    fields: Vec<(String, Field)>,
}

impl Shape {
    /// Empty shape. Accepts any object and strips every key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Later declarations of the same name replace the
    /// earlier rules but keep the original position.
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = field,
            None => self.fields.push((name, field)),
        }
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// What happens when a field is missing from the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    /// Missing → `"Required"` violation.
    Required,
    /// Missing → omitted from the output.
    Optional,
    /// Missing → this value, no violation.
    Default(Value),
}

/// Length bounds for string fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringRules {
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
}

/// Bounds for number fields.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumberRules {
    pub integer: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// The value type a field accepts.
#[derive(Debug, Clone)]
pub enum FieldKind {
    String(StringRules),
    Number(NumberRules),
    Boolean,
    Object(Shape),
    Array(Box<Field>),
}

/// Custom predicate with the reason reported when it fails.
#[derive(Clone)]
pub struct Refinement {
    check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
    message: String,
}

impl Refinement {
    pub(crate) fn holds(&self, value: &Value) -> bool {
        (self.check)(value)
    }

    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Rules for a single field.
#[derive(Debug, Clone)]
pub struct Field {
    kind: FieldKind,
    coerce: bool,
    presence: Presence,
    refinements: Vec<Refinement>,
}

impl Field {
    fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            coerce: false,
            presence: Presence::Required,
            refinements: Vec::new(),
        }
    }

    /// A JSON string.
    pub fn string() -> Self {
        Self::of(FieldKind::String(StringRules::default()))
    }

    /// A JSON number.
    pub fn number() -> Self {
        Self::of(FieldKind::Number(NumberRules::default()))
    }

    /// A JSON boolean.
    pub fn boolean() -> Self {
        Self::of(FieldKind::Boolean)
    }

    /// A nested object.
    pub fn object(shape: Shape) -> Self {
        Self::of(FieldKind::Object(shape))
    }

    /// An array whose elements all follow `item`.
    pub fn array(item: Field) -> Self {
        Self::of(FieldKind::Array(Box::new(item)))
    }

    /// Convert string input to the field's type before checking it.
    ///
    /// Path and query values always arrive as strings, so numeric and
    /// boolean fields declared there need this.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Allow the field to be absent.
    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    /// Use `value` when the field is absent.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.presence = Presence::Default(value.into());
        self
    }

    /// Require a whole number. Ignored for non-number fields.
    pub fn int(mut self) -> Self {
        if let FieldKind::Number(rules) = &mut self.kind {
            rules.integer = true;
        }
        self
    }

    /// Inclusive lower bound. Ignored for non-number fields.
    pub fn min(mut self, bound: f64) -> Self {
        if let FieldKind::Number(rules) = &mut self.kind {
            rules.min = Some(bound);
        }
        self
    }

    /// Inclusive upper bound. Ignored for non-number fields.
    pub fn max(mut self, bound: f64) -> Self {
        if let FieldKind::Number(rules) = &mut self.kind {
            rules.max = Some(bound);
        }
        self
    }

    /// Minimum length in characters. Ignored for non-string fields.
    pub fn min_len(mut self, len: usize) -> Self {
        if let FieldKind::String(rules) = &mut self.kind {
            rules.min_len = Some(len);
        }
        self
    }

    /// Maximum length in characters. Ignored for non-string fields.
    pub fn max_len(mut self, len: usize) -> Self {
        if let FieldKind::String(rules) = &mut self.kind {
            rules.max_len = Some(len);
        }
        self
    }

    /// Custom check, run after the type and bound checks.
    pub fn refine(
        mut self,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        self.refinements.push(Refinement {
            check: Arc::new(check),
            message: message.into(),
        });
        self
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn coerces(&self) -> bool {
        self.coerce
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    pub(crate) fn refinements(&self) -> &[Refinement] {
        &self.refinements
    }
}
