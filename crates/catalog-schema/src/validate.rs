//! # Schema Validation
//!
//! Validates raw, untyped JSON against a [`Shape`] and produces the
//! normalized value (coerced, defaulted, unknown keys stripped) or the
//! complete list of [`Violation`]s.
//!
//! ## Rules
//!
//! Validation is additive: every declared field is checked and every
//! failure is reported, in declaration order. Within one field:
//!
//! 1. Absent → default value, omission (optional) or `"Required"`.
//! 2. Coercion, when the field asks for it.
//! 3. Type check. A mismatch ends the checks for that field.
//! 4. Bounds, each failure reported.
//! 5. Refinements, each failure reported.
//!
//! Validation is a pure function of its inputs: the same raw value always
//! produces the same output and the same violations.

use catalog_core::{AppError, Violation};
use serde_json::{Map, Number, Value};

use crate::contract::{Part, RawBody, RawParts, RequestContract, ValidatedParts};
use crate::shape::{Field, FieldKind, NumberRules, Presence, Shape, StringRules};

/// Reason reported for an absent required field.
pub const REQUIRED: &str = "Required";

/// Stateless validator. Cheap to construct and safe to share.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate one JSON value against `shape`.
    ///
    /// `raw` must be an object; anything else yields a single root
    /// violation.
    pub fn validate(&self, shape: &Shape, raw: &Value) -> Result<Value, Vec<Violation>> {
        let mut violations = Vec::new();
        let output = match raw {
            Value::Object(map) => Some(check_object(shape, map, "", &mut violations)),
            other => {
                violations.push(Violation::root(format!(
                    "Expected object, received {}",
                    type_name(other)
                )));
                None
            }
        };

        match output {
            Some(map) if violations.is_empty() => Ok(Value::Object(map)),
            _ => Err(violations),
        }
    }

    /// Validate every declared part of a request.
    ///
    /// Undeclared parts are not looked at. Violations from all declared
    /// parts are merged (params, then body, then query) into a single
    /// `ValidationFailed` error.
    pub fn validate_request(
        &self,
        contract: &RequestContract,
        raw: &RawParts,
    ) -> Result<ValidatedParts, AppError> {
        let mut violations = Vec::new();
        let mut validated = ValidatedParts::default();

        for part in Part::ALL {
            let Some(shape) = contract.shape(part) else {
                continue;
            };
            let result = match part {
                Part::Body => match &raw.body {
                    RawBody::Empty => self.validate(shape, &Value::Object(Map::new())),
                    RawBody::Json(value) => self.validate(shape, value),
                    RawBody::Malformed(reason) => {
                        Err(vec![Violation::root(format!("Malformed JSON body: {reason}"))])
                    }
                },
                Part::Params => self.validate(shape, &raw.params),
                Part::Query => self.validate(shape, &raw.query),
            };
            match result {
                Ok(value) => validated.set(part, value),
                Err(mut found) => violations.append(&mut found),
            }
        }

        if violations.is_empty() {
            Ok(validated)
        } else {
            Err(AppError::validation(violations))
        }
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_object(
    shape: &Shape,
    input: &Map<String, Value>,
    prefix: &str,
    violations: &mut Vec<Violation>,
) -> Map<String, Value> {
    let mut output = Map::new();
    for (name, field) in shape.fields() {
        let path = join_path(prefix, name);
        if let Some(value) = check_field(field, &path, input.get(name), violations) {
            output.insert(name.to_string(), value);
        }
    }
    output
}

/// Check one field. Returns the normalized value when the field produced
/// no violation and has something to contribute to the output.
fn check_field(
    field: &Field,
    path: &str,
    value: Option<&Value>,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let Some(value) = value else {
        return match field.presence() {
            Presence::Required => {
                violations.push(Violation::at(path, REQUIRED));
                None
            }
            Presence::Optional => None,
            Presence::Default(default) => Some(default.clone()),
        };
    };

    let coerced;
    let value = if field.coerces() {
        match coerce(field.kind(), value) {
            Ok(converted) => {
                coerced = converted;
                &coerced
            }
            Err(received) => {
                violations.push(Violation::at(
                    path,
                    format!("Expected {}, received {received}", expected_name(field.kind())),
                ));
                return None;
            }
        }
    } else {
        value
    };

    let before = violations.len();
    let normalized = match field.kind() {
        FieldKind::String(rules) => check_string(rules, path, value, violations),
        FieldKind::Number(rules) => check_number(rules, path, value, violations),
        FieldKind::Boolean => match value {
            Value::Bool(_) => Some(value.clone()),
            other => {
                violations.push(mismatch(path, "boolean", other));
                None
            }
        },
        FieldKind::Object(shape) => match value {
            Value::Object(map) => Some(Value::Object(check_object(shape, map, path, violations))),
            other => {
                violations.push(mismatch(path, "object", other));
                None
            }
        },
        FieldKind::Array(item) => match value {
            Value::Array(items) => Some(Value::Array(
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, element)| {
                        check_field(item, &join_path(path, &i.to_string()), Some(element), violations)
                    })
                    .collect(),
            )),
            other => {
                violations.push(mismatch(path, "array", other));
                None
            }
        },
    };

    let normalized = normalized?;
    for refinement in field.refinements() {
        if !refinement.holds(&normalized) {
            violations.push(Violation::at(path, refinement.message()));
        }
    }

    (violations.len() == before).then_some(normalized)
}

fn mismatch(path: &str, expected: &str, received: &Value) -> Violation {
    Violation::at(
        path,
        format!("Expected {expected}, received {}", type_name(received)),
    )
}

fn expected_name(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::String(_) => "string",
        FieldKind::Number(_) => "number",
        FieldKind::Boolean => "boolean",
        FieldKind::Object(_) => "object",
        FieldKind::Array(_) => "array",
    }
}

/// Convert string input to the field's kind. Non-string input is passed
/// through untouched so the type check reports it. The error is the
/// "received" label for the violation.
fn coerce(kind: &FieldKind, value: &Value) -> Result<Value, &'static str> {
    match (kind, value) {
        (FieldKind::Number(_), Value::String(s)) => {
            let trimmed = s.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                return Ok(Value::from(n));
            }
            match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Number::from_f64(n).map(Value::Number).ok_or("nan"),
                _ => Err("nan"),
            }
        }
        (FieldKind::Boolean, Value::String(s)) => match s.trim() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err("string"),
        },
        (FieldKind::String(_), Value::Number(n)) => Ok(Value::String(n.to_string())),
        (FieldKind::String(_), Value::Bool(b)) => Ok(Value::String(b.to_string())),
        _ => Ok(value.clone()),
    }
}

fn check_string(
    rules: &StringRules,
    path: &str,
    value: &Value,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let Value::String(s) = value else {
        violations.push(mismatch(path, "string", value));
        return None;
    };
    let len = s.chars().count();
    if let Some(min) = rules.min_len {
        if len < min {
            violations.push(Violation::at(
                path,
                format!("String must contain at least {min} character(s)"),
            ));
        }
    }
    if let Some(max) = rules.max_len {
        if len > max {
            violations.push(Violation::at(
                path,
                format!("String must contain at most {max} character(s)"),
            ));
        }
    }
    Some(value.clone())
}

fn check_number(
    rules: &NumberRules,
    path: &str,
    value: &Value,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let Some(n) = value.as_f64() else {
        violations.push(mismatch(path, "number", value));
        return None;
    };
    if rules.integer && n.fract() != 0.0 {
        violations.push(Violation::at(path, "Expected integer, received float"));
    }
    if let Some(min) = rules.min {
        if n < min {
            violations.push(Violation::at(
                path,
                format!("Number must be greater than or equal to {min}"),
            ));
        }
    }
    if let Some(max) = rules.max {
        if n > max {
            violations.push(Violation::at(
                path,
                format!("Number must be less than or equal to {max}"),
            ));
        }
    }
    Some(normalize_number(value, n))
}

/// Whole numbers are stored as integers so they deserialize into integer
/// types.
fn normalize_number(value: &Value, n: f64) -> Value {
    if value.is_i64() || value.is_u64() {
        return value.clone();
    }
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn product_shape() -> Shape {
        Shape::new()
            .field("name", Field::string())
            .field("description", Field::string())
            .field("price", Field::number())
            .field("inStock", Field::boolean())
    }

    fn page_shape() -> Shape {
        Shape::new()
            .field("page", Field::number().coerce().int().min(1.0).default(1))
            .field(
                "limit",
                Field::number().coerce().int().min(1.0).max(50.0).default(10),
            )
    }

    fn fields(violations: &[Violation]) -> Vec<Option<&str>> {
        violations.iter().map(|v| v.field.as_deref()).collect()
    }

    #[test]
    fn all_missing_required_fields_reported_in_order() {
        let err = SchemaValidator::new()
            .validate(&product_shape(), &json!({}))
            .unwrap_err();
        assert_eq!(
            fields(&err),
            [Some("name"), Some("description"), Some("price"), Some("inStock")]
        );
        assert!(err.iter().all(|v| v.reason == REQUIRED));
    }

    #[test]
    fn valid_body_passes_and_unknown_keys_are_stripped() {
        let raw = json!({
            "name": "Lamp",
            "description": "Desk lamp",
            "price": 42.5,
            "inStock": true,
            "_id": "smuggled"
        });
        let value = SchemaValidator::new().validate(&product_shape(), &raw).unwrap();
        assert_eq!(
            value,
            json!({ "name": "Lamp", "description": "Desk lamp", "price": 42.5, "inStock": true })
        );
    }

    #[test]
    fn defaults_fill_missing_query_fields() {
        let value = SchemaValidator::new().validate(&page_shape(), &json!({})).unwrap();
        assert_eq!(value, json!({ "page": 1, "limit": 10 }));
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let value = SchemaValidator::new()
            .validate(&page_shape(), &json!({ "page": "2", "limit": " 5 " }))
            .unwrap();
        assert_eq!(value, json!({ "page": 2, "limit": 5 }));
        assert!(value["page"].is_i64());
    }

    #[test]
    fn coercion_happens_before_bounds() {
        let err = SchemaValidator::new()
            .validate(&page_shape(), &json!({ "page": "0", "limit": "100" }))
            .unwrap_err();
        assert_eq!(
            err,
            vec![
                Violation::at("page", "Number must be greater than or equal to 1"),
                Violation::at("limit", "Number must be less than or equal to 50"),
            ]
        );
    }

    #[test]
    fn non_numeric_string_is_nan() {
        let err = SchemaValidator::new()
            .validate(&page_shape(), &json!({ "page": "abc" }))
            .unwrap_err();
        assert_eq!(err, vec![Violation::at("page", "Expected number, received nan")]);
    }

    #[test]
    fn empty_string_is_nan_not_zero() {
        let err = SchemaValidator::new()
            .validate(&page_shape(), &json!({ "page": "", "limit": "  " }))
            .unwrap_err();
        assert_eq!(
            err,
            vec![
                Violation::at("page", "Expected number, received nan"),
                Violation::at("limit", "Expected number, received nan"),
            ]
        );
    }

    #[test]
    fn fractional_page_reports_every_failed_bound() {
        let err = SchemaValidator::new()
            .validate(&page_shape(), &json!({ "page": "0.5" }))
            .unwrap_err();
        assert_eq!(
            err,
            vec![
                Violation::at("page", "Expected integer, received float"),
                Violation::at("page", "Number must be greater than or equal to 1"),
            ]
        );
    }

    #[test]
    fn without_coercion_strings_are_type_errors() {
        let raw = json!({ "name": "Lamp", "description": "x", "price": "12", "inStock": "yes" });
        let err = SchemaValidator::new().validate(&product_shape(), &raw).unwrap_err();
        assert_eq!(
            err,
            vec![
                Violation::at("price", "Expected number, received string"),
                Violation::at("inStock", "Expected boolean, received string"),
            ]
        );
    }

    #[test]
    fn null_is_not_missing() {
        let raw = json!({ "name": null, "description": "x", "price": 1, "inStock": false });
        let err = SchemaValidator::new().validate(&product_shape(), &raw).unwrap_err();
        assert_eq!(err, vec![Violation::at("name", "Expected string, received null")]);
    }

    #[test]
    fn non_object_root_is_a_root_violation() {
        let err = SchemaValidator::new()
            .validate(&product_shape(), &json!([1, 2]))
            .unwrap_err();
        assert_eq!(err, vec![Violation::root("Expected object, received array")]);
    }

    #[test]
    fn nested_paths_are_dotted() {
        let shape = Shape::new()
            .field(
                "dimensions",
                Field::object(
                    Shape::new()
                        .field("width", Field::number().min(0.0))
                        .field("height", Field::number()),
                ),
            )
            .field("tags", Field::array(Field::string().min_len(1)));
        let raw = json!({ "dimensions": { "width": -1 }, "tags": ["ok", ""] });
        let err = SchemaValidator::new().validate(&shape, &raw).unwrap_err();
        assert_eq!(
            err,
            vec![
                Violation::at("dimensions.width", "Number must be greater than or equal to 0"),
                Violation::at("dimensions.height", REQUIRED),
                Violation::at("tags.1", "String must contain at least 1 character(s)"),
            ]
        );
    }

    #[test]
    fn optional_field_is_omitted() {
        let shape = Shape::new().field("note", Field::string().optional());
        let value = SchemaValidator::new().validate(&shape, &json!({})).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn refinement_runs_after_type_check() {
        let shape = Shape::new().field(
            "sku",
            Field::string().refine(
                |v| v.as_str().is_some_and(|s| s.starts_with("SKU-")),
                "Invalid SKU",
            ),
        );
        let validator = SchemaValidator::new();
        assert_eq!(
            validator.validate(&shape, &json!({ "sku": "ABC" })).unwrap_err(),
            vec![Violation::at("sku", "Invalid SKU")]
        );
        assert_eq!(
            validator.validate(&shape, &json!({ "sku": 7 })).unwrap_err(),
            vec![Violation::at("sku", "Expected string, received number")]
        );
    }

    #[test]
    fn boolean_coercion() {
        let shape = Shape::new().field("flag", Field::boolean().coerce());
        let validator = SchemaValidator::new();
        assert_eq!(
            validator.validate(&shape, &json!({ "flag": "1" })).unwrap(),
            json!({ "flag": true })
        );
        assert_eq!(
            validator.validate(&shape, &json!({ "flag": "maybe" })).unwrap_err(),
            vec![Violation::at("flag", "Expected boolean, received string")]
        );
    }

    proptest! {
        #[test]
        fn validation_is_idempotent(page in ".{0,6}", limit in ".{0,6}") {
            let raw = json!({ "page": page, "limit": limit });
            let validator = SchemaValidator::new();
            let first = validator.validate(&page_shape(), &raw);
            let second = validator.validate(&page_shape(), &raw);
            prop_assert_eq!(first, second);
        }
    }
}
