//! # Product Resource Types
//!
//! Wire types for `/api/products` and the shapes they are validated
//! against. JSON field names are camelCase.

use catalog_core::{DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT, MAX_PAGE};
use catalog_schema::{Field, Schema, Shape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub in_stock: bool,
}

impl Product {
    /// Assign a fresh id to `draft`.
    pub fn from_draft(draft: NewProduct) -> Self {
        Self::with_id(Uuid::new_v4(), draft)
    }

    pub fn with_id(id: Uuid, draft: NewProduct) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            in_stock: draft.in_stock,
        }
    }
}

/// Body of `POST /api/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub in_stock: bool,
}

impl Schema for NewProduct {
    fn shape() -> Option<Shape> {
        Some(
            Shape::new()
                .field("name", Field::string())
                .field("description", Field::string())
                .field("price", Field::number())
                .field("inStock", Field::boolean()),
        )
    }
}

/// Path of `GET /api/products/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProductParams {
    pub id: Uuid,
}

impl Schema for ProductParams {
    fn shape() -> Option<Shape> {
        Some(Shape::new().field(
            "id",
            Field::string().refine(
                |value| value.as_str().is_some_and(|s| Uuid::parse_str(s).is_ok()),
                "Invalid product id",
            ),
        ))
    }
}

/// Query of paginated listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl Schema for PageQuery {
    fn shape() -> Option<Shape> {
        Some(
            Shape::new()
                .field(
                    "page",
                    Field::number()
                        .coerce()
                        .int()
                        .min(1.0)
                        .max(f64::from(MAX_PAGE))
                        .default(DEFAULT_PAGE),
                )
                .field(
                    "limit",
                    Field::number()
                        .coerce()
                        .int()
                        .min(1.0)
                        .max(f64::from(MAX_LIMIT))
                        .default(DEFAULT_LIMIT),
                ),
        )
    }
}
