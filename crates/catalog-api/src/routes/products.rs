//! # Products API
//!
//! ## Endpoints
//!
//! - `POST /api/products` — create a product
//! - `GET /api/products?page&limit` — list products, paginated
//! - `GET /api/products/{id}` — get one product

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use catalog_core::{AppError, PageWindow};

use crate::envelope::Reply;
use crate::extractors::Validated;
use crate::invoke::Failure;
use crate::product::{NewProduct, PageQuery, Product, ProductParams};
use crate::state::AppState;

// ── Router ──────────────────────────────────────────────────────────

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route("/api/products/{id}", get(get_product))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /api/products — Create a product.
async fn create_product(
    State(state): State<AppState>,
    req: Validated<(), NewProduct>,
) -> Result<Reply<Product>, Failure> {
    let product = state.products.insert(req.body).await.map_err(|err| {
        tracing::error!(error = ?err, "product insert failed");
        AppError::internal("Failed to create the product").expose()
    })?;
    Ok(Reply::created(product).message("Product created successfully"))
}

/// GET /api/products — List one page of products.
async fn list_products(
    State(state): State<AppState>,
    req: Validated<(), (), PageQuery>,
) -> Result<Reply<Vec<Product>>, Failure> {
    let PageQuery { page, limit } = req.query;
    let window = PageWindow::for_page(page, limit);

    let (items, total) = tokio::try_join!(
        state.products.slice(window.offset, window.limit()),
        state.products.count(),
    )?;

    Ok(Reply::ok(items)
        .message("Products fetched successfully")
        .paginated(window.with_total(total).meta))
}

/// GET /api/products/{id} — Get a single product.
async fn get_product(
    State(state): State<AppState>,
    req: Validated<ProductParams>,
) -> Result<Reply<Product>, Failure> {
    let id = req.params.id;
    let mut found = state.products.find_by_id(id).await?;
    if found.len() > 1 {
        return Err(AppError::unprocessable(format!(
            "Multiple products with id {id} have been found"
        ))
        .into());
    }
    let product = found
        .pop()
        .ok_or_else(|| AppError::not_found(format!("Product with id {id} not found")))?;
    Ok(Reply::ok(product).message("Product fetched successfully"))
}
