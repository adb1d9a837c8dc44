//! # Product Repository
//!
//! The collaborator product handlers talk to. Handlers see only the
//! [`ProductRepository`] trait; the in-memory [`Store`] is the default
//! implementation. Failures are untyped (`anyhow`) and surface to clients
//! as masked 500s unless a handler maps them to something deliberate.

use async_trait::async_trait;
use uuid::Uuid;

use crate::product::{NewProduct, Product};
use crate::state::Store;

#[async_trait]
pub trait ProductRepository: Send + Sync + std::fmt::Debug {
    /// Number of stored products.
    async fn count(&self) -> anyhow::Result<u64>;

    /// Up to `limit` products in insertion order, skipping `offset`.
    async fn slice(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<Product>>;

    /// Store a new product under a fresh id.
    async fn insert(&self, draft: NewProduct) -> anyhow::Result<Product>;

    /// Every product stored under `id`. More than one means the store is
    /// inconsistent.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Vec<Product>>;
}

#[async_trait]
impl ProductRepository for Store<Product> {
    async fn count(&self) -> anyhow::Result<u64> {
        Ok(Store::len(self) as u64)
    }

    async fn slice(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<Product>> {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(Store::slice(self, offset, limit))
    }

    async fn insert(&self, draft: NewProduct) -> anyhow::Result<Product> {
        let product = Product::from_draft(draft);
        Store::insert(self, product.id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Vec<Product>> {
        Ok(Store::find(self, &id))
    }
}
