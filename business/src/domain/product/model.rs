use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::Price;

/// Canonical catalog entry as persisted by the store and mirrored into the cache.
///
/// `out_of_stock` is derived by the store from `qty`; callers never set it on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub price: Price,
    pub qty: u32,
    pub out_of_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Constructor for data already persisted in the repository (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn from_repository(
        id: Uuid,
        name: String,
        image: Option<String>,
        price: Price,
        qty: u32,
        out_of_stock: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            image,
            price,
            qty,
            out_of_stock,
            created_at,
            updated_at,
        }
    }
}

/// A validated upload row, ready to be upserted by `name`.
///
/// `id` is only a proposal: when `name` already exists the stored id wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub price: Price,
    pub qty: u32,
}
