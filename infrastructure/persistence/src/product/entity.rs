use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use business::domain::product::model::Product;
use business::domain::product::value_objects::Price;

/// Column list matching `ProductEntity`, in declaration order.
pub const PRODUCT_COLUMNS: &str =
    "id, name, image, price, qty, out_of_stock, created_at, updated_at";

#[derive(Error, Debug)]
pub enum EntityError {
    #[error("entity.decode: {0}")]
    Decode(#[from] sqlx::Error),
    #[error("entity.negative_quantity: {0}")]
    NegativeQuantity(i32),
    #[error("entity.invalid_price: {0}")]
    InvalidPrice(BigDecimal),
}

#[derive(Debug, FromRow)]
pub struct ProductEntity {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub price: BigDecimal,
    pub qty: i32,
    pub out_of_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductEntity {
    pub fn into_domain(self) -> Result<Product, EntityError> {
        let qty = u32::try_from(self.qty).map_err(|_| EntityError::NegativeQuantity(self.qty))?;
        let price =
            Price::new(self.price.clone()).map_err(|_| EntityError::InvalidPrice(self.price))?;

        Ok(Product::from_repository(
            self.id,
            self.name,
            self.image,
            price,
            qty,
            self.out_of_stock,
            self.created_at,
            self.updated_at,
        ))
    }
}
