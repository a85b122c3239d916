use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::EntityId,
    error::ValidationResult,
    protocol::ProductViewModel,
};
use storage::Product;

use crate::{Mapper, Validator};

pub const MAX_NAME_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductMapper;

impl Mapper<Product, ProductViewModel> for ProductMapper {
    fn to_view(&self, product: Product) -> anyhow::Result<ProductViewModel> {
        Ok(ProductViewModel {
            id: Some(product.id),
            name: product.name,
            description: product.description,
            price: Some(product.price),
        })
    }

    // Timestamps are owned by the store; the values set here are placeholders.
    fn to_entity(&self, view: ProductViewModel) -> anyhow::Result<Product> {
        let price = view
            .price
            .ok_or_else(|| anyhow!("product view model has no price"))?;
        let now = Utc::now();
        Ok(Product {
            id: view.id.unwrap_or_else(EntityId::new),
            name: view.name,
            description: view.description,
            price,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductValidator;

#[async_trait]
impl Validator<ProductViewModel> for ProductValidator {
    async fn validate(&self, view: &ProductViewModel) -> ValidationResult {
        let mut result = ValidationResult::valid();

        if view.name.trim().is_empty() {
            result.push("name", "required");
        } else if view.name.chars().count() > MAX_NAME_CHARS {
            result.push(
                "name",
                format!("must be at most {MAX_NAME_CHARS} characters"),
            );
        }

        if let Some(description) = &view.description {
            if description.chars().count() > MAX_DESCRIPTION_CHARS {
                result.push(
                    "description",
                    format!("must be at most {MAX_DESCRIPTION_CHARS} characters"),
                );
            }
        }

        match view.price {
            None => result.push("price", "required"),
            Some(price) if !price.is_finite() || price < 0.0 => {
                result.push("price", "must be a non-negative number")
            }
            Some(_) => {}
        }

        result
    }
}

#[cfg(test)]
#[path = "tests/product_tests.rs"]
mod tests;
