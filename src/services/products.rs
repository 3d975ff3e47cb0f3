use crate::{
    common::{new_product_code, PageRequest},
    db::DbPool,
    entities::{
        category::Entity as Category,
        product::{self, Entity as Product, Model as ProductModel},
        supplier::Entity as Supplier,
        ProductStatus,
    },
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("must_not_be_negative"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ProductInput {
    /// Generated from the product name when omitted.
    #[validate(length(max = 64))]
    pub product_id: Option<String>,
    #[validate(length(min = 1, max = 255, message = "product name is required"))]
    pub product_name: String,
    #[validate(custom = "validate_non_negative")]
    pub price: Decimal,
    #[serde(default)]
    #[validate(custom = "validate_non_negative")]
    pub discount: Decimal,
    pub plant_type: Option<String>,
    pub unit: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub description: Option<String>,
    /// One of the catalog status names; defaults to "Available".
    pub status: Option<String>,
    pub category_id: Option<i32>,
    pub supplier_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 255, message = "product name must not be empty"))]
    pub product_name: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub price: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub discount: Option<Decimal>,
    pub plant_type: Option<String>,
    pub unit: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub category_id: Option<i32>,
    pub supplier_id: Option<i32>,
}

fn parse_status(status: &str) -> Result<ProductStatus, ServiceError> {
    ProductStatus::from_str(status)
        .map_err(|_| ServiceError::ValidationError(format!("unknown product status: {}", status)))
}

/// Product catalog service
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Create a new product
    #[instrument(skip(self))]
    pub async fn create_product(&self, input: ProductInput) -> Result<ProductModel, ServiceError> {
        let status = match input.status.as_deref() {
            Some(status) => parse_status(status)?,
            None => ProductStatus::Available,
        };
        self.ensure_references(input.category_id, input.supplier_id)
            .await?;

        let product_id = match input.product_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => new_product_code(&input.product_name),
        };
        if Product::find_by_id(product_id.clone())
            .one(self.db.as_ref())
            .await?
            .is_some()
        {
            return Err(ServiceError::BadRequest(format!(
                "product {} already exists",
                product_id
            )));
        }

        let product = product::ActiveModel {
            product_id: Set(product_id),
            product_name: Set(input.product_name),
            price: Set(input.price),
            discount: Set(input.discount),
            plant_type: Set(input.plant_type),
            unit: Set(input.unit),
            image_url: Set(input.image_url),
            description: Set(input.description),
            status: Set(status),
            category_id: Set(input.category_id),
            supplier_id: Set(input.supplier_id),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(product_id = %product.product_id, "product created");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: &str) -> Result<ProductModel, ServiceError> {
        Product::find_by_id(product_id.to_string())
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {} not found", product_id)))
    }

    /// Lists products, most recently created first
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<ProductModel>, u64), ServiceError> {
        let paginator = Product::find()
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::ProductId)
            .paginate(self.db.as_ref(), page.limit);

        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page.index()).await?;
        Ok((products, total))
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        product_id: &str,
        input: UpdateProductInput,
    ) -> Result<ProductModel, ServiceError> {
        let status = input.status.as_deref().map(parse_status).transpose()?;
        self.ensure_references(input.category_id, input.supplier_id)
            .await?;

        let mut active: product::ActiveModel = self.get_product(product_id).await?.into();

        if let Some(name) = input.product_name {
            active.product_name = Set(name);
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(discount) = input.discount {
            active.discount = Set(discount);
        }
        if let Some(plant_type) = input.plant_type {
            active.plant_type = Set(Some(plant_type));
        }
        if let Some(unit) = input.unit {
            active.unit = Set(Some(unit));
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(Some(image_url));
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(status) = status {
            active.status = Set(status);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(supplier_id) = input.supplier_id {
            active.supplier_id = Set(Some(supplier_id));
        }

        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: &str) -> Result<(), ServiceError> {
        let result = Product::delete_by_id(product_id.to_string())
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "product {} not found",
                product_id
            )));
        }
        info!(product_id, "product deleted");
        Ok(())
    }

    async fn ensure_references(
        &self,
        category_id: Option<i32>,
        supplier_id: Option<i32>,
    ) -> Result<(), ServiceError> {
        if let Some(category_id) = category_id {
            if Category::find_by_id(category_id)
                .one(self.db.as_ref())
                .await?
                .is_none()
            {
                return Err(ServiceError::ValidationError(format!(
                    "category {} does not exist",
                    category_id
                )));
            }
        }
        if let Some(supplier_id) = supplier_id {
            if Supplier::find_by_id(supplier_id)
                .one(self.db.as_ref())
                .await?
                .is_none()
            {
                return Err(ServiceError::ValidationError(format!(
                    "supplier {} does not exist",
                    supplier_id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    #[rstest]
    #[case("Available", ProductStatus::Available)]
    #[case("Out of Stock", ProductStatus::OutOfStock)]
    #[case("New Arrival", ProductStatus::NewArrival)]
    fn known_statuses_parse(#[case] raw: &str, #[case] expected: ProductStatus) {
        assert_eq!(parse_status(raw).unwrap(), expected);
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        assert_matches!(parse_status("Sold"), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn negative_prices_fail_validation() {
        let input = ProductInput {
            product_id: None,
            product_name: "Hoa Dao".into(),
            price: Decimal::new(-100, 2),
            discount: Decimal::ZERO,
            plant_type: None,
            unit: None,
            image_url: None,
            description: None,
            status: None,
            category_id: None,
            supplier_id: None,
        };
        assert!(input.validate().is_err());

        let input = ProductInput {
            price: Decimal::new(15000, 2),
            ..input
        };
        assert!(input.validate().is_ok());
    }
}
