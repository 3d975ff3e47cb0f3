use crate::{
    common::PageRequest,
    db::DbPool,
    entities::supplier::{self, Entity as Supplier, Model as SupplierModel},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SupplierInput {
    #[validate(length(min = 1, max = 255, message = "supplier name is required"))]
    pub supplier_name: String,
    #[validate(length(max = 32))]
    pub contact_phone: Option<String>,
    #[validate(email(message = "contact email is not a valid email address"))]
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplierInput {
    #[validate(length(min = 1, max = 255, message = "supplier name must not be empty"))]
    pub supplier_name: Option<String>,
    #[validate(length(max = 32))]
    pub contact_phone: Option<String>,
    #[validate(email(message = "contact email is not a valid email address"))]
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// Service for managing suppliers
#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DbPool>,
}

impl SupplierService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Creates a new supplier
    #[instrument(skip(self))]
    pub async fn create_supplier(&self, input: SupplierInput) -> Result<SupplierModel, ServiceError> {
        let supplier = supplier::ActiveModel {
            supplier_name: Set(input.supplier_name),
            contact_phone: Set(input.contact_phone),
            contact_email: Set(input.contact_email),
            address: Set(input.address),
            city: Set(input.city),
            country: Set(input.country),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(supplier_id = supplier.supplier_id, "supplier created");
        Ok(supplier)
    }

    #[instrument(skip(self))]
    pub async fn get_supplier(&self, supplier_id: i32) -> Result<SupplierModel, ServiceError> {
        Supplier::find_by_id(supplier_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("supplier {} not found", supplier_id)))
    }

    /// Lists suppliers, most recently created first
    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<SupplierModel>, u64), ServiceError> {
        let paginator = Supplier::find()
            .order_by_desc(supplier::Column::CreatedAt)
            .order_by_desc(supplier::Column::SupplierId)
            .paginate(self.db.as_ref(), page.limit);

        let total = paginator.num_items().await?;
        let suppliers = paginator.fetch_page(page.index()).await?;
        Ok((suppliers, total))
    }

    /// Updates an existing supplier
    #[instrument(skip(self))]
    pub async fn update_supplier(
        &self,
        supplier_id: i32,
        input: UpdateSupplierInput,
    ) -> Result<SupplierModel, ServiceError> {
        let mut active: supplier::ActiveModel = self.get_supplier(supplier_id).await?.into();

        if let Some(name) = input.supplier_name {
            active.supplier_name = Set(name);
        }
        if let Some(phone) = input.contact_phone {
            active.contact_phone = Set(Some(phone));
        }
        if let Some(email) = input.contact_email {
            active.contact_email = Set(Some(email));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        if let Some(city) = input.city {
            active.city = Set(Some(city));
        }
        if let Some(country) = input.country {
            active.country = Set(Some(country));
        }

        Ok(active.update(self.db.as_ref()).await?)
    }

    /// Deletes a supplier
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, supplier_id: i32) -> Result<(), ServiceError> {
        let result = Supplier::delete_by_id(supplier_id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "supplier {} not found",
                supplier_id
            )));
        }
        info!(supplier_id, "supplier deleted");
        Ok(())
    }
}
