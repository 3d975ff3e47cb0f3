use crate::{
    common::PageRequest,
    db::DbPool,
    entities::warehouse::{self, Entity as Warehouse, Model as WarehouseModel},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct WarehouseInput {
    #[validate(length(min = 1, max = 255, message = "warehouse name is required"))]
    pub warehouse_name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateWarehouseInput {
    #[validate(length(min = 1, max = 255, message = "warehouse name must not be empty"))]
    pub warehouse_name: Option<String>,
    pub location: Option<String>,
}

/// Warehouses that stock entries and movements refer to by id.
#[derive(Clone)]
pub struct WarehouseService {
    db: Arc<DbPool>,
}

impl WarehouseService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_warehouse(
        &self,
        input: WarehouseInput,
    ) -> Result<WarehouseModel, ServiceError> {
        let warehouse = warehouse::ActiveModel {
            warehouse_name: Set(input.warehouse_name),
            location: Set(input.location),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(warehouse_id = warehouse.warehouse_id, "warehouse created");
        Ok(warehouse)
    }

    #[instrument(skip(self))]
    pub async fn get_warehouse(&self, warehouse_id: i32) -> Result<WarehouseModel, ServiceError> {
        Warehouse::find_by_id(warehouse_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("warehouse {} not found", warehouse_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_warehouses(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<WarehouseModel>, u64), ServiceError> {
        let paginator = Warehouse::find()
            .order_by_asc(warehouse::Column::WarehouseId)
            .paginate(self.db.as_ref(), page.limit);

        let total = paginator.num_items().await?;
        let warehouses = paginator.fetch_page(page.index()).await?;
        Ok((warehouses, total))
    }

    #[instrument(skip(self))]
    pub async fn update_warehouse(
        &self,
        warehouse_id: i32,
        input: UpdateWarehouseInput,
    ) -> Result<WarehouseModel, ServiceError> {
        let mut active: warehouse::ActiveModel = self.get_warehouse(warehouse_id).await?.into();

        if let Some(name) = input.warehouse_name {
            active.warehouse_name = Set(name);
        }
        if let Some(location) = input.location {
            active.location = Set(Some(location));
        }

        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_warehouse(&self, warehouse_id: i32) -> Result<(), ServiceError> {
        let result = Warehouse::delete_by_id(warehouse_id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "warehouse {} not found",
                warehouse_id
            )));
        }
        info!(warehouse_id, "warehouse deleted");
        Ok(())
    }
}
