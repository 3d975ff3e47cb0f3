use crate::{
    common::PageRequest,
    db::DbPool,
    entities::category::{self, Entity as Category, Model as CategoryModel},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 255, message = "category name is required"))]
    pub category_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, max = 255, message = "category name must not be empty"))]
    pub category_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DbPool>,
}

impl CategoryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn create_category(&self, input: CategoryInput) -> Result<CategoryModel, ServiceError> {
        let category = category::ActiveModel {
            category_name: Set(input.category_name),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(category_id = category.category_id, "category created");
        Ok(category)
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, category_id: i32) -> Result<CategoryModel, ServiceError> {
        Category::find_by_id(category_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("category {} not found", category_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<CategoryModel>, u64), ServiceError> {
        let paginator = Category::find()
            .order_by_asc(category::Column::CategoryId)
            .paginate(self.db.as_ref(), page.limit);

        let total = paginator.num_items().await?;
        let categories = paginator.fetch_page(page.index()).await?;
        Ok((categories, total))
    }

    #[instrument(skip(self))]
    pub async fn update_category(
        &self,
        category_id: i32,
        input: UpdateCategoryInput,
    ) -> Result<CategoryModel, ServiceError> {
        let mut active: category::ActiveModel = self.get_category(category_id).await?.into();

        if let Some(name) = input.category_name {
            active.category_name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }

        Ok(active.update(self.db.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, category_id: i32) -> Result<(), ServiceError> {
        let result = Category::delete_by_id(category_id)
            .exec(self.db.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "category {} not found",
                category_id
            )));
        }
        info!(category_id, "category deleted");
        Ok(())
    }
}
