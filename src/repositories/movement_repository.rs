use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryOrder,
};
use std::sync::Arc;

use crate::entities::inventory_transaction::{Column, Entity as Movement, Model as MovementModel};
use crate::errors::AppError;
use crate::repositories::{BaseRepository, Repository};

/// Append-only log of goods movements.
#[async_trait]
pub trait MovementLogStore: Send + Sync {
    /// Inserts `movement` inside the caller's transaction.
    async fn append(
        &self,
        txn: &DatabaseTransaction,
        movement: &MovementModel,
    ) -> Result<(), AppError>;

    async fn find(&self, movement_id: &str) -> Result<Option<MovementModel>, AppError>;

    /// Returns whether a record with that id existed.
    async fn delete(&self, movement_id: &str) -> Result<bool, AppError>;

    /// One page of movements, newest first, with the total count.
    async fn list(&self, page: u64, limit: u64) -> Result<(Vec<MovementModel>, u64), AppError>;
}

/// sea-orm backed log over the `inventory_transactions` table
#[derive(Debug, Clone)]
pub struct MovementRepository {
    base: BaseRepository,
}

impl MovementRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl MovementLogStore for MovementRepository {
    async fn append(
        &self,
        txn: &DatabaseTransaction,
        movement: &MovementModel,
    ) -> Result<(), AppError> {
        movement
            .clone()
            .into_active_model()
            .reset_all()
            .insert(txn)
            .await
            .map(|_| ())
            .map_err(AppError::DatabaseError)
    }

    async fn find(&self, movement_id: &str) -> Result<Option<MovementModel>, AppError> {
        Movement::find_by_id(movement_id.to_string())
            .one(self.base.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }

    async fn delete(&self, movement_id: &str) -> Result<bool, AppError> {
        let result = Movement::delete_by_id(movement_id.to_string())
            .exec(self.base.get_db())
            .await
            .map_err(AppError::DatabaseError)?;
        Ok(result.rows_affected > 0)
    }

    async fn list(&self, page: u64, limit: u64) -> Result<(Vec<MovementModel>, u64), AppError> {
        let paginator = Movement::find()
            .order_by_desc(Column::TransactionDate)
            .order_by_desc(Column::TransactionId)
            .paginate(self.base.get_db(), limit);

        let total = paginator.num_items().await.map_err(AppError::DatabaseError)?;
        let movements = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(AppError::DatabaseError)?;

        Ok((movements, total))
    }
}
