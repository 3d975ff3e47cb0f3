use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::debug;

use crate::entities::product_warehouse::{
    ActiveModel as LedgerActiveModel, Column, Entity as ProductWarehouse, Model as LedgerRow,
};
use crate::errors::AppError;
use crate::repositories::{BaseRepository, Repository};

/// Per-(product, warehouse) running stock totals.
///
/// `increment` and `decrement` only ever run inside the caller's
/// transaction. `decrement` refuses to take a row below zero.
#[async_trait]
pub trait StockLedgerStore: Send + Sync {
    async fn find(&self, product_id: &str, warehouse_id: i32)
        -> Result<Option<LedgerRow>, AppError>;

    /// Creates a zero-quantity row if none exists. Idempotent.
    async fn provision(&self, product_id: &str, warehouse_id: i32) -> Result<(), AppError>;

    async fn increment(
        &self,
        txn: &DatabaseTransaction,
        product_id: &str,
        warehouse_id: i32,
        quantity: i32,
    ) -> Result<(), AppError>;

    async fn decrement(
        &self,
        txn: &DatabaseTransaction,
        product_id: &str,
        warehouse_id: i32,
        quantity: i32,
    ) -> Result<(), AppError>;

    /// One page of rows, most recently updated first, with the total row count.
    async fn list(&self, page: u64, limit: u64) -> Result<(Vec<LedgerRow>, u64), AppError>;
}

/// sea-orm backed ledger over the `product_warehouse` table
#[derive(Debug, Clone)]
pub struct StockLedgerRepository {
    base: BaseRepository,
}

impl StockLedgerRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

fn missing_row(product_id: &str, warehouse_id: i32) -> AppError {
    AppError::NotFound(format!(
        "no stock entry for product {} in warehouse {}",
        product_id, warehouse_id
    ))
}

#[async_trait]
impl StockLedgerStore for StockLedgerRepository {
    async fn find(
        &self,
        product_id: &str,
        warehouse_id: i32,
    ) -> Result<Option<LedgerRow>, AppError> {
        ProductWarehouse::find_by_id((product_id.to_string(), warehouse_id))
            .one(self.base.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }

    async fn provision(&self, product_id: &str, warehouse_id: i32) -> Result<(), AppError> {
        let row = LedgerActiveModel {
            product_id: Set(product_id.to_string()),
            warehouse_id: Set(warehouse_id),
            quantity: Set(0),
            last_updated: Set(Utc::now()),
        };

        // A concurrent provisioner may win the insert; that is fine.
        let inserted = ProductWarehouse::insert(row)
            .on_conflict(
                OnConflict::columns([Column::ProductId, Column::WarehouseId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.base.get_db())
            .await
            .map_err(AppError::DatabaseError)?;

        debug!(product_id, warehouse_id, inserted, "stock ledger row provisioned");
        Ok(())
    }

    async fn increment(
        &self,
        txn: &DatabaseTransaction,
        product_id: &str,
        warehouse_id: i32,
        quantity: i32,
    ) -> Result<(), AppError> {
        let result = ProductWarehouse::update_many()
            .col_expr(Column::Quantity, Expr::col(Column::Quantity).add(quantity))
            .col_expr(Column::LastUpdated, Expr::value(Utc::now()))
            .filter(Column::ProductId.eq(product_id))
            .filter(Column::WarehouseId.eq(warehouse_id))
            .exec(txn)
            .await
            .map_err(AppError::DatabaseError)?;

        if result.rows_affected == 0 {
            return Err(missing_row(product_id, warehouse_id));
        }
        Ok(())
    }

    async fn decrement(
        &self,
        txn: &DatabaseTransaction,
        product_id: &str,
        warehouse_id: i32,
        quantity: i32,
    ) -> Result<(), AppError> {
        let result = ProductWarehouse::update_many()
            .col_expr(Column::Quantity, Expr::col(Column::Quantity).sub(quantity))
            .col_expr(Column::LastUpdated, Expr::value(Utc::now()))
            .filter(Column::ProductId.eq(product_id))
            .filter(Column::WarehouseId.eq(warehouse_id))
            .filter(Column::Quantity.gte(quantity))
            .exec(txn)
            .await
            .map_err(AppError::DatabaseError)?;

        if result.rows_affected > 0 {
            return Ok(());
        }

        // Nothing matched: either the row vanished or another issue drained it
        // after the caller's pre-check.
        let current = ProductWarehouse::find_by_id((product_id.to_string(), warehouse_id))
            .one(txn)
            .await
            .map_err(AppError::DatabaseError)?;

        Err(match current {
            Some(row) => AppError::InsufficientStock {
                requested: quantity,
                available: row.quantity,
            },
            None => missing_row(product_id, warehouse_id),
        })
    }

    async fn list(&self, page: u64, limit: u64) -> Result<(Vec<LedgerRow>, u64), AppError> {
        let paginator = ProductWarehouse::find()
            .order_by_desc(Column::LastUpdated)
            .order_by_asc(Column::ProductId)
            .order_by_asc(Column::WarehouseId)
            .paginate(self.base.get_db(), limit);

        let total = paginator.num_items().await.map_err(AppError::DatabaseError)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(AppError::DatabaseError)?;

        Ok((rows, total))
    }
}
