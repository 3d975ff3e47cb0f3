use crate::{
    common::PageRequest,
    entities::product_warehouse::Model as StockLevel,
    errors::ServiceError,
    repositories::StockLedgerStore,
};
use std::sync::Arc;
use tracing::instrument;

/// Read-only view over the stock ledger. Quantities only change through
/// recorded movements.
#[derive(Clone)]
pub struct StockLevelService {
    ledger: Arc<dyn StockLedgerStore>,
}

impl StockLevelService {
    pub fn new(ledger: Arc<dyn StockLedgerStore>) -> Self {
        Self { ledger }
    }

    #[instrument(skip(self))]
    pub async fn get_stock_level(
        &self,
        product_id: &str,
        warehouse_id: i32,
    ) -> Result<StockLevel, ServiceError> {
        self.ledger
            .find(product_id, warehouse_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no stock entry for product {} in warehouse {}",
                    product_id, warehouse_id
                ))
            })
    }

    /// Most recently updated entries first.
    #[instrument(skip(self))]
    pub async fn list_stock_levels(
        &self,
        page: PageRequest,
    ) -> Result<(Vec<StockLevel>, u64), ServiceError> {
        self.ledger.list(page.page, page.limit).await
    }
}
