pub mod categories;
pub mod common;
pub mod health;
pub mod movements;
pub mod products;
pub mod stock_levels;
pub mod suppliers;
pub mod warehouses;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::repositories::{MovementRepository, StockLedgerRepository, StockLedgerStore};
use crate::services::{
    categories::CategoryService, ledger_reconciliation::LedgerReconciliationService,
    products::ProductService, stock_levels::StockLevelService, suppliers::SupplierService,
    warehouses::WarehouseService,
};
use std::sync::Arc;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub ledger: Arc<LedgerReconciliationService>,
    pub stock_levels: Arc<StockLevelService>,
    pub categories: Arc<CategoryService>,
    pub suppliers: Arc<SupplierService>,
    pub warehouses: Arc<WarehouseService>,
    pub products: Arc<ProductService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        let ledger_store: Arc<dyn StockLedgerStore> =
            Arc::new(StockLedgerRepository::new(db_pool.clone()));
        let movement_store = Arc::new(MovementRepository::new(db_pool.clone()));

        Self {
            ledger: Arc::new(LedgerReconciliationService::new(
                db_pool.clone(),
                ledger_store.clone(),
                movement_store,
                event_sender,
            )),
            stock_levels: Arc::new(StockLevelService::new(ledger_store)),
            categories: Arc::new(CategoryService::new(db_pool.clone())),
            suppliers: Arc::new(SupplierService::new(db_pool.clone())),
            warehouses: Arc::new(WarehouseService::new(db_pool.clone())),
            products: Arc::new(ProductService::new(db_pool)),
        }
    }
}
