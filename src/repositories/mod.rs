//! Store contracts used by the reconciliation engine, with their sea-orm
//! adapters.
//!
//! Writes take the caller's `DatabaseTransaction` so that the movement
//! append and the ledger adjustment commit or roll back together.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod movement_repository;
pub mod stock_ledger_repository;

pub use movement_repository::{MovementLogStore, MovementRepository};
pub use stock_ledger_repository::{StockLedgerRepository, StockLedgerStore};

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
