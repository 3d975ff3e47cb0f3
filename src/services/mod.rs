// Stock ledger
pub mod ledger_reconciliation;
pub mod stock_levels;

// Catalog
pub mod categories;
pub mod products;
pub mod suppliers;
pub mod warehouses;
