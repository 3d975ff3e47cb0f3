//! sea-orm entities for the catalog, the stock ledger and the movement log.

pub mod category;
pub mod inventory_transaction;
pub mod product;
pub mod product_warehouse;
pub mod supplier;
pub mod warehouse;

pub use inventory_transaction::MovementKind;
pub use product::ProductStatus;
