use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a goods movement, stored and serialized as "in" / "out".
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum MovementKind {
    /// Goods receipt: stock comes into the warehouse.
    #[sea_orm(string_value = "in")]
    #[serde(rename = "in")]
    #[strum(serialize = "in")]
    Receipt,
    /// Goods issue: stock leaves the warehouse.
    #[sea_orm(string_value = "out")]
    #[serde(rename = "out")]
    #[strum(serialize = "out")]
    Issue,
}

/// An immutable movement record. Written only by the reconciliation engine.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_id: String,
    pub product_id: String,
    pub warehouse_id: i32,
    /// Always non-negative; the direction lives in `transaction_type`.
    pub quantity: i32,
    pub transaction_type: MovementKind,
    pub transaction_date: DateTimeUtc,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
