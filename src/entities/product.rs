use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Catalog status of a product. Values are stored verbatim.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ProductStatus {
    #[sea_orm(string_value = "Available")]
    #[serde(rename = "Available")]
    #[strum(serialize = "Available")]
    Available,
    #[sea_orm(string_value = "Out of Stock")]
    #[serde(rename = "Out of Stock")]
    #[strum(serialize = "Out of Stock")]
    OutOfStock,
    #[sea_orm(string_value = "Discontinued")]
    #[serde(rename = "Discontinued")]
    #[strum(serialize = "Discontinued")]
    Discontinued,
    #[sea_orm(string_value = "Pre-Order")]
    #[serde(rename = "Pre-Order")]
    #[strum(serialize = "Pre-Order")]
    PreOrder,
    #[sea_orm(string_value = "Back-Ordered")]
    #[serde(rename = "Back-Ordered")]
    #[strum(serialize = "Back-Ordered")]
    BackOrdered,
    #[sea_orm(string_value = "Reserved")]
    #[serde(rename = "Reserved")]
    #[strum(serialize = "Reserved")]
    Reserved,
    #[sea_orm(string_value = "On Sale")]
    #[serde(rename = "On Sale")]
    #[strum(serialize = "On Sale")]
    OnSale,
    #[sea_orm(string_value = "New Arrival")]
    #[serde(rename = "New Arrival")]
    #[strum(serialize = "New Arrival")]
    NewArrival,
    #[sea_orm(string_value = "Damaged")]
    #[serde(rename = "Damaged")]
    #[strum(serialize = "Damaged")]
    Damaged,
    #[sea_orm(string_value = "Pending")]
    #[serde(rename = "Pending")]
    #[strum(serialize = "Pending")]
    Pending,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: String,
    pub product_name: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount: Decimal,
    pub plant_type: Option<String>,
    pub unit: Option<String>,
    pub image_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: ProductStatus,
    pub category_id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::CategoryId"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::SupplierId"
    )]
    Supplier,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }
        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_display_names() {
        assert_eq!(ProductStatus::OutOfStock.to_string(), "Out of Stock");
        assert_eq!(
            ProductStatus::from_str("Back-Ordered").unwrap(),
            ProductStatus::BackOrdered
        );
        assert!(ProductStatus::from_str("Sold Out").is_err());
    }
}
