use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, Select};
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub brand: String,
    pub image_url: String,

    #[sea_orm(has_many, via = "product_size")]
    pub sizes: HasMany<super::size::Entity>,

    #[sea_orm(has_many)]
    pub try_ons: HasMany<super::try_on::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    pub deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
}

impl Entity {
    /// Products that have not been soft-deleted.
    pub fn find_live() -> Select<Entity> {
        Self::find().filter(Column::Deleted.eq(false))
    }
}

impl ActiveModelBehavior for ActiveModel {}
