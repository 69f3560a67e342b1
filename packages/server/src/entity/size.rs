use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, Select};
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "size")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub name: String, // e.g. "M", "42"

    #[sea_orm(has_many, via = "product_size")]
    pub products: HasMany<super::product::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    pub deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
}

impl Entity {
    pub fn find_live() -> Select<Entity> {
        Self::find().filter(Column::Deleted.eq(false))
    }
}

impl ActiveModelBehavior for ActiveModel {}
