use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_size")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub product_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub size_id: Uuid,
    #[sea_orm(belongs_to, from = "product_id", to = "id")]
    pub product: Option<super::product::Entity>,
    #[sea_orm(belongs_to, from = "size_id", to = "id")]
    pub size: Option<super::size::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
