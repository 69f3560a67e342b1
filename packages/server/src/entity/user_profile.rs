use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, Select};
use serde::{Deserialize, Serialize};

/// Body measurements used to pick sizes. Not unique per user at the schema level.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub height: Option<f64>, // in centimeters
    pub weight: Option<f64>, // in kilograms
    pub body_type: Option<String>,

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
