use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kept for schema parity; no endpoint reads or writes it.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "try_on_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub try_on_id: Uuid,
    #[sea_orm(belongs_to, from = "try_on_id", to = "id")]
    pub try_on: HasOne<super::try_on::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    pub deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
