use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, Select};
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string, never the plaintext.
    pub password: String,
    pub name: String,

    #[sea_orm(has_many)]
    pub profiles: HasMany<super::user_profile::Entity>,

    #[sea_orm(has_many)]
    pub try_ons: HasMany<super::try_on::Entity>,

    #[sea_orm(has_many)]
    pub try_on_histories: HasMany<super::try_on_history::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    pub deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
}

impl Entity {
    /// Users that have not been soft-deleted.
    pub fn find_live() -> Select<Entity> {
        Self::find().filter(Column::Deleted.eq(false))
    }
}

impl ActiveModelBehavior for ActiveModel {}
