use common::TryOnStatus;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, Select};
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "try_on")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    /// NULL until a product is chosen for processing.
    pub product_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "product_id", to = "id")]
    pub product: Option<super::product::Entity>,

    /// Stored upload path, e.g. `uploads/<user_id>_<uuid>.jpg`.
    pub original_image: String,
    pub result_image: Option<String>,

    pub status: TryOnStatus,

    /// Bumped every time processing is (re)started; the completion job only
    /// applies while the version it was scheduled with is still current.
    #[sea_orm(default_value = 0)]
    pub version: i32,

    #[sea_orm(has_many)]
    pub histories: HasMany<super::try_on_history::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    pub deleted: bool,
    pub deleted_at: Option<DateTimeUtc>,
}

impl Entity {
    /// Try-ons that have not been soft-deleted.
    pub fn find_live() -> Select<Entity> {
        Self::find().filter(Column::Deleted.eq(false))
    }

    /// Live try-on `id` owned by `user_id`.
    pub fn find_owned(id: Uuid, user_id: Uuid) -> Select<Entity> {
        Self::find_live()
            .filter(Column::Id.eq(id))
            .filter(Column::UserId.eq(user_id))
    }
}

impl ActiveModelBehavior for ActiveModel {}
