use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use sea_orm::*;
use sea_orm::sea_query::{
    Index, IndexCreateStatement, MysqlQueryBuilder, PostgresQueryBuilder, SqliteQueryBuilder,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::entity::{product, product_size, size, try_on};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid catalog entry: {0}")]
    Invalid(String),
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Product catalog file.
///
/// ```toml
/// [[sizes]]
/// name = "M"
///
/// [[products]]
/// name = "Linen shirt"
/// price = 49.9
/// category = "shirts"
/// brand = "Acme"
/// sizes = ["M"]
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct Catalog {
    #[serde(default)]
    pub sizes: Vec<CatalogSize>,
    #[serde(default)]
    pub products: Vec<CatalogProduct>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogSize {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CatalogProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category: String,
    pub brand: String,
    #[serde(default)]
    pub image_url: String,
    /// Size names; sizes not listed under `[[sizes]]` are created too.
    #[serde(default)]
    pub sizes: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub sizes_inserted: u32,
    pub products_inserted: u32,
    pub links_inserted: u32,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, SeedError> {
        let catalog: Catalog = toml::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), SeedError> {
        for s in &self.sizes {
            if s.name.trim().is_empty() {
                return Err(SeedError::Invalid("size name must not be empty".into()));
            }
        }
        for p in &self.products {
            if p.name.trim().is_empty() || p.brand.trim().is_empty() {
                return Err(SeedError::Invalid(
                    "product name and brand must not be empty".into(),
                ));
            }
            if !(p.price.is_finite() && p.price >= 0.0) {
                return Err(SeedError::Invalid(format!(
                    "product '{}' has a negative or non-finite price",
                    p.name
                )));
            }
        }
        Ok(())
    }
}

/// Insert the catalog's sizes and products that are not in the database yet.
///
/// Sizes are matched by name and products by `(name, brand)`, so running this
/// repeatedly is safe.
pub async fn seed_catalog(
    db: &DatabaseConnection,
    catalog: &Catalog,
) -> Result<SeedSummary, SeedError> {
    let txn = db.begin().await?;
    let mut summary = SeedSummary::default();
    let mut size_ids: HashMap<String, Uuid> = HashMap::new();

    let declared = catalog.sizes.iter().map(|s| s.name.trim());
    let referenced = catalog
        .products
        .iter()
        .flat_map(|p| p.sizes.iter().map(|s| s.trim()));

    for name in declared.chain(referenced) {
        if name.is_empty() || size_ids.contains_key(name) {
            continue;
        }
        let (id, inserted) = ensure_size(&txn, name).await?;
        if inserted {
            summary.sizes_inserted += 1;
        }
        size_ids.insert(name.to_string(), id);
    }

    for entry in &catalog.products {
        let (product_id, inserted) = ensure_product(&txn, entry).await?;
        if inserted {
            summary.products_inserted += 1;
        }

        for size_name in &entry.sizes {
            let Some(&size_id) = size_ids.get(size_name.trim()) else {
                continue;
            };
            let link = product_size::ActiveModel {
                product_id: Set(product_id),
                size_id: Set(size_id),
            };
            let result = product_size::Entity::insert(link)
                .on_conflict(
                    sea_orm::sea_query::OnConflict::columns([
                        product_size::Column::ProductId,
                        product_size::Column::SizeId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await;

            match result {
                Ok(n) if n > 0 => summary.links_inserted += 1,
                Ok(_) | Err(DbErr::RecordNotInserted) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    txn.commit().await?;

    if summary != SeedSummary::default() {
        info!(
            sizes = summary.sizes_inserted,
            products = summary.products_inserted,
            links = summary.links_inserted,
            "Seeded product catalog"
        );
    }

    Ok(summary)
}

async fn ensure_size<C: ConnectionTrait>(db: &C, name: &str) -> Result<(Uuid, bool), DbErr> {
    if let Some(existing) = size::Entity::find()
        .filter(size::Column::Name.eq(name))
        .one(db)
        .await?
    {
        return Ok((existing.id, false));
    }

    let now = Utc::now();
    let model = size::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted: Set(false),
        deleted_at: Set(None),
    }
    .insert(db)
    .await?;

    Ok((model.id, true))
}

async fn ensure_product<C: ConnectionTrait>(
    db: &C,
    entry: &CatalogProduct,
) -> Result<(Uuid, bool), DbErr> {
    let name = entry.name.trim();
    let brand = entry.brand.trim();

    if let Some(existing) = product::Entity::find()
        .filter(product::Column::Name.eq(name))
        .filter(product::Column::Brand.eq(brand))
        .one(db)
        .await?
    {
        return Ok((existing.id, false));
    }

    let now = Utc::now();
    let model = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(entry.description.clone()),
        price: Set(entry.price),
        category: Set(entry.category.trim().to_string()),
        brand: Set(brand.to_string()),
        image_url: Set(entry.image_url.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted: Set(false),
        deleted_at: Set(None),
    }
    .insert(db)
    .await?;

    Ok((model.id, true))
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // History listing:
    // SELECT * FROM try_on WHERE user_id = ? AND deleted = false ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_try_on_user_created")
        .table(try_on::Entity)
        .col(try_on::Column::UserId)
        .col(try_on::Column::CreatedAt)
        .to_owned();

    match db.execute_unprepared(&index_sql(db, &stmt)).await {
        Ok(_) => {
            info!("Ensured index idx_try_on_user_created exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_try_on_user_created: {}", e);
        }
    }

    // Product filters: WHERE category = ? AND brand = ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_product_category_brand")
        .table(product::Entity)
        .col(product::Column::Category)
        .col(product::Column::Brand)
        .to_owned();

    match db.execute_unprepared(&index_sql(db, &stmt)).await {
        Ok(_) => {
            info!("Ensured index idx_product_category_brand exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_product_category_brand: {}", e);
        }
    }

    Ok(())
}

fn index_sql(db: &DatabaseConnection, stmt: &IndexCreateStatement) -> String {
    match db.get_database_backend() {
        DbBackend::Postgres => stmt.to_string(PostgresQueryBuilder),
        DbBackend::Sqlite => stmt.to_string(SqliteQueryBuilder),
        _ => stmt.to_string(MysqlQueryBuilder),
    }
}
