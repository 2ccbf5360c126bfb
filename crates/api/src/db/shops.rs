//! Shop repository.
//!
//! Shops are owned by `OpenStreetMap`; this table is a local mirror that
//! discovery refreshes. Rows are never deleted.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thekawatch_core::ShopId;
use tracing::instrument;

use super::RepositoryError;
use crate::models::{NewShop, Shop};

/// Repository for shop database operations.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a shop by its `OpenStreetMap` id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: &ShopId) -> Result<Option<Shop>, RepositoryError> {
        let shop = sqlx::query_as::<_, Shop>(
            r"
            SELECT osm_id, name, lat, lon, category, address,
                   last_seen, created_at, updated_at
            FROM thekawatch.shop
            WHERE osm_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(shop)
    }

    /// Insert or refresh every discovered shop, stamping `last_seen`.
    ///
    /// Runs in a single transaction so a failed batch leaves no partial refresh.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    #[instrument(skip(self, shops), fields(count = shops.len()))]
    pub async fn upsert_many(
        &self,
        shops: &[NewShop],
        seen_at: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for shop in shops {
            affected += sqlx::query(
                r"
                INSERT INTO thekawatch.shop (osm_id, name, lat, lon, category, address, last_seen)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (osm_id) DO UPDATE
                SET name = EXCLUDED.name,
                    lat = EXCLUDED.lat,
                    lon = EXCLUDED.lon,
                    category = EXCLUDED.category,
                    address = EXCLUDED.address,
                    last_seen = EXCLUDED.last_seen,
                    updated_at = now()
                ",
            )
            .bind(&shop.osm_id)
            .bind(&shop.name)
            .bind(shop.lat)
            .bind(shop.lon)
            .bind(shop.category)
            .bind(&shop.address)
            .bind(seen_at)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(affected)
    }
}
